use std::cell::RefCell;

use mesh_dispatch::prelude::*;

fn plane() -> StructuredGrid<2> {
    StructuredGrid::try_new([3, 2], GridOptions::default()).unwrap()
}

#[test]
fn k_steps_visit_every_entity_k_times_in_stable_order() {
    const K: usize = 4;
    let grid = plane();
    let cells = grid.entity_range(2).unwrap();
    let calls = RefCell::new(Vec::new());
    let mut lp = for_each_entity(&cells, (), |e: Entity, step, ()| {
        calls.borrow_mut().push((step, e.index()));
    });
    SequentialDispatcher.execute_steps(1..=K, (&mut lp,)).unwrap();
    drop(lp);

    let calls = calls.into_inner();
    assert_eq!(calls.len(), K * cells.len());
    let order: Vec<usize> = cells.iter().map(|e| e.index()).collect();
    for (k, chunk) in calls.chunks(cells.len()).enumerate() {
        assert!(chunk.iter().all(|&(s, _)| s == k + 1));
        let seen: Vec<usize> = chunk.iter().map(|&(_, i)| i).collect();
        assert_eq!(seen, order);
    }
}

#[test]
fn loops_follow_argument_order_inside_each_step() {
    let grid = plane();
    let cells = grid.entity_range(2).unwrap();
    let nodes = grid.entity_range(0).unwrap();
    let calls = RefCell::new(Vec::new());
    let mut first = for_each_entity(&cells, (), |e: Entity, step, ()| {
        calls.borrow_mut().push(("cells", step, e.index()));
    });
    let mut second = for_each_entity(&nodes, (), |e: Entity, step, ()| {
        calls.borrow_mut().push(("nodes", step, e.index()));
    });
    SequentialDispatcher
        .execute_steps(0..2, (&mut first, &mut second))
        .unwrap();
    drop((first, second));

    let tags: Vec<(&str, usize)> = calls
        .into_inner()
        .into_iter()
        .map(|(t, s, _)| (t, s))
        .collect::<Vec<_>>()
        .chunk_by(|a, b| a == b)
        .map(|run| run[0])
        .collect();
    assert_eq!(
        tags,
        vec![("cells", 0), ("nodes", 0), ("cells", 1), ("nodes", 1)]
    );
}

#[test]
fn entity_order_is_range_order() {
    let grid = plane();
    let range = EntityRange::from_indices(2, [4, 1, 5, 0]).unwrap();
    let u = CpuBuffer::<_, usize>::try_new(&grid, [0, 0, 1, 0]).unwrap();
    let next = std::cell::Cell::new(0);
    let mut lp = for_each_entity(&range, (cell(&u).write(),), |_, _, (v,)| {
        v.set(0, next.get());
        next.set(next.get() + 1);
    });
    SequentialDispatcher.execute((&mut lp,)).unwrap();
    assert_eq!(u.get(u.dof_indices(2, 4).start), 0);
    assert_eq!(u.get(u.dof_indices(2, 1).start), 1);
    assert_eq!(u.get(u.dof_indices(2, 5).start), 2);
    assert_eq!(u.get(u.dof_indices(2, 0).start), 3);
}

#[test]
fn strided_steps_reach_the_body() {
    let grid = plane();
    let cells = grid.entity_range(2).unwrap();
    let u = CpuBuffer::<_, usize>::try_new(&grid, [0, 0, 0, 1]).unwrap();
    let mut lp = for_each_entity(&cells, (global(&u).accumulate(),), |_, step, (g,)| {
        g.add(0, step)
    });
    let steps = StepRange::new(0, 10).with_stride(5).unwrap();
    SequentialDispatcher.execute_steps(steps, (&mut lp,)).unwrap();
    // steps 0 and 5, six cells each
    assert_eq!(u.partition_values(3), vec![30]);
}

#[test]
fn body_error_surfaces_from_execute() {
    let grid = plane();
    let cells = grid.entity_range(2).unwrap();
    let mut lp = for_each_entity(&cells, (), |e: Entity, step, ()| {
        if step == 1 && e.index() == 3 {
            return Err(MeshDispatchError::kernel("probe", format!("cell {}", e.index())));
        }
        Ok(())
    })
    .with_label("probe");
    let err = SequentialDispatcher
        .execute_steps(0..3, (&mut lp,))
        .unwrap_err();
    assert_eq!(err, MeshDispatchError::kernel("probe", "cell 3"));
    assert_eq!(err.to_string(), "kernel `probe` failed: cell 3");
}

#[test]
fn loops_are_reusable_across_calls() {
    let grid = plane();
    let cells = grid.entity_range(2).unwrap();
    let u = CpuBuffer::<_, i32>::try_new(&grid, [0, 0, 1, 0]).unwrap();
    let mut bump = for_each_entity(&cells, (cell(&u).read_write(),), |_, _, (v,)| {
        v.set(0, v.get(0) + 1)
    });
    SequentialDispatcher.execute((&mut bump,)).unwrap();
    SequentialDispatcher.execute_steps(3usize, (&mut bump,)).unwrap();
    assert!(u.to_vec().iter().all(|&x| x == 4));
}
