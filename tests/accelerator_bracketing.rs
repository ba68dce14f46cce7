use mesh_dispatch::prelude::*;
use mesh_dispatch::dispatch::QueueEvent;

fn line() -> StructuredGrid<1> {
    StructuredGrid::try_new([4], GridOptions::default()).unwrap()
}

fn set_step(kernel: &str, step: usize) -> QueueEvent {
    QueueEvent::SetStep {
        kernel: kernel.into(),
        step,
    }
}

#[test]
fn unmap_steps_finish_map() {
    let grid = line();
    let u = CpuBuffer::<_, f64>::try_new(&grid, [0, 1, 1]).unwrap();
    let cells = grid.entity_range(1).unwrap();
    let mut write_step = OffloadedLoop::new(
        for_each_entity(&cells, (cell(&u).write(),), |_, s, (v,)| v.set(0, s as f64))
            .with_label("write"),
    );
    let mut count = OffloadedLoop::new(
        for_each_entity(&cells, (global(&u).accumulate(),), |_, _, (g,)| g.add(0, 1.0))
            .with_label("count"),
    );

    let mut d = AcceleratorDispatcher::new(HostAccelerator::recording());
    d.execute_steps(1..=2, &mut [&mut write_step as &mut dyn HostKernel, &mut count][..])
        .unwrap();

    let acc = d.into_inner();
    assert_eq!(
        acc.events(),
        &[
            QueueEvent::Unmap("write".into()),
            QueueEvent::Unmap("count".into()),
            set_step("write", 1),
            QueueEvent::Enqueue("write".into()),
            set_step("count", 1),
            QueueEvent::Enqueue("count".into()),
            set_step("write", 2),
            QueueEvent::Enqueue("write".into()),
            set_step("count", 2),
            QueueEvent::Enqueue("count".into()),
            QueueEvent::Finish,
            QueueEvent::Map("write".into()),
            QueueEvent::Map("count".into()),
        ]
    );
    assert_eq!(acc.launches(), 4);
    assert_eq!(acc.unmapped_count(), 0);
    assert_eq!(u.partition_values(1), vec![2.0; 4]);
    assert_eq!(u.partition_values(2), vec![8.0]);
    assert_eq!(write_step.step(), 2);
}

#[test]
fn dispatcher_is_stateless_between_calls() {
    let grid = line();
    let u = CpuBuffer::<_, i32>::try_new(&grid, [1, 0, 0]).unwrap();
    let nodes = grid.entity_range(0).unwrap();
    let mut kernels = vec![OffloadedLoop::new(for_each_entity(
        &nodes,
        (node(&u).accumulate(),),
        |_, _, (v,)| v.add(0, 1),
    ))];
    let mut d = AcceleratorDispatcher::new(HostAccelerator::default());
    d.execute(&mut kernels).unwrap();
    d.execute_steps(0..2, &mut kernels).unwrap();
    assert_eq!(d.accelerator().launches(), 3);
    assert_eq!(d.accelerator().unmapped_count(), 0);
    assert!(u.to_vec().iter().all(|&x| x == 3));
}

#[test]
fn kernel_failure_still_maps_every_kernel() {
    let grid = line();
    let cells = grid.entity_range(1).unwrap();
    let mut bad = OffloadedLoop::new(
        for_each_entity(&cells, (), |_, step, ()| {
            if step == 1 {
                Err(MeshDispatchError::kernel("bad", "step 1"))
            } else {
                Ok(())
            }
        })
        .with_label("bad"),
    );
    let mut d = AcceleratorDispatcher::new(HostAccelerator::recording());
    let err = d
        .execute_steps(0..3, &mut [&mut bad][..])
        .unwrap_err();
    assert_eq!(err, MeshDispatchError::kernel("bad", "step 1"));
    let acc = d.accelerator();
    assert_eq!(acc.launches(), 1);
    assert_eq!(acc.unmapped_count(), 0);
    assert_eq!(
        acc.events(),
        &[
            QueueEvent::Unmap("bad".into()),
            set_step("bad", 0),
            QueueEvent::Enqueue("bad".into()),
            set_step("bad", 1),
            QueueEvent::Enqueue("bad".into()),
            QueueEvent::Finish,
            QueueEvent::Map("bad".into()),
        ]
    );
}

#[test]
fn run_after_failure_starts_clean() {
    let grid = line();
    let u = CpuBuffer::<_, i32>::try_new(&grid, [0, 1, 0]).unwrap();
    let cells = grid.entity_range(1).unwrap();
    let fail = std::cell::Cell::new(true);
    let mut k = OffloadedLoop::new(
        for_each_entity(&cells, (cell(&u).accumulate(),), |_, _, (v,)| {
            if fail.get() {
                return Err(MeshDispatchError::kernel("flaky", "transient"));
            }
            v.add(0, 1);
            Ok(())
        })
        .with_label("flaky"),
    );
    let mut d = AcceleratorDispatcher::new(HostAccelerator::default());

    let first = d.execute(&mut [&mut k][..]);
    assert_eq!(first, Err(MeshDispatchError::kernel("flaky", "transient")));
    assert_eq!(d.accelerator().unmapped_count(), 0);

    fail.set(false);
    d.execute(&mut [&mut k][..]).unwrap();
    assert_eq!(d.accelerator().launches(), 1);
    assert_eq!(d.accelerator().unmapped_count(), 0);
    assert_eq!(u.partition_values(1), vec![1; 4]);
}

#[test]
fn lenient_mapping_keeps_going() {
    let grid = line();
    let cells = grid.entity_range(1).unwrap();
    let mut k = OffloadedLoop::new(for_each_entity(&cells, (), |_, _, ()| ()));
    let mut acc = HostAccelerator::new(HostAcceleratorOptions {
        strict_mapping: false,
        record_events: false,
    });
    // mapping a kernel that was never unmapped is only logged
    Accelerator::map(&mut acc, &mut k).unwrap();
    let mut d = AcceleratorDispatcher::new(acc);
    d.execute(&mut [&mut k][..]).unwrap();
    assert_eq!(d.accelerator().launches(), 1);
}
