mod util;
use util::*;

use mesh_dispatch::prelude::*;

#[test]
fn each_partition_writes_only_its_own_cells() {
    let grid = partitioned_plane(4, 4, 4);
    let cells = grid.entity_range(2).unwrap();
    assert_eq!(cells.num_partitions(), 4);
    let u = CpuBuffer::<_, usize>::try_new(&grid, [0, 0, 1, 0]).unwrap();
    for p in 0..cells.num_partitions() {
        let mut lp = for_each_entity(&cells, (cell(&u).write(),), move |_, _, (v,)| v.set(0, p + 1))
            .with_strategy(PartitionLocal::new(p));
        SequentialDispatcher.execute((&mut lp,)).unwrap();
    }
    for i in 0..grid.num_entities(2) {
        assert_eq!(u.get(u.dof_indices(2, i).start), grid.partition_of(2, i) + 1);
    }
}

#[test]
fn serial_strategy_covers_every_partition_once() {
    let grid = partitioned_plane(3, 3, 2);
    let nodes = grid.entity_range(0).unwrap();
    let mut seen = Vec::new();
    let mut lp = for_each_entity(&nodes, (), |e: Entity, _, ()| seen.push(e.index()));
    SequentialDispatcher.execute((&mut lp,)).unwrap();
    drop(lp);
    let all: Vec<usize> = (0..grid.num_entities(0)).collect();
    assert_permutation(&seen, &all);
}

#[test]
fn entities_carry_their_partition() {
    let grid = partitioned_plane(4, 2, 2);
    let cells = grid.entity_range(2).unwrap();
    let mut lp = for_each_entity(&cells, (), |e: Entity, _, ()| {
        assert_eq!(e.partition(), 1);
    })
    .with_strategy(PartitionLocal::new(1));
    SequentialDispatcher.execute((&mut lp,)).unwrap();
}

#[test]
fn missing_partition_is_an_error() {
    let grid = partitioned_plane(2, 2, 2);
    let cells = grid.entity_range(2).unwrap();
    let mut lp = for_each_entity(&cells, (), |_, _, ()| ()).with_strategy(PartitionLocal::new(5));
    assert_eq!(
        SequentialDispatcher.execute((&mut lp,)),
        Err(MeshDispatchError::PartitionOutOfRange {
            partition: 5,
            count: 2
        })
    );
}
