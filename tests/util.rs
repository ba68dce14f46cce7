#![allow(dead_code)]
use mesh_dispatch::topology::{GridOptions, StructuredGrid};

/// `n × n × n` cell cube in one partition.
pub fn cube(n: usize) -> StructuredGrid<3> {
    StructuredGrid::try_new([n, n, n], GridOptions::default()).unwrap()
}

/// 2D grid split into `partitions` contiguous chunks per dimension.
pub fn partitioned_plane(nx: usize, ny: usize, partitions: usize) -> StructuredGrid<2> {
    StructuredGrid::try_new([nx, ny], GridOptions { partitions }).unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
