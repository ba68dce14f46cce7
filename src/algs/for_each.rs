//! Loop constructors.

use crate::access::list::AccessList;
use crate::algs::mesh_loop::{KernelOutcome, MeshLoop};
use crate::algs::step_range::{Step, StepRange};
use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use crate::topology::mesh::Mesh;
use crate::topology::range::EntityRange;

/// Mesh loop over every entity of `range`, in range order.
///
/// ```rust
/// # fn try_main() -> Result<(), mesh_dispatch::mesh_error::MeshDispatchError> {
/// use mesh_dispatch::prelude::*;
///
/// let grid = StructuredGrid::try_new([2, 2], GridOptions::default())?;
/// let u = CpuBuffer::<_, f64>::try_new(&grid, [0, 0, 1, 0])?;
/// let cells = grid.entity_range(2)?;
/// let mut lp = for_each_entity(&cells, (cell(&u).write(),), |_, _, (v,)| v.set(0, 1.0));
/// SequentialDispatcher.execute((&mut lp,))?;
/// assert_eq!(u.to_vec(), vec![1.0; 4]);
/// # Ok(())
/// # }
/// # try_main().unwrap();
/// ```
pub fn for_each_entity<'r, A, F, R>(
    range: &'r EntityRange,
    access: A,
    body: F,
) -> MeshLoop<'r, A, F>
where
    A: AccessList,
    F: FnMut(Entity, Step, A::Views) -> R,
    R: KernelOutcome,
{
    MeshLoop::new(range, access, body)
}

/// Calls `body(i, sub)` for each direct sub-entity of `entity`, in the order
/// the mesh reports them. `i` is the local sub-entity index, the same index
/// neighbor patterns take as `across`.
pub fn for_each_sub_entity<M, F, R>(
    mesh: &M,
    entity: Entity,
    mut body: F,
) -> Result<(), MeshDispatchError>
where
    M: Mesh,
    F: FnMut(usize, Entity) -> R,
    R: KernelOutcome,
{
    for (i, sub) in mesh.sub_entities(entity).into_iter().enumerate() {
        body(i, sub).into_result()?;
    }
    Ok(())
}

/// Calls `body(i)` for each value of `steps`: a count, a range or a
/// strided [`StepRange`].
pub fn for_each<F, R>(steps: impl Into<StepRange>, mut body: F) -> Result<(), MeshDispatchError>
where
    F: FnMut(Step) -> R,
    R: KernelOutcome,
{
    for i in steps.into() {
        body(i).into_result()?;
    }
    Ok(())
}
