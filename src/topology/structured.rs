//! Structured Cartesian grids in one, two and three dimensions.
//!
//! Entities of dimension `k` are grouped into *orientations*: the set of `k`
//! axes the entity spans (an x-edge spans axis 0, an xy-face spans axes 0
//! and 1). Orientations are enumerated as lexicographic axis combinations;
//! inside an orientation, entities are numbered lexicographically with x
//! varying fastest, the same row-major scheme the box generators use for
//! vertices (`j * (nx + 1) + i`).

use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use crate::topology::mesh::Mesh;
use itertools::Itertools;

/// Options for [`StructuredGrid`] construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Number of contiguous partitions each dimension is split into.
    pub partitions: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self { partitions: 1 }
    }
}

/// One orientation block of a dimension.
#[derive(Clone, Copy, Debug)]
struct Block<const D: usize> {
    /// Bit `a` set when the entity spans axis `a`.
    mask: u8,
    /// Number of positions along each axis.
    extents: [usize; D],
    /// First entity index of the block.
    start: usize,
    len: usize,
}

/// A `D`-dimensional grid of `cells[0] × … × cells[D-1]` unit cells.
#[derive(Clone, Debug)]
pub struct StructuredGrid<const D: usize> {
    cells: [usize; D],
    options: GridOptions,
    blocks: Vec<Vec<Block<D>>>,
    counts: Vec<usize>,
}

fn invalid_geometry(message: impl Into<String>) -> MeshDispatchError {
    MeshDispatchError::InvalidGeometry(message.into())
}

impl<const D: usize> StructuredGrid<D> {
    /// Build a grid with `cells[a]` cells along axis `a`.
    ///
    /// # Errors
    /// Returns `Err(InvalidGeometry)` if `D` is not 1, 2 or 3, if any axis has
    /// zero cells, or if `options.partitions` is zero.
    pub fn try_new(cells: [usize; D], options: GridOptions) -> Result<Self, MeshDispatchError> {
        if !(1..=3).contains(&D) {
            return Err(invalid_geometry(format!("unsupported grid dimension {D}")));
        }
        if let Some(axis) = cells.iter().position(|&n| n == 0) {
            return Err(invalid_geometry(format!("axis {axis} has zero cells")));
        }
        if options.partitions == 0 {
            return Err(invalid_geometry("partitions must be positive"));
        }

        let mut blocks = Vec::with_capacity(D + 1);
        let mut counts = Vec::with_capacity(D + 1);
        for k in 0..=D {
            let mut start = 0usize;
            let mut dim_blocks = Vec::new();
            for axes in (0..D).combinations(k) {
                let mask = axes.iter().fold(0u8, |m, &a| m | (1 << a));
                let mut extents = [0usize; D];
                for (a, ext) in extents.iter_mut().enumerate() {
                    *ext = if mask & (1 << a) != 0 {
                        cells[a]
                    } else {
                        cells[a] + 1
                    };
                }
                let len = extents
                    .iter()
                    .try_fold(1usize, |acc, &e| acc.checked_mul(e))
                    .ok_or_else(|| invalid_geometry("entity count overflows usize"))?;
                dim_blocks.push(Block {
                    mask,
                    extents,
                    start,
                    len,
                });
                start = start
                    .checked_add(len)
                    .ok_or_else(|| invalid_geometry("entity count overflows usize"))?;
            }
            blocks.push(dim_blocks);
            counts.push(start);
        }
        log::debug!("structured grid {cells:?}: entity counts {counts:?}");
        Ok(Self {
            cells,
            options,
            blocks,
            counts,
        })
    }

    /// Cells along each axis.
    pub fn cells(&self) -> [usize; D] {
        self.cells
    }

    /// Options the grid was built with.
    pub fn options(&self) -> GridOptions {
        self.options
    }

    /// Lattice position of `entity` inside its orientation block, together
    /// with the axes it spans as a bitmask.
    pub fn lattice_position(&self, entity: Entity) -> Option<(u8, [usize; D])> {
        let block = self.block_of(entity.dim(), entity.index())?;
        let mut rem = entity.index() - block.start;
        let mut pos = [0usize; D];
        for (p, &ext) in pos.iter_mut().zip(block.extents.iter()) {
            *p = rem % ext;
            rem /= ext;
        }
        Some((block.mask, pos))
    }

    fn block_of(&self, dim: usize, index: usize) -> Option<&Block<D>> {
        self.blocks
            .get(dim)?
            .iter()
            .find(|b| index >= b.start && index < b.start + b.len)
    }

    fn encode(&self, dim: usize, mask: u8, pos: &[usize; D]) -> Option<Entity> {
        let block = self.blocks.get(dim)?.iter().find(|b| b.mask == mask)?;
        let mut index = 0usize;
        let mut stride = 1usize;
        for (&p, &ext) in pos.iter().zip(block.extents.iter()) {
            if p >= ext {
                return None;
            }
            index += p * stride;
            stride *= ext;
        }
        let index = block.start + index;
        Some(Entity::new(dim, index, self.partition_index(dim, index)))
    }

    fn partition_index(&self, dim: usize, index: usize) -> usize {
        let count = self.counts.get(dim).copied().unwrap_or(0);
        let chunk = count.div_ceil(self.options.partitions).max(1);
        index / chunk
    }

    fn spanned_axes(mask: u8) -> impl Iterator<Item = usize> {
        (0..D).filter(move |a| mask & (1 << a) != 0)
    }

    fn children(&self, entity: Entity) -> Vec<Entity> {
        let Some((mask, pos)) = self.lattice_position(entity) else {
            return Vec::new();
        };
        let dim = entity.dim();
        let mut out = Vec::with_capacity(2 * dim);
        for a in Self::spanned_axes(mask) {
            let child_mask = mask & !(1 << a);
            let mut upper = pos;
            upper[a] += 1;
            out.extend(self.encode(dim - 1, child_mask, &pos));
            out.extend(self.encode(dim - 1, child_mask, &upper));
        }
        out
    }

    fn adjacent(&self, entity: Entity, across: usize) -> Option<Entity> {
        let (mask, pos) = self.lattice_position(entity)?;
        let axis = Self::spanned_axes(mask).nth(across / 2)?;
        let mut other = pos;
        if across % 2 == 0 {
            other[axis] = pos[axis].checked_sub(1)?;
        } else {
            other[axis] = pos[axis] + 1;
        }
        self.encode(entity.dim(), mask, &other)
    }

    fn parent_cell(&self, entity: Entity) -> Option<Entity> {
        let (mask, mut pos) = self.lattice_position(entity)?;
        for (a, p) in pos.iter_mut().enumerate() {
            if mask & (1 << a) == 0 {
                *p = p.saturating_sub(1);
            }
        }
        let full = ((1u16 << D) - 1) as u8;
        self.encode(D, full, &pos)
    }
}

macro_rules! impl_mesh_for_grid {
    ($d:literal, $n:literal) => {
        impl Mesh for StructuredGrid<$d> {
            const CELL_DIM: usize = $d;
            type Dofs = [usize; $n];

            fn num_entities(&self, dim: usize) -> usize {
                self.counts.get(dim).copied().unwrap_or(0)
            }

            fn num_partitions(&self) -> usize {
                self.options.partitions
            }

            fn partition_of(&self, dim: usize, index: usize) -> usize {
                self.partition_index(dim, index)
            }

            fn sub_entities(&self, entity: Entity) -> Vec<Entity> {
                self.children(entity)
            }

            fn neighbor(&self, entity: Entity, across: usize) -> Option<Entity> {
                self.adjacent(entity, across)
            }

            fn containing_cell(&self, entity: Entity) -> Option<Entity> {
                self.parent_cell(entity)
            }
        }
    };
}

impl_mesh_for_grid!(1, 3);
impl_mesh_for_grid!(2, 4);
impl_mesh_for_grid!(3, 5);
