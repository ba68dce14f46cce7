//! Heterogeneous lists of access definitions.
//!
//! A loop takes an ordered list of definitions and hands the body the
//! corresponding list of local views, position for position. Tuples of up to
//! eight definitions are supported, as are arrays and vectors of one
//! definition type.

use crate::access::definition::AccessDefinition;
use crate::access::local_view::LocalView;
use crate::access::mode::AccessMode;
use crate::data::storage::Storage;
use crate::topology::entity::Entity;
use crate::topology::mesh::Mesh;

/// Anything that yields a view for an iterated entity.
pub trait Access {
    type View;

    fn project(&self, entity: Entity) -> Self::View;
}

impl<'b, M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>> Access
    for AccessDefinition<'b, M, V, Mode, S>
{
    type View = LocalView<'b, V, Mode>;

    #[inline]
    fn project(&self, entity: Entity) -> Self::View {
        AccessDefinition::project(self, entity)
    }
}

impl<A: Access + ?Sized> Access for &A {
    type View = A::View;

    #[inline]
    fn project(&self, entity: Entity) -> Self::View {
        (**self).project(entity)
    }
}

/// Ordered list of accesses projected together.
pub trait AccessList {
    /// Views handed to the body, in list order.
    type Views;

    /// Number of accesses in the list.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn project(&self, entity: Entity) -> Self::Views;
}

impl AccessList for () {
    type Views = ();

    fn len(&self) -> usize {
        0
    }

    #[inline]
    fn project(&self, _entity: Entity) -> Self::Views {}
}

macro_rules! tuple_access_list {
    ($len:literal; $($name:ident),+) => {
        impl<$($name: Access),+> AccessList for ($($name,)+) {
            type Views = ($($name::View,)+);

            fn len(&self) -> usize {
                $len
            }

            #[inline]
            #[allow(non_snake_case)]
            fn project(&self, entity: Entity) -> Self::Views {
                let ($($name,)+) = self;
                ($($name.project(entity),)+)
            }
        }
    };
}

tuple_access_list!(1; A);
tuple_access_list!(2; A, B);
tuple_access_list!(3; A, B, C);
tuple_access_list!(4; A, B, C, D);
tuple_access_list!(5; A, B, C, D, E);
tuple_access_list!(6; A, B, C, D, E, F);
tuple_access_list!(7; A, B, C, D, E, F, G);
tuple_access_list!(8; A, B, C, D, E, F, G, H);

impl<A: Access, const N: usize> AccessList for [A; N] {
    type Views = [A::View; N];

    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn project(&self, entity: Entity) -> Self::Views {
        self.each_ref().map(|a| a.project(entity))
    }
}

impl<A: Access> AccessList for Vec<A> {
    type Views = Vec<A::View>;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn project(&self, entity: Entity) -> Self::Views {
        self.iter().map(|a| a.project(entity)).collect()
    }
}
