//! Core type handles for the in-memory type universe.
//!
//! Types are interned: every structurally distinct [`TypeData`] gets exactly
//! one [`TypeId`], so type equality is a `u32` comparison and `TypeId` is a
//! valid cache key.

use crate::def::DefId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Interned type handle.
///
/// Only meaningful together with the universe that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// First id handed out by a universe.
    pub const FIRST: u32 = 1;
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Argument lists rarely exceed two entries.
pub type TypeList = SmallVec<[TypeId; 4]>;

/// A generic definition applied to an argument list.
///
/// When `args` are exactly the definition's own parameters this is the open
/// generic definition itself (`Range<>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub definition: DefId,
    pub args: TypeList,
}

/// Reference to the `index`-th type parameter of `owner`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamRef {
    pub owner: DefId,
    pub index: u32,
}

/// Structural representation behind a [`TypeId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// A non-generic declared class, struct or interface.
    Named(DefId),
    /// A generic definition applied to arguments (closed, partially open, or
    /// the open definition itself).
    Application(TypeApplication),
    /// An unbound generic parameter.
    Parameter(TypeParamRef),
}

impl TypeData {
    /// The declaration this type is built from, if any.
    pub fn definition(&self) -> Option<DefId> {
        match self {
            TypeData::Named(def) => Some(*def),
            TypeData::Application(app) => Some(app.definition),
            TypeData::Parameter(_) => None,
        }
    }
}
