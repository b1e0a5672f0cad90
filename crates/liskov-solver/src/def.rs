//! Declarations and their storage.
//!
//! A `DefId` names one declared class, struct or interface. Generic
//! declarations carry their type parameters (with constraint lists); classes
//! and structs carry their base type; every declaration carries the
//! interfaces it directly implements. Base and interface entries are stored
//! as `TypeId`s that may mention the declaration's own parameters.

use crate::types::{TypeId, TypeList};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `DefinitionStore` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// DefId
// =============================================================================

/// Declaration identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// First allocated `DefId`; `0` is never handed out.
    pub const FIRST_VALID: u32 = 1;
}

// =============================================================================
// DefKind
// =============================================================================

/// Kind of declaration.
///
/// | Kind | Base type | Appears in `implements` |
/// |------|-----------|-------------------------|
/// | Class | optional, class kind | no |
/// | Struct | optional, class kind | no |
/// | Interface | never | yes |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefKind {
    Class,
    Struct,
    Interface,
}

impl DefKind {
    pub const fn is_interface(self) -> bool {
        matches!(self, DefKind::Interface)
    }
}

// =============================================================================
// DefinitionInfo
// =============================================================================

/// One generic parameter slot of a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamInfo {
    pub name: String,
    /// Types the argument must be assignable to, in declaration order.
    pub constraints: TypeList,
}

impl TypeParamInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: TypeList::new(),
        }
    }
}

/// Complete information about a declaration.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    pub name: String,
    pub type_params: Vec<TypeParamInfo>,
    /// Direct base type (classes and structs only).
    pub extends: Option<TypeId>,
    /// Directly implemented interfaces, in declaration order.
    pub implements: Vec<TypeId>,
}

impl DefinitionInfo {
    pub fn new(kind: DefKind, name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            kind,
            name: name.into(),
            type_params: params.iter().map(|p| TypeParamInfo::new(*p)).collect(),
            extends: None,
            implements: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>, params: &[&str]) -> Self {
        Self::new(DefKind::Class, name, params)
    }

    pub fn structure(name: impl Into<String>, params: &[&str]) -> Self {
        Self::new(DefKind::Struct, name, params)
    }

    pub fn interface(name: impl Into<String>, params: &[&str]) -> Self {
        Self::new(DefKind::Interface, name, params)
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Thread-safe storage for declarations.
///
/// Uses `DashMap` so lookups from concurrent queries never need an outer lock.
/// Entries are `Arc`-shared; readers clone the `Arc`, never the declaration.
pub struct DefinitionStore {
    /// Unique instance ID for debugging (tracks which store instance this is)
    instance_id: u64,

    definitions: DashMap<DefId, Arc<DefinitionInfo>>,

    /// Declaration names are unique within a store.
    names: DashMap<String, DefId>,

    next_id: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DefinitionStore::new - creating new instance");
        Self {
            instance_id,
            definitions: DashMap::new(),
            names: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    /// Register a declaration.
    ///
    /// Returns `None` (and registers nothing) when the name is already taken.
    pub fn register(&self, info: DefinitionInfo) -> Option<DefId> {
        match self.names.entry(info.name.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let id = DefId(self.next_id.fetch_add(1, Ordering::SeqCst));
                trace!(
                    instance_id = self.instance_id,
                    def_id = id.0,
                    kind = ?info.kind,
                    name = %info.name,
                    "DefinitionStore::register"
                );
                self.definitions.insert(id, Arc::new(info));
                slot.insert(id);
                Some(id)
            }
        }
    }

    /// Get a declaration by `DefId`.
    pub fn get(&self, id: DefId) -> Option<Arc<DefinitionInfo>> {
        self.definitions.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn get_kind(&self, id: DefId) -> Option<DefKind> {
        self.definitions.get(&id).map(|r| r.kind)
    }

    pub fn get_name(&self, id: DefId) -> Option<String> {
        self.definitions.get(&id).map(|r| r.name.clone())
    }

    pub fn get_extends(&self, id: DefId) -> Option<TypeId> {
        self.definitions.get(&id).and_then(|r| r.extends)
    }

    /// Find a declaration by name.
    pub fn find_by_name(&self, name: &str) -> Option<DefId> {
        self.names.get(name).map(|r| *r)
    }

    /// Mutate a declaration in place. Returns `false` if `id` is unknown.
    pub fn update(&self, id: DefId, f: impl FnOnce(&mut DefinitionInfo)) -> bool {
        match self.definitions.get_mut(&id) {
            Some(mut entry) => {
                f(Arc::make_mut(entry.value_mut()));
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
