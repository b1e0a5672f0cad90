//! In-memory type universe.
//!
//! `TypeUniverse` is a synthetic reflection facility: it stores declarations
//! (classes, structs, interfaces, with generic parameters and constraints),
//! interns every type it hands out, and answers the [`TypeModel`] queries
//! the substitution checker needs.
//!
//! All methods take `&self`. Interning goes through `DashMap`, so queries
//! running on several threads may construct new closed types concurrently
//! and still agree on their `TypeId`s.
//!
//! ## Interface order
//!
//! [`TypeModel::interfaces`] lists the interfaces of the base chain first
//! (root-most ancestor first), then the type's own declared interfaces in
//! declaration order, each one immediately followed by the interfaces it
//! inherits (preorder). Duplicates keep their first position.

use crate::def::{DefId, DefKind, DefinitionInfo, DefinitionStore};
use crate::model::TypeModel;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{TypeApplication, TypeData, TypeId, TypeList, TypeParamRef};
use dashmap::DashMap;
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{trace, warn};

/// Errors reported while declaring types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("type `{0}` is already declared")]
    DuplicateName(String),
    #[error("unknown type {0}")]
    UnknownType(TypeId),
    #[error("`{0}` is not a type declaration")]
    NotADeclaration(String),
    #[error("`{0}` is not generic")]
    NotGeneric(String),
    #[error("`{name}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("`{name}` has no type parameter at index {index}")]
    ParameterOutOfRange { name: String, index: usize },
    #[error("`{name}` has no type parameter named `{param}`")]
    UnknownParameter { name: String, param: String },
    #[error("`{0}` is not a generic parameter")]
    NotAParameter(String),
    #[error("interface `{0}` cannot have a base type")]
    InterfaceBase(String),
    #[error("`{base}` cannot be used as the base type of `{name}`")]
    InvalidBase { name: String, base: String },
    #[error("`{0}` is not an interface")]
    NotAnInterface(String),
    #[error("`{ty}` mentions type parameters that do not belong to `{owner}`")]
    ForeignParameter { owner: String, ty: String },
    #[error("`{child}` inheriting from `{parent}` would create a cycle")]
    InheritanceCycle { child: String, parent: String },
}

/// Concurrent in-memory type universe.
pub struct TypeUniverse {
    defs: DefinitionStore,
    types: DashMap<TypeId, TypeData, FxBuildHasher>,
    interned: DashMap<TypeData, TypeId, FxBuildHasher>,
    /// `Named(def)` for plain declarations, the open application otherwise.
    def_types: DashMap<DefId, TypeId, FxBuildHasher>,
    /// Interface closures; dropped whenever a declaration changes.
    interface_cache: DashMap<TypeId, Arc<[TypeId]>, FxBuildHasher>,
    next_type: AtomicU32,
}

impl fmt::Debug for TypeUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeUniverse")
            .field("definitions", &self.defs.len())
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self {
            defs: DefinitionStore::new(),
            types: DashMap::default(),
            interned: DashMap::default(),
            def_types: DashMap::default(),
            interface_cache: DashMap::default(),
            next_type: AtomicU32::new(TypeId::FIRST),
        }
    }

    // =========================================================================
    // Interning
    // =========================================================================

    fn intern(&self, data: TypeData) -> TypeId {
        if let Some(existing) = self.interned.get(&data) {
            return *existing;
        }
        let key = data.clone();
        *self.interned.entry(key).or_insert_with(|| {
            let id = TypeId(self.next_type.fetch_add(1, Ordering::Relaxed));
            self.types.insert(id, data);
            id
        })
    }

    /// Structural data behind `ty`.
    pub fn data(&self, ty: TypeId) -> Option<TypeData> {
        self.types.get(&ty).map(|r| r.value().clone())
    }

    pub fn contains(&self, ty: TypeId) -> bool {
        self.types.contains_key(&ty)
    }

    /// Number of interned types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn definitions(&self) -> &DefinitionStore {
        &self.defs
    }

    /// The type a declaration introduces: plain for non-generic declarations,
    /// the open generic definition otherwise.
    pub fn definition_type(&self, def: DefId) -> Option<TypeId> {
        self.def_types.get(&def).map(|r| *r)
    }

    /// Look a declaration up by name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.defs
            .find_by_name(name)
            .and_then(|def| self.definition_type(def))
    }

    /// Declaration a type is built from (`None` for parameters).
    pub fn def_of(&self, ty: TypeId) -> Option<DefId> {
        self.types.get(&ty).and_then(|r| r.definition())
    }

    fn kind_of(&self, ty: TypeId) -> Option<DefKind> {
        self.def_of(ty).and_then(|def| self.defs.get_kind(def))
    }

    /// Render a type for humans (`List<Dog>`, `Range<>`, `T`).
    pub fn display(&self, ty: TypeId) -> String {
        crate::format::TypeFormatter::new(self).format(ty)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn declare_class(&self, name: &str, params: &[&str]) -> Result<TypeId, UniverseError> {
        self.declare(DefinitionInfo::class(name, params))
    }

    pub fn declare_struct(&self, name: &str, params: &[&str]) -> Result<TypeId, UniverseError> {
        self.declare(DefinitionInfo::structure(name, params))
    }

    pub fn declare_interface(
        &self,
        name: &str,
        params: &[&str],
    ) -> Result<TypeId, UniverseError> {
        self.declare(DefinitionInfo::interface(name, params))
    }

    /// Register a declaration and return the type it introduces.
    ///
    /// Supertypes and constraints are attached afterwards with
    /// [`set_base`](Self::set_base), [`add_interface`](Self::add_interface)
    /// and [`add_constraint`](Self::add_constraint), so mutually referencing
    /// declarations can be built in any order.
    pub fn declare(&self, mut info: DefinitionInfo) -> Result<TypeId, UniverseError> {
        info.extends = None;
        info.implements.clear();
        for param in &mut info.type_params {
            param.constraints.clear();
        }
        let name = info.name.clone();
        let arity = info.arity();
        let def = self
            .defs
            .register(info)
            .ok_or_else(|| UniverseError::DuplicateName(name.clone()))?;

        let ty = if arity == 0 {
            self.intern(TypeData::Named(def))
        } else {
            let args: TypeList = (0..arity as u32)
                .map(|index| self.intern(TypeData::Parameter(TypeParamRef { owner: def, index })))
                .collect();
            self.intern(TypeData::Application(TypeApplication {
                definition: def,
                args,
            }))
        };
        self.def_types.insert(def, ty);
        trace!(name = %name, arity, type_id = ty.0, "TypeUniverse::declare");
        Ok(ty)
    }

    /// The `index`-th parameter of a generic declaration.
    pub fn parameter(&self, definition: TypeId, index: usize) -> Result<TypeId, UniverseError> {
        let (def, info) = self.declaration(definition)?;
        if !info.is_generic() {
            return Err(UniverseError::NotGeneric(info.name.clone()));
        }
        if index >= info.arity() {
            return Err(UniverseError::ParameterOutOfRange {
                name: info.name.clone(),
                index,
            });
        }
        Ok(self.intern(TypeData::Parameter(TypeParamRef {
            owner: def,
            index: index as u32,
        })))
    }

    /// A parameter of a generic declaration, by name.
    pub fn parameter_named(&self, definition: TypeId, name: &str) -> Result<TypeId, UniverseError> {
        let (_, info) = self.declaration(definition)?;
        let index = info
            .type_params
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| UniverseError::UnknownParameter {
                name: info.name.clone(),
                param: name.to_string(),
            })?;
        self.parameter(definition, index)
    }

    /// Apply a generic declaration to arguments (`List<>` + `[Dog]` → `List<Dog>`).
    pub fn apply(&self, definition: TypeId, args: &[TypeId]) -> Result<TypeId, UniverseError> {
        let (def, info) = self.declaration(definition)?;
        if !info.is_generic() {
            return Err(UniverseError::NotGeneric(info.name.clone()));
        }
        if info.arity() != args.len() {
            return Err(UniverseError::ArityMismatch {
                name: info.name.clone(),
                expected: info.arity(),
                found: args.len(),
            });
        }
        if let Some(unknown) = args.iter().find(|a| !self.contains(**a)) {
            return Err(UniverseError::UnknownType(*unknown));
        }
        Ok(self.intern(TypeData::Application(TypeApplication {
            definition: def,
            args: args.iter().copied().collect(),
        })))
    }

    /// Set the direct base type of a class or struct declaration.
    pub fn set_base(&self, declared: TypeId, base: TypeId) -> Result<(), UniverseError> {
        let (def, info) = self.own_declaration(declared)?;
        if info.kind.is_interface() {
            return Err(UniverseError::InterfaceBase(info.name.clone()));
        }
        let base_def = match self.def_of(base) {
            Some(base_def) if self.defs.get_kind(base_def).is_some_and(|k| !k.is_interface()) => {
                base_def
            }
            Some(_) | None if self.contains(base) => {
                return Err(UniverseError::InvalidBase {
                    name: info.name.clone(),
                    base: self.display(base),
                });
            }
            _ => return Err(UniverseError::UnknownType(base)),
        };
        self.check_parameter_scope(def, &info, base)?;
        if base_def == def || self.inherits_from(base_def, def) {
            return Err(UniverseError::InheritanceCycle {
                child: info.name.clone(),
                parent: self.display(base),
            });
        }
        self.defs.update(def, |info| info.extends = Some(base));
        self.interface_cache.clear();
        Ok(())
    }

    /// Append an interface to a declaration's `implements` list.
    pub fn add_interface(&self, declared: TypeId, interface: TypeId) -> Result<(), UniverseError> {
        let (def, info) = self.own_declaration(declared)?;
        if !self.contains(interface) {
            return Err(UniverseError::UnknownType(interface));
        }
        let iface_def = match self.def_of(interface) {
            Some(iface_def) if self.defs.get_kind(iface_def) == Some(DefKind::Interface) => {
                iface_def
            }
            _ => return Err(UniverseError::NotAnInterface(self.display(interface))),
        };
        self.check_parameter_scope(def, &info, interface)?;
        if iface_def == def || self.inherits_from(iface_def, def) {
            return Err(UniverseError::InheritanceCycle {
                child: info.name.clone(),
                parent: self.display(interface),
            });
        }
        if !info.implements.contains(&interface) {
            self.defs.update(def, |info| info.implements.push(interface));
            self.interface_cache.clear();
        }
        Ok(())
    }

    /// Append a constraint to a generic parameter.
    pub fn add_constraint(&self, parameter: TypeId, constraint: TypeId) -> Result<(), UniverseError> {
        let param = match self.data(parameter) {
            Some(TypeData::Parameter(param)) => param,
            Some(_) => return Err(UniverseError::NotAParameter(self.display(parameter))),
            None => return Err(UniverseError::UnknownType(parameter)),
        };
        if !self.contains(constraint) {
            return Err(UniverseError::UnknownType(constraint));
        }
        let info = self
            .defs
            .get(param.owner)
            .ok_or(UniverseError::UnknownType(parameter))?;
        self.check_parameter_scope(param.owner, &info, constraint)?;
        self.defs.update(param.owner, |info| {
            if let Some(slot) = info.type_params.get_mut(param.index as usize) {
                if !slot.constraints.contains(&constraint) {
                    slot.constraints.push(constraint);
                }
            }
        });
        self.interface_cache.clear();
        Ok(())
    }

    fn declaration(&self, ty: TypeId) -> Result<(DefId, Arc<DefinitionInfo>), UniverseError> {
        let data = self.data(ty).ok_or(UniverseError::UnknownType(ty))?;
        let def = data
            .definition()
            .ok_or_else(|| UniverseError::NotADeclaration(self.display(ty)))?;
        let info = self.defs.get(def).ok_or(UniverseError::UnknownType(ty))?;
        Ok((def, info))
    }

    /// Like `declaration`, but `ty` must be the declaration's own type rather
    /// than some application of it.
    fn own_declaration(&self, ty: TypeId) -> Result<(DefId, Arc<DefinitionInfo>), UniverseError> {
        let (def, info) = self.declaration(ty)?;
        if self.definition_type(def) != Some(ty) {
            return Err(UniverseError::NotADeclaration(self.display(ty)));
        }
        Ok((def, info))
    }

    fn check_parameter_scope(
        &self,
        owner: DefId,
        info: &DefinitionInfo,
        ty: TypeId,
    ) -> Result<(), UniverseError> {
        let foreign = self
            .parameters_in(ty)
            .into_iter()
            .any(|param| param.owner != owner);
        if foreign {
            return Err(UniverseError::ForeignParameter {
                owner: info.name.clone(),
                ty: self.display(ty),
            });
        }
        Ok(())
    }

    /// Whether `from` reaches `goal` through declared bases or interfaces.
    fn inherits_from(&self, from: DefId, goal: DefId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(def) = stack.pop() {
            if def == goal {
                return true;
            }
            if !visited.insert(def) {
                continue;
            }
            if let Some(info) = self.defs.get(def) {
                stack.extend(info.extends.iter().filter_map(|ty| self.def_of(*ty)));
                stack.extend(info.implements.iter().filter_map(|ty| self.def_of(*ty)));
            }
        }
        false
    }

    // =========================================================================
    // Structure helpers
    // =========================================================================

    /// All parameter occurrences inside `ty`.
    fn parameters_in(&self, ty: TypeId) -> Vec<TypeParamRef> {
        let mut found = Vec::new();
        let mut stack = vec![ty];
        while let Some(current) = stack.pop() {
            match self.data(current) {
                Some(TypeData::Parameter(param)) => found.push(param),
                Some(TypeData::Application(app)) => stack.extend(app.args.iter().copied()),
                _ => {}
            }
        }
        found
    }

    /// Replace the parameters of `owner` inside `ty` with `args`.
    pub fn instantiate(&self, ty: TypeId, owner: DefId, args: &[TypeId]) -> TypeId {
        let mut counter = DepthCounter::with_profile(RecursionProfile::Instantiation);
        let result = self.instantiate_inner(ty, owner, args, &mut counter);
        if counter.is_exceeded() {
            warn!(
                type_id = ty.0,
                "TypeUniverse::instantiate - nesting limit reached, leaving type partially open"
            );
        }
        result
    }

    fn instantiate_inner(
        &self,
        ty: TypeId,
        owner: DefId,
        args: &[TypeId],
        counter: &mut DepthCounter,
    ) -> TypeId {
        match self.data(ty) {
            Some(TypeData::Parameter(param)) if param.owner == owner => {
                args.get(param.index as usize).copied().unwrap_or(ty)
            }
            Some(TypeData::Application(app)) => {
                if !counter.enter() {
                    return ty;
                }
                let substituted: TypeList = app
                    .args
                    .iter()
                    .map(|arg| self.instantiate_inner(*arg, owner, args, counter))
                    .collect();
                counter.leave();
                if substituted == app.args {
                    ty
                } else {
                    self.intern(TypeData::Application(TypeApplication {
                        definition: app.definition,
                        args: substituted,
                    }))
                }
            }
            _ => ty,
        }
    }

    /// Interfaces `ty` declares directly, instantiated for its arguments.
    pub fn declared_interfaces(&self, ty: TypeId) -> TypeList {
        match self.data(ty) {
            Some(TypeData::Named(def)) => self
                .defs
                .get(def)
                .map(|info| info.implements.iter().copied().collect())
                .unwrap_or_default(),
            Some(TypeData::Application(app)) => self
                .defs
                .get(app.definition)
                .map(|info| {
                    info.implements
                        .iter()
                        .map(|iface| self.instantiate(*iface, app.definition, &app.args))
                        .collect()
                })
                .unwrap_or_default(),
            Some(TypeData::Parameter(_)) => self
                .parameter_constraints(ty)
                .into_iter()
                .filter(|c| self.kind_of(*c) == Some(DefKind::Interface))
                .collect(),
            None => TypeList::new(),
        }
    }

    /// `ty` followed by its base chain, bounded by the hierarchy walk limit.
    fn base_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let limit = RecursionProfile::HierarchyWalk.max_depth() as usize;
        let mut chain = Vec::new();
        let mut current = Some(ty);
        while let Some(step) = current {
            if chain.len() >= limit {
                warn!(type_id = ty.0, limit, "TypeUniverse::base_chain - chain truncated");
                break;
            }
            chain.push(step);
            current = self.base_type(step);
        }
        chain
    }

    fn compute_interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let mut result: IndexSet<TypeId, FxBuildHasher> = IndexSet::default();
        for class in self.base_chain(ty).into_iter().rev() {
            let mut stack: Vec<TypeId> = self.declared_interfaces(class).into_iter().rev().collect();
            while let Some(iface) = stack.pop() {
                if result.insert(iface) {
                    stack.extend(self.declared_interfaces(iface).into_iter().rev());
                }
            }
        }
        result.into_iter().collect()
    }
}

impl TypeModel for TypeUniverse {
    fn is_generic(&self, ty: TypeId) -> bool {
        matches!(self.data(ty), Some(TypeData::Application(_)))
    }

    fn generic_definition(&self, ty: TypeId) -> Option<TypeId> {
        match self.data(ty)? {
            TypeData::Application(app) => self.definition_type(app.definition),
            _ => None,
        }
    }

    fn generic_arguments(&self, ty: TypeId) -> TypeList {
        match self.data(ty) {
            Some(TypeData::Application(app)) => app.args,
            _ => TypeList::new(),
        }
    }

    fn base_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.data(ty)? {
            TypeData::Named(def) => self.defs.get_extends(def),
            TypeData::Application(app) => self
                .defs
                .get_extends(app.definition)
                .map(|base| self.instantiate(base, app.definition, &app.args)),
            TypeData::Parameter(_) => self
                .parameter_constraints(ty)
                .into_iter()
                .find(|c| matches!(self.kind_of(*c), Some(DefKind::Class | DefKind::Struct))),
        }
    }

    fn interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        if let Some(cached) = self.interface_cache.get(&ty) {
            return cached.to_vec();
        }
        let computed = self.compute_interfaces(ty);
        self.interface_cache
            .insert(ty, Arc::from(computed.as_slice()));
        computed
    }

    fn is_generic_parameter(&self, ty: TypeId) -> bool {
        matches!(self.data(ty), Some(TypeData::Parameter(_)))
    }

    fn parameter_constraints(&self, ty: TypeId) -> TypeList {
        match self.data(ty) {
            Some(TypeData::Parameter(param)) => self
                .defs
                .get(param.owner)
                .and_then(|info| {
                    info.type_params
                        .get(param.index as usize)
                        .map(|p| p.constraints.clone())
                })
                .unwrap_or_default(),
            _ => TypeList::new(),
        }
    }

    fn is_interface(&self, ty: TypeId) -> bool {
        self.kind_of(ty) == Some(DefKind::Interface)
    }

    fn contains_generic_parameters(&self, ty: TypeId) -> bool {
        !self.parameters_in(ty).is_empty()
    }

    fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        match self.kind_of(target) {
            Some(DefKind::Interface) => self.interfaces(source).contains(&target),
            Some(DefKind::Class | DefKind::Struct) => self.base_chain(source).contains(&target),
            None => false,
        }
    }

    fn make_generic(&self, definition: TypeId, args: &[TypeId]) -> Option<TypeId> {
        match self.data(definition)? {
            TypeData::Application(_) => self.apply(definition, args).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/universe_tests.rs"]
mod tests;
