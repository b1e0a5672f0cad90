//! The read-only type oracle consumed by the substitution checker.
//!
//! The checker never looks at declarations directly. Everything it needs
//! about a type's shape goes through [`TypeModel`], so any reflective type
//! universe can be plugged in. [`TypeUniverse`](crate::TypeUniverse) is the
//! in-memory implementation shipped with this crate.

use crate::types::{TypeId, TypeList};

/// Reflection capabilities over a universe of types.
///
/// Implementations must be total: unknown or malformed handles answer
/// `false` / `None` / empty rather than panicking.
pub trait TypeModel: Send + Sync {
    /// `true` for generic definitions and for every type constructed from one.
    fn is_generic(&self, ty: TypeId) -> bool;

    /// The open generic definition `ty` was built from (`List<Dog>` → `List<>`).
    /// For an open definition this is the definition itself.
    fn generic_definition(&self, ty: TypeId) -> Option<TypeId>;

    /// Arguments bound to the definition's parameters, in order. For an open
    /// definition these are its own parameters. Empty for non-generic types.
    fn generic_arguments(&self, ty: TypeId) -> TypeList;

    /// The single direct supertype in the class chain.
    fn base_type(&self, ty: TypeId) -> Option<TypeId>;

    /// Every interface `ty` implements, transitively, with generic interfaces
    /// instantiated. The order must be deterministic.
    fn interfaces(&self, ty: TypeId) -> Vec<TypeId>;

    /// `true` if `ty` is an unbound generic parameter.
    fn is_generic_parameter(&self, ty: TypeId) -> bool;

    /// Constraints declared on a generic parameter, in declaration order.
    fn parameter_constraints(&self, ty: TypeId) -> TypeList;

    fn is_interface(&self, ty: TypeId) -> bool;

    /// `true` if an unbound parameter occurs anywhere inside `ty`.
    fn contains_generic_parameters(&self, ty: TypeId) -> bool;

    /// The host's native assignability: can a `source` be stored where a
    /// `target` is expected, without any generic variance reasoning.
    fn is_assignable(&self, source: TypeId, target: TypeId) -> bool;

    /// Close `definition` over `args`. `None` if `definition` is not generic
    /// or the arity does not match.
    fn make_generic(&self, definition: TypeId, args: &[TypeId]) -> Option<TypeId>;
}
