//! Generic Substitutability Solver
//!
//! Decides whether a value of one type can be substituted wherever another
//! type is expected, under Liskov substitution extended to generic type
//! constructors, and produces the closed form of the expected type that the
//! source actually satisfies:
//!
//! ```text
//! List<Dog>      as ICollection<Animal>  =>  ICollection<Dog>
//! DateTimeRange  as Range<>              =>  Range<DateTime>
//! ```
//!
//! Pieces:
//!
//! - [`TypeModel`]: the read-only reflection oracle the solver consumes
//! - [`TypeUniverse`]: an in-memory, concurrently interned implementation
//! - [`SubstitutionChecker`]: the recursive constraint-satisfying algorithm
//! - [`SubstitutionCache`]: permanent, lock-free-to-callers memoization
//! - [`SubstitutionSolver`]: model + cache bundle exposing the public queries
mod cache;
pub mod def;
mod format;
pub mod model;
mod queries;
mod query_trace;
pub mod recursion;
mod substitution;
pub mod types;
mod universe;

#[cfg(test)]
mod test_fixtures;

pub use cache::{CacheEntry, SubstitutionCache, SubstitutionCacheStats, TypePair};
pub use def::{DefId, DefKind, DefinitionInfo, DefinitionStore, TypeParamInfo};
pub use format::TypeFormatter;
pub use model::TypeModel;
pub use queries::{
    SubstitutionSolver, is_subtype_of, query_substitution, query_substitution_with_options,
};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use substitution::{SubstitutionChecker, SubstitutionOptions, SubstitutionResult};
pub use types::{TypeApplication, TypeData, TypeId, TypeList, TypeParamRef};
pub use universe::{TypeUniverse, UniverseError};
