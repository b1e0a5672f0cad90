//! The substitution checker.
//!
//! Given a source type `A` and a target shape `B`, decides whether an `A`
//! can stand wherever a `B` is expected and, if so, which closed form of `B`
//! it actually satisfies (`List<Dog>` against `ICollection<Animal>` resolves
//! to `ICollection<Dog>`).
//!
//! Evaluation order for a pair:
//!
//! 1. identity (`A == B`) succeeds with `A`, uncached;
//! 2. a recorded verdict is returned as is;
//! 3. non-generic target: native assignability from a fully closed `A`;
//! 4. class-kind generic target: the first type on `A`'s base chain built
//!    from `B`'s generic definition, without checking its arguments;
//! 5. interface-kind generic target: `A` itself when it is built from `B`'s
//!    definition and satisfies [`satisfy_constraints`](SubstitutionChecker::satisfy_constraints),
//!    otherwise the first of `A`'s interfaces that does.
//!
//! Every verdict from steps 3-5 is recorded in the [`SubstitutionCache`].
//!
//! ## Recursion
//!
//! Constraint satisfaction recurses into nested pairs. A pair that is reached
//! again while still being evaluated is assumed to hold (coinductive, as with
//! F-bounded constraints like `T : IComparable<T>`); results that lean on such
//! an assumption are only cached once the pair that introduced it completes.
//! Hitting the depth or iteration limit fails the pair, and nothing computed
//! under an exceeded limit is cached.

use crate::cache::{CacheEntry, SubstitutionCache, TypePair};
use crate::model::TypeModel;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{TypeId, TypeList};
use tracing::{debug, trace, warn};

/// Limits for a substitution query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionOptions {
    /// Maximum nesting of recursive pair evaluations.
    pub max_depth: u32,
    /// Maximum number of pair evaluations per query.
    pub max_iterations: u32,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self::from_profile(RecursionProfile::SubstitutionCheck)
    }
}

impl SubstitutionOptions {
    pub const fn from_profile(profile: RecursionProfile) -> Self {
        Self {
            max_depth: profile.max_depth(),
            max_iterations: profile.max_iterations(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Outcome of a substitution query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionResult {
    /// The closed form of the target the source satisfies.
    pub substitution: Option<TypeId>,
    /// The verdict for the outer pair was served from the cache.
    pub cache_hit: bool,
    /// A recursion limit was hit while answering.
    pub depth_exceeded: bool,
}

impl SubstitutionResult {
    pub const fn unrelated() -> Self {
        Self {
            substitution: None,
            cache_hit: false,
            depth_exceeded: false,
        }
    }

    #[inline]
    pub fn is_related(&self) -> bool {
        self.substitution.is_some()
    }
}

/// Per-query evaluation state over a shared model and cache.
pub struct SubstitutionChecker<'a> {
    model: &'a dyn TypeModel,
    cache: &'a SubstitutionCache,
    guard: RecursionGuard<TypePair>,
    /// Pairs currently under evaluation, outermost first.
    stack: Vec<TypePair>,
    /// Stack index of the outermost pair a provisional result depends on.
    lowest_cycle_head: usize,
    /// Incremented each time a recursion limit refuses work.
    limit_hits: u32,
}

impl<'a> SubstitutionChecker<'a> {
    pub fn new(model: &'a dyn TypeModel, cache: &'a SubstitutionCache) -> Self {
        Self::with_options(model, cache, SubstitutionOptions::default())
    }

    pub fn with_options(
        model: &'a dyn TypeModel,
        cache: &'a SubstitutionCache,
        options: SubstitutionOptions,
    ) -> Self {
        Self {
            model,
            cache,
            guard: RecursionGuard::new(options.max_depth, options.max_iterations),
            stack: Vec::new(),
            lowest_cycle_head: usize::MAX,
            limit_hits: 0,
        }
    }

    /// Whether any recursion limit was hit by this checker so far.
    pub fn depth_exceeded(&self) -> bool {
        self.guard.is_exceeded()
    }

    /// Answer a query. Absent inputs are never related.
    pub fn check(&mut self, source: Option<TypeId>, target: Option<TypeId>) -> SubstitutionResult {
        let (Some(source), Some(target)) = (source, target) else {
            return SubstitutionResult::unrelated();
        };
        if source == target {
            return SubstitutionResult {
                substitution: Some(source),
                cache_hit: false,
                depth_exceeded: false,
            };
        }
        let key = TypePair::new(source, target);
        if let Some(entry) = self.cache.lookup(key) {
            return SubstitutionResult {
                substitution: entry.substitution(),
                cache_hit: true,
                depth_exceeded: false,
            };
        }
        let substitution = self.evaluate(key);
        SubstitutionResult {
            substitution,
            cache_hit: false,
            depth_exceeded: self.guard.is_exceeded(),
        }
    }

    /// Nested entry point used while satisfying constraints.
    fn substitute(&mut self, source: TypeId, target: TypeId) -> Option<TypeId> {
        if source == target {
            return Some(source);
        }
        let key = TypePair::new(source, target);
        if let Some(entry) = self.cache.lookup(key) {
            trace!(source = source.0, target = target.0, "substitution cache hit");
            return entry.substitution();
        }
        self.evaluate(key)
    }

    fn evaluate(&mut self, key: TypePair) -> Option<TypeId> {
        let was_exceeded = self.guard.is_exceeded();
        let entry = self.guard.enter(key);
        if entry.is_exceeded() {
            self.limit_hits += 1;
            if !was_exceeded {
                warn!(
                    source = key.source.0,
                    target = key.target.0,
                    depth = self.guard.depth(),
                    iterations = self.guard.iterations(),
                    reason = ?entry,
                    "substitution recursion limit reached"
                );
            }
            return None;
        }
        if entry == RecursionResult::Cycle {
            let head = self
                .stack
                .iter()
                .position(|pair| *pair == key)
                .unwrap_or(0);
            self.lowest_cycle_head = self.lowest_cycle_head.min(head);
            trace!(
                source = key.source.0,
                target = key.target.0,
                head,
                "substitution cycle, assuming related"
            );
            return Some(key.source);
        }

        let index = self.stack.len();
        self.stack.push(key);
        let outer_lowest = std::mem::replace(&mut self.lowest_cycle_head, usize::MAX);
        let limit_hits_before = self.limit_hits;

        let computed = self.resolve(key.source, key.target);

        self.stack.pop();
        self.guard.leave(key);

        let provisional = self.lowest_cycle_head < index;
        self.lowest_cycle_head = if provisional {
            outer_lowest.min(self.lowest_cycle_head)
        } else {
            outer_lowest
        };

        if provisional || self.limit_hits != limit_hits_before {
            trace!(
                source = key.source.0,
                target = key.target.0,
                provisional,
                related = computed.is_some(),
                "substitution verdict not cached"
            );
            return computed;
        }

        let stored = self.cache.record(key, CacheEntry::from(computed));
        debug!(
            source = key.source.0,
            target = key.target.0,
            related = stored.substitution().is_some(),
            substitution = ?stored.substitution().map(|t| t.0),
            "substitution verdict"
        );
        stored.substitution()
    }

    fn resolve(&mut self, source: TypeId, target: TypeId) -> Option<TypeId> {
        let model = self.model;

        if !model.is_generic(target) {
            // Generic-shape analysis cannot match a non-generic target, so
            // native assignability decides on its own.
            if !model.contains_generic_parameters(source) && model.is_assignable(source, target) {
                return Some(source);
            }
            return None;
        }

        let definition = model.generic_definition(target)?;

        if !model.is_interface(target) {
            return self.match_base_chain(source, definition);
        }

        if model.is_generic(source) && model.generic_definition(source) == Some(definition) {
            if let Some(resolved) = self.satisfy_constraints(source, target) {
                return Some(resolved);
            }
        }

        let arity = model.generic_arguments(target).len();
        for iface in model.interfaces(source) {
            if !model.is_generic(iface) || model.generic_definition(iface) != Some(definition) {
                continue;
            }
            if model.generic_arguments(iface).len() != arity {
                continue;
            }
            if let Some(resolved) = self.satisfy_constraints(iface, target) {
                return Some(resolved);
            }
        }
        None
    }

    /// First type on `source`'s base chain (itself included) built from
    /// `definition`. Arguments are not compared.
    fn match_base_chain(&mut self, source: TypeId, definition: TypeId) -> Option<TypeId> {
        let model = self.model;
        let limit = RecursionProfile::HierarchyWalk.max_depth();
        let mut current = Some(source);
        let mut steps = 0;
        while let Some(ty) = current {
            if steps >= limit {
                self.limit_hits += 1;
                warn!(source = source.0, limit, "base chain walk truncated");
                return None;
            }
            if model.is_generic(ty) && model.generic_definition(ty) == Some(definition) {
                return Some(ty);
            }
            current = model.base_type(ty);
            steps += 1;
        }
        None
    }

    /// Check `candidate`'s arguments against `target`'s, position by
    /// position, and build the closed form of `target` they imply.
    ///
    /// Concrete target arguments take the candidate argument when natively
    /// assignable, else the recursively resolved substitution. Open target
    /// parameters take the candidate argument unchanged once every constraint
    /// on the parameter holds. The first failing position fails the whole
    /// check.
    pub fn satisfy_constraints(&mut self, candidate: TypeId, target: TypeId) -> Option<TypeId> {
        let model = self.model;
        let candidate_args = model.generic_arguments(candidate);
        let target_args = model.generic_arguments(target);
        if candidate_args.len() != target_args.len() {
            return None;
        }

        let mut substituted = TypeList::with_capacity(candidate_args.len());
        for (&candidate_arg, &target_arg) in candidate_args.iter().zip(target_args.iter()) {
            if !model.is_generic_parameter(target_arg) {
                if target_arg == candidate_arg || model.is_assignable(candidate_arg, target_arg) {
                    substituted.push(candidate_arg);
                } else {
                    substituted.push(self.substitute(candidate_arg, target_arg)?);
                }
            } else {
                for constraint in model.parameter_constraints(target_arg) {
                    if constraint == candidate_arg || model.is_assignable(candidate_arg, constraint)
                    {
                        continue;
                    }
                    self.substitute(candidate_arg, constraint)?;
                }
                substituted.push(candidate_arg);
            }
        }

        let definition = model.generic_definition(target)?;
        model.make_generic(definition, &substituted)
    }
}

#[cfg(test)]
#[path = "../tests/substitution_tests.rs"]
mod tests;
