//! Query entry points.
//!
//! The free functions run one query against a caller-provided model and
//! cache. [`SubstitutionSolver`] bundles a model reference with its own
//! cache and options and is what long-lived callers hold on to.

use crate::cache::{SubstitutionCache, SubstitutionCacheStats};
use crate::model::TypeModel;
use crate::query_trace;
use crate::substitution::{SubstitutionChecker, SubstitutionOptions, SubstitutionResult};
use crate::types::TypeId;

/// Can a `source` be used wherever a `target` is expected?
pub fn is_subtype_of(
    model: &dyn TypeModel,
    cache: &SubstitutionCache,
    source: TypeId,
    target: TypeId,
) -> bool {
    query_substitution(model, cache, Some(source), Some(target)).is_related()
}

/// Full query: verdict plus the closed form of `target` that `source`
/// satisfies.
pub fn query_substitution(
    model: &dyn TypeModel,
    cache: &SubstitutionCache,
    source: Option<TypeId>,
    target: Option<TypeId>,
) -> SubstitutionResult {
    query_substitution_with_options(model, cache, source, target, SubstitutionOptions::default())
}

pub fn query_substitution_with_options(
    model: &dyn TypeModel,
    cache: &SubstitutionCache,
    source: Option<TypeId>,
    target: Option<TypeId>,
    options: SubstitutionOptions,
) -> SubstitutionResult {
    let trace_enabled = query_trace::enabled();
    let query_id = trace_enabled.then(query_trace::next_query_id);
    if let Some(query_id) = query_id {
        query_trace::substitution_start(query_id, source, target);
    }

    let mut checker = SubstitutionChecker::with_options(model, cache, options);
    let result = checker.check(source, target);

    if let Some(query_id) = query_id {
        query_trace::substitution_end(
            query_id,
            result.substitution,
            result.cache_hit,
            result.depth_exceeded,
        );
    }
    result
}

/// A model paired with the cache that memoizes queries against it.
///
/// The cache lives as long as the solver; [`clear_cache`](Self::clear_cache)
/// resets it. `SubstitutionSolver` is `Sync`, so one instance can serve
/// queries from many threads.
pub struct SubstitutionSolver<'a> {
    model: &'a dyn TypeModel,
    cache: SubstitutionCache,
    options: SubstitutionOptions,
}

impl<'a> SubstitutionSolver<'a> {
    pub fn new(model: &'a dyn TypeModel) -> Self {
        Self::with_options(model, SubstitutionOptions::default())
    }

    pub fn with_options(model: &'a dyn TypeModel, options: SubstitutionOptions) -> Self {
        Self {
            model,
            cache: SubstitutionCache::new(),
            options,
        }
    }

    pub fn model(&self) -> &'a dyn TypeModel {
        self.model
    }

    pub fn cache(&self) -> &SubstitutionCache {
        &self.cache
    }

    pub fn options(&self) -> SubstitutionOptions {
        self.options
    }

    pub fn is_subtype_of(&self, source: TypeId, target: TypeId) -> bool {
        self.substitution(Some(source), Some(target)).is_related()
    }

    pub fn substitution(&self, source: Option<TypeId>, target: Option<TypeId>) -> SubstitutionResult {
        query_substitution_with_options(self.model, &self.cache, source, target, self.options)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> SubstitutionCacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
#[path = "../tests/queries_tests.rs"]
mod tests;
