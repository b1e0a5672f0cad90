//! Query evaluation for the `check` and `run` commands.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use liskov_solver::{
    SubstitutionCacheStats, SubstitutionOptions, SubstitutionSolver, TypeId, TypeUniverse,
};

use crate::cli::type_expr::resolve_type_str;
use crate::cli::universe_file::{UniverseFile, load_universe_file};

/// A universe file together with the universe it declares.
pub struct LoadedUniverse {
    pub file: UniverseFile,
    pub universe: TypeUniverse,
}

pub fn load(path: &Path) -> Result<LoadedUniverse> {
    let file = load_universe_file(path)?;
    let universe = file
        .build()
        .with_context(|| format!("invalid universe file {}", path.display()))?;
    Ok(LoadedUniverse { file, universe })
}

/// Solver limits: the command-line depth wins over the file's.
pub fn effective_options(cli_max_depth: Option<u32>, file: &UniverseFile) -> SubstitutionOptions {
    let options = SubstitutionOptions::default();
    match cli_max_depth.or(file.options.max_depth) {
        Some(depth) => options.with_max_depth(depth),
        None => options,
    }
}

/// The answer to one query, rendered for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub source: String,
    pub target: String,
    pub related: bool,
    pub substitution: Option<String>,
    pub cache_hit: bool,
    pub depth_exceeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_substitution: Option<String>,
    pub passed: bool,
}

/// A query with every expression already resolved.
struct PreparedQuery {
    source: TypeId,
    target: TypeId,
    expect: Option<bool>,
    substitution: Option<TypeId>,
}

fn prepare(
    universe: &TypeUniverse,
    source: &str,
    target: &str,
    expect: Option<bool>,
    substitution: Option<&str>,
) -> Result<PreparedQuery> {
    let source = resolve_type_str(universe, source, None)
        .with_context(|| format!("in query source '{source}'"))?;
    let target = resolve_type_str(universe, target, None)
        .with_context(|| format!("in query target '{target}'"))?;
    let substitution = substitution
        .map(|expr| {
            resolve_type_str(universe, expr, None)
                .with_context(|| format!("in expected substitution '{expr}'"))
        })
        .transpose()?;
    Ok(PreparedQuery {
        source,
        target,
        expect,
        substitution,
    })
}

fn evaluate(
    universe: &TypeUniverse,
    solver: &SubstitutionSolver<'_>,
    query: &PreparedQuery,
) -> QueryOutcome {
    let result = solver.substitution(Some(query.source), Some(query.target));
    let related = result.is_related();

    // An expected substitution implies the pair is expected to relate.
    let expected = query.expect.or(query.substitution.map(|_| true));
    let verdict_ok = expected.is_none_or(|expected| expected == related);
    let substitution_ok = query
        .substitution
        .is_none_or(|expected| result.substitution == Some(expected));

    QueryOutcome {
        source: universe.display(query.source),
        target: universe.display(query.target),
        related,
        substitution: result.substitution.map(|ty| universe.display(ty)),
        cache_hit: result.cache_hit,
        depth_exceeded: result.depth_exceeded,
        expected,
        expected_substitution: query.substitution.map(|ty| universe.display(ty)),
        passed: verdict_ok && substitution_ok,
    }
}

/// Answer a single ad-hoc query.
pub fn check_query(
    universe: &TypeUniverse,
    options: SubstitutionOptions,
    source: &str,
    target: &str,
) -> Result<QueryOutcome> {
    let query = prepare(universe, source, target, None, None)?;
    let solver = SubstitutionSolver::with_options(universe, options);
    Ok(evaluate(universe, &solver, &query))
}

/// Outcomes of a `run`, in file order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub outcomes: Vec<QueryOutcome>,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.failures() == 0
    }
}

/// Evaluate every query of `file` in parallel against one shared solver.
pub fn run_queries(
    universe: &TypeUniverse,
    file: &UniverseFile,
    options: SubstitutionOptions,
) -> Result<RunSummary> {
    let prepared = file
        .queries
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            prepare(
                universe,
                &spec.source,
                &spec.target,
                spec.expect,
                spec.substitution.as_deref(),
            )
            .with_context(|| format!("query #{}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let solver = SubstitutionSolver::with_options(universe, options);
    let start = Instant::now();
    let outcomes: Vec<QueryOutcome> = prepared
        .par_iter()
        .map(|query| evaluate(universe, &solver, query))
        .collect();
    let stats: SubstitutionCacheStats = solver.cache_stats();

    info!(
        queries = outcomes.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        cache_entries = stats.entries,
        "queries evaluated"
    );
    debug!(hits = stats.hits, misses = stats.misses, "substitution cache");

    Ok(RunSummary {
        outcomes,
        cache_entries: stats.entries,
        cache_hits: stats.hits,
        cache_misses: stats.misses,
    })
}
