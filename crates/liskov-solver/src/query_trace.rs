//! Structured tracing for substitution query entry points.
//!
//! Events use target `liskov::query_json` and are meant to be consumed with
//! `LISKOV_LOG=liskov::query_json=trace LISKOV_LOG_FORMAT=json`.
//!
//! Environment:
//! - `LISKOV_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::types::TypeId;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "liskov::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("LISKOV_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn substitution_start(query_id: u64, source: Option<TypeId>, target: Option<TypeId>) {
    trace!(
        target: "liskov::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op = "substitution",
        source_type_id = source.map(|t| t.0),
        target_type_id = target.map(|t| t.0),
    );
}

#[inline]
pub(crate) fn substitution_end(
    query_id: u64,
    substitution: Option<TypeId>,
    cache_hit: bool,
    depth_exceeded: bool,
) {
    trace!(
        target: "liskov::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op = "substitution",
        related = substitution.is_some(),
        substitution_type_id = substitution.map(|t| t.0),
        cache_hit,
        depth_exceeded,
    );
}
