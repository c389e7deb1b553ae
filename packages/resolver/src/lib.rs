#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood assignment for rounded coordinates.
//!
//! Walks the sorted, deduplicated coordinate set once. Each coordinate is
//! first checked against the store's global bounds, then against the
//! polygon that matched the previous coordinate, and only then against
//! every polygon in order. Because neighboring coordinates in sort order
//! usually fall in the same neighborhood, most coordinates cost a single
//! containment test instead of one per polygon.
//!
//! The sticky check never changes the answer for non-overlapping
//! polygons: a miss always falls back to the full scan.
//! [`resolve_full_scan`] runs without the shortcut for comparison, and
//! [`parallel::resolve_parallel`] splits the sweep across a `rayon` pool.

pub mod context;
pub mod parallel;

use taxi_nbhd_geography_models::{ResolvedLocation, RoundedCoordinate};
use taxi_nbhd_progress::{NullProgress, ProgressCallback};
use taxi_nbhd_spatial::PolygonStore;
use thiserror::Error;

pub use context::{MatchKind, ResolveContext, resolve_one};
pub use parallel::resolve_parallel;

/// Coordinates between progress updates.
const PROGRESS_BATCH: usize = 1_000;

/// Coordinates between debug log lines.
const LOG_INTERVAL: usize = 100_000;

/// Errors that can occur while resolving.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The worker pool for parallel resolution could not be started.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counts of how coordinates were resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Coordinates processed.
    pub total: u64,
    /// Rejected by the global bounds prefilter.
    pub out_of_bounds: u64,
    /// Matched the previous coordinate's polygon.
    pub sticky_hits: u64,
    /// Matched during a full scan.
    pub scanned: u64,
    /// In bounds but contained by no polygon.
    pub unresolved: u64,
}

impl ResolveStats {
    /// Tallies one outcome.
    pub const fn record(&mut self, kind: MatchKind) {
        self.total += 1;
        match kind {
            MatchKind::OutOfBounds => self.out_of_bounds += 1,
            MatchKind::Sticky => self.sticky_hits += 1,
            MatchKind::Scanned => self.scanned += 1,
            MatchKind::Unresolved => self.unresolved += 1,
        }
    }

    /// Adds another partition's counts to these.
    pub const fn merge(&mut self, other: &Self) {
        self.total += other.total;
        self.out_of_bounds += other.out_of_bounds;
        self.sticky_hits += other.sticky_hits;
        self.scanned += other.scanned;
        self.unresolved += other.unresolved;
    }

    /// Coordinates assigned to a neighborhood.
    #[must_use]
    pub const fn resolved(&self) -> u64 {
        self.sticky_hits + self.scanned
    }
}

/// Resolved locations, in input order, with their statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per input coordinate.
    pub locations: Vec<ResolvedLocation>,
    /// How each coordinate was resolved.
    pub stats: ResolveStats,
}

/// Resolves every coordinate with the locality heuristic.
///
/// `coords` should be sorted and unique; the result is correct for any
/// order, only slower.
#[must_use]
pub fn resolve(coords: &[RoundedCoordinate], store: &PolygonStore) -> Vec<ResolvedLocation> {
    resolve_with_progress(coords, store, &NullProgress).locations
}

/// Resolves every coordinate with the locality heuristic, reporting
/// progress and logging a summary.
#[must_use]
pub fn resolve_with_progress(
    coords: &[RoundedCoordinate],
    store: &PolygonStore,
    progress: &dyn ProgressCallback,
) -> Resolution {
    progress.set_total(coords.len() as u64);
    progress.set_message("Resolving neighborhoods".to_string());

    let resolution = sweep(coords, store, |done| {
        if done % PROGRESS_BATCH == 0 {
            progress.inc(PROGRESS_BATCH as u64);
        }
        if done % LOG_INTERVAL == 0 {
            log::debug!("{done} coordinates resolved...");
        }
    });
    progress.inc((coords.len() % PROGRESS_BATCH) as u64);

    progress.finish(format!(
        "Resolved {}/{} coordinates",
        resolution.stats.resolved(),
        resolution.stats.total
    ));
    log_stats(&resolution.stats);
    resolution
}

/// Resolves every coordinate by scanning all polygons each time.
///
/// Produces the same locations as [`resolve`] when polygons do not
/// overlap; useful as a reference.
#[must_use]
pub fn resolve_full_scan(
    coords: &[RoundedCoordinate],
    store: &PolygonStore,
) -> Vec<ResolvedLocation> {
    coords
        .iter()
        .map(|&coord| context::resolve_one_full_scan(coord, store).0)
        .collect()
}

/// Drops unresolved locations, keeping input order.
#[must_use]
pub fn resolved_only(locations: Vec<ResolvedLocation>) -> Vec<ResolvedLocation> {
    locations
        .into_iter()
        .filter(ResolvedLocation::is_resolved)
        .collect()
}

/// Sequential sweep over one partition, seeded with the default context.
///
/// `on_step` receives the running count after each coordinate.
fn sweep<F>(coords: &[RoundedCoordinate], store: &PolygonStore, mut on_step: F) -> Resolution
where
    F: FnMut(usize),
{
    let mut ctx = ResolveContext::default();
    let mut stats = ResolveStats::default();
    let mut locations = Vec::with_capacity(coords.len());

    for (i, &coord) in coords.iter().enumerate() {
        let (next, location, kind) = resolve_one(ctx, coord, store);
        ctx = next;
        stats.record(kind);
        locations.push(location);
        on_step(i + 1);
    }

    Resolution { locations, stats }
}

fn log_stats(stats: &ResolveStats) {
    log::info!(
        "Resolved {} of {} coordinates ({} sticky, {} scanned, {} out of bounds, {} unmatched)",
        stats.resolved(),
        stats.total,
        stats.sticky_hits,
        stats.scanned,
        stats.out_of_bounds,
        stats.unresolved,
    );
}
