//! Single-coordinate resolution step.
//!
//! The only state carried between coordinates is the index of the last
//! polygon that matched. It is passed in and handed back explicitly so a
//! sweep can be split into independent partitions, each with its own
//! context.

use taxi_nbhd_geography_models::{ResolvedLocation, RoundedCoordinate};
use taxi_nbhd_spatial::PolygonStore;

/// State threaded from one coordinate to the next.
///
/// Starts at the first polygon in store order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveContext {
    /// Store index of the last polygon that contained a coordinate.
    pub last_matched: usize,
}

/// How a coordinate was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Outside the store's global bounds; no containment test was run.
    OutOfBounds,
    /// Matched the previously matched polygon without a scan.
    Sticky,
    /// Matched during a full scan.
    Scanned,
    /// Inside the global bounds but in no polygon.
    Unresolved,
}

/// Resolves one coordinate.
///
/// 1. Coordinates not strictly inside the global bounds are unresolved.
/// 2. The polygon at `ctx.last_matched` is tried first; a hit returns
///    immediately and keeps the context.
/// 3. Otherwise every polygon is scanned in store order and the first
///    containing one wins and becomes the new context.
///
/// A miss leaves the context unchanged.
#[must_use]
pub fn resolve_one(
    ctx: ResolveContext,
    coord: RoundedCoordinate,
    store: &PolygonStore,
) -> (ResolveContext, ResolvedLocation, MatchKind) {
    let (lon, lat) = (coord.lon(), coord.lat());

    if !store.global_bounds().strictly_contains(lon, lat) {
        return (ctx, ResolvedLocation::unresolved(coord), MatchKind::OutOfBounds);
    }

    if store.contains(ctx.last_matched, lon, lat) {
        let label = store.label(ctx.last_matched).clone();
        return (ctx, ResolvedLocation::resolved(coord, label), MatchKind::Sticky);
    }

    scan(ctx, coord, store)
}

/// Resolves one coordinate without the sticky shortcut.
#[must_use]
pub fn resolve_one_full_scan(
    coord: RoundedCoordinate,
    store: &PolygonStore,
) -> (ResolvedLocation, MatchKind) {
    if !store
        .global_bounds()
        .strictly_contains(coord.lon(), coord.lat())
    {
        return (ResolvedLocation::unresolved(coord), MatchKind::OutOfBounds);
    }

    let (_, location, kind) = scan(ResolveContext::default(), coord, store);
    (location, kind)
}

fn scan(
    ctx: ResolveContext,
    coord: RoundedCoordinate,
    store: &PolygonStore,
) -> (ResolveContext, ResolvedLocation, MatchKind) {
    match store.first_containing(coord.lon(), coord.lat()) {
        Some(index) => (
            ResolveContext {
                last_matched: index,
            },
            ResolvedLocation::resolved(coord, store.label(index).clone()),
            MatchKind::Scanned,
        ),
        None => (ctx, ResolvedLocation::unresolved(coord), MatchKind::Unresolved),
    }
}
