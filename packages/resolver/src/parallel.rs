//! Partitioned resolution on a `rayon` pool.
//!
//! The sorted coordinate slice is cut into one contiguous chunk per
//! worker. Each chunk starts from a fresh [`ResolveContext`], so chunks
//! share nothing but the read-only store, and results are concatenated in
//! chunk order.

use rayon::prelude::*;
use taxi_nbhd_geography_models::RoundedCoordinate;
use taxi_nbhd_progress::ProgressCallback;
use taxi_nbhd_spatial::PolygonStore;

use crate::{Resolution, ResolveStats, ResolverError};

/// Resolves `coords` across `threads` workers.
///
/// With `threads <= 1`, or fewer coordinates than workers, this runs the
/// sequential sweep on the calling thread. The output is identical to
/// [`crate::resolve`] for non-overlapping polygons.
///
/// # Errors
///
/// Returns [`ResolverError::ThreadPool`] if the worker pool cannot be
/// started.
pub fn resolve_parallel(
    coords: &[RoundedCoordinate],
    store: &PolygonStore,
    threads: usize,
    progress: &dyn ProgressCallback,
) -> Result<Resolution, ResolverError> {
    if threads <= 1 || coords.len() < threads {
        return Ok(crate::resolve_with_progress(coords, store, progress));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    progress.set_total(coords.len() as u64);
    progress.set_message(format!("Resolving neighborhoods on {threads} threads"));

    let chunk_size = coords.len().div_ceil(threads);
    log::debug!(
        "Resolving {} coordinates in chunks of {chunk_size} on {threads} threads",
        coords.len()
    );

    let parts: Vec<Resolution> = pool.install(|| {
        coords
            .par_chunks(chunk_size)
            .map(|chunk| {
                let part = crate::sweep(chunk, store, |_| {});
                progress.inc(chunk.len() as u64);
                part
            })
            .collect()
    });

    let mut resolution = Resolution {
        locations: Vec::with_capacity(coords.len()),
        stats: ResolveStats::default(),
    };
    for part in parts {
        resolution.stats.merge(&part.stats);
        resolution.locations.extend(part.locations);
    }

    progress.finish(format!(
        "Resolved {}/{} coordinates",
        resolution.stats.resolved(),
        resolution.stats.total
    ));
    crate::log_stats(&resolution.stats);
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use taxi_nbhd_progress::NullProgress;

    use super::*;
    use crate::test_support::{grid_store, random_coords};

    #[test]
    fn matches_sequential_sweep() {
        let store = grid_store();
        let coords = random_coords(7, 4_000);
        let sequential = crate::resolve(&coords, &store);

        for threads in [2, 3, 8] {
            let parallel = resolve_parallel(&coords, &store, threads, &NullProgress).unwrap();
            assert_eq!(parallel.locations, sequential, "threads {threads}");
            assert_eq!(parallel.stats.total, coords.len() as u64);
        }
    }

    #[test]
    fn resolved_count_does_not_depend_on_partitioning() {
        let store = grid_store();
        let coords = random_coords(13, 2_500);
        let one = resolve_parallel(&coords, &store, 1, &NullProgress).unwrap();
        let four = resolve_parallel(&coords, &store, 4, &NullProgress).unwrap();
        assert_eq!(one.stats.resolved(), four.stats.resolved());
        assert_eq!(one.stats.out_of_bounds, four.stats.out_of_bounds);
    }

    #[test]
    fn tiny_inputs_fall_back_to_sequential() {
        let store = grid_store();
        let coords = random_coords(1, 2);
        let result = resolve_parallel(&coords, &store, 16, &NullProgress).unwrap();
        assert_eq!(result.locations.len(), coords.len());
    }
}
