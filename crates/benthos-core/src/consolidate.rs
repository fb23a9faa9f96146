//! Iterative merging of sub-threshold polygons into their neighbours.
//!
//! Candidate polygons from upstream raster thresholding arrive fragmented;
//! slivers below the area threshold are folded into an adjacent neighbour
//! until none remain. The fixed point is explicit: the outcome carries a
//! `converged` flag so a capped run is detectable by the caller.

use geo::{Area, BooleanOps, Polygon};

use crate::polygon::shared_boundary_length;

/// Hard cap on merge rounds, a safety bound against pathological inputs.
pub const MAX_CONSOLIDATION_ROUNDS: u32 = 1000;

/// Result of one consolidation run.
#[derive(Debug, Clone)]
pub struct ConsolidationOutcome {
    pub polygons: Vec<Polygon<f64>>,
    /// False only when the round cap was reached before the fixed point.
    pub converged: bool,
    /// Number of merge rounds executed.
    pub iterations: u32,
    /// Sub-threshold polygons retained because they have no edge-adjacent
    /// neighbour.
    pub isolated_small: usize,
}

/// Merge every polygon smaller than `area_threshold` into its largest-area
/// edge-adjacent neighbour, repeating until no mergeable sub-threshold
/// polygon remains.
///
/// Neighbour ties break by larger shared-boundary length, then by input
/// order. Point contact is not adjacency. Total polygon count never
/// increases and total area is conserved; an isolated sub-threshold polygon
/// is kept as-is and logged.
pub fn consolidate(polygons: Vec<Polygon<f64>>, area_threshold: f64) -> ConsolidationOutcome {
    let mut alive: Vec<Option<Polygon<f64>>> = polygons.into_iter().map(Some).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_CONSOLIDATION_ROUNDS {
        let small: Vec<usize> = alive
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p.unsigned_area())))
            .filter(|&(_, a)| a < area_threshold)
            .map(|(i, _)| i)
            .collect();
        if small.is_empty() {
            converged = true;
            break;
        }

        iterations += 1;
        let mut merged_any = false;
        for idx in small {
            // The polygon may have grown past the threshold, or been
            // absorbed, by an earlier merge this round.
            let Some(poly) = alive[idx].clone() else { continue };
            if poly.unsigned_area() >= area_threshold {
                continue;
            }

            let mut best: Option<(usize, f64, f64)> = None;
            for (j, candidate) in alive.iter().enumerate() {
                if j == idx {
                    continue;
                }
                let Some(candidate) = candidate else { continue };
                let shared = shared_boundary_length(&poly, candidate);
                if shared <= 0.0 {
                    continue;
                }
                let area = candidate.unsigned_area();
                let better = match best {
                    None => true,
                    Some((bj, ba, bs)) => {
                        area > ba || (area == ba && (shared > bs || (shared == bs && j < bj)))
                    }
                };
                if better {
                    best = Some((j, area, shared));
                }
            }

            let Some((target, ..)) = best else {
                log::debug!("polygon {idx} is below threshold but has no adjacent neighbour");
                continue;
            };
            let union = alive[target]
                .as_ref()
                .map(|t| t.union(&poly))
                .filter(|m| m.0.len() == 1);
            match union {
                Some(mut m) => {
                    alive[target] = Some(m.0.remove(0));
                    alive[idx] = None;
                    merged_any = true;
                }
                None => {
                    log::debug!("union of polygon {idx} into its neighbour did not yield a single polygon; leaving it unmerged");
                }
            }
        }

        // Every remaining sub-threshold polygon is isolated: fixed point.
        if !merged_any {
            converged = true;
            break;
        }
    }

    if !converged {
        log::warn!("consolidation stopped at the {MAX_CONSOLIDATION_ROUNDS}-round cap without reaching a fixed point");
    }

    let polygons: Vec<Polygon<f64>> = alive.into_iter().flatten().collect();
    let isolated_small = polygons
        .iter()
        .filter(|p| p.unsigned_area() < area_threshold)
        .count();
    ConsolidationOutcome {
        polygons,
        converged,
        iterations,
        isolated_small,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn small_polygons_fold_into_largest_neighbour() {
        // 5 and 8 km² fragments both adjacent to a 40 km² neighbour;
        // threshold 10 km².
        let a = rect(0.0, 0.0, 2000.0, 2500.0); // 5e6 m²
        let b = rect(0.0, 2500.0, 2000.0, 6500.0); // 8e6 m²
        let c = rect(2000.0, 0.0, 12000.0, 4000.0); // 4e7 m²
        let out = consolidate(vec![a, b, c], 1.0e7);
        assert!(out.converged);
        assert_eq!(out.polygons.len(), 1);
        assert_eq!(out.isolated_small, 0);
        assert_relative_eq!(out.polygons[0].unsigned_area(), 5.3e7, epsilon = 1.0);
    }

    #[test]
    fn count_never_increases_and_area_is_conserved() {
        let input = vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(100.0, 0.0, 150.0, 100.0),
            rect(150.0, 0.0, 400.0, 100.0),
            rect(0.0, 100.0, 400.0, 140.0),
        ];
        let n_before = input.len();
        let area_before: f64 = input.iter().map(|p| p.unsigned_area()).sum();
        let out = consolidate(input, 20_000.0);
        assert!(out.converged);
        assert!(out.polygons.len() <= n_before);
        let area_after: f64 = out.polygons.iter().map(|p| p.unsigned_area()).sum();
        assert_relative_eq!(area_after, area_before, epsilon = 1e-3);
        assert!(out.polygons.iter().all(|p| p.unsigned_area() >= 20_000.0));
    }

    #[test]
    fn isolated_small_polygon_is_retained() {
        let big = rect(0.0, 0.0, 1000.0, 1000.0);
        let lone = rect(5000.0, 5000.0, 5010.0, 5010.0);
        let out = consolidate(vec![big, lone], 1000.0);
        assert!(out.converged);
        assert_eq!(out.polygons.len(), 2);
        assert_eq!(out.isolated_small, 1);
    }

    #[test]
    fn above_threshold_set_passes_through() {
        let input = vec![rect(0.0, 0.0, 100.0, 100.0), rect(200.0, 0.0, 300.0, 100.0)];
        let out = consolidate(input.clone(), 1.0);
        assert!(out.converged);
        assert_eq!(out.iterations, 0);
        assert_eq!(out.polygons.len(), 2);
    }

    #[test]
    fn empty_input_is_a_fixed_point() {
        let out = consolidate(Vec::new(), 1.0e6);
        assert!(out.converged);
        assert!(out.polygons.is_empty());
        assert_eq!(out.isolated_small, 0);
    }

    #[test]
    fn corner_contact_is_not_adjacency() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 10.0, 1000.0, 1000.0);
        let out = consolidate(vec![a, b], 1000.0);
        assert_eq!(out.polygons.len(), 2);
        assert_eq!(out.isolated_small, 1);
    }
}
