//! Cross-section profile construction and per-feature aggregation.
//!
//! A profile is a depth-vs-distance polyline through a polygon's centroid.
//! Small polygons get a single profile along the long axis; polygons above
//! the area threshold get five, rotated at equal 36-degree offsets (180
//! degrees of coverage, since a chord is symmetric). Samples are taken from
//! the bathymetry grid at one cell-size spacing.

pub mod simplify;

use geo::{Area, Centroid, Coord, Polygon};

use crate::attributes::{Concavity, ProfileShape, ProfileSymmetry, SlopeClass};
use crate::config::ExecutionContext;
use crate::error::AttributeError;
use crate::grid::BathyGrid;
use crate::polygon::{chord_through, mbr_metrics, plan_distance};

/// One bathymetry sample along a profile chord. `z` is the raster value
/// (metres, negative below the datum); `distance` is measured from the chord
/// start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSample {
    pub distance: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An ordered sequence of samples along one chord. Always has at least two
/// points.
#[derive(Debug, Clone)]
pub struct Profile {
    pub samples: Vec<ProfileSample>,
}

impl Profile {
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &ProfileSample {
        &self.samples[0]
    }

    pub fn last(&self) -> &ProfileSample {
        &self.samples[self.samples.len() - 1]
    }

    /// The sample with the lowest raster value (the deepest point).
    pub fn deepest(&self) -> &ProfileSample {
        self.samples
            .iter()
            .fold(&self.samples[0], |acc, s| if s.z < acc.z { s } else { acc })
    }
}

/// Angular offsets (degrees off the long axis) for the five-profile case.
const PROFILE_OFFSETS_DEG: [f64; 5] = [0.0, 36.0, 72.0, 108.0, 144.0];

/// Build the cross-section profiles for one polygon. The first profile is
/// always the long-axis profile.
pub fn build_profiles(
    poly: &Polygon<f64>,
    feature: usize,
    ctx: &ExecutionContext,
) -> Result<Vec<Profile>, AttributeError> {
    let mbr = mbr_metrics(poly).ok_or(AttributeError::DegenerateGeometry { feature })?;
    let centroid = poly
        .centroid()
        .ok_or(AttributeError::DegenerateGeometry { feature })?;
    let origin = Coord {
        x: centroid.x(),
        y: centroid.y(),
    };

    let offsets: &[f64] = if poly.unsigned_area() > ctx.profile_area_threshold {
        &PROFILE_OFFSETS_DEG
    } else {
        &PROFILE_OFFSETS_DEG[..1]
    };

    let mut profiles = Vec::with_capacity(offsets.len());
    for &off in offsets {
        let angle = mbr.orientation_rad + off.to_radians();
        let (a, b) = chord_through(poly, origin, angle).ok_or(
            AttributeError::ChordOutsideBoundary {
                feature,
                angle_deg: off,
            },
        )?;
        let profile = sample_chord(ctx.bathymetry, a, b)
            .ok_or(AttributeError::ProfileTooShort { feature })?;
        profiles.push(profile);
    }
    Ok(profiles)
}

/// Sample the grid along the chord at one cell-size spacing, keeping both
/// endpoints. No-data stations are dropped; fewer than two valid samples
/// means the chord cannot form a profile.
fn sample_chord(grid: &BathyGrid, a: Coord<f64>, b: Coord<f64>) -> Option<Profile> {
    let dist = plan_distance(a, b);
    let step = grid.cell_size;
    if dist <= 0.0 || step <= 0.0 {
        return None;
    }
    let ux = (b.x - a.x) / dist;
    let uy = (b.y - a.y) / dist;
    let n = (dist / step).ceil() as usize;

    let mut samples = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let t = (i as f64 * step).min(dist);
        let x = a.x + t * ux;
        let y = a.y + t * uy;
        if let Some(v) = grid.value_at(x, y) {
            samples.push(ProfileSample {
                distance: t,
                x,
                y,
                z: v as f64,
            });
        }
    }
    if samples.len() < 2 {
        return None;
    }
    Some(Profile { samples })
}

/// Categorical and scalar descriptors of one simplified profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileAttributes {
    pub shape: ProfileShape,
    pub symmetry: ProfileSymmetry,
    pub concavity: Concavity,
    pub top_slope_class: SlopeClass,
    pub side_slope_class: SlopeClass,
    /// Positive-down depth of the shallowest knickpoint.
    pub top_depth: Option<f64>,
    /// Relief between the deepest and shallowest knickpoints.
    pub relief: Option<f64>,
    /// Plan distance between the first and last knickpoint.
    pub length: Option<f64>,
}

/// Combine per-profile attributes into one record: majority vote for the
/// categorical fields (ties broken toward the flatter or more regular
/// category) and the mean of present values for the scalar fields.
pub fn aggregate_attributes(per: &[ProfileAttributes]) -> ProfileAttributes {
    assert!(!per.is_empty(), "aggregate_attributes needs at least one profile");
    if per.len() == 1 {
        return per[0];
    }
    ProfileAttributes {
        shape: majority(per.iter().map(|p| p.shape), |s| s.vote_rank()),
        symmetry: majority(per.iter().map(|p| p.symmetry), |s| s.vote_rank()),
        concavity: majority(per.iter().map(|p| p.concavity), |c| c.vote_rank()),
        top_slope_class: majority(per.iter().map(|p| p.top_slope_class), |s| s.vote_rank()),
        side_slope_class: majority(per.iter().map(|p| p.side_slope_class), |s| s.vote_rank()),
        top_depth: mean_present(per.iter().map(|p| p.top_depth)),
        relief: mean_present(per.iter().map(|p| p.relief)),
        length: mean_present(per.iter().map(|p| p.length)),
    }
}

fn majority<T: Copy + PartialEq>(items: impl Iterator<Item = T>, rank: impl Fn(T) -> u8) -> T {
    let mut tally: Vec<(T, usize)> = Vec::new();
    for item in items {
        match tally.iter_mut().find(|(t, _)| *t == item) {
            Some((_, n)) => *n += 1,
            None => tally.push((item, 1)),
        }
    }
    tally
        .into_iter()
        .max_by(|(a, na), (b, nb)| na.cmp(nb).then(rank(*b).cmp(&rank(*a))))
        .map(|(t, _)| t)
        .expect("majority of a non-empty iterator")
}

fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Mean segment slope for a low feature: linear segments connect the head,
/// each profile's deepest point (ordered by distance from the head), and the
/// foot; their absolute slopes in degrees are averaged. Head and foot are
/// the endpoints of the long-axis profile.
pub fn mean_segment_slope(profiles: &[Profile]) -> Option<f64> {
    let axis = profiles.first()?;
    let head = *axis.first();
    let foot = *axis.last();

    let mut waypoints: Vec<ProfileSample> = profiles.iter().map(|p| *p.deepest()).collect();
    waypoints.sort_by(|a, b| {
        let da = (a.x - head.x).hypot(a.y - head.y);
        let db = (b.x - head.x).hypot(b.y - head.y);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut chain = Vec::with_capacity(waypoints.len() + 2);
    chain.push(head);
    chain.extend(waypoints);
    chain.push(foot);

    let mut slopes = Vec::with_capacity(chain.len() - 1);
    for pair in chain.windows(2) {
        slopes.push(simplify::segment_slope_deg(&pair[0], &pair[1]).abs());
    }
    Some(slopes.iter().sum::<f64>() / slopes.len() as f64)
}
