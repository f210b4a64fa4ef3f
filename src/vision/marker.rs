use nalgebra::{Point2, Vector2};

// ---------------------------------------------------------------------------
// Marker geometry: corner quads, centroids, apparent area
// ---------------------------------------------------------------------------

/// Where the target sits in the frame this cycle.
///
/// `cx`/`cy` are the marker centroid in pixel coordinates (y grows
/// downward), `area` the apparent pixel area of the marker quad. One fix
/// per cycle, no persisted identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFix {
    pub cx: f64,
    pub cy: f64,
    pub area: f64,
}

/// One decoded fiducial marker in a frame: its family id and the four
/// corner points, in detection order.
#[derive(Debug, Clone)]
pub struct MarkerSighting {
    pub id: u32,
    pub corners: [Point2<f64>; 4],
}

impl MarkerSighting {
    pub fn new(id: u32, corners: [Point2<f64>; 4]) -> Self {
        Self { id, corners }
    }

    /// Centroid as the mean of the four corners.
    pub fn centroid(&self) -> Point2<f64> {
        let sum = self
            .corners
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / 4.0)
    }

    /// Apparent area of the corner quad (shoelace formula). Corner winding
    /// does not matter; the result is always non-negative.
    pub fn area(&self) -> f64 {
        let mut twice = 0.0;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice += a.x * b.y - b.x * a.y;
        }
        (twice * 0.5).abs()
    }

    /// Reduce the sighting to the fix the control channels consume.
    pub fn fix(&self) -> TargetFix {
        let c = self.centroid();
        TargetFix {
            cx: c.x,
            cy: c.y,
            area: self.area(),
        }
    }
}

/// Pick the sighting that drives this cycle's command.
///
/// When several sightings in one frame carry the target id, the last one
/// wins and the rest are ignored; no averaging, no aggregation. Duplicate
/// target ids in a frame are degenerate input, and taking the final match
/// is the intended policy, not an iteration accident.
pub fn select_target(sightings: &[MarkerSighting], target_id: u32) -> Option<&MarkerSighting> {
    sightings.iter().rev().find(|s| s.id == target_id)
}
