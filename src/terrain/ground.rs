//! Ground-intersection queries
//!
//! `GroundQuery` is the seam where a host physics engine plugs in.
//! `HeightfieldGround` answers the same query against the terrain's own
//! height grid so placement works without one.

use glam::Vec3;
use tracing::trace;

use super::Terrain;

pub trait GroundQuery {
    /// First hit along `direction` within `max_distance`, considering only
    /// colliders on layers set in `layer_mask`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layer_mask: u32) -> Option<Vec3>;
}

/// Raycasts against the terrain surface, which lives on a single layer.
pub struct HeightfieldGround<'a> {
    terrain: &'a Terrain,
    layer: u32,
}

impl<'a> HeightfieldGround<'a> {
    pub fn new(terrain: &'a Terrain, layer: u32) -> Self {
        Self { terrain, layer }
    }

    /// Signed distance of `p` above the surface; `None` off the footprint.
    fn clearance(&self, p: Vec3) -> Option<f32> {
        self.terrain.surface_height_world(p.x, p.z).map(|s| p.y - s)
    }
}

impl GroundQuery for HeightfieldGround<'_> {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layer_mask: u32) -> Option<Vec3> {
        if self.layer >= 32 || layer_mask & (1 << self.layer) == 0 {
            return None;
        }
        let dir = direction.try_normalize()?;

        // Vertical rays have a closed form.
        if dir.x == 0.0 && dir.z == 0.0 {
            let surface = self.terrain.surface_height_world(origin.x, origin.z)?;
            let t = (surface - origin.y) / dir.y;
            return (0.0..=max_distance)
                .contains(&t)
                .then(|| Vec3::new(origin.x, surface, origin.z));
        }

        // March, then bisect the first sign change.
        let step = (self.terrain.sample_spacing() * 0.5).max(1e-3);
        let steps = (max_distance / step).ceil() as usize;
        let mut prev_t = 0.0;
        let mut prev = self.clearance(origin);
        if prev == Some(0.0) {
            return Some(origin);
        }

        for i in 1..=steps {
            let t = (i as f32 * step).min(max_distance);
            let cur = self.clearance(origin + dir * t);
            if let (Some(a), Some(b)) = (prev, cur) {
                if a.signum() != b.signum() || b == 0.0 {
                    let (mut lo, mut hi) = (prev_t, t);
                    for _ in 0..24 {
                        let mid = 0.5 * (lo + hi);
                        match self.clearance(origin + dir * mid) {
                            Some(c) if c.signum() == a.signum() && c != 0.0 => lo = mid,
                            _ => hi = mid,
                        }
                    }
                    let hit = origin + dir * hi;
                    trace!(?origin, ?hit, "heightfield hit");
                    return Some(hit);
                }
            }
            prev_t = t;
            prev = cur;
        }
        None
    }
}
