//! Ray-space patch discovery: a ring lattice of short probe rays.
//!
//! Probes are laid out on concentric rings in the seed's tangent plane and
//! fired back at the surface along `-n`. This is a regular-grid region growth
//! approximation of a flood fill: surface reachable only through gaps in the
//! lattice is missed, but the cost is fixed at `rings × rays_per_ring`
//! raycasts per attempt.

use glam::{Vec2, Vec3};
use patchcarve_core::{Ray, RingSamplerOptions, SurfaceHit, TangentFrame};
use patchcarve_sensor::Raycaster;
use rand::Rng;

/// A probe hit accepted as part of the patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSample {
    /// Hit position in world space.
    pub world: Vec3,
    /// Hit position in the seed frame's plane coordinates.
    pub plane: Vec2,
}

/// Why a probe did not contribute a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The hit lies on the seed surface.
    Accepted,
    /// No hit within the probe length.
    Missed,
    /// Hit normal confidence below the minimum.
    LowConfidence,
    /// Distance from the reference jumps by more than the surface step.
    DepthDiscontinuity,
    /// Hit normal is degenerate or tilted past the angle limit.
    NormalMismatch,
}

/// Casts ring probes around a seed hit.
#[derive(Debug, Clone)]
pub struct RingSampler {
    options: RingSamplerOptions,
    cos_max_angle: f32,
}

impl RingSampler {
    /// Creates a sampler from ray-space options.
    pub fn new(options: RingSamplerOptions) -> Self {
        let cos_max_angle = options.max_normal_angle_deg.to_radians().cos();
        Self {
            options,
            cos_max_angle,
        }
    }

    /// Returns the sampler options.
    pub fn options(&self) -> &RingSamplerOptions {
        &self.options
    }

    /// Upper bound on raycasts per call.
    pub fn probe_count(&self) -> usize {
        self.options.rings as usize * self.options.rays_per_ring as usize
    }

    /// Samples the surface around `seed`.
    ///
    /// The seed itself is always the first sample, at plane `(0, 0)`. Depth
    /// continuity is measured as distance from `reference` (typically the
    /// pointer anchor) compared with the seed's distance from it.
    pub fn sample<R, G>(
        &self,
        seed: &SurfaceHit,
        frame: &TangentFrame,
        reference: Vec3,
        raycaster: &R,
        rng: &mut G,
    ) -> Vec<RingSample>
    where
        R: Raycaster + ?Sized,
        G: Rng + ?Sized,
    {
        let opts = &self.options;
        let n = frame.normal();
        let seed_distance = seed.point.distance(reference);

        let mut samples = Vec::with_capacity(self.probe_count() + 1);
        samples.push(RingSample {
            world: seed.point,
            plane: Vec2::ZERO,
        });

        let mut rejected = 0usize;
        for ring in 0..opts.rings {
            #[allow(clippy::cast_precision_loss)]
            let radius = opts.radius_start + ring as f32 * opts.radius_step;
            for step in 0..opts.rays_per_ring {
                #[allow(clippy::cast_precision_loss)]
                let mut theta = std::f32::consts::TAU * step as f32 / opts.rays_per_ring as f32;
                if opts.jitter_deg > 0.0 {
                    theta += rng.gen_range(-opts.jitter_deg..=opts.jitter_deg).to_radians();
                }
                let offset = (frame.tangent_x() * theta.cos() + frame.tangent_y() * theta.sin()) * radius;
                let ray = Ray::with_max_distance(
                    seed.point + n * opts.probe_lift + offset,
                    -n,
                    opts.probe_lift + opts.probe_depth,
                );

                let hit = raycaster.raycast(&ray);
                let outcome = self.classify(hit.as_ref(), n, reference, seed_distance);
                match (outcome, hit) {
                    (ProbeOutcome::Accepted, Some(hit)) => samples.push(RingSample {
                        world: hit.point,
                        plane: frame.to_plane(hit.point),
                    }),
                    _ => {
                        rejected += 1;
                        log::trace!("probe ring {ring} step {step}: {outcome:?}");
                    }
                }
            }
        }

        log::debug!(
            "ring sampler: {} accepted, {} rejected of {} probes",
            samples.len() - 1,
            rejected,
            self.probe_count()
        );
        samples
    }

    /// Applies the confidence, depth-continuity and coplanarity tests.
    pub fn classify(
        &self,
        hit: Option<&SurfaceHit>,
        seed_normal: Vec3,
        reference: Vec3,
        seed_distance: f32,
    ) -> ProbeOutcome {
        let Some(hit) = hit else {
            return ProbeOutcome::Missed;
        };
        if !hit.is_confident(self.options.min_confidence) {
            return ProbeOutcome::LowConfidence;
        }
        if (hit.point.distance(reference) - seed_distance).abs() > self.options.max_surface_step {
            return ProbeOutcome::DepthDiscontinuity;
        }
        match hit.unit_normal() {
            Some(normal) if normal.dot(seed_normal) >= self.cos_max_angle - 1e-6 => {
                ProbeOutcome::Accepted
            }
            _ => ProbeOutcome::NormalMismatch,
        }
    }
}
