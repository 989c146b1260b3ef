//! Configuration options for patch segmentation.
//!
//! All distances are in meters and all angles in degrees.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::fan_mesh::DEFAULT_DEDUP_TOLERANCE;

/// Which patch discovery strategy the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Strategy {
    /// Threshold the depth buffer around the seed pixel.
    #[default]
    ImageSpace,
    /// Probe the surface with a ring lattice of short rays.
    RaySpace,
}

/// Top-level segmentation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SegmentationOptions {
    /// Patch discovery strategy.
    pub strategy: Strategy,

    /// Seed acceptance and normal smoothing.
    pub seed: SeedOptions,

    /// Image-space strategy parameters.
    pub depth_mask: DepthMaskOptions,

    /// Ray-space strategy parameters.
    pub ring: RingSamplerOptions,

    /// Mesh synthesis parameters.
    pub mesh: MeshOptions,
}

/// Seed gating and smoothing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    /// Hits with a lower normal confidence are rejected.
    pub min_confidence: f32,

    /// Whether to reject surfaces facing downward (ceilings).
    pub reject_ceilings: bool,

    /// A normal is a ceiling when its dot product with world down exceeds this.
    pub ceiling_alignment: f32,

    /// Rolling normal filter window size.
    pub normal_window: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            reject_ceilings: true,
            ceiling_alignment: 0.85,
            normal_window: 5,
        }
    }
}

/// Options for the image-space (depth mask) strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthMaskOptions {
    /// Side of the square ROI around the seed pixel, in full-resolution pixels.
    pub roi_size: u32,

    /// Resampling factor; the ROI is read at `1 / downsample` resolution.
    pub downsample: u32,

    /// Maximum absolute depth difference to the seed depth.
    pub depth_threshold: f32,

    /// Keep only pixels with `(x ^ y) & 1 == 0` before hulling.
    pub checkerboard: bool,

    /// Offset of back-projected vertices along the seed normal.
    pub lift_along_normal: f32,
}

impl Default for DepthMaskOptions {
    fn default() -> Self {
        Self {
            roi_size: 128,
            downsample: 2,
            depth_threshold: 0.03,
            checkerboard: true,
            lift_along_normal: 0.001,
        }
    }
}

/// Options for the ray-space (ring sampler) strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingSamplerOptions {
    /// Number of concentric rings.
    pub rings: u32,

    /// Probe rays per ring.
    pub rays_per_ring: u32,

    /// Radius of the innermost ring.
    pub radius_start: f32,

    /// Radius increment between rings.
    pub radius_step: f32,

    /// Maximum change in distance to the reference anchor.
    pub max_surface_step: f32,

    /// Maximum angle between a probe hit normal and the seed normal.
    pub max_normal_angle_deg: f32,

    /// Probe hits with a lower normal confidence are discarded.
    pub min_confidence: f32,

    /// Bound of the random angular offset per probe (0 = regular lattice).
    pub jitter_deg: f32,

    /// Seed for the jitter generator.
    pub jitter_seed: u64,

    /// Height above the tangent plane where probes start.
    pub probe_lift: f32,

    /// How far below the tangent plane probes may reach.
    pub probe_depth: f32,

    /// Offset of boundary vertices along the seed normal.
    pub lift_along_normal: f32,
}

impl Default for RingSamplerOptions {
    fn default() -> Self {
        Self {
            rings: 6,
            rays_per_ring: 16,
            radius_start: 0.05,
            radius_step: 0.05,
            max_surface_step: 0.05,
            max_normal_angle_deg: 15.0,
            min_confidence: 0.5,
            jitter_deg: 0.0,
            jitter_seed: 0x5eed,
            probe_lift: 0.05,
            probe_depth: 0.1,
            lift_along_normal: 0.001,
        }
    }
}

/// Options for fan mesh synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Boundary points closer than this are merged.
    pub dedup_tolerance: f32,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
        }
    }
}

impl SegmentationOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&text)?;
        log::info!("loaded segmentation options from {}", path.display());
        Ok(options)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every option against its valid range.
    pub fn validate(&self) -> Result<()> {
        let seed = &self.seed;
        unit_interval("seed.min_confidence", seed.min_confidence)?;
        unit_interval("seed.ceiling_alignment", seed.ceiling_alignment)?;
        if seed.normal_window == 0 {
            return Err(PatchError::invalid_option(
                "seed.normal_window",
                "window must hold at least one sample",
            ));
        }

        let mask = &self.depth_mask;
        if mask.roi_size < 2 {
            return Err(PatchError::invalid_option(
                "depth_mask.roi_size",
                format!("{} is smaller than 2", mask.roi_size),
            ));
        }
        if mask.downsample == 0 {
            return Err(PatchError::invalid_option(
                "depth_mask.downsample",
                "must be at least 1",
            ));
        }
        non_negative("depth_mask.depth_threshold", mask.depth_threshold)?;
        non_negative("depth_mask.lift_along_normal", mask.lift_along_normal)?;

        let ring = &self.ring;
        if ring.rings > 0 && ring.rays_per_ring == 0 {
            return Err(PatchError::invalid_option(
                "ring.rays_per_ring",
                "must be at least 1 when rings are enabled",
            ));
        }
        non_negative("ring.radius_start", ring.radius_start)?;
        non_negative("ring.radius_step", ring.radius_step)?;
        non_negative("ring.max_surface_step", ring.max_surface_step)?;
        if !(0.0..=180.0).contains(&ring.max_normal_angle_deg) {
            return Err(PatchError::invalid_option(
                "ring.max_normal_angle_deg",
                format!("{} is outside [0, 180]", ring.max_normal_angle_deg),
            ));
        }
        unit_interval("ring.min_confidence", ring.min_confidence)?;
        non_negative("ring.jitter_deg", ring.jitter_deg)?;
        if ring.probe_lift.is_nan() || ring.probe_lift <= 0.0 {
            return Err(PatchError::invalid_option(
                "ring.probe_lift",
                "must be positive",
            ));
        }
        non_negative("ring.probe_depth", ring.probe_depth)?;
        non_negative("ring.lift_along_normal", ring.lift_along_normal)?;

        non_negative("mesh.dedup_tolerance", self.mesh.dedup_tolerance)?;
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PatchError::invalid_option(
            name,
            format!("{value} is not a finite non-negative number"),
        ))
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PatchError::invalid_option(
            name,
            format!("{value} is outside [0, 1]"),
        ))
    }
}
