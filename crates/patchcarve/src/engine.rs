//! The per-frame segmentation driver.

use glam::{Vec2, Vec3};
use patchcarve_core::{
    convex_hull, convex_hull_indices, FanMeshBuilder, PatchMesh, PixelRect, Ray, Result,
    RollingNormalFilter, SegmentationOptions, Strategy, SurfaceHit, TangentFrame, WORLD_UP,
};
use patchcarve_sensor::{is_valid_depth, CameraModel, DepthSource, Raycaster};
use patchcarve_strategies::{BackProjector, DepthMaskExtractor, RingSampler};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::overlay::{publish, OverlaySink};
use crate::rejection::{Rejection, SeedIssue, Stage};

/// A surface hit under the pointer, plus the point the pointer was cast from.
///
/// The anchor is the reference for ray-space depth continuity: probe hits are
/// compared by their distance to it, not to the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    /// Surface hit under the pointer.
    pub hit: SurfaceHit,
    /// Origin of the pointer ray.
    pub anchor: Vec3,
}

impl Seed {
    /// Pairs a hit with the ray origin it was found from.
    pub fn new(hit: SurfaceHit, anchor: Vec3) -> Self {
        Self { hit, anchor }
    }

    /// Casts the pointer ray and anchors the seed at its origin.
    pub fn acquire<R: Raycaster + ?Sized>(pointer: &Ray, raycaster: &R) -> Option<Self> {
        raycaster
            .raycast(pointer)
            .map(|hit| Self::new(hit, pointer.origin))
    }
}

/// Read-only sensor state for one attempt.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Depth image for this frame, in meters along the camera ray.
    pub depth: &'a dyn DepthSource,
    /// Camera the depth image was captured with.
    pub camera: &'a dyn CameraModel,
    /// Environment geometry for pointer and probe rays.
    pub raycaster: &'a dyn Raycaster,
}

impl<'a> FrameContext<'a> {
    /// Bundles one frame's sensor state.
    pub fn new(
        depth: &'a dyn DepthSource,
        camera: &'a dyn CameraModel,
        raycaster: &'a dyn Raycaster,
    ) -> Self {
        Self {
            depth,
            camera,
            raycaster,
        }
    }
}

/// Turns pointer seeds into overlay meshes, one attempt per frame.
///
/// The engine holds only what has to outlive a frame: the rolling normal
/// filter and the jitter RNG. Everything else is rebuilt per attempt.
#[derive(Debug)]
pub struct SegmentationEngine {
    options: SegmentationOptions,
    normal_filter: RollingNormalFilter,
    mask_extractor: DepthMaskExtractor,
    ring_sampler: RingSampler,
    mesh_builder: FanMeshBuilder,
    rng: StdRng,
}

impl SegmentationEngine {
    /// Creates an engine after validating the options.
    pub fn new(options: SegmentationOptions) -> Result<Self> {
        options.validate()?;
        log::info!(
            "segmentation engine: {:?} strategy, normal window {}",
            options.strategy,
            options.seed.normal_window
        );
        Ok(Self {
            normal_filter: RollingNormalFilter::new(options.seed.normal_window),
            mask_extractor: DepthMaskExtractor::from_options(&options.depth_mask),
            ring_sampler: RingSampler::new(options.ring.clone()),
            mesh_builder: FanMeshBuilder::new().with_dedup_tolerance(options.mesh.dedup_tolerance),
            rng: StdRng::seed_from_u64(options.ring.jitter_seed),
            options,
        })
    }

    pub fn options(&self) -> &SegmentationOptions {
        &self.options
    }

    pub fn strategy(&self) -> Strategy {
        self.options.strategy
    }

    /// Switches strategy without touching the normal history.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.options.strategy = strategy;
    }

    /// The normal smoothing filter.
    pub fn normal_filter(&self) -> &RollingNormalFilter {
        &self.normal_filter
    }

    /// Forgets the normal history and re-seeds the jitter RNG.
    pub fn reset(&mut self) {
        self.normal_filter.reset();
        self.rng = StdRng::seed_from_u64(self.options.ring.jitter_seed);
    }

    /// Runs one attempt. Rejections are logged and reported as `None`.
    pub fn attempt(&mut self, seed: Option<&Seed>, ctx: &FrameContext<'_>) -> Option<PatchMesh> {
        match self.try_attempt(seed, ctx) {
            Ok(mesh) => Some(mesh),
            Err(rejection) => {
                log::debug!("segmentation rejected: {rejection}");
                None
            }
        }
    }

    /// Acquires a seed along `pointer`, then runs one attempt.
    pub fn attempt_pointer(&mut self, pointer: &Ray, ctx: &FrameContext<'_>) -> Option<PatchMesh> {
        let seed = Seed::acquire(pointer, ctx.raycaster);
        self.attempt(seed.as_ref(), ctx)
    }

    /// Runs one attempt and publishes the result to `sink`.
    ///
    /// Returns whether the overlay is visible afterwards.
    pub fn update<S: OverlaySink + ?Sized>(
        &mut self,
        sink: &mut S,
        seed: Option<&Seed>,
        ctx: &FrameContext<'_>,
    ) -> bool {
        let mesh = self.attempt(seed, ctx);
        let visible = mesh.is_some();
        publish(sink, mesh);
        visible
    }

    /// Runs one attempt, reporting why no mesh was produced.
    pub fn try_attempt(
        &mut self,
        seed: Option<&Seed>,
        ctx: &FrameContext<'_>,
    ) -> std::result::Result<PatchMesh, Rejection> {
        let seed = seed.ok_or(SeedIssue::NoHit)?;
        let frame = self.seed_frame(seed, ctx.camera)?;

        let boundary = match self.options.strategy {
            Strategy::ImageSpace => self.image_space_boundary(seed, &frame, ctx)?,
            Strategy::RaySpace => self.ray_space_boundary(seed, &frame, ctx)?,
        };

        let mesh = self
            .mesh_builder
            .build_facing(&boundary, frame.normal())
            .ok_or(Rejection::DegenerateGeometry("zero-area boundary"))?;
        log::debug!(
            "patch mesh: {} boundary vertices, {} triangles",
            mesh.boundary_len(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }

    /// Validates the seed and builds the tangent frame from the smoothed normal.
    fn seed_frame(
        &mut self,
        seed: &Seed,
        camera: &dyn CameraModel,
    ) -> std::result::Result<TangentFrame, Rejection> {
        let opts = &self.options.seed;
        if !seed.hit.is_confident(opts.min_confidence) {
            return Err(SeedIssue::LowConfidence.into());
        }
        let normal = seed
            .hit
            .unit_normal()
            .ok_or(Rejection::DegenerateGeometry("zero seed normal"))?;
        if opts.reject_ceilings && normal.dot(-WORLD_UP) > opts.ceiling_alignment {
            return Err(SeedIssue::Ceiling.into());
        }
        if camera.world_to_screen(seed.hit.point).z <= 0.0 {
            return Err(SeedIssue::BehindCamera.into());
        }

        let smoothed = self.normal_filter.update(normal);
        TangentFrame::try_build(seed.hit.point, smoothed)
            .ok_or(Rejection::DegenerateGeometry("smoothed normal cancelled out"))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn image_space_boundary(
        &self,
        seed: &Seed,
        frame: &TangentFrame,
        ctx: &FrameContext<'_>,
    ) -> std::result::Result<Vec<Vec3>, Rejection> {
        let opts = &self.options.depth_mask;
        let screen = ctx.camera.world_to_screen(seed.hit.point);
        let (width, height) = ctx.depth.dimensions();
        #[allow(clippy::cast_precision_loss)]
        let on_screen = screen.x.is_finite()
            && screen.y.is_finite()
            && (0.0..width as f32).contains(&screen.x)
            && (0.0..height as f32).contains(&screen.y);
        if !on_screen {
            return Err(SeedIssue::OffScreen.into());
        }

        let sampled = ctx.depth.sample_nearest(screen.x, screen.y);
        let seed_depth = if is_valid_depth(sampled) {
            sampled
        } else {
            ctx.camera.position().distance(seed.hit.point)
        };

        let roi = PixelRect::centered(screen.x as i32, screen.y as i32, opts.roi_size);
        let mask = self
            .mask_extractor
            .extract(ctx.depth, roi, seed_depth)
            .ok_or(Rejection::insufficient(Stage::DepthMask, 0))?;
        if !mask.is_sufficient() {
            return Err(Rejection::insufficient(Stage::DepthMask, mask.len()));
        }

        let hull = convex_hull(&mask.planar_points());
        if hull.len() < 3 {
            return Err(Rejection::insufficient(Stage::Hull, hull.len()));
        }
        log::debug!(
            "image space: {} mask pixels ({:.0}% of grid), hull of {}",
            mask.len(),
            mask.coverage() * 100.0,
            hull.len()
        );

        let projector =
            BackProjector::for_mask(&mask, seed_depth, frame.normal(), opts.lift_along_normal);
        let boundary = projector.project(&hull, ctx.depth, ctx.camera);
        if boundary.len() < 3 {
            return Err(Rejection::insufficient(Stage::BackProjection, boundary.len()));
        }
        Ok(boundary)
    }

    fn ray_space_boundary(
        &mut self,
        seed: &Seed,
        frame: &TangentFrame,
        ctx: &FrameContext<'_>,
    ) -> std::result::Result<Vec<Vec3>, Rejection> {
        let samples =
            self.ring_sampler
                .sample(&seed.hit, frame, seed.anchor, ctx.raycaster, &mut self.rng);
        if samples.len() < 3 {
            return Err(Rejection::insufficient(Stage::RingSampler, samples.len()));
        }

        let planar: Vec<Vec2> = samples.iter().map(|s| s.plane).collect();
        let hull = convex_hull_indices(&planar);
        if hull.len() < 3 {
            return Err(Rejection::insufficient(Stage::Hull, hull.len()));
        }
        log::debug!("ray space: {} samples, hull of {}", samples.len(), hull.len());

        let lift = frame.normal() * self.options.ring.lift_along_normal;
        Ok(hull.iter().map(|&i| samples[i].world + lift).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcarve_sensor::{DepthBuffer, MeshProxy, PinholeCamera};

    struct Scene {
        depth: DepthBuffer,
        camera: PinholeCamera,
        proxy: MeshProxy,
    }

    impl Scene {
        fn wall() -> Self {
            let mut proxy = MeshProxy::new();
            proxy.add_rectangle(Vec3::new(0.011, 0.004, 1.0), Vec3::X * 2.0, Vec3::Y * 2.0);
            Self {
                depth: DepthBuffer::filled(128, 128, 1.0).unwrap(),
                camera: PinholeCamera::look_at(Vec3::ZERO, Vec3::Z, Vec3::Y, 128, 128, 60.0),
                proxy,
            }
        }

        fn ctx(&self) -> FrameContext<'_> {
            FrameContext::new(&self.depth, &self.camera, &self.proxy)
        }
    }

    fn wall_seed() -> Seed {
        Seed::new(
            SurfaceHit::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z, 1.0),
            Vec3::ZERO,
        )
    }

    fn engine(strategy: Strategy) -> SegmentationEngine {
        let mut options = SegmentationOptions::default();
        options.strategy = strategy;
        options.depth_mask.roi_size = 32;
        SegmentationEngine::new(options).unwrap()
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut options = SegmentationOptions::default();
        options.seed.normal_window = 0;
        assert!(SegmentationEngine::new(options).is_err());
    }

    #[test]
    fn test_no_seed() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::ImageSpace);
        assert_eq!(
            engine.try_attempt(None, &scene.ctx()),
            Err(Rejection::NoSeed(SeedIssue::NoHit))
        );
        assert!(engine.attempt(None, &scene.ctx()).is_none());
    }

    #[test]
    fn test_seed_rejections() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::ImageSpace);

        let mut weak = wall_seed();
        weak.hit.normal_confidence = 0.1;
        assert_eq!(
            engine.try_attempt(Some(&weak), &scene.ctx()),
            Err(Rejection::NoSeed(SeedIssue::LowConfidence))
        );

        let mut flat = wall_seed();
        flat.hit.normal = Vec3::ZERO;
        assert!(matches!(
            engine.try_attempt(Some(&flat), &scene.ctx()),
            Err(Rejection::DegenerateGeometry(_))
        ));

        let mut ceiling = wall_seed();
        ceiling.hit.normal = Vec3::NEG_Y;
        assert_eq!(
            engine.try_attempt(Some(&ceiling), &scene.ctx()),
            Err(Rejection::NoSeed(SeedIssue::Ceiling))
        );

        let mut behind = wall_seed();
        behind.hit.point = Vec3::new(0.0, 0.0, -1.0);
        assert_eq!(
            engine.try_attempt(Some(&behind), &scene.ctx()),
            Err(Rejection::NoSeed(SeedIssue::BehindCamera))
        );

        // None of the rejected seeds reached the normal filter.
        assert_eq!(
            engine.normal_filter().state(),
            patchcarve_core::WindowState::Uninitialized
        );
    }

    #[test]
    fn test_seed_on_image_plane_is_behind() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::ImageSpace);
        let mut grazing = wall_seed();
        grazing.hit.point = Vec3::new(0.0, 0.0, 1e-8);
        assert_eq!(
            engine.try_attempt(Some(&grazing), &scene.ctx()),
            Err(Rejection::NoSeed(SeedIssue::BehindCamera))
        );
    }

    #[test]
    fn test_off_screen_seed() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::ImageSpace);
        let mut aside = wall_seed();
        aside.hit.point = Vec3::new(5.0, 0.0, 1.0);
        assert_eq!(
            engine.try_attempt(Some(&aside), &scene.ctx()),
            Err(Rejection::NoSeed(SeedIssue::OffScreen))
        );
    }

    #[test]
    fn test_opposing_normals_cancel() {
        let scene = Scene::wall();
        let mut options = SegmentationOptions::default();
        options.seed.normal_window = 2;
        options.depth_mask.roi_size = 32;
        let mut engine = SegmentationEngine::new(options).unwrap();
        assert!(engine.try_attempt(Some(&wall_seed()), &scene.ctx()).is_ok());

        let mut flipped = wall_seed();
        flipped.hit.normal = Vec3::Z;
        assert_eq!(
            engine.try_attempt(Some(&flipped), &scene.ctx()),
            Err(Rejection::DegenerateGeometry("smoothed normal cancelled out"))
        );
    }

    #[test]
    fn test_thin_strip_fails_at_hull() {
        let mut scene = Scene::wall();
        // One matching column: every mask pixel is collinear.
        scene.depth =
            DepthBuffer::from_fn(128, 128, |x, _| if x == 64 { 1.0 } else { 3.0 }).unwrap();
        let mut options = SegmentationOptions::default();
        options.depth_mask.roi_size = 32;
        options.depth_mask.downsample = 1;
        options.depth_mask.checkerboard = false;
        let mut engine = SegmentationEngine::new(options).unwrap();
        assert!(matches!(
            engine.try_attempt(Some(&wall_seed()), &scene.ctx()),
            Err(Rejection::InsufficientBoundary {
                stage: Stage::Hull,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_roi_fails_at_depth_mask() {
        let mut scene = Scene::wall();
        // No depth anywhere: the seed depth falls back but nothing matches it.
        scene.depth = DepthBuffer::filled(128, 128, 0.0).unwrap();
        let mut engine = engine(Strategy::ImageSpace);
        assert!(matches!(
            engine.try_attempt(Some(&wall_seed()), &scene.ctx()),
            Err(Rejection::InsufficientBoundary {
                stage: Stage::DepthMask,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_seed_depth_falls_back_to_distance() {
        let mut scene = Scene::wall();
        scene.depth.set(64, 64, 0.0);
        let mut engine = engine(Strategy::ImageSpace);
        let mesh = engine.try_attempt(Some(&wall_seed()), &scene.ctx()).unwrap();
        assert!(mesh.num_triangles() >= 3);
    }

    #[test]
    fn test_ceiling_allowed_when_disabled() {
        let mut options = SegmentationOptions::default();
        options.seed.reject_ceilings = false;
        options.strategy = Strategy::RaySpace;
        let mut engine = SegmentationEngine::new(options).unwrap();
        let scene = Scene::wall();
        let mut ceiling = wall_seed();
        ceiling.hit.normal = Vec3::NEG_Y;
        assert_ne!(
            engine.try_attempt(Some(&ceiling), &scene.ctx()).err(),
            Some(Rejection::NoSeed(SeedIssue::Ceiling))
        );
    }

    #[test]
    fn test_image_space_wall() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::ImageSpace);
        let mesh = engine.try_attempt(Some(&wall_seed()), &scene.ctx()).unwrap();
        assert!(mesh.num_triangles() >= 3);
        assert!(mesh.normal.dot(Vec3::NEG_Z) > 0.99);
    }

    #[test]
    fn test_ray_space_wall() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::RaySpace);
        let mesh = engine.try_attempt(Some(&wall_seed()), &scene.ctx()).unwrap();
        assert!(mesh.num_triangles() >= 3);
        assert!(mesh.normal.dot(Vec3::NEG_Z) > 0.999);
        let lift = engine.options().ring.lift_along_normal;
        for v in &mesh.vertices {
            assert!((v.z - (1.0 - lift)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_update_publishes_and_hides() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::RaySpace);
        let mut overlay = crate::OverlayState::new();
        assert!(engine.update(&mut overlay, Some(&wall_seed()), &scene.ctx()));
        assert!(overlay.is_visible());
        assert!(!engine.update(&mut overlay, None, &scene.ctx()));
        assert!(!overlay.is_visible());
        assert!(overlay.mesh().is_some());
    }

    #[test]
    fn test_attempt_pointer() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::RaySpace);
        let pointer = Ray::new(Vec3::new(0.0, 0.0, 0.2), Vec3::Z);
        assert!(engine.attempt_pointer(&pointer, &scene.ctx()).is_some());
        let miss = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(engine.attempt_pointer(&miss, &scene.ctx()).is_none());
    }

    #[test]
    fn test_reset_clears_normal_history() {
        let scene = Scene::wall();
        let mut engine = engine(Strategy::RaySpace);
        engine.attempt(Some(&wall_seed()), &scene.ctx());
        assert_ne!(
            engine.normal_filter().state(),
            patchcarve_core::WindowState::Uninitialized
        );
        engine.reset();
        assert_eq!(
            engine.normal_filter().state(),
            patchcarve_core::WindowState::Uninitialized
        );
    }
}
