//! Demo segmenting a synthetic room corner with both strategies.
//!
//! A camera at the origin looks at a wall one meter away with a box standing
//! in front of its left half. The pointer sweeps across the scene and each
//! frame's patch is printed. Run with `RUST_LOG=debug` to see rejections.

use patchcarve::*;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn main() -> Result<()> {
    init_logging();

    let camera = PinholeCamera::look_at(Vec3::ZERO, Vec3::Z, Vec3::Y, WIDTH, HEIGHT, 60.0);

    // Environment proxy: back wall at z = 1.0, box front face at z = 0.7.
    let mut proxy = MeshProxy::new();
    proxy.add_rectangle(Vec3::new(0.0, 0.0, 1.0), Vec3::X * 2.0, Vec3::Y * 1.5);
    proxy.add_rectangle(Vec3::new(-0.25, -0.1, 0.7), Vec3::X * 0.2, Vec3::Y * 0.2);

    // Render the proxy into a ray-length depth buffer.
    let depth = DepthBuffer::from_fn(WIDTH, HEIGHT, |x, y| {
        let ray = camera.screen_to_ray(x as f32 + 0.5, y as f32 + 0.5);
        proxy
            .raycast(&ray)
            .map_or(0.0, |hit| hit.point.distance(ray.origin))
    })?;
    println!(
        "depth buffer {}x{}, {:.0}% valid",
        depth.width(),
        depth.height(),
        depth.valid_fraction() * 100.0
    );

    let ctx = FrameContext::new(&depth, &camera, &proxy);
    let mut overlay = OverlayState::new();

    for strategy in [Strategy::ImageSpace, Strategy::RaySpace] {
        let mut options = SegmentationOptions::default();
        options.strategy = strategy;
        let mut engine = SegmentationEngine::new(options)?;
        println!("\n{strategy:?}");

        for step in 0..8 {
            let x = -0.6 + 0.15 * step as f32;
            let pointer = Ray::new(Vec3::ZERO, Vec3::new(x, -0.1, 1.0));
            let seed = Seed::acquire(&pointer, &proxy);

            match engine.try_attempt(seed.as_ref(), &ctx) {
                Ok(mesh) => {
                    let centroid = mesh.centroid().unwrap_or(Vec3::ZERO);
                    println!(
                        "  x = {x:+.2}: {} triangles, area {:.3} m^2, centroid ({:.2}, {:.2}, {:.2})",
                        mesh.num_triangles(),
                        mesh.signed_area(),
                        centroid.x,
                        centroid.y,
                        centroid.z
                    );
                    publish(&mut overlay, Some(mesh));
                }
                Err(rejection) => {
                    println!("  x = {x:+.2}: {rejection}");
                    publish(&mut overlay, None);
                }
            }
        }
    }

    println!("\noverlay received {} meshes", overlay.revision());
    Ok(())
}
