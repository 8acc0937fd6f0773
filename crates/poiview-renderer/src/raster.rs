//! Rasterization
//!
//! Half-space triangle rasterizer over screen-space vertices.

use glam::{Vec2, Vec3};

/// Map a normalized device coordinate to screen space
///
/// Screen x grows right and y grows down, with pixel centers at half
/// coordinates. Depth passes through unchanged.
pub fn ndc_to_screen(ndc: Vec3, width: u32, height: u32) -> Vec3 {
    Vec3::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
        ndc.z,
    )
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Rasterize a screen-space triangle of either winding
///
/// `plot` is called once per covered pixel with its coordinates and the
/// interpolated depth. Pixels outside `width` x `height` are clipped, and
/// zero-area or non-finite triangles plot nothing. Returns the number of
/// pixels plotted.
pub fn rasterize_triangle<F>(a: Vec3, b: Vec3, c: Vec3, width: u32, height: u32, mut plot: F) -> usize
where
    F: FnMut(u32, u32, f32),
{
    if width == 0 || height == 0 || !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return 0;
    }

    let (a2, b2, c2) = (a.truncate(), b.truncate(), c.truncate());
    let area = edge(a2, b2, c2);
    if area == 0.0 {
        return 0;
    }

    let min = a2.min(b2).min(c2).floor().max(Vec2::ZERO);
    let max = a2.max(b2).max(c2).ceil().min(Vec2::new(width as f32, height as f32));
    if min.x >= max.x || min.y >= max.y {
        return 0;
    }

    let inv_area = 1.0 / area;
    let mut plotted = 0;

    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b2, c2, p) * inv_area;
            let w1 = edge(c2, a2, p) * inv_area;
            let w2 = edge(a2, b2, p) * inv_area;

            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0 * a.z + w1 * b.z + w2 * c.z;
            plot(x, y, depth);
            plotted += 1;
        }
    }

    plotted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_to_screen() {
        let top_left = ndc_to_screen(Vec3::new(-1.0, 1.0, 0.25), 100, 50);
        assert_eq!(top_left, Vec3::new(0.0, 0.0, 0.25));

        let center = ndc_to_screen(Vec3::ZERO, 100, 50);
        assert_eq!(center, Vec3::new(50.0, 25.0, 0.0));
    }

    #[test]
    fn test_full_square_coverage() {
        let mut covered = vec![false; 16];
        let a = Vec3::new(0.0, 0.0, 0.5);
        let b = Vec3::new(4.0, 0.0, 0.5);
        let c = Vec3::new(4.0, 4.0, 0.5);
        let d = Vec3::new(0.0, 4.0, 0.5);

        rasterize_triangle(a, b, c, 4, 4, |x, y, _| covered[(y * 4 + x) as usize] = true);
        rasterize_triangle(a, c, d, 4, 4, |x, y, _| covered[(y * 4 + x) as usize] = true);
        assert!(covered.iter().all(|&hit| hit));
    }

    #[test]
    fn test_both_windings_plot() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(8.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 8.0, 0.0);

        let forward = rasterize_triangle(a, b, c, 8, 8, |_, _, _| {});
        let backward = rasterize_triangle(a, c, b, 8, 8, |_, _, _| {});
        assert!(forward > 0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_depth_interpolation() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 1.0);
        let c = Vec3::new(0.0, 10.0, 0.0);

        let mut depths = Vec::new();
        rasterize_triangle(a, b, c, 10, 10, |x, y, z| {
            if y == 0 {
                depths.push((x, z));
            }
        });

        assert!(depths.len() > 2);
        for (x, z) in depths {
            assert!((z - (x as f32 + 0.5) / 10.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_clipped_to_target() {
        let mut max_x = 0;
        let mut max_y = 0;
        let count = rasterize_triangle(
            Vec3::new(-50.0, -50.0, 0.0),
            Vec3::new(150.0, -50.0, 0.0),
            Vec3::new(-50.0, 150.0, 0.0),
            4,
            4,
            |x, y, _| {
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            },
        );
        assert_eq!(count, 16);
        assert_eq!((max_x, max_y), (3, 3));
    }

    #[test]
    fn test_degenerate_triangles() {
        let line = rasterize_triangle(Vec3::ZERO, Vec3::new(4.0, 4.0, 0.0), Vec3::new(8.0, 8.0, 0.0), 8, 8, |_, _, _| {});
        assert_eq!(line, 0);

        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        let bad = rasterize_triangle(nan, Vec3::X, Vec3::Y, 8, 8, |_, _, _| {});
        assert_eq!(bad, 0);

        let offscreen = rasterize_triangle(
            Vec3::new(20.0, 20.0, 0.0),
            Vec3::new(30.0, 20.0, 0.0),
            Vec3::new(20.0, 30.0, 0.0),
            8,
            8,
            |_, _, _| {},
        );
        assert_eq!(offscreen, 0);
    }
}
