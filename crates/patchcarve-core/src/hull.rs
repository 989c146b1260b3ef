//! Planar convex hull (Andrew's monotone chain).
//!
//! The hull is returned counter-clockwise with collinear boundary points
//! removed, so the result is the minimal strictly convex polygon.

use std::cmp::Ordering;

use glam::Vec2;

/// A point in a plane's local 2-D coordinates.
pub type PlanarPoint = Vec2;

/// Twice the signed area of the triangle `(o, a, b)`.
///
/// Positive for a left (counter-clockwise) turn.
#[inline]
pub fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn lexicographic(a: Vec2, b: Vec2) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Returns the indices of the hull vertices of `points`, counter-clockwise.
///
/// Inputs with two or fewer points return all indices in input order.
pub fn convex_hull_indices(points: &[PlanarPoint]) -> Vec<usize> {
    if points.len() <= 2 {
        return (0..points.len()).collect();
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| lexicographic(points[a], points[b]));

    let mut lower: Vec<usize> = Vec::with_capacity(order.len());
    for &i in &order {
        while lower.len() >= 2
            && cross(
                points[lower[lower.len() - 2]],
                points[lower[lower.len() - 1]],
                points[i],
            ) <= 0.0
        {
            lower.pop();
        }
        lower.push(i);
    }

    let mut upper: Vec<usize> = Vec::with_capacity(order.len());
    for &i in order.iter().rev() {
        while upper.len() >= 2
            && cross(
                points[upper[upper.len() - 2]],
                points[upper[upper.len() - 1]],
                points[i],
            ) <= 0.0
        {
            upper.pop();
        }
        upper.push(i);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Computes the convex hull of a point set.
///
/// A result with fewer than three points means there is no valid polygon.
pub fn convex_hull(points: &[PlanarPoint]) -> Vec<PlanarPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    convex_hull_indices(points)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Signed area of a closed polygon (positive when counter-clockwise).
pub fn signed_area(polygon: &[PlanarPoint]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let twice: f32 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    twice * 0.5
}

/// Returns whether `point` lies inside or on a counter-clockwise convex polygon.
pub fn contains(polygon: &[PlanarPoint], point: PlanarPoint, tolerance: f32) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .all(|(&a, &b)| {
            let edge = b - a;
            let len = edge.length();
            len <= f32::EPSILON || cross(a, b, point) / len >= -tolerance
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square_with_interior() -> Vec<Vec2> {
        vec![
            Vec2::new(0.5, 0.5),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.2, 0.7),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_square_ccw() {
        let hull = convex_hull(&square_with_interior());
        assert_eq!(
            hull,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]
        );
        assert!((signed_area(&hull) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_boundary_points_removed() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(0.0, 1.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn test_all_collinear_degenerates() {
        let points = vec![Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        let hull = convex_hull(&points);
        assert!(hull.len() < 3);
    }

    #[test]
    fn test_degenerate_inputs_unchanged() {
        assert!(convex_hull(&[]).is_empty());
        let one = vec![Vec2::new(3.0, 4.0)];
        assert_eq!(convex_hull(&one), one);
        let two = vec![Vec2::new(3.0, 4.0), Vec2::new(-1.0, 0.0)];
        assert_eq!(convex_hull(&two), two);
        assert_eq!(convex_hull_indices(&two), vec![0, 1]);
    }

    #[test]
    fn test_duplicates() {
        let points = vec![Vec2::ZERO; 5]
            .into_iter()
            .chain([Vec2::X, Vec2::Y, Vec2::X])
            .collect::<Vec<_>>();
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 3);
        assert!(signed_area(&hull) > 0.0);
    }

    #[test]
    fn test_indices_match_points() {
        let points = square_with_interior();
        let indices = convex_hull_indices(&points);
        let hull: Vec<Vec2> = indices.iter().map(|&i| points[i]).collect();
        assert_eq!(hull, convex_hull(&points));
    }

    #[test]
    fn test_contains() {
        let hull = convex_hull(&square_with_interior());
        assert!(contains(&hull, Vec2::new(0.5, 0.5), 1e-6));
        assert!(contains(&hull, Vec2::new(1.0, 0.5), 1e-6));
        assert!(!contains(&hull, Vec2::new(1.1, 0.5), 1e-6));
    }

    fn has_collinear_triple(hull: &[Vec2]) -> bool {
        let n = hull.len();
        (0..n).any(|i| cross(hull[i], hull[(i + 1) % n], hull[(i + 2) % n]) <= 0.0)
    }

    proptest! {
        #[test]
        fn prop_hull_contains_all_points(
            coords in prop::collection::vec((-100i32..100, -100i32..100), 3..64)
        ) {
            #[allow(clippy::cast_precision_loss)]
            let points: Vec<Vec2> = coords
                .iter()
                .map(|&(x, y)| Vec2::new(x as f32, y as f32))
                .collect();
            let hull = convex_hull(&points);
            prop_assert!(hull.len() <= points.len());
            if hull.len() >= 3 {
                prop_assert!(signed_area(&hull) > 0.0);
                prop_assert!(!has_collinear_triple(&hull));
                for p in &points {
                    prop_assert!(contains(&hull, *p, 1e-3));
                }
            }
        }
    }
}
