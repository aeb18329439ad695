//! Small geometric helpers on top of `geo` types.

use geo::{Coord, Rect};

/// Axis-aligned rectangle of size `dimensions` centred on `center`.
pub fn rect_around(center: Coord<f32>, dimensions: Coord<f32>) -> Rect<f32> {
    let half = dimensions / 2.0;
    Rect::new(center - half, center + half)
}

/// Whether `point` lies inside `rect`, edges included.
pub fn rect_contains(rect: &Rect<f32>, point: Coord<f32>) -> bool {
    let (min, max) = (rect.min(), rect.max());
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Radius of the smallest circle around the rectangle's centre that covers
/// the whole rectangle.
pub fn covering_radius(rect: &Rect<f32>) -> f32 {
    rect.width().hypot(rect.height()) / 2.0
}

/// Whether `point` lies in the half-open box `[min, max)` on both axes.
pub fn half_open_contains(rect: &Rect<f32>, point: Coord<f32>) -> bool {
    let (min, max) = (rect.min(), rect.max());
    point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
}
