//! Rasterization: burn a shape into the canvas and the mask together.
//!
//! Each geometry is drawn exactly once, into a binary coverage raster,
//! using the `imageproc` drawing primitives. The coverage is then stamped
//! into both buffers with a [`Fill`] pair (color for the canvas, label for
//! the mask), so the two buffers cannot drift out of pixel alignment.

use image::{GrayImage, Luma};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::rect::Rect;

use crate::canvas::Canvas;
use crate::mask::Mask;
use crate::sample::Geometry;
use crate::types::Point;

/// Coverage value for pixels a shape fills.
const COVERED: Luma<u8> = Luma([255]);

/// The values written for one shape: a color into the canvas and a label
/// into the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill<'a> {
    /// Per-channel color for the canvas.
    pub color: &'a [u8],
    /// Label for the mask.
    pub label: u8,
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn to_point(p: Point) -> imageproc::point::Point<i32> {
    imageproc::point::Point::new(to_i32(p.x), to_i32(p.y))
}

#[allow(clippy::cast_precision_loss)]
fn to_f32(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

/// Draw the filled geometry into a `width x height` binary raster.
///
/// Covered pixels are 255, everything else 0. Pixels outside the raster
/// are clipped.
#[must_use = "returns the coverage raster"]
pub fn coverage(geometry: &Geometry, width: u32, height: u32) -> GrayImage {
    let mut raster = GrayImage::new(width, height);
    match *geometry {
        Geometry::Rectangle { .. } | Geometry::Square { .. } => {
            let bbox = geometry.bounding_box();
            let rect = Rect::at(to_i32(bbox.min_x), to_i32(bbox.min_y))
                .of_size(bbox.max_x - bbox.min_x + 1, bbox.max_y - bbox.min_y + 1);
            draw_filled_rect_mut(&mut raster, rect, COVERED);
        }
        Geometry::Triangle { vertices } => draw_triangle(&mut raster, vertices),
        Geometry::Circle { center, radius } => {
            draw_filled_circle_mut(
                &mut raster,
                (to_i32(center.x), to_i32(center.y)),
                to_i32(radius),
                COVERED,
            );
        }
    }
    raster
}

/// Twice the signed area of the triangle `abc`.
fn doubled_area(a: Point, b: Point, c: Point) -> i64 {
    let (ax, ay) = (i64::from(a.x), i64::from(a.y));
    let (bx, by) = (i64::from(b.x), i64::from(b.y));
    let (cx, cy) = (i64::from(c.x), i64::from(c.y));
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// Fill a triangle, degrading to line segments or a single pixel when
/// the vertices are collinear or coincide.
///
/// `draw_polygon_mut` only receives triangles with non-zero area; it
/// panics when the first and last points are equal.
fn draw_triangle(raster: &mut GrayImage, vertices: [Point; 3]) {
    let mut distinct: Vec<Point> = Vec::with_capacity(3);
    for v in vertices {
        if !distinct.contains(&v) {
            distinct.push(v);
        }
    }
    match distinct.as_slice() {
        [a, b, c] if doubled_area(*a, *b, *c) != 0 => {
            draw_polygon_mut(raster, &[to_point(*a), to_point(*b), to_point(*c)], COVERED);
        }
        [a, b, c] => {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                draw_line_segment_mut(raster, to_f32(*p), to_f32(*q), COVERED);
            }
        }
        [a, b] => draw_line_segment_mut(raster, to_f32(*a), to_f32(*b), COVERED),
        [a] => {
            if let Some(pixel) = raster.get_pixel_mut_checked(a.x, a.y) {
                *pixel = COVERED;
            }
        }
        _ => {}
    }
}

/// Rasterize `geometry` into both buffers: `fill.color` into the canvas
/// and `fill.label` into the mask, over exactly the same pixels.
///
/// Later calls overwrite earlier ones where shapes overlap. Returns the
/// number of pixels covered.
pub fn rasterize(canvas: &mut Canvas, mask: &mut Mask, geometry: &Geometry, fill: Fill<'_>) -> u64 {
    debug_assert_eq!(
        (canvas.width(), canvas.height()),
        (mask.width(), mask.height()),
        "canvas and mask must share dimensions",
    );
    let raster = coverage(geometry, canvas.width(), canvas.height());
    let mut covered = 0;
    for (x, y, pixel) in raster.enumerate_pixels() {
        if pixel.0[0] != 0 {
            canvas.put_pixel(x, y, fill.color);
            mask.set_label(x, y, fill.label);
            covered += 1;
        }
    }
    log::trace!("rasterized {geometry:?} over {covered} pixels");
    covered
}
