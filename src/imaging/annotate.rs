use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde::Serialize;

use super::Bitmap;

/// Outline colour for detected faces.
pub const FACE_BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outline width in pixels for detected faces.
pub const FACE_BOX_STROKE: u32 = 4;

/// Axis-aligned rectangle in pixel coordinates, both corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    /// Build a box from two opposite corners, in either order.
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left) + 1
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top) + 1
    }

    /// The rectangle `inset` pixels inside this one, if any area remains.
    fn inset(&self, inset: i32) -> Option<Rect> {
        let shrink = 2 * i64::from(inset);
        let width = self.width() - shrink;
        let height = self.height() - shrink;
        if width <= 0 || height <= 0 {
            return None;
        }
        let width = u32::try_from(width).ok()?;
        let height = u32::try_from(height).ok()?;
        Some(Rect::at(self.left + inset, self.top + inset).of_size(width, height))
    }

    /// Shrink the box to the bitmap grown by `margin` on every side.
    ///
    /// Edges further out than `margin` can't put stroke pixels on the
    /// bitmap, so moving them to the margin leaves the visible outline
    /// unchanged. `None` when the box misses the bitmap entirely.
    fn clamp_to(&self, width: u32, height: u32, margin: i32) -> Option<Self> {
        let (right_limit, bottom_limit) = (i64::from(width) - 1, i64::from(height) - 1);
        let (left, top) = (i64::from(self.left), i64::from(self.top));
        let (right, bottom) = (i64::from(self.right), i64::from(self.bottom));
        if right < 0 || bottom < 0 || left > right_limit || top > bottom_limit {
            return None;
        }
        let margin = i64::from(margin);
        let clamp = |v: i64, limit: i64| i32::try_from(v.clamp(-margin, limit + margin)).ok();
        Some(Self {
            left: clamp(left, right_limit)?,
            top: clamp(top, bottom_limit)?,
            right: clamp(right, right_limit)?,
            bottom: clamp(bottom, bottom_limit)?,
        })
    }
}

/// Draw an outline for every box onto `bitmap`, in place.
///
/// The stroke grows inward from the box edge. Parts outside the bitmap are
/// clipped, so drawing cost follows the bitmap size rather than the box size.
pub fn draw_bounding_boxes(
    bitmap: &mut Bitmap,
    boxes: &[BoundingBox],
    color: Rgb<u8>,
    stroke: u32,
) {
    let stroke = i32::try_from(stroke).unwrap_or(i32::MAX);
    let (width, height) = bitmap.dimensions();
    for bbox in boxes {
        let Some(visible) = bbox.clamp_to(width, height, stroke) else {
            log::debug!("Box {bbox:?} lies outside the {width}x{height} bitmap");
            continue;
        };
        for inset in 0..stroke {
            match visible.inset(inset) {
                Some(rect) => draw_hollow_rect_mut(bitmap, rect, color),
                None => break,
            }
        }
    }
}
