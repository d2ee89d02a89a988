//! Bit-packed solidity bitmap
//!
//! One bit per pixel, row-major, MSB-first within a byte. A set bit is solid
//! ground; a clear bit is air. Every row carries `floor(width / 8) + 1` bytes,
//! so there is always at least one padding bit at the end of a row. Padding
//! bits are kept clear by every mutation.

use glam::IVec2;

use super::rect::Rect;
use crate::error::SimError;

/// Destructible 1-bit terrain layer (also used as a stamp/crater shape)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainBuffer {
    width: i32,
    height: i32,
    stride: usize,
    diggable: bool,
    data: Vec<u8>,
}

/// Bit for pixel column `x` inside its byte
#[inline]
fn bit_of(x: i32) -> u8 {
    0x80 >> (x & 7)
}

/// Mask of the bits in byte column `byte` whose pixels fall in `[from, to)`
#[inline]
fn span_mask(byte: i32, from: i32, to: i32) -> u8 {
    let lo = (from - byte * 8).max(0);
    let hi = (to - byte * 8).min(8);
    if hi <= lo {
        return 0;
    }
    ((0xFFu16 >> lo) & !(0xFFu16 >> hi)) as u8
}

impl TerrainBuffer {
    /// Create an all-air buffer. Fails for zero-sized dimensions.
    pub fn new(width: u32, height: u32, diggable: bool) -> Result<Self, SimError> {
        let invalid = SimError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(invalid);
        };

        let stride = (width / 8) as usize + 1;
        Ok(Self {
            width: w,
            height: h,
            stride,
            diggable,
            data: vec![0; stride * height as usize],
        })
    }

    pub fn create_empty(width: u32, height: u32, diggable: bool) -> Result<Self, SimError> {
        Self::new(width, height, diggable)
    }

    /// Filled disk of the given radius on a `2r x 2r` tile centered at `(r, r)`.
    ///
    /// A pixel is solid iff `dx² + dy² <= r²` (boundary inclusive).
    pub fn create_circle_tile(radius: u32, diggable: bool) -> Result<Self, SimError> {
        let size = radius.saturating_mul(2);
        let r = radius as i64;
        Self::from_fn(size, size, diggable, |x, y| {
            let dx = x as i64 - r;
            let dy = y as i64 - r;
            dx * dx + dy * dy <= r * r
        })
    }

    /// Fully solid rectangle
    pub fn create_rect_tile(width: u32, height: u32, diggable: bool) -> Result<Self, SimError> {
        let mut tile = Self::new(width, height, diggable)?;
        let full = (tile.width / 8) as usize;
        let rem = tile.width % 8;
        let tail = if rem == 0 { 0 } else { 0xFFu8 << (8 - rem) };
        for row in tile.data.chunks_exact_mut(tile.stride) {
            row[..full].fill(0xFF);
            row[full] = tail;
        }
        Ok(tile)
    }

    /// Build a buffer by evaluating `solid(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, diggable: bool, mut solid: F) -> Result<Self, SimError>
    where
        F: FnMut(i32, i32) -> bool,
    {
        let mut buffer = Self::new(width, height, diggable)?;
        for y in 0..buffer.height {
            for x in 0..buffer.width {
                if solid(x, y) {
                    let index = buffer.index(x, y);
                    buffer.data[index] |= bit_of(x);
                }
            }
        }
        Ok(buffer)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn is_diggable(&self) -> bool {
        self.diggable
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `{0, 0, width, height}`
    pub fn bound(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.stride + (x >> 3) as usize
    }

    /// True for air. Anything outside the buffer is air.
    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        self.data[self.index(x, y)] & bit_of(x) == 0
    }

    /// Set or clear a single pixel; out-of-range writes are ignored
    pub fn set_solid(&mut self, x: i32, y: i32, solid: bool) {
        if !self.in_bounds(x, y) {
            return;
        }
        let index = self.index(x, y);
        if solid {
            self.data[index] |= bit_of(x);
        } else {
            self.data[index] &= !bit_of(x);
        }
    }

    /// Number of solid pixels
    pub fn count_solid(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Corner-only emptiness test.
    ///
    /// Clips `rect` to the buffer and checks the four corners of the clipped
    /// rectangle. Solid pixels strictly inside the rectangle that touch no
    /// corner are not seen. Probe boxes and crater sizes are tuned around
    /// this, so it is deliberately not a full scan.
    pub fn is_rectangle_empty_quick(&self, rect: Rect) -> bool {
        let clipped = rect.intersect(&self.bound());
        if clipped.is_empty() {
            return true;
        }
        let right = clipped.right() - 1;
        let bottom = clipped.bottom() - 1;

        self.is_empty(right, bottom)
            && self.is_empty(clipped.x, bottom)
            && self.is_empty(right, clipped.y)
            && self.is_empty(clipped.x, clipped.y)
    }

    /// Clamp a vertical scan window to the buffer. Returns `(y, h)`.
    fn clamp_column(&self, y: i32, h: i32) -> (i32, i32) {
        let y = y.max(0);
        let h = if y.saturating_add(h) > self.height { self.height - y } else { h };
        (y, h)
    }

    /// True when column `x` has no solid pixel in `[y, y + h)`
    pub fn is_y_line_empty(&self, x: i32, y: i32, h: i32) -> bool {
        self.find_not_empty_point(x, y, h).is_none()
    }

    /// First solid pixel scanning down column `x` from `y` for `h` pixels
    pub fn find_not_empty_point(&self, x: i32, y: i32, h: i32) -> Option<IVec2> {
        if x < 0 || x >= self.width {
            return None;
        }
        let (y, h) = self.clamp_column(y, h);
        (y..y + h.max(0))
            .find(|&cy| !self.is_empty(x, cy))
            .map(|cy| IVec2::new(x, cy))
    }

    /// Blit `stamp` with its top-left corner at `(x, y)`.
    ///
    /// `erase == false` ORs the stamp's solid bits in; `erase == true` clears
    /// them (AND-NOT). Only the overlap of the placed stamp with this buffer
    /// is touched; an empty overlap is a no-op.
    ///
    /// Stamp pixel `s` lands on buffer pixel `s + x`, so every stamp byte
    /// column `j` starts `b_offset = x mod 8` bits into buffer byte column
    /// `floor(x / 8) + j`. Each stamp byte is therefore split in two: its
    /// leading bits shifted right by `b_offset` into that byte, and its
    /// trailing bits shifted left by `8 - b_offset` into the right
    /// neighbour. Stamp bytes are masked to the overlap columns first, which
    /// keeps edge rows from spilling into padding or across rows.
    pub fn stamp_bits(&mut self, x: i32, y: i32, stamp: &TerrainBuffer, erase: bool) {
        let overlap = stamp.bound().offset(x, y).intersect(&self.bound());
        if overlap.is_empty() {
            return;
        }

        // overlap in stamp-local columns
        let src_from = overlap.x - x;
        let src_to = overlap.right() - x;
        let first_col = src_from >> 3;
        let last_col = (src_to - 1) >> 3;

        let b_offset = x.rem_euclid(8) as u32;
        let base_col = x.div_euclid(8);

        for row in overlap.y..overlap.bottom() {
            let src_row = (row - y) as usize * stamp.stride;
            for col in first_col..=last_col {
                let src = stamp.data[src_row + col as usize] & span_mask(col, src_from, src_to);
                if src == 0 {
                    continue;
                }

                let wide = (src as u16) << (8 - b_offset);
                let dest_col = base_col + col;
                self.combine(dest_col, row, (wide >> 8) as u8, erase);
                self.combine(dest_col + 1, row, wide as u8, erase);
            }
        }
    }

    #[inline]
    fn combine(&mut self, col: i32, row: i32, bits: u8, erase: bool) {
        if bits == 0 || col < 0 || col as usize >= self.stride {
            return;
        }
        let index = row as usize * self.stride + col as usize;
        if erase {
            self.data[index] &= !bits;
        } else {
            self.data[index] |= bits;
        }
    }

    /// Stamp solid matter with the stamp's top-left at `(x, y)`
    pub fn add(&mut self, x: i32, y: i32, stamp: &TerrainBuffer) {
        self.stamp_bits(x, y, stamp, false);
    }

    /// Erase the stamp's solid pixels with its top-left at `(x, y)`
    pub fn remove(&mut self, x: i32, y: i32, stamp: &TerrainBuffer) {
        self.stamp_bits(x, y, stamp, true);
    }

    /// Erase `stamp` centered on `(cx, cy)`. No-op on non-diggable buffers.
    pub fn dig(&mut self, cx: f32, cy: f32, stamp: &TerrainBuffer) {
        if !self.diggable {
            return;
        }
        let (x, y) = centered_origin(cx, cy, stamp);
        self.remove(x, y, stamp);
    }

    /// Stamp `overlay` centered on `(cx, cy)`, e.g. a scorched rim around a
    /// fresh crater. Only meant for layers nothing collides with.
    pub fn overlay(&mut self, cx: f32, cy: f32, overlay: &TerrainBuffer) {
        if !self.diggable {
            return;
        }
        let (x, y) = centered_origin(cx, cy, overlay);
        self.add(x, y, overlay);
    }
}

/// Top-left position that centers `stamp` on `(cx, cy)`
fn centered_origin(cx: f32, cy: f32, stamp: &TerrainBuffer) -> (i32, i32) {
    (
        (cx - stamp.width as f32 / 2.0).floor() as i32,
        (cy - stamp.height as f32 / 2.0).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Per-pixel reference blit
    fn naive_stamp(target: &mut TerrainBuffer, x: i32, y: i32, stamp: &TerrainBuffer, erase: bool) {
        for sy in 0..stamp.height() {
            for sx in 0..stamp.width() {
                if !stamp.is_empty(sx, sy) {
                    target.set_solid(sx + x, sy + y, !erase);
                }
            }
        }
    }

    fn padding_is_clear(buffer: &TerrainBuffer) -> bool {
        buffer.data().chunks_exact(buffer.stride()).all(|row| {
            row.iter()
                .enumerate()
                .all(|(col, &byte)| byte & !span_mask(col as i32, 0, buffer.width()) == 0)
        })
    }

    #[test]
    fn test_stride_and_len() {
        let buffer = TerrainBuffer::create_empty(17, 5, true).unwrap();
        assert_eq!(buffer.stride(), 3);
        assert_eq!(buffer.data().len(), 15);

        let aligned = TerrainBuffer::create_empty(16, 2, true).unwrap();
        assert_eq!(aligned.stride(), 3);
    }

    #[test]
    fn test_zero_dimensions_fail() {
        assert!(matches!(
            TerrainBuffer::new(0, 10, true),
            Err(SimError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(TerrainBuffer::new(10, 0, true).is_err());
        assert!(TerrainBuffer::create_circle_tile(0, true).is_err());
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let buffer = TerrainBuffer::create_rect_tile(12, 7, true).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (12, 0), (0, 7), (i32::MIN, i32::MAX), (100, 100)] {
            assert!(buffer.is_empty(x, y), "({x}, {y}) should be air");
        }
        assert!(!buffer.is_empty(11, 6));
    }

    #[test]
    fn test_rect_tile_keeps_padding_clear() {
        let tile = TerrainBuffer::create_rect_tile(10, 3, true).unwrap();
        assert_eq!(tile.count_solid(), 30);
        assert!(padding_is_clear(&tile));
    }

    #[test]
    fn test_circle_tile_inclusive_boundary() {
        let r = 6;
        let tile = TerrainBuffer::create_circle_tile(r, true).unwrap();
        assert_eq!(tile.width(), 12);

        let r = r as i32;
        for y in 0..tile.height() {
            for x in 0..tile.width() {
                let d2 = (x - r).pow(2) + (y - r).pow(2);
                assert_eq!(!tile.is_empty(x, y), d2 <= r * r, "pixel ({x}, {y})");
            }
        }
        // exactly on the circle: (r, 0) has d² == r²
        assert!(!tile.is_empty(r, 0));
    }

    #[test]
    fn test_rect_stamp_scenario() {
        let mut buffer = TerrainBuffer::create_empty(100, 100, true).unwrap();
        let block = TerrainBuffer::create_rect_tile(10, 10, true).unwrap();

        buffer.add(45, 45, &block);
        assert!(!buffer.is_empty(50, 50));
        assert!(buffer.is_empty(0, 0));
        assert!(buffer.is_empty(44, 45));
        assert!(!buffer.is_empty(45, 45));
        assert!(!buffer.is_empty(54, 54));
        assert!(buffer.is_empty(55, 54));
        assert_eq!(buffer.count_solid(), 100);

        buffer.remove(45, 45, &block);
        assert_eq!(buffer.count_solid(), 0);
    }

    #[test]
    fn test_add_then_remove_restores_original() {
        let mut buffer = TerrainBuffer::from_fn(64, 40, true, |x, y| y > 30 || ((x + y) % 7 == 0 && x < 10))
            .unwrap();
        let original = buffer.clone();
        let stamp = TerrainBuffer::create_circle_tile(7, true).unwrap();

        buffer.add(21, 9, &stamp);
        assert_ne!(buffer, original);
        buffer.remove(21, 9, &stamp);
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_dig_is_centered() {
        let mut ground = TerrainBuffer::create_rect_tile(40, 40, true).unwrap();
        let crater = TerrainBuffer::create_circle_tile(5, true).unwrap();

        ground.dig(20.0, 20.0, &crater);
        assert!(ground.is_empty(20, 20));
        assert!(ground.is_empty(15, 20));
        assert!(ground.is_empty(20, 15));
        assert!(!ground.is_empty(14, 20));
        assert!(!ground.is_empty(20, 26));
    }

    #[test]
    fn test_overlay_is_centered() {
        let mut layer = TerrainBuffer::create_empty(40, 40, true).unwrap();
        let rim = TerrainBuffer::create_rect_tile(4, 4, true).unwrap();

        layer.overlay(20.0, 20.0, &rim);
        assert_eq!(layer.count_solid(), 16);
        assert!(!layer.is_empty(18, 18));
        assert!(!layer.is_empty(21, 21));
        assert!(layer.is_empty(22, 20));

        let mut fixed = TerrainBuffer::create_empty(40, 40, false).unwrap();
        fixed.overlay(20.0, 20.0, &rim);
        assert_eq!(fixed.count_solid(), 0);
    }

    #[test]
    fn test_dig_respects_diggable_flag() {
        let mut bedrock = TerrainBuffer::create_rect_tile(20, 20, false).unwrap();
        let crater = TerrainBuffer::create_circle_tile(4, true).unwrap();
        bedrock.dig(10.0, 10.0, &crater);
        assert_eq!(bedrock.count_solid(), 400);
    }

    #[test]
    fn test_extreme_coordinates_are_total() {
        let mut buffer = TerrainBuffer::from_fn(20, 20, true, |_, y| y >= 10).unwrap();
        let original = buffer.clone();
        let block = TerrainBuffer::create_rect_tile(10, 10, true).unwrap();

        assert_eq!(buffer.find_not_empty_point(0, 5, i32::MAX), Some(IVec2::new(0, 10)));
        assert!(!buffer.is_y_line_empty(0, 5, i32::MAX));
        assert!(buffer.is_y_line_empty(0, i32::MIN, 10));
        assert!(buffer.is_rectangle_empty_quick(Rect::new(i32::MAX - 5, 0, 10, 10)));
        assert!(buffer.is_rectangle_empty_quick(Rect::new(0, i32::MAX - 1, i32::MAX, i32::MAX)));

        buffer.add(i32::MAX - 3, 0, &block);
        buffer.add(0, i32::MAX - 3, &block);
        buffer.remove(i32::MIN, i32::MIN, &block);
        buffer.dig(f32::MAX, 15.0, &block);
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_stamp_outside_is_noop() {
        let mut buffer = TerrainBuffer::create_empty(30, 30, true).unwrap();
        let block = TerrainBuffer::create_rect_tile(5, 5, true).unwrap();
        buffer.add(30, 0, &block);
        buffer.add(-5, 10, &block);
        buffer.add(10, 200, &block);
        assert_eq!(buffer.count_solid(), 0);
    }

    #[test]
    fn test_stamp_clipped_at_edges() {
        let mut buffer = TerrainBuffer::create_empty(21, 12, true).unwrap();
        let block = TerrainBuffer::create_rect_tile(9, 9, true).unwrap();

        buffer.add(-3, -2, &block);
        buffer.add(17, 6, &block);
        assert_eq!(buffer.count_solid(), 6 * 7 + 4 * 6);
        assert!(padding_is_clear(&buffer));
        assert!(!buffer.is_empty(0, 0));
        assert!(!buffer.is_empty(20, 11));
    }

    #[test]
    fn test_every_sub_byte_alignment() {
        let stamp = TerrainBuffer::from_fn(13, 3, true, |x, y| (x * 3 + y) % 4 != 0).unwrap();
        for x in 0..16 {
            let mut fast = TerrainBuffer::create_empty(40, 5, true).unwrap();
            let mut slow = fast.clone();
            fast.add(x, 1, &stamp);
            naive_stamp(&mut slow, x, 1, &stamp, false);
            assert_eq!(fast, slow, "alignment {x}");
        }
    }

    #[test]
    fn test_quick_rect_detects_corner_contact() {
        let mut buffer = TerrainBuffer::create_empty(50, 50, true).unwrap();
        buffer.set_solid(30, 30, true);
        assert!(!buffer.is_rectangle_empty_quick(Rect::new(28, 28, 3, 3)));
        assert!(!buffer.is_rectangle_empty_quick(Rect::new(30, 30, 3, 3)));
    }

    #[test]
    fn test_quick_rect_misses_interior_solid() {
        // Known approximation: a solid blob strictly inside the rectangle
        // touching none of its corners is reported as empty.
        let mut buffer = TerrainBuffer::create_empty(50, 50, true).unwrap();
        let blob = TerrainBuffer::create_rect_tile(4, 4, true).unwrap();
        buffer.add(20, 20, &blob);

        let query = Rect::new(15, 15, 15, 15);
        assert!(buffer.is_rectangle_empty_quick(query));
        assert!(!buffer.is_empty(22, 22));
    }

    #[test]
    fn test_quick_rect_clips_to_bound() {
        let buffer = TerrainBuffer::create_rect_tile(10, 10, true).unwrap();
        assert!(!buffer.is_rectangle_empty_quick(Rect::new(-5, -5, 8, 8)));
        assert!(buffer.is_rectangle_empty_quick(Rect::new(20, 20, 5, 5)));
    }

    #[test]
    fn test_vertical_scans() {
        let mut buffer = TerrainBuffer::create_empty(10, 30, true).unwrap();
        buffer.set_solid(4, 18, true);

        assert_eq!(buffer.find_not_empty_point(4, 0, 30), Some(IVec2::new(4, 18)));
        assert_eq!(buffer.find_not_empty_point(4, -10, 100), Some(IVec2::new(4, 18)));
        assert_eq!(buffer.find_not_empty_point(4, 0, 18), None);
        assert_eq!(buffer.find_not_empty_point(-1, 0, 30), None);
        assert!(buffer.is_y_line_empty(4, 19, 50));
        assert!(!buffer.is_y_line_empty(4, 10, 9));
    }

    proptest! {
        #[test]
        fn prop_blit_matches_per_pixel(
            sw in 1u32..27,
            sh in 1u32..9,
            x in -30i32..60,
            y in -10i32..30,
            seed in any::<u32>(),
            erase in any::<bool>(),
        ) {
            let stamp = TerrainBuffer::from_fn(sw, sh, true, |px, py| {
                (seed.rotate_left((px * 5 + py * 3) as u32 % 32)) & 1 == 1
            }).unwrap();
            let start = |px: i32, py: i32| erase && (px + py) % 3 != 0;

            let mut fast = TerrainBuffer::from_fn(45, 25, true, start).unwrap();
            let mut slow = fast.clone();
            fast.stamp_bits(x, y, &stamp, erase);
            naive_stamp(&mut slow, x, y, &stamp, erase);

            prop_assert_eq!(&fast, &slow);
            prop_assert!(padding_is_clear(&fast));
        }
    }
}
