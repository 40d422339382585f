//! SCREEN 2 / SCREEN 4 pixel plane.
//!
//! The name table is laid out sequentially, so every 8×8 cell owns one
//! pattern. The screen is split into three 64-line banks of 256 patterns:
//!
//! ```text
//! pattern = ((y / 8) % 8) * 32 + x / 8
//! offset  = (y / 64) * 0x800 + pattern * 8 + y % 8
//! ```
//!
//! The same offset addresses the pattern byte (one bit per pixel, bit 7 on
//! the left) and the color byte (foreground high nibble, background low).
//! Setting a pixel recolors the whole 8-pixel row of its cell.

use bit_field::BitField;

use crate::backend::PixelBackend;
use crate::mode::ScreenMode;
use crate::vdp::Vdp;

pub const PATTERN_GENERATOR: u32 = 0x0000;
pub const COLOR_TABLE: u32 = 0x2000;
/// Bytes per table: three banks of 256 patterns × 8 lines.
pub const TABLE_SIZE: u32 = 0x1800;

/// Table offset of the row holding pixel (`x`, `y`) and the pixel's bit.
#[inline(always)]
pub fn cell(x: u16, y: u16) -> (u32, usize) {
    let bank = ((y >> 6) as u32) << 11;
    let pattern = (((y >> 3) & 7) as u32) << 5 | (x >> 3) as u32;
    (bank + (pattern << 3) + (y & 7) as u32, 7 - (x & 7) as usize)
}

#[derive(Copy, Clone, Debug)]
pub struct PlanarBackend {
    mode: ScreenMode,
}

impl PlanarBackend {
    pub fn new(mode: ScreenMode) -> Self {
        Self { mode }
    }

    /// Blank every pattern and reset every color row to `fg`/`bg`.
    pub fn clear<V: Vdp>(&self, vdp: &mut V, fg: u8, bg: u8) {
        let color = (fg & 0x0F) << 4 | (bg & 0x0F);
        for offset in 0..TABLE_SIZE {
            vdp.write_vram(PATTERN_GENERATOR + offset, 0);
            vdp.write_vram(COLOR_TABLE + offset, color);
        }
    }
}

impl PixelBackend for PlanarBackend {
    fn mode(&self) -> ScreenMode {
        self.mode
    }

    fn get_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16) -> u8 {
        if !self.mode.in_bounds(x, y) {
            return 0;
        }
        let (offset, bit) = cell(x as u16, y as u16);
        let pattern = vdp.read_vram(PATTERN_GENERATOR + offset);
        let color = vdp.read_vram(COLOR_TABLE + offset);
        if pattern.get_bit(bit) {
            color >> 4
        } else {
            color & 0x0F
        }
    }

    fn set_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16, color: u8, background: u8) -> bool {
        if !self.mode.in_bounds(x, y) {
            return false;
        }
        let (offset, bit) = cell(x as u16, y as u16);
        let mut pattern = vdp.read_vram(PATTERN_GENERATOR + offset);
        pattern.set_bit(bit, true);
        vdp.write_vram(PATTERN_GENERATOR + offset, pattern);
        vdp.write_vram(COLOR_TABLE + offset, (color & 0x0F) << 4 | (background & 0x0F));
        true
    }
}
