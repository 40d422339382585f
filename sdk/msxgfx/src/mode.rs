//! # Screen Modes
//!
//! Only the graphics modes get a backend. Text modes (0, 1) and multicolor
//! mode 3 are rejected with [`GfxError::UnsupportedMode`].
//!
//! | Mode  | VDP mode   | Size    | Pixel format              | Backend  |
//! |-------|------------|---------|---------------------------|----------|
//! | 2     | GRAPHIC2   | 256×192 | pattern bit + fg/bg byte  | software |
//! | 4     | GRAPHIC3   | 256×192 | pattern bit + fg/bg byte  | software |
//! | 5     | GRAPHIC4   | 256×212 | 4 bpp, 128 bytes/line     | hardware |
//! | 6     | GRAPHIC5   | 512×212 | 2 bpp, 128 bytes/line     | hardware |
//! | 7     | GRAPHIC6   | 512×212 | 4 bpp, 256 bytes/line     | hardware |
//! | 8     | GRAPHIC7   | 256×212 | 8 bpp, 256 bytes/line     | hardware |
//! | 10–12 | GRAPHIC7+YJK | 256×212 | 8 bpp (YJK encoded)     | hardware |
//!
//! Bitmap VRAM is addressed linearly: line `y` of the 1024 (or 512) line
//! address space starts at `y * bytes_per_line`, and each page is 256 lines.

use core::ops::Range;

use crate::error::GfxError;
use crate::vdp::VRAM_SIZE;

/// Lines per display page in the bitmap modes.
pub const PAGE_LINES: u16 = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Pattern generator + color table, edited byte by byte from the CPU.
    Software,
    /// Bitmap modes driven through the VDP command engine.
    Hardware,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenMode {
    number: u8,
    width: u16,
    height: u16,
    bits_per_pixel: u8,
    kind: BackendKind,
}

const fn software(number: u8) -> ScreenMode {
    ScreenMode { number, width: 256, height: 192, bits_per_pixel: 1, kind: BackendKind::Software }
}

const fn bitmap(number: u8, width: u16, bits_per_pixel: u8) -> ScreenMode {
    ScreenMode { number, width, height: 212, bits_per_pixel, kind: BackendKind::Hardware }
}

const MODES: [ScreenMode; 9] = [
    software(2),
    software(4),
    bitmap(5, 256, 4),
    bitmap(6, 512, 2),
    bitmap(7, 512, 4),
    bitmap(8, 256, 8),
    bitmap(10, 256, 8),
    bitmap(11, 256, 8),
    bitmap(12, 256, 8),
];

// R#0 mode bits M3..M5, R#1 mode bits M1/M2, R#25 YJK/YAE
const R0_M3: u8 = 0b0000_0010;
const R0_M4: u8 = 0b0000_0100;
const R0_M5: u8 = 0b0000_1000;
const R0_MODE_MASK: u8 = R0_M3 | R0_M4 | R0_M5;
const R1_MODE_MASK: u8 = 0b0001_1000;
const R25_YJK: u8 = 0b0000_1000;
const R25_YAE: u8 = 0b0001_0000;

impl ScreenMode {
    pub fn from_number(number: u8) -> Result<Self, GfxError> {
        MODES
            .iter()
            .copied()
            .find(|mode| mode.number == number)
            .ok_or(GfxError::UnsupportedMode(number))
    }

    /// Decode the mode the VDP is in from its mode registers.
    ///
    /// SCREEN 10 and 11 share a hardware mode; both decode as 10.
    pub fn from_registers(r0: u8, r1: u8, r25: u8) -> Option<Self> {
        if r1 & R1_MODE_MASK != 0 {
            return None;
        }
        let number = match r0 & R0_MODE_MASK {
            R0_M3 => 2,
            R0_M4 => 4,
            m if m == R0_M3 | R0_M4 => 5,
            R0_M5 => 6,
            m if m == R0_M5 | R0_M3 => 7,
            m if m == R0_M5 | R0_M4 | R0_M3 => match r25 & (R25_YJK | R25_YAE) {
                0 => 8,
                R25_YJK => 12,
                _ => 10,
            },
            _ => return None,
        };
        Self::from_number(number).ok()
    }

    /// Values for the mode bits of R#0, R#1 and R#25.
    pub fn mode_registers(&self) -> (u8, u8, u8) {
        let r0 = match self.number {
            2 => R0_M3,
            4 => R0_M4,
            5 => R0_M3 | R0_M4,
            6 => R0_M5,
            7 => R0_M5 | R0_M3,
            _ => R0_M5 | R0_M4 | R0_M3,
        };
        let r25 = match self.number {
            10 | 11 => R25_YJK | R25_YAE,
            12 => R25_YJK,
            _ => 0,
        };
        (r0, 0, r25)
    }

    #[inline(always)]
    pub const fn number(&self) -> u8 {
        self.number
    }

    #[inline(always)]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline(always)]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline(always)]
    pub const fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    #[inline(always)]
    pub const fn kind(&self) -> BackendKind {
        self.kind
    }

    #[inline(always)]
    pub const fn is_bitmap(&self) -> bool {
        matches!(self.kind, BackendKind::Hardware)
    }

    /// Mask applied to every color written in this mode.
    pub const fn color_mask(&self) -> u8 {
        match self.bits_per_pixel {
            2 => 0x03,
            8 => 0xFF,
            _ => 0x0F,
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: i16, y: i16) -> bool {
        x >= 0 && y >= 0 && (x as u16) < self.width && (y as u16) < self.height
    }

    /// Same test on widened coordinates, for rasterizers working in `i32`.
    #[inline(always)]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Replicate `color` across a whole VRAM byte, as byte-wide commands expect.
    pub fn pack_color(&self, color: u8) -> u8 {
        let color = color & self.color_mask();
        match self.bits_per_pixel {
            2 => color << 6 | color << 4 | color << 2 | color,
            4 => color << 4 | color,
            8 => color,
            _ => color,
        }
    }

    /// Bytes one row of `width` pixels occupies in this mode's native packing.
    pub fn packed_row_bytes(&self, width: u16) -> usize {
        let width = width as usize;
        match self.bits_per_pixel {
            2 => (width + 3) / 4,
            4 => (width + 1) / 2,
            8 => width,
            _ => (width + 7) / 8,
        }
    }

    /// Bytes per VRAM line in the bitmap modes.
    pub const fn bytes_per_line(&self) -> u32 {
        self.width as u32 * self.bits_per_pixel as u32 / 8
    }

    /// Lines addressable by the command engine across all pages.
    pub const fn vram_lines(&self) -> u32 {
        VRAM_SIZE as u32 / self.bytes_per_line()
    }

    pub const fn page_count(&self) -> u8 {
        match self.kind {
            BackendKind::Software => 1,
            BackendKind::Hardware => (self.vram_lines() / PAGE_LINES as u32) as u8,
        }
    }

    /// VRAM address of the byte holding bitmap pixel (`x`, `y`), `y` counted
    /// across pages.
    #[inline(always)]
    pub fn pixel_address(&self, x: u16, y: u16) -> u32 {
        y as u32 * self.bytes_per_line() + x as u32 * self.bits_per_pixel as u32 / 8
    }

    /// Bits of the VRAM byte that hold pixel column `x`; leftmost pixel sits
    /// in the high bits.
    #[inline(always)]
    pub fn pixel_bits(&self, x: u16) -> Range<usize> {
        match self.bits_per_pixel {
            2 => {
                let lo = 6 - 2 * (x as usize & 3);
                lo..lo + 2
            }
            4 => {
                if x & 1 == 0 {
                    4..8
                } else {
                    0..4
                }
            }
            _ => 0..8,
        }
    }

    /// Sprite attribute table and sprite pattern generator base addresses.
    ///
    /// In sprite mode 2 the sprite color table sits 0x200 below the
    /// attribute table.
    pub const fn sprite_tables(&self) -> (u32, u32) {
        match self.number {
            2 => (0x1B00, 0x3800),
            4 => (0x1E00, 0x3800),
            5 | 6 => (0x7600, 0x7800),
            _ => (0xFA00, 0xF000),
        }
    }

    /// Sprite mode 2 (per-line colors, 8 sprites per line) is used from
    /// SCREEN 4 up.
    pub const fn sprite_mode2(&self) -> bool {
        self.number >= 4
    }

    /// Value written to R#2 to show `page`.
    pub fn display_page_register(&self, page: u8) -> u8 {
        match self.number {
            5 | 6 => 0x1F | (page & 3) << 5,
            7..=12 => 0x1F | (page & 1) << 5,
            _ => 0x06,
        }
    }

    /// Page shown by a given R#2 value; inverse of [`display_page_register`].
    ///
    /// [`display_page_register`]: ScreenMode::display_page_register
    pub fn display_page_from_register(&self, r2: u8) -> u8 {
        match self.number {
            5 | 6 => (r2 >> 5) & 3,
            7..=12 => (r2 >> 5) & 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_modes_have_no_backend() {
        assert_eq!(ScreenMode::from_number(0), Err(GfxError::UnsupportedMode(0)));
        assert_eq!(ScreenMode::from_number(3), Err(GfxError::UnsupportedMode(3)));
        assert_eq!(ScreenMode::from_number(9), Err(GfxError::UnsupportedMode(9)));
    }

    #[test]
    fn mode_registers_decode_back() {
        for number in [2, 4, 5, 6, 7, 8, 12] {
            let mode = ScreenMode::from_number(number).unwrap();
            let (r0, r1, r25) = mode.mode_registers();
            assert_eq!(ScreenMode::from_registers(r0, r1, r25), Some(mode));
        }
        let eleven = ScreenMode::from_number(11).unwrap();
        let (r0, r1, r25) = eleven.mode_registers();
        assert_eq!(ScreenMode::from_registers(r0, r1, r25).map(|m| m.number()), Some(10));
    }

    #[test]
    fn geometry_matches_vram() {
        let s5 = ScreenMode::from_number(5).unwrap();
        let s7 = ScreenMode::from_number(7).unwrap();
        assert_eq!(s5.bytes_per_line(), 128);
        assert_eq!(s5.page_count(), 4);
        assert_eq!(s7.bytes_per_line(), 256);
        assert_eq!(s7.page_count(), 2);
        assert_eq!(s5.pixel_address(3, 2), 2 * 128 + 1);
        assert_eq!(s5.pixel_bits(3), 0..4);
        assert_eq!(s5.pixel_bits(2), 4..8);
    }

    #[test]
    fn screen6_packs_four_pixels() {
        let s6 = ScreenMode::from_number(6).unwrap();
        assert_eq!(s6.pack_color(0b10), 0b1010_1010);
        assert_eq!(s6.pack_color(0xFF), 0xFF);
        assert_eq!(s6.pixel_bits(0), 6..8);
        assert_eq!(s6.pixel_bits(3), 0..2);
        assert_eq!(s6.packed_row_bytes(5), 2);
    }
}
