//! Hardware sprites: size, patterns, placement and the collision flag.
//!
//! Each of the 32 sprites has a 4-byte attribute entry (Y, X, pattern,
//! color). The tables sit where the BIOS puts them for the mode, see
//! [`ScreenMode::sprite_tables`](crate::mode::ScreenMode::sprite_tables).
//! Sprite mode 2 ignores the color byte of the entry and reads 16 per-line
//! colors from the color table instead.

use bitflags::bitflags;

use crate::graphics::{Graphics, R1_SPRITE_MASK};
use crate::vdp::{Status0, Vdp};

pub const SPRITE_COUNT: u8 = 32;

/// Y coordinate that hides a sprite (and every sprite after it).
const HIDE_Y_MODE1: u8 = 208;
const HIDE_Y_MODE2: u8 = 216;

bitflags! {
    /// Sprite bits of R#1.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SpriteSize: u8 {
        const MAGNIFIED = 0b0000_0001;
        const LARGE     = 0b0000_0010;
    }
}

impl SpriteSize {
    /// `SCREEN ,n` size code: bit 0 selects 16×16, bit 1 doubles the size.
    pub fn from_code(code: u8) -> Self {
        let mut size = SpriteSize::empty();
        size.set(SpriteSize::LARGE, code & 1 != 0);
        size.set(SpriteSize::MAGNIFIED, code & 2 != 0);
        size
    }

    /// Pattern bytes per sprite.
    pub fn pattern_len(self) -> usize {
        if self.contains(SpriteSize::LARGE) {
            32
        } else {
            8
        }
    }
}

/// Early clock: shifts the sprite 32 pixels left.
const EARLY_CLOCK: u8 = 0x80;

const COLOR_TABLE_OFFSET: u32 = 0x200;
const COLOR_LINES: u32 = 16;

impl<V: Vdp> Graphics<V> {
    pub fn sprite_size(&self) -> SpriteSize {
        SpriteSize::from_bits_truncate(self.r1 & R1_SPRITE_MASK)
    }

    pub fn set_sprite_size(&mut self, size: SpriteSize) {
        self.r1 = (self.r1 & !R1_SPRITE_MASK) | size.bits();
        let r1 = self.r1;
        self.vdp.without_interrupts(|vdp| vdp.write_register(1, r1));
    }

    /// Define pattern `number`. Short slices fill the start of the pattern.
    pub fn sprite_pattern(&mut self, number: u8, pattern: &[u8]) {
        let len = self.sprite_size().pattern_len();
        let (_, generator) = self.mode().sprite_tables();
        let base = generator + number as u32 * len as u32;
        for (i, byte) in pattern.iter().take(len).enumerate() {
            self.vdp.write_vram(base + i as u32, *byte);
        }
    }

    /// `PUT SPRITE`. Sprites past the 32nd are ignored; x may go down to -32.
    pub fn put_sprite(&mut self, sprite: u8, x: i16, y: i16, color: u8, pattern: u8) {
        if sprite >= SPRITE_COUNT {
            return;
        }
        let (mut x, mut early) = (x, 0);
        if x < 0 {
            early = EARLY_CLOCK;
            x += 32;
        }
        let entry = self.attribute_entry(sprite);
        // the VDP draws a sprite one line below its Y
        self.vdp.write_vram(entry, y.wrapping_sub(1) as u8);
        self.vdp.write_vram(entry + 1, x as u8);
        self.vdp.write_vram(entry + 2, pattern);
        self.vdp.write_vram(entry + 3, (color & 0x0F) | early);

        if self.mode().sprite_mode2() {
            let (attributes, _) = self.mode().sprite_tables();
            let lines = attributes - COLOR_TABLE_OFFSET + sprite as u32 * COLOR_LINES;
            for line in 0..COLOR_LINES {
                self.vdp.write_vram(lines + line, (color & 0x0F) | early);
            }
        }
    }

    pub fn sprite_off(&mut self, sprite: u8) {
        if sprite >= SPRITE_COUNT {
            return;
        }
        let hide = if self.mode().sprite_mode2() { HIDE_Y_MODE2 } else { HIDE_Y_MODE1 };
        let entry = self.attribute_entry(sprite);
        self.vdp.write_vram(entry, hide);
    }

    pub fn sprites_off(&mut self) {
        for sprite in 0..SPRITE_COUNT {
            self.sprite_off(sprite);
        }
    }

    /// Whether two sprites overlapped since the flag was last read.
    pub fn sprite_collision(&mut self) -> bool {
        let status = self.vdp.without_interrupts(|vdp| Status0::from_bits_truncate(vdp.read_status(0)));
        status.contains(Status0::COLLISION)
    }

    fn attribute_entry(&self, sprite: u8) -> u32 {
        let (attributes, _) = self.mode().sprite_tables();
        attributes + sprite as u32 * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdp::sim::SimVdp;

    #[test]
    fn size_bits_follow_register_layout() {
        let mut gfx = Graphics::new(SimVdp::new(), 2).unwrap();
        gfx.set_sprite_size(SpriteSize::from_code(3));
        assert_eq!(gfx.vdp().register(1) & 0x03, 0x03);
        assert_eq!(gfx.sprite_size().pattern_len(), 32);
        gfx.set_sprite_size(SpriteSize::from_code(2));
        assert_eq!(gfx.vdp().register(1) & 0x43, 0x41);

        // size survives a mode change
        gfx.set_mode(5).unwrap();
        assert_eq!(gfx.sprite_size(), SpriteSize::MAGNIFIED);
    }

    #[test]
    fn attributes_in_screen2_table() {
        let mut gfx = Graphics::new(SimVdp::new(), 2).unwrap();
        gfx.put_sprite(1, -5, 100, 0x1A, 7);
        let vram = gfx.vdp().vram();
        assert_eq!(&vram[0x1B04..0x1B08], &[99, 27, 7, 0x8A]);
    }

    #[test]
    fn patterns_and_hiding_in_screen5() {
        let mut gfx = Graphics::new(SimVdp::new(), 5).unwrap();
        gfx.sprite_pattern(2, &[0xFF; 40]);
        let vram = gfx.vdp().vram();
        assert_eq!(vram[0x7800 + 16], 0xFF);
        assert_eq!(vram[0x7800 + 24], 0);

        gfx.sprites_off();
        assert_eq!(gfx.vdp().vram()[0x7600 + 31 * 4], 216);
        gfx.put_sprite(40, 0, 0, 1, 1);
        assert_eq!(gfx.vdp().vram()[0x7600 + 32 * 4], 0);
    }

    #[test]
    fn sprite_mode2_fills_the_color_table() {
        let mut gfx = Graphics::new(SimVdp::new(), 4).unwrap();
        gfx.put_sprite(2, -1, 10, 9, 0);
        let vram = gfx.vdp().vram();
        assert_eq!(&vram[0x1E08..0x1E0C], &[9, 31, 0, 0x89]);
        assert!(vram[0x1C20..0x1C30].iter().all(|&c| c == 0x89));
        assert_eq!(vram[0x1C30], 0);

        // sprite mode 1 leaves the name table under its attributes alone
        gfx.set_mode(2).unwrap();
        gfx.put_sprite(2, 0, 10, 9, 0);
        assert_eq!(gfx.vdp().vram()[0x1920], 0x20);
        assert_eq!(gfx.vdp().vram()[0x1B0B], 9);
    }

    #[test]
    fn collision_flag_clears_on_read() {
        let mut gfx = Graphics::new(SimVdp::new(), 8).unwrap();
        assert!(!gfx.sprite_collision());
        gfx.vdp_mut().raise_status0(Status0::COLLISION);
        assert!(gfx.sprite_collision());
        assert!(!gfx.sprite_collision());
    }
}
