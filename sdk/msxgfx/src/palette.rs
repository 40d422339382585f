//! Color conversion for the 16-entry palette and the direct-color modes.

/// MSX2 power-on palette, 3 bits per channel as (R, G, B).
pub const DEFAULT_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (0, 0, 0),
    (1, 6, 1),
    (3, 7, 3),
    (1, 1, 7),
    (2, 3, 7),
    (5, 1, 1),
    (2, 6, 7),
    (7, 1, 1),
    (7, 3, 3),
    (6, 6, 1),
    (6, 6, 4),
    (1, 4, 1),
    (6, 2, 5),
    (5, 5, 5),
    (7, 7, 7),
];

#[inline(always)]
fn scale(value: u8, max: u8) -> u8 {
    (value.min(max) as u16 * 255 / max as u16) as u8
}

/// Palette entry to 8-bit RGB.
pub fn rgb333_to_rgb888((r, g, b): (u8, u8, u8)) -> [u8; 3] {
    [scale(r, 7), scale(g, 7), scale(b, 7)]
}

/// SCREEN 8 pixel byte (`GGGRRRBB`) to 8-bit RGB.
pub fn grb332_to_rgb888(pixel: u8) -> [u8; 3] {
    let g = pixel >> 5;
    let r = (pixel >> 2) & 0x07;
    let b = pixel & 0x03;
    [scale(r, 7), scale(g, 7), scale(b, 3)]
}

/// One 5-bit luminance sample plus the chroma shared by its group of four.
pub fn yjk_to_rgb888(y: u8, j: i8, k: i8) -> [u8; 3] {
    let y = y as i16;
    let (j, k) = (j as i16, k as i16);
    let r = (y + j).clamp(0, 31) as u8;
    let g = (y + k).clamp(0, 31) as u8;
    let b = ((5 * y - 2 * j - k) / 4).clamp(0, 31) as u8;
    [scale(r, 31), scale(g, 31), scale(b, 31)]
}

/// Bytes written to the palette port for one entry: `0RRR0BBB`, `00000GGG`.
pub fn palette_port_bytes(r: u8, g: u8, b: u8) -> [u8; 2] {
    [(r & 0x07) << 4 | (b & 0x07), g & 0x07]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_full_range() {
        assert_eq!(rgb333_to_rgb888((7, 0, 7)), [255, 0, 255]);
        assert_eq!(grb332_to_rgb888(0xFF), [255, 255, 255]);
        assert_eq!(grb332_to_rgb888(0b000_111_00), [255, 0, 0]);
        assert_eq!(yjk_to_rgb888(31, 0, 0), [255, 255, 255]);
    }

    #[test]
    fn palette_port_layout() {
        assert_eq!(palette_port_bytes(7, 5, 3), [0x73, 0x05]);
    }
}
