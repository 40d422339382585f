//! # Block Transfer
//!
//! `GET`/`PUT` style capture and paste. A block buffer is:
//!
//! | Offset | Size      | Content                                   |
//! |--------|-----------|-------------------------------------------|
//! | 0      | 2         | width, little endian                      |
//! | 2      | 2         | height, little endian                     |
//! | 4      | w × h     | one color byte per pixel, row-major       |
//!
//! Pixels are stored unpacked whatever the mode. [`Graphics::size_for`]
//! instead reports the mode's packed size, which is smaller than
//! [`capture_len`] in every mode below 8 bpp; size capture buffers with
//! [`capture_len`]. Width and height saturate at 65535, so a block spanning
//! the whole `i16` range loses its last column or row.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::GfxError;
use crate::graphics::Graphics;
use crate::vdp::Vdp;

pub const BLOCK_HEADER_LEN: usize = 4;

/// How a pasted pixel combines with what is already on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RasterOp {
    #[default]
    Pset,
    And,
    Or,
    Xor,
    /// Complement of the source, masked to the mode's color width.
    Preset,
}

impl RasterOp {
    /// Decode the `PUT` operation code (0 = PSET … 4 = PRESET).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RasterOp::Pset),
            1 => Some(RasterOp::And),
            2 => Some(RasterOp::Or),
            3 => Some(RasterOp::Xor),
            4 => Some(RasterOp::Preset),
            _ => None,
        }
    }

    #[inline(always)]
    fn reads_destination(self) -> bool {
        matches!(self, RasterOp::And | RasterOp::Or | RasterOp::Xor)
    }

    fn combine(self, src: u8, dst: u8, mask: u8) -> u8 {
        match self {
            RasterOp::Pset => src,
            RasterOp::And => src & dst,
            RasterOp::Or => src | dst,
            RasterOp::Xor => src ^ dst,
            RasterOp::Preset => !src & mask,
        }
    }
}

/// Bytes [`Graphics::capture`] produces for a `width`×`height` block.
pub const fn capture_len(width: u16, height: u16) -> usize {
    BLOCK_HEADER_LEN + width as usize * height as usize
}

/// A borrowed, validated block buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageBlock<'a> {
    width: u16,
    height: u16,
    pixels: &'a [u8],
}

impl<'a> ImageBlock<'a> {
    pub fn parse(buffer: &'a [u8]) -> Result<Self, GfxError> {
        let Some(header) = buffer.get(..BLOCK_HEADER_LEN) else {
            return Err(GfxError::TruncatedBlock { needed: BLOCK_HEADER_LEN, actual: buffer.len() });
        };
        let width = u16::from_le_bytes([header[0], header[1]]);
        let height = u16::from_le_bytes([header[2], header[3]]);
        let needed = capture_len(width, height);
        if buffer.len() < needed {
            return Err(GfxError::TruncatedBlock { needed, actual: buffer.len() });
        }
        Ok(Self { width, height, pixels: &buffer[BLOCK_HEADER_LEN..needed] })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> {
        let rows = if self.width == 0 { 0 } else { self.height as usize };
        self.pixels.chunks(self.width.max(1) as usize).take(rows)
    }
}

impl<V: Vdp> Graphics<V> {
    /// Packed size of a `width`×`height` block in the current mode's native
    /// bit depth, header included.
    pub fn size_for(&self, width: u16, height: u16) -> usize {
        BLOCK_HEADER_LEN + self.mode().packed_row_bytes(width) * height as usize
    }

    /// `GET (x1,y1)-(x2,y2)` into a new buffer. Off-screen pixels read as 0.
    pub fn capture(&mut self, x1: i16, y1: i16, x2: i16, y2: i16) -> Vec<u8> {
        let (width, height) = block_extent(x1, y1, x2, y2);
        let mut buffer = vec![0u8; capture_len(width, height)];
        self.fill_block(x1, y1, x2, y2, &mut buffer);
        buffer
    }

    /// `GET` into a caller buffer; returns the number of bytes written.
    pub fn capture_into(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, buffer: &mut [u8]) -> Result<usize, GfxError> {
        let (width, height) = block_extent(x1, y1, x2, y2);
        let needed = capture_len(width, height);
        let Some(target) = buffer.get_mut(..needed) else {
            return Err(GfxError::BufferTooSmall { needed, actual: buffer.len() });
        };
        self.fill_block(x1, y1, x2, y2, target);
        Ok(needed)
    }

    fn fill_block(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, buffer: &mut [u8]) {
        let (width, height) = block_extent(x1, y1, x2, y2);
        buffer[..2].copy_from_slice(&width.to_le_bytes());
        buffer[2..4].copy_from_slice(&height.to_le_bytes());

        let (left, top) = (x1.min(x2) as i32, y1.min(y2) as i32);
        let rows = buffer[BLOCK_HEADER_LEN..].chunks_mut(width.max(1) as usize);
        for (dy, row) in rows.take(height as usize).enumerate() {
            for (dx, pixel) in row.iter_mut().enumerate() {
                *pixel = self.read(left + dx as i32, top + dy as i32);
            }
        }
    }

    /// `PUT (x,y),buffer,op`. Pixels landing off screen are skipped.
    pub fn paste(&mut self, x: i16, y: i16, buffer: &[u8], op: RasterOp) -> Result<(), GfxError> {
        let block = ImageBlock::parse(buffer)?;
        let mask = self.mode().color_mask();
        for (dy, row) in block.rows().enumerate() {
            let py = y as i32 + dy as i32;
            for (dx, &src) in row.iter().enumerate() {
                let px = x as i32 + dx as i32;
                let dst = if op.reads_destination() { self.read(px, py) } else { 0 };
                self.plot(px, py, op.combine(src & mask, dst, mask));
            }
        }
        Ok(())
    }
}

/// Corner-inclusive size, saturated to what the header can hold. Spans of
/// 65536 pixels are cut to 65535, counted from the top-left corner.
fn block_extent(x1: i16, y1: i16, x2: i16, y2: i16) -> (u16, u16) {
    let span = |a: i16, b: i16| (a as i32 - b as i32).unsigned_abs().saturating_add(1).min(u16::MAX as u32) as u16;
    (span(x1, x2), span(y1, y2))
}
