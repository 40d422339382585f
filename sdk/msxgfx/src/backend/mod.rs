//! # Pixel Backends
//!
//! A [`Backend`] is chosen once, when the screen mode is set, and every
//! drawing call goes through it:
//!
//! | Variant            | Modes   | Set pixel                    | Bulk operations       |
//! |--------------------|---------|------------------------------|-----------------------|
//! | [`Backend::Planar`]| 2, 4    | pattern bit + color row      | none, per-pixel only  |
//! | [`Backend::Bitmap`]| 5–12    | 1×1 LMMV command             | LMMV, LINE, LMMM      |
//!
//! Coordinates are signed; anything outside the screen is clipped silently
//! and reads back as 0.

pub mod bitmap;
pub mod planar;

use crate::config::GfxConfig;
use crate::mode::{BackendKind, ScreenMode};
use crate::vdp::Vdp;

pub use bitmap::BitmapBackend;
pub use planar::PlanarBackend;

pub trait PixelBackend {
    fn mode(&self) -> ScreenMode;

    /// Color at (`x`, `y`), or 0 off screen.
    fn get_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16) -> u8;

    /// Write `color` (masked to the mode) at (`x`, `y`). `background` is the
    /// color the pattern modes store alongside it. Returns `false` when the
    /// point was clipped.
    fn set_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16, color: u8, background: u8) -> bool;
}

#[derive(Copy, Clone, Debug)]
pub enum Backend {
    Planar(PlanarBackend),
    Bitmap(BitmapBackend),
}

impl Backend {
    pub fn for_mode(mode: ScreenMode, config: &GfxConfig) -> Self {
        match mode.kind() {
            BackendKind::Software => Backend::Planar(PlanarBackend::new(mode)),
            BackendKind::Hardware => Backend::Bitmap(BitmapBackend::new(mode, config.wait)),
        }
    }

    /// The hardware backend, when the mode has one.
    #[inline(always)]
    pub fn accelerated(&self) -> Option<&BitmapBackend> {
        match self {
            Backend::Bitmap(b) => Some(b),
            Backend::Planar(_) => None,
        }
    }

    #[inline(always)]
    pub fn accelerated_mut(&mut self) -> Option<&mut BitmapBackend> {
        match self {
            Backend::Bitmap(b) => Some(b),
            Backend::Planar(_) => None,
        }
    }
}

impl PixelBackend for Backend {
    #[inline(always)]
    fn mode(&self) -> ScreenMode {
        match self {
            Backend::Planar(b) => b.mode(),
            Backend::Bitmap(b) => b.mode(),
        }
    }

    #[inline(always)]
    fn get_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16) -> u8 {
        match self {
            Backend::Planar(b) => b.get_pixel(vdp, x, y),
            Backend::Bitmap(b) => b.get_pixel(vdp, x, y),
        }
    }

    #[inline(always)]
    fn set_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16, color: u8, background: u8) -> bool {
        match self {
            Backend::Planar(b) => b.set_pixel(vdp, x, y, color, background),
            Backend::Bitmap(b) => b.set_pixel(vdp, x, y, color, background),
        }
    }
}
