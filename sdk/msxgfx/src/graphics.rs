//! # Graphics Context
//!
//! [`Graphics`] owns the VDP handle, the backend picked for the current screen
//! mode, the foreground/background colors and the graphics cursor. Every
//! drawing operation in the crate is a method on it; the shape, paint, block,
//! DRAW and sprite modules each add their own `impl` block.
//!
//! The cursor is the implicit origin of every `*_step` call and of DRAW
//! strings. Operations leave it on their last point:
//!
//! | Operation                  | Cursor afterwards          |
//! |----------------------------|----------------------------|
//! | `pset`, `preset`, `point`  | the point (if on screen)   |
//! | `line`, `box`, `boxfill`   | second corner              |
//! | circles and ellipses       | center                     |
//! | `paint`                    | seed                       |
//! | `draw`                     | final pen position         |
//! | `paste`                    | last pixel written         |
//! | `capture`, `copy`          | unchanged                  |

use log::debug;

use crate::backend::{Backend, PixelBackend};
use crate::config::GfxConfig;
use crate::error::GfxError;
use crate::mode::ScreenMode;
use crate::palette::palette_port_bytes;
use crate::vdp::{Vdp, REG_NAME_TABLE, REG_PALETTE};

/// R#1: display enable.
const R1_BLANK: u8 = 0b0100_0000;
/// R#1: sprite size and magnification bits.
pub(crate) const R1_SPRITE_MASK: u8 = 0b0000_0011;

/// Name table base for the pattern modes.
const PATTERN_NAME_TABLE: u32 = 0x1800;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

pub struct Graphics<V: Vdp> {
    pub(crate) vdp: V,
    pub(crate) backend: Backend,
    pub(crate) config: GfxConfig,
    pub(crate) cursor: Point,
    pub(crate) fg: u8,
    pub(crate) bg: u8,
    /// Shadow of R#1, which cannot be read back.
    pub(crate) r1: u8,
}

impl<V: Vdp> Graphics<V> {
    /// Take over `vdp` and switch it to screen mode `mode`.
    pub fn new(vdp: V, mode: u8) -> Result<Self, GfxError> {
        Self::with_config(vdp, mode, GfxConfig::default())
    }

    pub fn with_config(vdp: V, mode: u8, config: GfxConfig) -> Result<Self, GfxError> {
        let screen = ScreenMode::from_number(mode)?;
        let mut gfx = Self {
            vdp,
            backend: Backend::for_mode(screen, &config),
            config,
            cursor: Point::default(),
            fg: 15,
            bg: 4,
            r1: R1_BLANK,
        };
        gfx.load_mode_registers(screen);
        Ok(gfx)
    }

    /// Switch screen mode. The backend is chosen here, once.
    pub fn set_mode(&mut self, mode: u8) -> Result<(), GfxError> {
        let screen = ScreenMode::from_number(mode)?;
        self.backend = Backend::for_mode(screen, &self.config);
        self.load_mode_registers(screen);
        debug!(target: "vdp", "screen {} ({}x{}, {:?})", mode, screen.width(), screen.height(), screen.kind());
        Ok(())
    }

    fn load_mode_registers(&mut self, mode: ScreenMode) {
        let (r0, r1, r25) = mode.mode_registers();
        self.r1 = R1_BLANK | r1 | (self.r1 & R1_SPRITE_MASK);
        let (attributes, patterns) = mode.sprite_tables();
        let mut r5 = (attributes >> 7) as u8;
        if mode.sprite_mode2() {
            // A9..A7 must read as ones, the color table takes the 0x200 below
            r5 |= 0x07;
        }
        let r11 = (attributes >> 15) as u8;
        let r6 = (patterns >> 11) as u8;
        let r1 = self.r1;

        self.vdp.without_interrupts(|vdp| {
            vdp.write_register(0, r0);
            vdp.write_register(1, r1);
            vdp.write_register(25, r25);
            vdp.write_register(REG_NAME_TABLE, mode.display_page_register(0));
            if !mode.is_bitmap() {
                // color table at 0x2000, pattern generator at 0x0000, full masks
                vdp.write_register(3, 0xFF);
                vdp.write_register(4, 0x03);
            }
            vdp.write_register(5, r5);
            vdp.write_register(6, r6);
            vdp.write_register(11, r11);
        });

        if !mode.is_bitmap() {
            for cell in 0..0x300u32 {
                self.vdp.write_vram(PATTERN_NAME_TABLE + cell, cell as u8);
            }
        }
    }

    #[inline(always)]
    pub fn mode(&self) -> ScreenMode {
        self.backend.mode()
    }

    pub fn config(&self) -> &GfxConfig {
        &self.config
    }

    pub fn vdp(&self) -> &V {
        &self.vdp
    }

    pub fn vdp_mut(&mut self) -> &mut V {
        &mut self.vdp
    }

    pub fn into_inner(self) -> V {
        self.vdp
    }

    pub fn colors(&self) -> (u8, u8) {
        (self.fg, self.bg)
    }

    pub fn set_colors(&mut self, fg: u8, bg: u8) {
        self.fg = fg;
        self.bg = bg;
    }

    #[inline(always)]
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Move the cursor without drawing.
    pub fn move_to(&mut self, x: i16, y: i16) {
        self.cursor = Point::new(x, y);
    }

    /// Set one pixel. Off-screen points are ignored and leave the cursor alone.
    pub fn pset(&mut self, x: i16, y: i16, color: u8) {
        self.plot(x as i32, y as i32, color);
    }

    pub fn pset_fg(&mut self, x: i16, y: i16) {
        self.pset(x, y, self.fg);
    }

    /// `PSET STEP`: offset from the cursor.
    pub fn pset_step(&mut self, dx: i16, dy: i16, color: u8) {
        let x = self.cursor.x as i32 + dx as i32;
        let y = self.cursor.y as i32 + dy as i32;
        self.plot(x, y, color);
    }

    /// Set a pixel to the background color.
    pub fn preset(&mut self, x: i16, y: i16) {
        self.pset(x, y, self.bg);
    }

    /// Color at (`x`, `y`); 0 off screen.
    pub fn point(&mut self, x: i16, y: i16) -> u8 {
        if !self.mode().in_bounds(x, y) {
            return 0;
        }
        self.cursor = Point::new(x, y);
        self.backend.get_pixel(&mut self.vdp, x, y)
    }

    /// Initialise the graphics screen to the background color.
    pub fn clear(&mut self) {
        match &self.backend {
            Backend::Planar(b) => b.clear(&mut self.vdp, self.fg, self.bg),
            Backend::Bitmap(b) => b.clear(&mut self.vdp, self.bg),
        }
    }

    /// `SET PAGE`: show `display`, draw on `active`. Ignored in the pattern
    /// modes, which have a single page.
    pub fn set_page(&mut self, display: u8, active: u8) {
        let mode = self.mode();
        let Some(bitmap) = self.backend.accelerated_mut() else {
            debug!(target: "vdp", "set_page ignored in screen {}", mode.number());
            return;
        };
        bitmap.set_active_page(active);
        self.vdp.write_register(REG_NAME_TABLE, mode.display_page_register(display));
    }

    /// Copy a block within the active page.
    pub fn copy(&mut self, sx: i16, sy: i16, width: i16, height: i16, dx: i16, dy: i16) {
        let Some(bitmap) = self.backend.accelerated() else {
            return;
        };
        let page = bitmap.active_page();
        bitmap.copy_rect(&mut self.vdp, sx, sy, width, height, page, dx, dy, page);
    }

    /// Copy a block between pages.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_page(
        &mut self,
        sx: i16,
        sy: i16,
        width: i16,
        height: i16,
        src_page: u8,
        dx: i16,
        dy: i16,
        dst_page: u8,
    ) {
        let Some(bitmap) = self.backend.accelerated() else {
            return;
        };
        bitmap.copy_rect(&mut self.vdp, sx, sy, width, height, src_page, dx, dy, dst_page);
    }

    /// Program palette entry `index` with 3-bit `r`, `g`, `b`.
    pub fn set_palette(&mut self, index: u8, r: u8, g: u8, b: u8) {
        let [rb, g] = palette_port_bytes(r, g, b);
        self.vdp.without_interrupts(|vdp| {
            vdp.write_register(REG_PALETTE, index & 0x0F);
            vdp.write_palette(rb);
            vdp.write_palette(g);
        });
    }

    /// Block until the next vertical blank.
    pub fn wait_frame(&mut self) {
        self.vdp.wait_vblank();
    }

    /// Set a pixel at widened coordinates; the cursor follows on success.
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: u8) -> bool {
        let (Ok(x), Ok(y)) = (i16::try_from(x), i16::try_from(y)) else {
            return false;
        };
        let set = self.backend.set_pixel(&mut self.vdp, x, y, color, self.bg);
        if set {
            self.cursor = Point::new(x, y);
        }
        set
    }

    pub(crate) fn read(&mut self, x: i32, y: i32) -> u8 {
        match (i16::try_from(x), i16::try_from(y)) {
            (Ok(x), Ok(y)) => self.backend.get_pixel(&mut self.vdp, x, y),
            _ => 0,
        }
    }

    /// Horizontal run `x1..=x2` on row `y`, clipped. Does not move the cursor.
    pub(crate) fn hline(&mut self, x1: i32, x2: i32, y: i32, color: u8) {
        let (left, right) = (x1.min(x2), x1.max(x2));
        let mode = self.mode();
        if y < 0 || y >= mode.height() as i32 {
            return;
        }
        let left = left.max(0);
        let right = right.min(mode.width() as i32 - 1);
        if left > right {
            return;
        }
        match &self.backend {
            Backend::Bitmap(b) => b.fill_rect(&mut self.vdp, left as i16, y as i16, right as i16, y as i16, color),
            Backend::Planar(b) => {
                for x in left..=right {
                    b.set_pixel(&mut self.vdp, x as i16, y as i16, color, self.bg);
                }
            }
        }
    }
}
