//! Bitmap modes (SCREEN 5–12) driven through the command engine.
//!
//! Reads go straight to VRAM; every write is a VDP command. All coordinates
//! handed to the engine are screen coordinates on the active page, which sits
//! `page * 256` lines down the command address space.

use bit_field::BitField;
use log::warn;

use crate::backend::PixelBackend;
use crate::config::WaitPolicy;
use crate::mode::{ScreenMode, PAGE_LINES};
use crate::vdp::{submit, Vdp, VdpCommand};

#[derive(Copy, Clone, Debug)]
pub struct BitmapBackend {
    mode: ScreenMode,
    active_page: u8,
    wait: WaitPolicy,
}

/// A rectangle already clipped to the screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Clipped {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

impl BitmapBackend {
    pub fn new(mode: ScreenMode, wait: WaitPolicy) -> Self {
        Self { mode, active_page: 0, wait }
    }

    pub fn active_page(&self) -> u8 {
        self.active_page
    }

    pub fn set_active_page(&mut self, page: u8) {
        self.active_page = page % self.mode.page_count();
    }

    #[inline(always)]
    fn page_y(&self, page: u8, y: u16) -> u16 {
        page as u16 * PAGE_LINES + y
    }

    fn issue<V: Vdp>(&self, vdp: &mut V, command: VdpCommand) {
        if let Err(e) = submit(vdp, &command, self.wait) {
            warn!(target: "vdp", "{:?} abandoned: {}", command.opcode, e);
        }
    }

    fn clip(&self, x1: i16, y1: i16, x2: i16, y2: i16) -> Option<Clipped> {
        let (left, right) = (x1.min(x2) as i32, x1.max(x2) as i32);
        let (top, bottom) = (y1.min(y2) as i32, y1.max(y2) as i32);
        let left = left.max(0);
        let top = top.max(0);
        let right = right.min(self.mode.width() as i32 - 1);
        let bottom = bottom.min(self.mode.height() as i32 - 1);
        if left > right || top > bottom {
            return None;
        }
        Some(Clipped {
            x: left as u16,
            y: top as u16,
            width: (right - left + 1) as u16,
            height: (bottom - top + 1) as u16,
        })
    }

    /// Logical fill of the rectangle spanned by two corners, clipped.
    pub fn fill_rect<V: Vdp>(&self, vdp: &mut V, x1: i16, y1: i16, x2: i16, y2: i16, color: u8) {
        let Some(rect) = self.clip(x1, y1, x2, y2) else {
            return;
        };
        let y = self.page_y(self.active_page, rect.y);
        let color = color & self.mode.color_mask();
        self.issue(vdp, VdpCommand::fill(rect.x, y, rect.width, rect.height, color));
    }

    /// Hardware LINE between two on-screen endpoints.
    ///
    /// Returns `false` without drawing when either endpoint is off screen;
    /// the engine has no clipping of its own.
    pub fn draw_line<V: Vdp>(&self, vdp: &mut V, x1: i16, y1: i16, x2: i16, y2: i16, color: u8) -> bool {
        if !self.mode.in_bounds(x1, y1) || !self.mode.in_bounds(x2, y2) {
            return false;
        }
        let (y1, y2) = (self.page_y(self.active_page, y1 as u16), self.page_y(self.active_page, y2 as u16));
        let color = color & self.mode.color_mask();
        self.issue(vdp, VdpCommand::line(x1 as u16, y1, x2 as u16, y2, color));
        true
    }

    /// Copy a `width`×`height` block between pages, clipping both source and
    /// destination to the screen.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_rect<V: Vdp>(
        &self,
        vdp: &mut V,
        sx: i16,
        sy: i16,
        width: i16,
        height: i16,
        src_page: u8,
        dx: i16,
        dy: i16,
        dst_page: u8,
    ) {
        let (mut sx, mut sy, mut dx, mut dy) = (sx as i32, sy as i32, dx as i32, dy as i32);
        let (mut width, mut height) = (width as i32, height as i32);
        if sx < 0 {
            width += sx;
            dx -= sx;
            sx = 0;
        }
        if dx < 0 {
            width += dx;
            sx -= dx;
            dx = 0;
        }
        if sy < 0 {
            height += sy;
            dy -= sy;
            sy = 0;
        }
        if dy < 0 {
            height += dy;
            sy -= dy;
            dy = 0;
        }
        let screen_w = self.mode.width() as i32;
        let screen_h = self.mode.height() as i32;
        width = width.min(screen_w - sx).min(screen_w - dx);
        height = height.min(screen_h - sy).min(screen_h - dy);
        if width <= 0 || height <= 0 {
            return;
        }

        let pages = self.mode.page_count();
        let command = VdpCommand::copy(
            sx as u16,
            self.page_y(src_page % pages, sy as u16),
            width as u16,
            height as u16,
            dx as u16,
            self.page_y(dst_page % pages, dy as u16),
        );
        self.issue(vdp, command);
    }

    /// Fill the whole active page with `color` using the byte-wide fill.
    pub fn clear<V: Vdp>(&self, vdp: &mut V, color: u8) {
        let y = self.page_y(self.active_page, 0);
        let packed = self.mode.pack_color(color);
        self.issue(vdp, VdpCommand::fill_bytes(0, y, self.mode.width(), self.mode.height(), packed));
    }
}

impl PixelBackend for BitmapBackend {
    fn mode(&self) -> ScreenMode {
        self.mode
    }

    fn get_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16) -> u8 {
        if !self.mode.in_bounds(x, y) {
            return 0;
        }
        let (x, y) = (x as u16, self.page_y(self.active_page, y as u16));
        let byte = vdp.read_vram(self.mode.pixel_address(x, y));
        byte.get_bits(self.mode.pixel_bits(x))
    }

    fn set_pixel<V: Vdp>(&self, vdp: &mut V, x: i16, y: i16, color: u8, _background: u8) -> bool {
        if !self.mode.in_bounds(x, y) {
            return false;
        }
        let y = self.page_y(self.active_page, y as u16);
        self.issue(vdp, VdpCommand::pset(x as u16, y, color & self.mode.color_mask()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdp::sim::SimVdp;

    fn screen(number: u8) -> (BitmapBackend, SimVdp) {
        let mode = ScreenMode::from_number(number).unwrap();
        let mut vdp = SimVdp::new();
        vdp.set_mode(mode);
        (BitmapBackend::new(mode, WaitPolicy::Unbounded), vdp)
    }

    #[test]
    fn pixels_land_in_native_packing() {
        let (backend, mut vdp) = screen(5);
        backend.set_pixel(&mut vdp, 1, 0, 0x1C, 0);
        assert_eq!(vdp.vram()[0], 0x0C);
        assert_eq!(backend.get_pixel(&mut vdp, 1, 0), 0x0C);
        assert_eq!(backend.get_pixel(&mut vdp, 0, 0), 0);

        let (backend, mut vdp) = screen(6);
        backend.set_pixel(&mut vdp, 2, 1, 0x07, 0);
        assert_eq!(vdp.vram()[128], 0b0000_1100);
        assert_eq!(backend.get_pixel(&mut vdp, 2, 1), 3);
    }

    #[test]
    fn fill_is_clipped_to_screen() {
        let (backend, mut vdp) = screen(8);
        backend.fill_rect(&mut vdp, 250, 210, 300, -5, 0x55);
        assert_eq!(backend.get_pixel(&mut vdp, 255, 0), 0x55);
        assert_eq!(backend.get_pixel(&mut vdp, 250, 210), 0x55);
        assert_eq!(backend.get_pixel(&mut vdp, 250, 211), 0);
        assert_eq!(backend.get_pixel(&mut vdp, 249, 100), 0);
        // nothing spilled onto the next page
        assert_eq!(vdp.vram()[(256 * 256) as usize], 0);
    }

    #[test]
    fn off_screen_line_is_declined() {
        let (backend, mut vdp) = screen(5);
        assert!(!backend.draw_line(&mut vdp, -1, 0, 10, 10, 3));
        assert_eq!(vdp.commands_executed(), 0);
        assert!(backend.draw_line(&mut vdp, 0, 0, 10, 5, 3));
        assert_eq!(backend.get_pixel(&mut vdp, 10, 5), 3);
    }

    #[test]
    fn active_page_offsets_writes() {
        let (mut backend, mut vdp) = screen(5);
        backend.set_active_page(1);
        backend.set_pixel(&mut vdp, 0, 0, 9, 0);
        assert_eq!(vdp.vram()[256 * 128], 0x90);
        backend.set_active_page(0);
        assert_eq!(backend.get_pixel(&mut vdp, 0, 0), 0);
    }

    #[test]
    fn copy_between_pages() {
        let (mut backend, mut vdp) = screen(5);
        backend.fill_rect(&mut vdp, 4, 4, 7, 7, 6);
        backend.copy_rect(&mut vdp, 4, 4, 4, 4, 0, 10, 12, 2);
        backend.set_active_page(2);
        assert_eq!(backend.get_pixel(&mut vdp, 10, 12), 6);
        assert_eq!(backend.get_pixel(&mut vdp, 13, 15), 6);
        assert_eq!(backend.get_pixel(&mut vdp, 14, 15), 0);
    }
}
