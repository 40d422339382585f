//! # Flood Fill
//!
//! Border fill (`PAINT`): starting from a seed, every pixel reachable through
//! 4-connected neighbours that is neither the border color nor already the
//! fill color is painted.
//!
//! The fill is a scanline walk over a fixed-capacity span stack. A span
//! `(x1, x2, y, dy)` says "row `y` is painted from `x1` to `x2`, now look at
//! row `y + dy`". For each run found on the new row:
//!
//! 1. the run is extended left and right past the parent span as far as the
//!    region goes, then painted in one horizontal line;
//! 2. the run is pushed to continue in direction `dy`;
//! 3. any part of the run sticking out beyond the parent span is pushed in
//!    direction `-dy`, which is how the walk gets around concave corners.
//!
//! When the stack is full further spans are dropped and the fill may stop
//! short. Capacity is [`PAINT_STACK_CAPACITY`] spans unless the caller picks
//! another bound with [`Graphics::paint_with_capacity`].

use heapless::Vec;
use log::{debug, trace};

use crate::graphics::{Graphics, Point};
use crate::vdp::Vdp;

/// Default bound on pending spans.
pub const PAINT_STACK_CAPACITY: usize = 128;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PaintSpan {
    pub x1: i16,
    pub x2: i16,
    pub y: i16,
    pub dy: i8,
}

struct SpanStack<const N: usize> {
    spans: Vec<PaintSpan, N>,
    rows: i32,
    dropped: u32,
}

impl<const N: usize> SpanStack<N> {
    fn new(rows: i32) -> Self {
        Self { spans: Vec::new(), rows, dropped: 0 }
    }

    /// Queue a span unless the row it points at is off screen.
    fn push(&mut self, x1: i32, x2: i32, y: i32, dy: i8) {
        let next = y + dy as i32;
        if next < 0 || next >= self.rows {
            return;
        }
        let span = PaintSpan { x1: x1 as i16, x2: x2 as i16, y: y as i16, dy };
        if self.spans.push(span).is_err() {
            trace!(target: "paint", "stack full, dropped {:?}", span);
            self.dropped += 1;
        }
    }

    fn pop(&mut self) -> Option<PaintSpan> {
        self.spans.pop()
    }
}

impl<V: Vdp> Graphics<V> {
    /// `PAINT (x,y),color,border` with the default stack bound.
    pub fn paint(&mut self, x: i16, y: i16, color: u8, border: u8) {
        self.paint_with_capacity::<PAINT_STACK_CAPACITY>(x, y, color, border);
    }

    /// `PAINT (x,y),color`: the region is bounded by its own color.
    pub fn paint_solid(&mut self, x: i16, y: i16, color: u8) {
        self.paint(x, y, color, color);
    }

    /// Border fill holding at most `N` pending spans.
    pub fn paint_with_capacity<const N: usize>(&mut self, x: i16, y: i16, color: u8, border: u8) {
        let mode = self.mode();
        if !mode.in_bounds(x, y) {
            return;
        }
        self.cursor = Point::new(x, y);

        let mask = mode.color_mask();
        let (color, border) = (color & mask, border & mask);
        let seed = self.read(x as i32, y as i32);
        if seed == color || seed == border {
            return;
        }

        let width = mode.width() as i32;
        let mut stack = SpanStack::<N>::new(mode.height() as i32);
        let (x, y) = (x as i32, y as i32);
        stack.push(x, x, y, 1);
        stack.push(x, x, y + 1, -1);

        let mut runs = 0u32;
        while let Some(span) = stack.pop() {
            let row = span.y as i32 + span.dy as i32;
            let (x1, x2) = (span.x1 as i32, span.x2 as i32);
            let inside = |gfx: &mut Self, x: i32| {
                let c = gfx.read(x, row);
                c != border && c != color
            };

            let mut cx = x1;
            while cx <= x2 {
                if !inside(self, cx) {
                    cx += 1;
                    continue;
                }
                let mut left = cx;
                while left > 0 && inside(self, left - 1) {
                    left -= 1;
                }
                let mut right = cx;
                while right < width - 1 && inside(self, right + 1) {
                    right += 1;
                }
                self.hline(left, right, row, color);
                runs += 1;

                if left < x1 {
                    stack.push(left, x1 - 1, row, -span.dy);
                }
                if right > x2 {
                    stack.push(x2 + 1, right, row, -span.dy);
                }
                stack.push(left, right, row, span.dy);

                // right + 1 is border or fill
                cx = right + 2;
            }
        }

        debug!(target: "paint", "seed ({}, {}): {} runs, {} spans dropped", x, y, runs, stack.dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdp::sim::SimVdp;

    fn screen5() -> Graphics<SimVdp> {
        Graphics::new(SimVdp::new(), 5).unwrap()
    }

    #[test]
    fn fills_a_box_and_stops_at_border() {
        let mut gfx = screen5();
        gfx.r#box(10, 10, 40, 30, 15);
        gfx.paint(20, 20, 6, 15);
        assert_eq!(gfx.cursor(), Point::new(20, 20));
        assert_eq!(gfx.point(11, 11), 6);
        assert_eq!(gfx.point(39, 29), 6);
        assert_eq!(gfx.point(10, 20), 15);
        assert_eq!(gfx.point(9, 20), 0);
        assert_eq!(gfx.point(41, 20), 0);
    }

    #[test]
    fn seed_on_border_or_fill_is_a_no_op() {
        let mut gfx = screen5();
        gfx.r#box(10, 10, 40, 30, 15);
        let before = gfx.vdp().commands_executed();
        gfx.paint(10, 10, 6, 15);
        assert_eq!(gfx.vdp().commands_executed(), before);

        gfx.boxfill(50, 50, 60, 60, 6);
        let before = gfx.vdp().commands_executed();
        gfx.paint(55, 55, 6, 15);
        gfx.paint(-1, 5, 6, 15);
        assert_eq!(gfx.vdp().commands_executed(), before);
    }

    #[test]
    fn walks_around_concave_shapes() {
        let mut gfx = screen5();
        // a U: fill seeded in one arm must reach the other arm
        gfx.r#box(10, 10, 60, 60, 15);
        gfx.line(35, 10, 35, 50, 15);
        gfx.paint(20, 20, 3, 15);
        assert_eq!(gfx.point(50, 20), 3);
        assert_eq!(gfx.point(50, 11), 3);
        assert_eq!(gfx.point(35, 55), 3);
    }

    #[test]
    fn diagonal_gaps_do_not_leak() {
        let mut gfx = screen5();
        // diamond outline: only diagonal neighbours touch
        gfx.line(50, 20, 70, 40, 15);
        gfx.line(70, 40, 50, 60, 15);
        gfx.line(50, 60, 30, 40, 15);
        gfx.line(30, 40, 50, 20, 15);
        gfx.paint(50, 40, 9, 15);
        assert_eq!(gfx.point(50, 40), 9);
        assert_eq!(gfx.point(50, 22), 9);
        assert_eq!(gfx.point(30, 30), 0);
        assert_eq!(gfx.point(71, 40), 0);
        assert_eq!(gfx.point(50, 61), 0);
    }

    #[test]
    fn solid_paint_uses_fill_as_border() {
        let mut gfx = screen5();
        gfx.circle(100, 100, 20, 12);
        gfx.paint_solid(100, 100, 12);
        assert_eq!(gfx.point(100, 100), 12);
        assert_eq!(gfx.point(119, 100), 12);
        assert_eq!(gfx.point(122, 100), 0);
    }

    #[test]
    fn tiny_stack_leaves_fill_incomplete() {
        // comb: every gap between teeth needs its own span
        let comb = || {
            let mut gfx = screen5();
            gfx.r#box(0, 0, 100, 40, 15);
            for x in (4..100).step_by(4) {
                gfx.line(x, 10, x, 40, 15);
            }
            gfx
        };
        let filled = |gfx: &mut Graphics<SimVdp>| (1..100).filter(|x| x % 4 != 0).filter(|&x| gfx.point(x, 35) == 7).count();

        let mut starved = comb();
        starved.paint_with_capacity::<2>(2, 5, 7, 15);
        assert!(filled(&mut starved) < 75);

        let mut roomy = comb();
        roomy.paint(2, 5, 7, 15);
        assert_eq!(filled(&mut roomy), 75);
    }
}
