//! # DRAW Strings
//!
//! A one-pass interpreter for the `DRAW` turtle language. Each command is a
//! letter, optionally followed directly by a decimal number:
//!
//! | Command      | Effect                                                    |
//! |--------------|-----------------------------------------------------------|
//! | `U` `D` `L` `R` | step up / down / left / right, `n` units (default 1)   |
//! | `E` `F` `G` `H` | diagonal step: up-right, down-right, down-left, up-left |
//! | `Mx,y`       | move to (x, y); not rotated                               |
//! | `M+x,y` `M-x,y` | move by (±x, y); rotated, not scaled                   |
//! | `B`          | next move does not draw                                   |
//! | `N`          | next move does not update the position                    |
//! | `Cn`         | pen color                                                 |
//! | `An`         | rotate later moves by `n mod 4` × 90°                     |
//! | `Sn`         | scale steps by `n / 4` (1–255; other values ignored)      |
//!
//! Letters are case-insensitive. Spaces, tabs and `;` separate commands.
//! Anything else is skipped together with the number following it.
//!
//! Rotation follows screen axes (y grows downwards): `A1` turns `R` into a
//! step down, so `A1R10` from (0, 0) ends on (0, 10).

use log::{debug, trace};

use crate::graphics::{Graphics, Point};
use crate::vdp::Vdp;

/// Scale numerator meaning 1:1.
pub const UNIT_SCALE: u8 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawOp {
    /// `U`..`H`: unit direction and raw distance (0 when omitted).
    Step { ux: i8, uy: i8, distance: u32 },
    MoveTo { x: i32, y: i32 },
    MoveBy { dx: i32, dy: i32 },
    PenUp,
    NoUpdate,
    Color(u32),
    Angle(u32),
    Scale(u32),
    /// Unrecognised letter.
    Skip(u8),
}

/// Tokenizer over a DRAW string.
pub struct DrawCommands<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DrawCommands<'a> {
    pub fn new(commands: &'a str) -> Self {
        Self { bytes: commands.as_bytes(), pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(digit @ b'0'..=b'9') = self.peek() {
            value = value.saturating_mul(10).saturating_add((digit - b'0') as u32);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn signed(&mut self) -> i32 {
        let negative = self.eat(b'-');
        if !negative {
            self.eat(b'+');
        }
        let value = self.number().unwrap_or(0).min(i32::MAX as u32) as i32;
        if negative {
            -value
        } else {
            value
        }
    }
}

impl Iterator for DrawCommands<'_> {
    type Item = DrawOp;

    fn next(&mut self) -> Option<DrawOp> {
        let letter = loop {
            let byte = self.peek()?;
            self.pos += 1;
            if !matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b';') {
                break byte.to_ascii_uppercase();
            }
        };

        if letter == b'M' {
            return Some(match self.peek() {
                Some(sign @ (b'+' | b'-')) => {
                    self.pos += 1;
                    let dx = self.number().unwrap_or(0).min(i32::MAX as u32) as i32;
                    let dx = if sign == b'-' { -dx } else { dx };
                    let dy = if self.eat(b',') { self.signed() } else { 0 };
                    DrawOp::MoveBy { dx, dy }
                }
                _ => {
                    let x = self.number().unwrap_or(0).min(i32::MAX as u32) as i32;
                    let y = if self.eat(b',') { self.signed() } else { 0 };
                    DrawOp::MoveTo { x, y }
                }
            });
        }

        let distance = self.number().unwrap_or(0);
        let step = |ux, uy| DrawOp::Step { ux, uy, distance };
        Some(match letter {
            b'U' => step(0, -1),
            b'D' => step(0, 1),
            b'L' => step(-1, 0),
            b'R' => step(1, 0),
            b'E' => step(1, -1),
            b'F' => step(1, 1),
            b'G' => step(-1, 1),
            b'H' => step(-1, -1),
            b'B' => DrawOp::PenUp,
            b'N' => DrawOp::NoUpdate,
            b'C' => DrawOp::Color(distance),
            b'A' => DrawOp::Angle(distance),
            b'S' => DrawOp::Scale(distance),
            other => {
                // a stray second number belongs to the skipped command too
                if self.eat(b',') {
                    self.number();
                }
                DrawOp::Skip(other)
            }
        })
    }
}

/// Pen state for one `draw` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PenState {
    pub pen_down: bool,
    pub no_update: bool,
    pub quadrant: u8,
    pub scale: u8,
    pub color: u8,
}

impl PenState {
    pub fn new(color: u8) -> Self {
        Self { pen_down: true, no_update: false, quadrant: 0, scale: UNIT_SCALE, color }
    }

    /// Rotate a vector by the current quadrant.
    pub fn rotate(&self, dx: i32, dy: i32) -> (i32, i32) {
        match self.quadrant & 3 {
            1 => (-dy, dx),
            2 => (-dx, -dy),
            3 => (dy, -dx),
            _ => (dx, dy),
        }
    }

    /// Scaled length of a step of `distance` units (0 counts as 1).
    pub fn step_length(&self, distance: u32) -> i32 {
        let distance = distance.max(1) as i64;
        (distance * self.scale as i64 / UNIT_SCALE as i64).min(i32::MAX as i64) as i32
    }

    fn reset_one_shots(&mut self) {
        self.pen_down = true;
        self.no_update = false;
    }
}

#[inline(always)]
fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

impl<V: Vdp> Graphics<V> {
    /// Run a DRAW string from the cursor in the foreground color. The cursor
    /// ends on the final pen position.
    pub fn draw(&mut self, commands: &str) {
        let mut pen = PenState::new(self.fg);
        let (mut x, mut y) = (self.cursor.x as i32, self.cursor.y as i32);

        for op in DrawCommands::new(commands) {
            trace!(target: "draw", "{:?}", op);
            let (dx, dy) = match op {
                DrawOp::Step { ux, uy, distance } => {
                    let length = pen.step_length(distance);
                    pen.rotate(ux as i32 * length, uy as i32 * length)
                }
                DrawOp::MoveBy { dx, dy } => pen.rotate(dx, dy),
                DrawOp::MoveTo { x: tx, y: ty } => {
                    if pen.pen_down {
                        self.line(clamp_i16(x), clamp_i16(y), clamp_i16(tx), clamp_i16(ty), pen.color);
                    }
                    if !pen.no_update {
                        (x, y) = (tx, ty);
                    }
                    pen.reset_one_shots();
                    continue;
                }
                DrawOp::PenUp => {
                    pen.pen_down = false;
                    continue;
                }
                DrawOp::NoUpdate => {
                    pen.no_update = true;
                    continue;
                }
                DrawOp::Color(c) => {
                    pen.color = c as u8;
                    continue;
                }
                DrawOp::Angle(a) => {
                    pen.quadrant = (a & 3) as u8;
                    continue;
                }
                DrawOp::Scale(s) => {
                    match u8::try_from(s) {
                        Ok(s) if s > 0 => pen.scale = s,
                        _ => debug!(target: "draw", "scale {} ignored", s),
                    }
                    continue;
                }
                DrawOp::Skip(letter) => {
                    debug!(target: "draw", "skipped '{}'", letter as char);
                    continue;
                }
            };

            if dx != 0 || dy != 0 {
                let (nx, ny) = (x.saturating_add(dx), y.saturating_add(dy));
                if pen.pen_down {
                    self.line(clamp_i16(x), clamp_i16(y), clamp_i16(nx), clamp_i16(ny), pen.color);
                }
                if !pen.no_update {
                    (x, y) = (nx, ny);
                }
            }
            pen.reset_one_shots();
        }

        self.cursor = Point::new(clamp_i16(x), clamp_i16(y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdp::sim::SimVdp;
    use alloc::vec::Vec;

    fn ops(s: &str) -> Vec<DrawOp> {
        DrawCommands::new(s).collect()
    }

    fn run(commands: &str) -> Graphics<SimVdp> {
        let mut gfx = Graphics::new(SimVdp::new(), 5).unwrap();
        gfx.draw(commands);
        gfx
    }

    #[test]
    fn tokenizes_numbers_and_moves() {
        assert_eq!(
            ops("r10 U;M+5,-3 M20,30 c7"),
            [
                DrawOp::Step { ux: 1, uy: 0, distance: 10 },
                DrawOp::Step { ux: 0, uy: -1, distance: 0 },
                DrawOp::MoveBy { dx: 5, dy: -3 },
                DrawOp::MoveTo { x: 20, y: 30 },
                DrawOp::Color(7),
            ]
        );
        assert_eq!(ops("X5,6R1"), [DrawOp::Skip(b'X'), DrawOp::Step { ux: 1, uy: 0, distance: 1 }]);
        assert_eq!(ops("M-4,2"), [DrawOp::MoveBy { dx: -4, dy: 2 }]);
    }

    #[test]
    fn step_moves_and_draws() {
        let mut gfx = run("R10");
        assert_eq!(gfx.cursor(), Point::new(10, 0));
        assert_eq!(gfx.point(5, 0), 15);
    }

    #[test]
    fn quarter_turn_points_down() {
        assert_eq!(run("A1 R10").cursor(), Point::new(0, 10));
        assert_eq!(run("BM50,50 A2 R10").cursor(), Point::new(40, 50));
        assert_eq!(run("BM50,50 A3 R10").cursor(), Point::new(50, 40));
    }

    #[test]
    fn scale_multiplies_by_quarters() {
        assert_eq!(run("S8 R10").cursor(), Point::new(20, 0));
        assert_eq!(run("S4 R10").cursor(), Point::new(10, 0));
        assert_eq!(run("S2 R5").cursor(), Point::new(2, 0));
        // out of range scale keeps the previous one
        assert_eq!(run("S0 R3 S300 R3").cursor(), Point::new(6, 0));
    }

    #[test]
    fn one_shot_flags() {
        let mut gfx = run("BM10,10 BR5 NR5 D3");
        assert_eq!(gfx.cursor(), Point::new(15, 13));
        assert_eq!(gfx.point(12, 10), 0);
        // N drew the segment but stayed put
        assert_eq!(gfx.point(18, 10), 15);
        assert_eq!(gfx.point(15, 12), 15);
        assert_eq!(gfx.point(0, 0), 0);
    }

    #[test]
    fn relative_moves_rotate_but_do_not_scale() {
        assert_eq!(run("BM20,20 S8 A1 M+4,0").cursor(), Point::new(20, 24));
        assert_eq!(run("BM20,20 A1 M+0,0 R1").cursor(), Point::new(20, 21));
    }

    #[test]
    fn color_and_diagonals() {
        let mut gfx = run("BM20,20 C9 F4 E4");
        assert_eq!(gfx.cursor(), Point::new(28, 20));
        assert_eq!(gfx.point(24, 24), 9);
        assert_eq!(gfx.point(26, 22), 9);
    }
}
