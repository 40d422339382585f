use msxgfx::{Graphics, GfxConfig, Point, RasterOp, SimVdp, WaitPolicy};
use proptest::prelude::*;

fn screen(number: u8) -> Graphics<SimVdp> {
    Graphics::new(SimVdp::new(), number).unwrap()
}

fn bitmap_mode() -> impl Strategy<Value = u8> {
    prop::sample::select(vec![5u8, 6, 7, 8, 10, 12])
}

proptest! {
    #[test]
    fn pixels_read_back_masked(number in bitmap_mode(), x in 0i16..512, y in 0i16..212, color: u8) {
        let mut gfx = screen(number);
        let mode = gfx.mode();
        let x = x % mode.width() as i16;
        gfx.pset(x, y, color);
        prop_assert_eq!(gfx.point(x, y), color & mode.color_mask());
        prop_assert_eq!(gfx.cursor(), Point::new(x, y));
        prop_assert_eq!(gfx.vdp().unguarded_command_writes(), 0);
    }

    #[test]
    fn capture_then_paste_restores_block(
        number in prop::sample::select(vec![5u8, 8]),
        x in 0i16..200,
        y in 0i16..150,
        w in 1i16..12,
        h in 1i16..12,
        seed in prop::collection::vec(any::<u8>(), 144),
    ) {
        let mut gfx = screen(number);
        for dy in 0..h {
            for dx in 0..w {
                gfx.pset(x + dx, y + dy, seed[(dy * 12 + dx) as usize]);
            }
        }
        let block = gfx.capture(x, y, x + w - 1, y + h - 1);
        gfx.boxfill(x, y, x + w - 1, y + h - 1, 0);
        gfx.paste(x, y, &block, RasterOp::Pset).unwrap();
        prop_assert_eq!(gfx.capture(x, y, x + w - 1, y + h - 1), block);
    }

    #[test]
    fn xor_paste_twice_is_identity(
        x in 0i16..200,
        y in 0i16..150,
        pixels in prop::collection::vec(any::<u8>(), 1..40),
        background in any::<u8>(),
    ) {
        let mut gfx = screen(8);
        let width = pixels.len() as u16;
        let mut block = Vec::with_capacity(4 + pixels.len());
        block.extend_from_slice(&width.to_le_bytes());
        block.extend_from_slice(&1u16.to_le_bytes());
        block.extend_from_slice(&pixels);

        let right = x + width as i16 - 1;
        gfx.boxfill(x, y, right, y + 2, background);
        let before = gfx.capture(x, y, right, y + 2);
        gfx.paste(x, y + 1, &block, RasterOp::Xor).unwrap();
        gfx.paste(x, y + 1, &block, RasterOp::Xor).unwrap();
        prop_assert_eq!(gfx.capture(x, y, right, y + 2), before);
    }

    #[test]
    fn circles_have_eightfold_symmetry(radius in 0i16..60) {
        let (cx, cy) = (128i16, 100i16);
        let mut gfx = screen(8);
        gfx.circle(cx, cy, radius, 0xFF);
        prop_assert_eq!(gfx.cursor(), Point::new(cx, cy));
        for dy in 0..=radius {
            for dx in 0..=radius {
                if gfx.point(cx + dx, cy + dy) != 0xFF {
                    continue;
                }
                for (ex, ey) in [(dx, dy), (dy, dx)] {
                    for (sx, sy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
                        prop_assert_eq!(gfx.point(cx + sx * ex, cy + sy * ey), 0xFF);
                    }
                }
            }
        }
        // the four axis extremes are always on the curve
        prop_assert_eq!(gfx.point(cx + radius, cy), 0xFF);
        prop_assert_eq!(gfx.point(cx, cy - radius), 0xFF);
    }

    #[test]
    fn paint_stays_inside_its_border(
        x0 in 5i16..60,
        y0 in 5i16..60,
        w in 20i16..120,
        h in 20i16..100,
        step in 4i16..12,
    ) {
        let (x1, y1) = (x0 + w, y0 + h);
        let mut gfx = screen(8);
        gfx.r#box(x0, y0, x1, y1, 15);
        // serpentine walls, alternately hanging from the top and standing on the bottom
        for (i, wx) in (x0 + step..x1 - 1).step_by(step as usize).enumerate() {
            if i % 2 == 0 {
                gfx.line(wx, y0, wx, y1 - 2, 15);
            } else {
                gfx.line(wx, y0 + 2, wx, y1, 15);
            }
        }
        gfx.paint(x0 + 1, y0 + 1, 6, 15);

        for y in y0 - 2..=y1 + 2 {
            for x in x0 - 2..=x1 + 2 {
                let c = gfx.point(x, y);
                if x < x0 || x > x1 || y < y0 || y > y1 {
                    prop_assert_eq!(c, 0, "leak at ({}, {})", x, y);
                } else if c != 15 {
                    prop_assert_eq!(c, 6, "hole at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn draw_moves_by_rotated_scaled_distance(
        distance in 1u32..50,
        quadrant in 0u8..4,
        scale in 1u8..16,
    ) {
        let mut gfx = screen(5);
        gfx.draw(&format!("BM100,100 A{} S{} BR{}", quadrant, scale, distance));
        let length = (distance * scale as u32 / 4) as i16;
        let expected = match quadrant {
            0 => Point::new(100 + length, 100),
            1 => Point::new(100, 100 + length),
            2 => Point::new(100 - length, 100),
            _ => Point::new(100, 100 - length),
        };
        prop_assert_eq!(gfx.cursor(), expected);
    }

    #[test]
    fn command_writes_are_always_guarded(
        busy in 0u32..4,
        coords in prop::collection::vec((0i16..256, 0i16..212), 2..6),
    ) {
        let mut gfx = Graphics::new(SimVdp::new().with_busy_polls(busy), 5).unwrap();
        for pair in coords.windows(2) {
            let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
            gfx.line(ax, ay, bx, by, 7);
            gfx.boxfill(ax, ay, bx, by, 3);
            gfx.copy(ax, ay, 8, 8, bx, by);
        }
        prop_assert!(gfx.vdp().commands_executed() > 0);
        prop_assert_eq!(gfx.vdp().unguarded_command_writes(), 0);
    }
}

#[test]
fn hung_vdp_with_bounded_wait_abandons_commands() {
    let config = GfxConfig::default().with_wait(WaitPolicy::Bounded { polls: 8 });
    let mut gfx = Graphics::with_config(SimVdp::new(), 8, config).unwrap();
    gfx.vdp_mut().set_hung(true);

    gfx.pset(10, 10, 0x42);
    gfx.boxfill(0, 0, 20, 20, 0x11);
    assert_eq!(gfx.vdp().commands_executed(), 0);
    assert_eq!(gfx.point(10, 10), 0);

    gfx.vdp_mut().set_hung(false);
    gfx.pset(10, 10, 0x42);
    assert_eq!(gfx.point(10, 10), 0x42);
}
