use clap::ValueEnum;
use msxgfx::{Graphics, LineStyle, RasterOp, SimVdp};
use tracing::{debug, warn};

/// House outline drawn from its bottom-left corner: walls, roof, door, eaves.
const HOUSE: &str = "C15 R60 U40 H30 G30 D40 BM+25,0 U16 R10 D16 BM90,130 R60";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scene {
    /// Lines, boxes, circles, arcs and ellipses
    Shapes,
    /// A DRAW string house, painted in
    House,
    /// Flood fill into concave regions
    Paint,
    /// GET/PUT raster operations and page copies
    Blocks,
}

impl Scene {
    pub fn render(&self, gfx: &mut Graphics<SimVdp>) {
        match self {
            Scene::Shapes => shapes(gfx),
            Scene::House => house(gfx),
            Scene::Paint => paint(gfx),
            Scene::Blocks => blocks(gfx),
        }
    }
}

fn shapes(gfx: &mut Graphics<SimVdp>) {
    gfx.set_palette(14, 7, 3, 0);

    for i in 0..8i16 {
        gfx.line(8, 8 + i * 6, 90, 60 - i * 6, (i + 1) as u8);
    }
    gfx.line_styled(100, 10, 150, 60, 10, LineStyle::Box);
    gfx.line_styled(110, 20, 140, 50, 12, LineStyle::BoxFill);
    gfx.line_step(30, -20, 6, LineStyle::Line);

    gfx.circle(200, 40, 30, 15);
    gfx.circle_fill(200, 40, 12, 9);
    gfx.circle_arc(60, 130, 40, 14, 0, 90, 100);
    gfx.circle_arc(60, 130, 40, 11, 180, 270, 50);
    gfx.ellipse(180, 140, 50, 20, 13);
    gfx.ellipse_fill(180, 140, 30, 8, 7);
}

fn house(gfx: &mut Graphics<SimVdp>) {
    gfx.move_to(90, 170);
    gfx.draw(HOUSE);
    debug!("house drawn, pen at {:?}", gfx.cursor());

    gfx.paint(100, 150, 8, 15);
    gfx.paint(120, 110, 6, 15);

    // sun
    gfx.circle(220, 30, 14, 10);
    gfx.paint_solid(220, 30, 10);
}

fn paint(gfx: &mut Graphics<SimVdp>) {
    gfx.r#box(20, 20, 236, 190, 15);
    for x in (40..236).step_by(24) {
        gfx.line(x, 20, x, 170, 15);
        gfx.line(x + 12, 40, x + 12, 190, 15);
    }
    gfx.paint(25, 100, 3, 15);
}

fn blocks(gfx: &mut Graphics<SimVdp>) {
    gfx.boxfill(10, 10, 41, 41, 5);
    gfx.circle_fill(25, 25, 12, 11);
    let tile = gfx.capture(10, 10, 41, 41);

    for (i, op) in [RasterOp::Pset, RasterOp::And, RasterOp::Or, RasterOp::Xor, RasterOp::Preset].into_iter().enumerate() {
        let x = 60 + i as i16 * 36;
        gfx.boxfill(x, 60, x + 31, 91, 6);
        if let Err(e) = gfx.paste(x, 60, &tile, op) {
            warn!("paste {:?} failed: {}", op, e);
        }
    }

    if gfx.mode().is_bitmap() {
        gfx.copy(60, 60, 176, 32, 60, 110);
        gfx.set_page(0, 1);
        gfx.boxfill(0, 0, 40, 40, 13);
        gfx.copy_page(0, 0, 41, 41, 1, 200, 150, 0);
        gfx.set_page(0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(number: u8) -> Graphics<SimVdp> {
        let mut gfx = Graphics::new(SimVdp::new(), number).unwrap();
        gfx.clear();
        gfx
    }

    #[test]
    fn house_is_painted_inside_its_outline() {
        let mut gfx = screen(5);
        Scene::House.render(&mut gfx);
        assert_eq!(gfx.point(100, 150), 8);
        assert_eq!(gfx.point(120, 135), 8);
        assert_eq!(gfx.point(120, 110), 6);
        assert_eq!(gfx.point(80, 150), 4);
        // the door is its own region
        assert_eq!(gfx.point(120, 160), 4);
    }

    #[test]
    fn blocks_copy_across_pages() {
        let mut gfx = screen(8);
        Scene::Blocks.render(&mut gfx);
        assert_eq!(gfx.point(200, 150), 13);
        assert_eq!(gfx.point(60, 110), gfx.point(60, 60));
    }

    #[test]
    fn every_scene_renders_in_pattern_and_bitmap_modes() {
        for number in [2, 5, 8] {
            for scene in Scene::value_variants() {
                let mut gfx = screen(number);
                scene.render(&mut gfx);
                assert!(gfx.vdp().render_rgba().is_some());
                assert_eq!(gfx.vdp().unguarded_command_writes(), 0);
            }
        }
    }
}
