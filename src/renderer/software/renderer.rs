use log::trace;

use crate::{
    renderer::{FrameTarget, Renderer},
    world::{bsp::BspTree, camera::Camera, grid::TileGrid},
};

use super::{Software, planes::draw_surface, projection::View, walls::draw_wall};

impl Renderer for Software {
    fn render(
        &mut self,
        frame: &mut FrameTarget<'_>,
        camera: &Camera,
        grid: &TileGrid,
        tree: &BspTree,
    ) {
        frame.clear();
        self.begin_frame(grid);

        let config = self.config;
        let view = View::new(camera, frame.width(), frame.height(), config.near_clip);

        let mut nodes = 0usize;
        tree.walk(view.eye, |node| {
            nodes += 1;

            // pass 1: vertical faces
            for seg in node.segments.iter().filter(|s| s.front_h != 0.0) {
                draw_wall(frame, &view, grid, &config, seg);
            }

            // pass 2: horizontal surfaces of the tiles owning these faces
            for seg in &node.segments {
                for (x, y) in seg.tiles() {
                    if self.claim_tile(grid, x, y) {
                        draw_surface(frame, &view, grid, &config, (x, y));
                    }
                }
            }
        });

        frame.fill_background(&config.palette);
        trace!("frame: {nodes} nodes walked");
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DEPTH_CLEAR, Palette, RenderConfig, Rgba, UNPAINTED};
    use crate::world::{
        grid::Tile,
        segments::extract_segments,
    };
    use glam::Vec3;
    use std::f32::consts::FRAC_PI_2;

    const W: usize = 40;
    const H: usize = 40;

    struct Frame {
        pixels: Vec<Rgba>,
        depth: Vec<f32>,
    }

    fn render(grid: &TileGrid, camera: &Camera) -> Frame {
        let tree = BspTree::build(extract_segments(grid));
        let mut pixels = vec![UNPAINTED; W * H];
        let mut depth = vec![DEPTH_CLEAR; W];
        let mut sw = Software::new(RenderConfig::default());
        let mut frame = FrameTarget::new(&mut pixels, &mut depth, W, H).unwrap();
        sw.render(&mut frame, camera, grid, &tree);
        Frame { pixels, depth }
    }

    fn east_camera(x: f32, y: f32) -> Camera {
        Camera::new(Vec3::new(x, y, 0.0), 0.0, FRAC_PI_2)
    }

    fn covered(f: &Frame) -> Vec<usize> {
        (0..W).filter(|&x| f.depth[x] < DEPTH_CLEAR).collect()
    }

    #[test]
    fn empty_tree_gives_background_only() {
        let grid = TileGrid::new(4);
        let tree = BspTree::default();
        let mut pixels = vec![0xFF_FFFFFF; W * H];
        let mut depth = vec![0.0; W];
        let mut frame = FrameTarget::new(&mut pixels, &mut depth, W, H).unwrap();
        Software::default().render(&mut frame, &east_camera(1.5, 1.5), &grid, &tree);

        let pal = Palette::default();
        for y in 0..H {
            let expected = if y < H / 2 { pal.ceiling } else { pal.floor };
            assert!((0..W).all(|x| frame.pixel(x, y) == expected));
        }
        assert!(frame.depth().iter().all(|&d| d == DEPTH_CLEAR));
    }

    #[test]
    fn single_tile_wall_spans_its_projection() {
        let mut grid = TileGrid::new(5);
        grid.set(2, 2, Tile::wall(1.0));
        let f = render(&grid, &east_camera(0.5, 2.5));

        // west face at x = 2, 1.5 ahead, ±0.5 across; focal 20
        // → screen x 13.33 .. 26.67
        assert_eq!(covered(&f), (13..=26).collect::<Vec<_>>());
        for x in 13..=26 {
            assert!((f.depth[x] - 1.5).abs() < 1e-4, "column {x}: {}", f.depth[x]);
        }
        assert_eq!(f.pixels[(H / 2) * W + W / 2], Palette::default().wall_y);
    }

    #[test]
    fn every_pixel_is_painted() {
        let grid = TileGrid::from_ascii(
            "
            ########
            #......#
            #.=..+.#
            #..__..#
            #..~...#
            #.S..#.#
            #......#
            ########
            ",
        )
        .unwrap();
        let spawn = grid.spawn().unwrap();
        for yaw in [0.0, 0.7, 1.9, 3.0, 4.4, 5.8] {
            let cam = Camera::new(spawn.extend(0.0), yaw, FRAC_PI_2);
            let f = render(&grid, &cam);
            assert!(f.pixels.iter().all(|&p| p != UNPAINTED), "yaw {yaw}");
        }
    }

    #[test]
    fn rendering_twice_is_identical() {
        let grid = TileGrid::from_ascii(
            "
            ######
            #....#
            #.=_.#
            #....#
            #S...#
            ######
            ",
        )
        .unwrap();
        let cam = Camera::new(Vec3::new(1.5, 1.5, 0.0), 0.8, FRAC_PI_2);
        let tree = BspTree::build(extract_segments(&grid));
        let mut sw = Software::default();

        let mut first = (vec![UNPAINTED; W * H], vec![DEPTH_CLEAR; W]);
        let mut frame = FrameTarget::new(&mut first.0, &mut first.1, W, H).unwrap();
        sw.render(&mut frame, &cam, &grid, &tree);

        let mut second = (vec![UNPAINTED; W * H], vec![DEPTH_CLEAR; W]);
        let mut frame = FrameTarget::new(&mut second.0, &mut second.1, W, H).unwrap();
        sw.render(&mut frame, &cam, &grid, &tree);

        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn pit_does_not_hide_wall_behind_it() {
        let mut grid = TileGrid::new(7);
        grid.set(2, 3, Tile::wall(-0.5));
        grid.set(5, 3, Tile::wall(1.0));
        let f = render(&grid, &east_camera(0.5, 3.5));

        // far wall keeps its own depth through the pit
        let centre = W / 2;
        assert!((f.depth[centre] - 4.5).abs() < 1e-4, "{}", f.depth[centre]);
        assert_eq!(f.pixels[(H / 2) * W + centre], Palette::default().wall_y);
        // only the far wall's columns hold a depth
        assert!(covered(&f).iter().all(|&x| (f.depth[x] - 4.5).abs() < 0.6));
    }

    #[test]
    fn nearer_wall_wins_the_column() {
        let mut grid = TileGrid::new(7);
        grid.set(2, 3, Tile::wall(1.0));
        grid.set(5, 3, Tile::wall(1.0));
        let f = render(&grid, &east_camera(0.5, 3.5));

        let centre = W / 2;
        assert!((f.depth[centre] - 1.5).abs() < 1e-4);
        assert!(f.depth.iter().all(|&d| d >= 1.5 - 1e-4));
    }
}
