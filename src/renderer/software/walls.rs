use crate::{
    renderer::{FrameTarget, RenderConfig, Rgba},
    world::{
        geometry::{FULL_WALL_HEIGHT, Segment, side_value},
        grid::TileGrid,
    },
};

use super::projection::{Edge, View, project_segment};

/// One projected wall face, ready for column filling.
#[derive(Clone, Copy, Debug)]
struct WallSpan {
    edge: Edge,
    /* screen extents at the left / right endpoint */
    y_top0: f32,
    y_top1: f32,
    y_bot0: f32,
    y_bot1: f32,
    colour: Rgba,
    /// tests and writes the depth buffer (false for pit faces)
    occludes: bool,
}

/// World-space vertical extent of a face: from the lower to the higher of
/// its two heights, full-height walls reaching up to their ceiling.
pub(super) fn wall_extent(seg: &Segment, grid: &TileGrid) -> (f32, f32) {
    let lo = seg.front_h.min(seg.back_h);
    let mut hi = seg.front_h.max(seg.back_h);
    if seg.front_h >= FULL_WALL_HEIGHT {
        hi = hi.max(grid.tile(seg.tile_x, seg.tile_y).ceiling);
    }
    (lo, hi)
}

/// A pit face is only seen from inside the pit's half-plane.
#[inline]
fn pit_face_hidden(seg: &Segment, view: &View) -> bool {
    side_value(seg.a, seg.b, view.eye) >= 0.0
}

/// Rasterise `seg` as a vertical wall.  Pit faces (negative height) are
/// drawn without touching the depth buffer.
pub(super) fn draw_wall(
    frame: &mut FrameTarget<'_>,
    view: &View,
    grid: &TileGrid,
    config: &RenderConfig,
    seg: &Segment,
) {
    if seg.front_h == 0.0 {
        return;
    }
    let occludes = seg.front_h > 0.0;
    if !occludes && config.cull_pit_faces && pit_face_hidden(seg, view) {
        return;
    }
    let Some(edge) = project_segment(seg, view) else {
        return;
    };

    let (lo, hi) = wall_extent(seg, grid);
    let colour = if seg.runs_along_x() {
        config.palette.wall_x
    } else {
        config.palette.wall_y
    };

    fill_span(
        frame,
        &WallSpan {
            edge,
            y_top0: view.screen_y(hi, edge.z_l),
            y_top1: view.screen_y(hi, edge.z_r),
            y_bot0: view.screen_y(lo, edge.z_l),
            y_bot1: view.screen_y(lo, edge.z_r),
            colour,
            occludes,
        },
    );
}

/// Column loop: interpolate depth and both screen rows by the same `t`.
fn fill_span(frame: &mut FrameTarget<'_>, span: &WallSpan) {
    let edge = &span.edge;
    for x in edge.x_l..=edge.x_r {
        let col = x as usize;
        let t = edge.t_at(x);
        let depth = edge.depth_at(t);

        if span.occludes && frame.depth_at(col) <= depth {
            continue;
        }

        let top = span.y_top0 + (span.y_top1 - span.y_top0) * t;
        let bot = span.y_bot0 + (span.y_bot1 - span.y_bot0) * t;
        frame.fill_column(col, top, bot, span.colour);

        if span.occludes {
            frame.set_depth(col, depth);
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DEPTH_CLEAR, Palette, UNPAINTED};
    use crate::world::{camera::Camera, geometry::Direction};
    use glam::{Vec3, vec2};
    use std::f32::consts::FRAC_PI_2;

    const W: usize = 40;
    const H: usize = 40;

    fn cfg() -> RenderConfig {
        RenderConfig::default()
    }

    fn view() -> View {
        let cam = Camera::new(Vec3::new(0.0, 0.5, 0.0), 0.0, FRAC_PI_2);
        View::new(&cam, W, H, 0.05)
    }

    // West face of a tile at x = 3, looking at it from the west
    fn west_face(front_h: f32, back_h: f32) -> Segment {
        Segment::tile_face(Direction::West, (3, 0), front_h, back_h)
    }

    #[test]
    fn wall_writes_depth_and_pixels() {
        let grid = TileGrid::new(8);
        let mut px = vec![UNPAINTED; W * H];
        let mut depth = vec![DEPTH_CLEAR; W];
        let mut frame = FrameTarget::new(&mut px, &mut depth, W, H).unwrap();

        draw_wall(&mut frame, &view(), &grid, &cfg(), &west_face(1.0, 0.0));

        // x = 3, y ∈ [0, 1], eye at y = 0.5 → columns 20 ± 20/6
        let covered: Vec<usize> = (0..W).filter(|&x| frame.depth_at(x) < DEPTH_CLEAR).collect();
        assert_eq!(covered, (17..=22).collect::<Vec<_>>());
        for &x in &covered {
            assert!((frame.depth_at(x) - 3.0).abs() < 1e-5);
            assert_eq!(frame.pixel(x, H / 2), Palette::default().wall_y);
        }
    }

    #[test]
    fn farther_wall_fails_depth_test() {
        let grid = TileGrid::new(8);
        let mut px = vec![UNPAINTED; W * H];
        let mut depth = vec![DEPTH_CLEAR; W];
        let mut frame = FrameTarget::new(&mut px, &mut depth, W, H).unwrap();
        let config = cfg();

        draw_wall(&mut frame, &view(), &grid, &config, &west_face(1.0, 0.0));
        let far = Segment {
            a: vec2(6.0, -10.0),
            b: vec2(6.0, 11.0),
            ..west_face(1.0, 0.0)
        };
        draw_wall(&mut frame, &view(), &grid, &config, &far);

        for x in 17..=22 {
            assert!((frame.depth_at(x) - 3.0).abs() < 1e-5);
        }
        // columns outside the near wall got the far one
        assert!((frame.depth_at(5) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn near_pit_face_paints_without_depth() {
        let grid = TileGrid::new(8);
        let mut px = vec![UNPAINTED; W * H];
        let mut depth = vec![DEPTH_CLEAR; W];
        let mut frame = FrameTarget::new(&mut px, &mut depth, W, H).unwrap();

        // west face of a pit at (2, 0), seen from outside at x = 0
        let outer = Segment::tile_face(Direction::West, (2, 0), -0.5, 0.0);
        draw_wall(&mut frame, &view(), &grid, &cfg(), &outer);

        // x = 2 → columns 20 ± 20/4, rows below the horizon
        let painted: Vec<usize> = (0..W)
            .filter(|&x| (0..H).any(|y| frame.pixel(x, y) != UNPAINTED))
            .collect();
        assert_eq!(painted, (15..=24).collect::<Vec<_>>());
        assert!((0..H / 2).all(|y| frame.pixel(W / 2, y) == UNPAINTED));
        assert!(frame.depth().iter().all(|&d| d == DEPTH_CLEAR));
    }

    #[test]
    fn pit_faces_culled_from_outside_when_enabled() {
        let grid = TileGrid::new(8);
        let mut px = vec![UNPAINTED; W * H];
        let mut depth = vec![DEPTH_CLEAR; W];
        let mut frame = FrameTarget::new(&mut px, &mut depth, W, H).unwrap();
        let culling = RenderConfig {
            cull_pit_faces: true,
            ..cfg()
        };

        let outer = Segment::tile_face(Direction::West, (2, 0), -0.5, 0.0);
        draw_wall(&mut frame, &view(), &grid, &culling, &outer);
        assert!(frame.pixels().iter().all(|&p| p == UNPAINTED));

        // far face seen from across the pit: painted, depth untouched
        let inner = Segment::tile_face(Direction::East, (2, 0), -0.5, 0.0);
        draw_wall(&mut frame, &view(), &grid, &culling, &inner);
        assert!(frame.pixels().iter().any(|&p| p != UNPAINTED));
        assert!(frame.depth().iter().all(|&d| d == DEPTH_CLEAR));
    }

    #[test]
    fn full_wall_reaches_ceiling() {
        let mut grid = TileGrid::new(4);
        let mut tile = crate::world::grid::Tile::wall(1.0);
        tile.ceiling = 1.5;
        grid.set(1, 1, tile);
        let seg = Segment::tile_face(Direction::North, (1, 1), 1.0, 0.0);
        assert_eq!(wall_extent(&seg, &grid), (0.0, 1.5));

        let step = Segment::tile_face(Direction::North, (1, 1), 0.5, -0.5);
        assert_eq!(wall_extent(&step, &grid), (-0.5, 0.5));
    }
}
