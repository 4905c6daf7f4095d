use glam::{Vec2, vec2};

use crate::{
    renderer::{FrameTarget, Palette, RenderConfig, Rgba},
    world::{
        geometry::{EPSILON, FULL_WALL_HEIGHT, TileCoord},
        grid::{Tile, TileFlags, TileGrid},
    },
};

use super::projection::View;

/// Entry depths this far past the buffered depth still pass; covers the
/// linear depth interpolation of the tile's own faces.
const SURFACE_DEPTH_SLACK: f32 = 1e-3;

/// Step back from the entry point when looking up the tile a ray came from.
const RIM_STEP_BACK: f32 = 1e-3;

/// Entry / exit ray parameters of a 2D ray through an axis-aligned box.
pub(super) fn slab(origin: Vec2, dir: Vec2, min: Vec2, max: Vec2) -> Option<(f32, f32)> {
    let mut t_in = f32::NEG_INFINITY;
    let mut t_out = f32::INFINITY;
    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], dir[axis], min[axis], max[axis]);
        if d.abs() < EPSILON {
            // parallel to this slab: inside or never
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
        if t0 > t1 {
            core::mem::swap(&mut t0, &mut t1);
        }
        t_in = t_in.max(t0);
        t_out = t_out.min(t1);
    }
    (t_out > t_in).then_some((t_in, t_out))
}

fn surface_colour(tile: &Tile, palette: &Palette) -> Rgba {
    if tile.height > 0.0 {
        palette.wall_top
    } else if tile.flags.contains(TileFlags::LAVA) {
        palette.lava
    } else {
        palette.pit_floor
    }
}

/// Draw the horizontal surface of tile `coord` (wall top or pit floor).
/// Never writes depth; skips columns where a nearer wall already stands.
pub(super) fn draw_surface(
    frame: &mut FrameTarget<'_>,
    view: &View,
    grid: &TileGrid,
    config: &RenderConfig,
    coord: TileCoord,
) {
    let tile = grid.tile(coord.0, coord.1);
    let h = tile.height;
    if h == 0.0 || h >= FULL_WALL_HEIGHT {
        return;
    }
    // seen edge-on or from underneath
    if view.eye_z <= h {
        return;
    }

    let (cx, cy) = grid.clamp(coord.0, coord.1);
    let min = vec2(cx as f32, cy as f32);
    let max = min + Vec2::ONE;
    let colour = surface_colour(tile, &config.palette);

    for x in 0..view.width {
        let dir = view.column_ray(x);
        let Some((t_in, t_out)) = slab(view.eye, dir, min, max) else {
            continue;
        };
        let entry = t_in.max(view.near);
        if t_out <= entry {
            continue;
        }
        if entry > frame.depth_at(x) + SURFACE_DEPTH_SLACK {
            continue;
        }

        let y_far = view.screen_y(h, t_out);
        let mut y_near = view.screen_y(h, entry);

        // Looking into a pit from outside: the rim we crossed hides the
        // part of the floor below it.
        if config.clip_pit_rims && h < 0.0 && t_in > view.near {
            let from = grid.tile_at(view.eye + dir * (t_in - RIM_STEP_BACK));
            let rim = if from.is_wall() { from.height } else { 0.0 };
            if rim > h {
                y_near = y_near.min(view.screen_y(rim, t_in));
            }
            if y_near <= y_far {
                continue;
            }
        }

        frame.fill_column(x, y_far, y_near, colour);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
