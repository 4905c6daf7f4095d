//! Grid walking for the viewers: axis-separated slide against blocking
//! tiles, stepping onto low platforms and dropping into pits.

use glam::{Vec2, vec2};

use crate::world::{
    geometry::FULL_WALL_HEIGHT,
    grid::{Tile, TileGrid},
};

/// Highest rise the walker climbs without being blocked (tiles).
pub const MAX_STEP_HEIGHT: f32 = 0.3;
/// Half-width of the walker's square footprint.
pub const WALKER_RADIUS: f32 = 0.2;
const SLICE_COUNT: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveResult {
    pub pos: Vec2,
    /// height of the floor the walker now stands on
    pub floor_z: f32,
    pub hit_wall: bool,
}

/// Height a walker standing on `tile` rests at.
#[inline]
pub fn standing_height(tile: &Tile) -> f32 {
    if tile.is_wall() { tile.height } else { 0.0 }
}

/// Highest floor under the footprint centred at `p`, or `None` if any
/// corner is inside a full-height wall.
pub fn floor_under(grid: &TileGrid, p: Vec2) -> Option<f32> {
    let r = WALKER_RADIUS;
    let mut floor = f32::NEG_INFINITY;
    for corner in [vec2(-r, -r), vec2(r, -r), vec2(-r, r), vec2(r, r)] {
        let tile = grid.tile_at(p + corner);
        if tile.is_wall() && tile.height >= FULL_WALL_HEIGHT {
            return None;
        }
        floor = floor.max(standing_height(tile));
    }
    Some(floor)
}

fn try_move(grid: &TileGrid, floor_z: f32, dest: Vec2) -> Option<f32> {
    floor_under(grid, dest).filter(|&f| f - floor_z <= MAX_STEP_HEIGHT)
}

/// Move `delta` from `pos` in quarter slices; a blocked slice retries each
/// axis alone so the walker glides along walls.
pub fn slide_move(grid: &TileGrid, pos: Vec2, floor_z: f32, delta: Vec2) -> MoveResult {
    let slice = delta / SLICE_COUNT as f32;
    let mut pos = pos;
    let mut floor_z = floor_z;
    let mut hit_wall = false;

    for _ in 0..SLICE_COUNT {
        let candidates = [pos + slice, pos + vec2(slice.x, 0.0), pos + vec2(0.0, slice.y)];
        let mut moved = false;
        for (i, dest) in candidates.into_iter().enumerate() {
            if let Some(f) = try_move(grid, floor_z, dest) {
                hit_wall |= i > 0;
                pos = dest;
                floor_z = f;
                moved = true;
                break;
            }
        }
        if !moved {
            hit_wall = true;
        }
    }

    MoveResult {
        pos,
        floor_z,
        hit_wall,
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
