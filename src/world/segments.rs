//! Tile grid → boundary segments.
//!
//! Every wall cell contributes one face per exposed side; collinear faces
//! on the same grid line are then merged into maximal runs so the BSP
//! builder starts from as few segments as possible.

use std::collections::BTreeMap;

use log::debug;

use crate::world::geometry::{Direction, EPSILON, Segment, TileCoord};
use crate::world::grid::TileGrid;

/// Faces sharing one of these can be merged: same grid line, same facing,
/// same heights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RunKey {
    dir: Direction,
    line: i32,
    front_bits: u32,
    back_bits: u32,
}

/// One interval along a grid line.
#[derive(Clone, Copy, Debug)]
struct Run {
    lo: f32,
    hi: f32,
    tile: TileCoord,
}

/// Derive the merged boundary of every wall tile in `grid`.
pub fn extract_segments(grid: &TileGrid) -> Vec<Segment> {
    let faces = collect_faces(grid);
    let face_count = faces.len();

    let (horizontal, vertical): (Vec<Segment>, Vec<Segment>) =
        faces.into_iter().partition(|s| s.dir.is_horizontal());

    let mut out = merge_runs(horizontal);
    out.extend(merge_runs(vertical));

    debug!(
        "extracted {} faces from {}x{} grid, {} segments after merge",
        face_count,
        grid.size(),
        grid.size(),
        out.len()
    );
    out
}

/// One unit face per exposed side of each wall cell.
fn collect_faces(grid: &TileGrid) -> Vec<Segment> {
    let mut faces = Vec::new();
    for ((x, y), tile) in grid.iter() {
        if !tile.is_wall() {
            continue;
        }
        for dir in Direction::ALL {
            let (dx, dy) = dir.offset();
            let (nx, ny) = (x + dx, y + dy);
            // the clamped accessor would fold off-grid neighbours back onto
            // the edge row; the map border faces outwards and is never seen
            if grid.clamp(nx, ny) != (nx, ny) {
                continue;
            }
            let neighbour = grid.tile(nx, ny);
            // open space, or a raised neighbour (of any height) across the seam
            let exposed = !neighbour.is_wall() || neighbour.height > 0.0;
            if !exposed {
                continue;
            }
            let back_h = if neighbour.is_wall() {
                neighbour.height
            } else {
                0.0
            };
            faces.push(Segment::tile_face(dir, (x, y), tile.height, back_h));
        }
    }
    faces
}

/// Coalesce touching/overlapping collinear faces into maximal runs.
fn merge_runs(faces: Vec<Segment>) -> Vec<Segment> {
    let mut lines: BTreeMap<RunKey, Vec<Run>> = BTreeMap::new();
    for seg in faces {
        let (line, lo, hi) = if seg.dir.is_horizontal() {
            (seg.a.y, seg.a.x.min(seg.b.x), seg.a.x.max(seg.b.x))
        } else {
            (seg.a.x, seg.a.y.min(seg.b.y), seg.a.y.max(seg.b.y))
        };
        let key = RunKey {
            dir: seg.dir,
            line: line.round() as i32,
            front_bits: seg.front_h.to_bits(),
            back_bits: seg.back_h.to_bits(),
        };
        lines.entry(key).or_default().push(Run {
            lo,
            hi,
            tile: (seg.tile_x, seg.tile_y),
        });
    }

    let mut out = Vec::new();
    for (key, mut runs) in lines {
        runs.sort_by(|l, r| l.lo.total_cmp(&r.lo));

        let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
        for run in runs {
            match merged.last_mut() {
                Some(cur) if run.lo <= cur.hi + EPSILON => {
                    cur.hi = cur.hi.max(run.hi);
                }
                _ => merged.push(run),
            }
        }

        let front_h = f32::from_bits(key.front_bits);
        let back_h = f32::from_bits(key.back_bits);
        out.extend(merged.into_iter().map(|run| {
            Segment::axis_face(
                key.dir,
                key.line as f32,
                run.lo,
                run.hi,
                run.tile,
                front_h,
                back_h,
            )
        }));
    }
    out
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
