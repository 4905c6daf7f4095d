//! ---------------------------------------------------------------------------
//! Software (CPU) column renderer
//!
//! * Fills a caller-owned `&mut [u32]` frame-buffer in **0xAARRGGBB** format.
//! * Walks the BSP **back-to-front** (far side, node, near side) so nearer
//!   walls overwrite farther ones; a per-column depth buffer rejects walls
//!   hidden behind nearer opaque ones.
//! * Pits never occlude: their faces skip the depth buffer entirely and rely
//!   on the traversal order alone.
//!
//! Scratch (per-tile drawn flags, pit neighbourhood) is sized to the grid and
//! rebuilt every frame; nothing else survives between frames.
//! ---------------------------------------------------------------------------

mod planes;
mod projection;
mod renderer;
mod walls;

pub use projection::{Edge, View, project_segment};

use crate::{renderer::RenderConfig, world::grid::TileGrid};

/// Chebyshev radius around a pit inside which tiles are always redrawn.
const PIT_RING: i32 = 2;

#[derive(Default)]
pub struct Software {
    pub config: RenderConfig,
    /// horizontal surface already drawn this frame
    drawn: Vec<bool>,
    /// within [`PIT_RING`] of a pit tile
    near_pit: Vec<bool>,
}

impl Software {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Reset the per-tile scratch for `grid`.
    fn begin_frame(&mut self, grid: &TileGrid) {
        let n = grid.size() * grid.size();
        self.drawn.clear();
        self.drawn.resize(n, false);
        self.near_pit.clear();
        self.near_pit.resize(n, false);

        for ((x, y), tile) in grid.iter() {
            if !tile.is_pit() {
                continue;
            }
            for dy in -PIT_RING..=PIT_RING {
                for dx in -PIT_RING..=PIT_RING {
                    self.near_pit[grid.index(x + dx, y + dy)] = true;
                }
            }
        }
    }

    /// Claim tile `(x, y)` for its horizontal surface.  Returns false if it
    /// was drawn already this frame and isn't next to a pit.
    fn claim_tile(&mut self, grid: &TileGrid, x: i32, y: i32) -> bool {
        let idx = grid.index(x, y);
        if self.drawn[idx] && !self.near_pit[idx] {
            return false;
        }
        self.drawn[idx] = true;
        true
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
