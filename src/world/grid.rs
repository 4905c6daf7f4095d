use bitflags::bitflags;
use glam::{Vec2, vec2};
use log::warn;
use thiserror::Error;

use crate::world::geometry::{FULL_WALL_HEIGHT, TileCoord};

/// Occupancy of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Empty,
    Wall,
    Spawn,
}

bitflags! {
    /// Gameplay markers carried by a cell.  The renderer only looks at `LAVA`.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TileFlags: u8 {
        const LAVA    = 0x01;
        const SLIDING = 0x02;
        const EXIT    = 0x04;
        const ESCAPE  = 0x08;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    /// 0 = open floor, (0,1) = partial wall, 1 = full wall, < 0 = pit depth.
    pub height: f32,
    pub ceiling: f32,
    pub flags: TileFlags,
}

impl Default for Tile {
    fn default() -> Self {
        Self::floor()
    }
}

impl Tile {
    pub const fn floor() -> Self {
        Self {
            kind: TileKind::Empty,
            height: 0.0,
            ceiling: FULL_WALL_HEIGHT,
            flags: TileFlags::empty(),
        }
    }

    pub const fn wall(height: f32) -> Self {
        Self {
            kind: TileKind::Wall,
            height,
            ceiling: FULL_WALL_HEIGHT,
            flags: TileFlags::empty(),
        }
    }

    pub const fn with_flags(mut self, flags: TileFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.kind == TileKind::Wall
    }

    #[inline]
    pub fn is_pit(&self) -> bool {
        self.height < 0.0
    }
}

/// Things that can go wrong when parsing an ASCII map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("map is empty")]
    Empty,

    /// Grid must be square: every row as long as there are rows.
    #[error("row {row} has {len} tiles, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("unknown tile `{ch}` at row {row}, column {col}")]
    UnknownTile { ch: char, row: usize, col: usize },
}

/// Fixed-size square tile map.  Tile `(x, y)` covers `[x, x+1] × [y, y+1]`.
#[derive(Clone, Debug)]
pub struct TileGrid {
    size: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// `size × size` grid of open floor.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "grid must hold at least one tile");
        Self {
            size,
            tiles: vec![Tile::floor(); size * size],
        }
    }

    /// Parse the ASCII layout.  The first text row is the **north** edge
    /// (highest `y`).
    ///
    /// ```text
    /// .  floor        #  wall          =  half wall     +  low platform
    /// _  pit          ~  lava pit      D  sliding door  X  exit wall
    /// E  escape pad   S  spawn
    /// ```
    pub fn from_ascii(src: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = src
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(GridError::Empty);
        }

        let size = rows.len();
        let mut grid = Self::new(size);
        let mut spawns = 0usize;
        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != size {
                return Err(GridError::NotSquare {
                    row,
                    len,
                    expected: size,
                });
            }
            let y = (size - 1 - row) as i32;
            for (col, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '.' => Tile::floor(),
                    '#' => Tile::wall(FULL_WALL_HEIGHT),
                    '=' => Tile::wall(0.5),
                    '+' => Tile::wall(0.25),
                    '_' => Tile::wall(-0.5),
                    '~' => Tile::wall(-0.25).with_flags(TileFlags::LAVA),
                    'D' => Tile::wall(FULL_WALL_HEIGHT).with_flags(TileFlags::SLIDING),
                    'X' => Tile::wall(FULL_WALL_HEIGHT).with_flags(TileFlags::EXIT),
                    'E' => Tile::floor().with_flags(TileFlags::ESCAPE),
                    'S' => {
                        spawns += 1;
                        Tile {
                            kind: TileKind::Spawn,
                            ..Tile::floor()
                        }
                    }
                    _ => return Err(GridError::UnknownTile { ch, row, col }),
                };
                grid.set(col as i32, y, tile);
            }
        }
        if spawns > 1 {
            warn!("map has {spawns} spawn tiles, using the lowest one");
        }
        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Clamp `(x, y)` into the grid.
    #[inline]
    pub fn clamp(&self, x: i32, y: i32) -> TileCoord {
        let max = self.size as i32 - 1;
        (x.clamp(0, max), y.clamp(0, max))
    }

    /// Flat index of the clamped coordinate.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> usize {
        let (x, y) = self.clamp(x, y);
        y as usize * self.size + x as usize
    }

    /// Clamped read accessor; out-of-range coordinates read the nearest edge.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> &Tile {
        &self.tiles[self.index(x, y)]
    }

    /// Write access for map setup; out-of-range coordinates are clamped.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        let idx = self.index(x, y);
        self.tiles[idx] = tile;
    }

    /// Tile containing world point `p` (clamped).
    #[inline]
    pub fn tile_at(&self, p: Vec2) -> &Tile {
        self.tile(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Centre of the first spawn tile, scanning row by row.
    pub fn spawn(&self) -> Option<Vec2> {
        self.tiles
            .iter()
            .position(|t| t.kind == TileKind::Spawn)
            .map(|i| {
                let (x, y) = (i % self.size, i / self.size);
                vec2(x as f32 + 0.5, y as f32 + 0.5)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(i, t)| {
            (((i % self.size) as i32, (i / self.size) as i32), t)
        })
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
