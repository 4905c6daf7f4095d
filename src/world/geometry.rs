use glam::{Vec2, vec2};
use smallvec::SmallVec;

/// Tolerance for lengths, positions and on-line tests (world units).
pub const EPSILON: f32 = 1e-6;

/// Height of a solid, floor-to-ceiling wall tile.
pub const FULL_WALL_HEIGHT: f32 = 1.0;

pub type TileCoord = (i32, i32);

/// Which face of its tile a segment was cut from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North, // +y
    South, // -y
    West,  // -x
    East,  // +x
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Tile offset of the neighbour this face looks at.
    #[inline]
    pub fn offset(self) -> TileCoord {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    /// North/South faces run along X.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

/// Oriented boundary piece between a wall tile and one of its neighbours.
///
/// * `a → b` is oriented so the neighbour lies on the **front** side
///   (positive cross product).
/// * `front_h` is the owning tile's height, `back_h` the neighbour's
///   (0 for open floor).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub tile_x: i32,
    pub tile_y: i32,
    pub front_h: f32,
    pub back_h: f32,
    pub dir: Direction,
}

impl Segment {
    /// Build the face `dir` of the grid line at `line`, spanning `lo..hi` along
    /// the other axis, oriented outwards.
    pub fn axis_face(
        dir: Direction,
        line: f32,
        lo: f32,
        hi: f32,
        tile: TileCoord,
        front_h: f32,
        back_h: f32,
    ) -> Self {
        let (a, b) = match dir {
            Direction::North => (vec2(lo, line), vec2(hi, line)),
            Direction::South => (vec2(hi, line), vec2(lo, line)),
            Direction::East => (vec2(line, hi), vec2(line, lo)),
            Direction::West => (vec2(line, lo), vec2(line, hi)),
        };
        Self {
            a,
            b,
            tile_x: tile.0,
            tile_y: tile.1,
            front_h,
            back_h,
            dir,
        }
    }

    /// The face `dir` of tile `(x, y)` (tile covers `[x, x+1] × [y, y+1]`).
    pub fn tile_face(dir: Direction, tile: TileCoord, front_h: f32, back_h: f32) -> Self {
        let (x, y) = (tile.0 as f32, tile.1 as f32);
        let (line, lo) = match dir {
            Direction::North => (y + 1.0, x),
            Direction::South => (y, x),
            Direction::East => (x + 1.0, y),
            Direction::West => (x, y),
        };
        Self::axis_face(dir, line, lo, lo + 1.0, tile, front_h, back_h)
    }

    #[inline]
    pub fn delta(&self) -> Vec2 {
        self.b - self.a
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.delta().length_squared()
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.delta().length()
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.a + self.b) * 0.5
    }

    /// Shorter than [`EPSILON`].
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.length() < EPSILON
    }

    /// True if the segment runs more along X than along Y.
    #[inline]
    pub fn runs_along_x(&self) -> bool {
        let d = self.delta();
        d.x.abs() >= d.y.abs()
    }

    /// Split at parameter `t` (0 = `a`, 1 = `b`).  Both halves inherit tile,
    /// heights and direction; they share the exact split point.
    pub fn split_at(&self, t: f32) -> (Segment, Segment) {
        let p = self.a + self.delta() * t;
        (Segment { b: p, ..*self }, Segment { a: p, ..*self })
    }

    /// Tiles this face borders on its owning side.  A single face yields its
    /// own tile; merged runs yield every tile along the run.
    pub fn tiles(&self) -> SmallVec<[TileCoord; 8]> {
        let mut out = SmallVec::new();
        let (lo, hi) = if self.dir.is_horizontal() {
            (self.a.x.min(self.b.x), self.a.x.max(self.b.x))
        } else {
            (self.a.y.min(self.b.y), self.a.y.max(self.b.y))
        };
        let first = (lo + EPSILON).floor() as i32;
        let last = (hi - EPSILON).ceil() as i32 - 1;
        for i in first..=last {
            if self.dir.is_horizontal() {
                out.push((i, self.tile_y));
            } else {
                out.push((self.tile_x, i));
            }
        }
        out
    }
}

/// Signed area of `p` relative to the line `a → b`: `> 0` front, `< 0` back.
#[inline(always)]
pub fn side_value(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_point_outwards() {
        let tile = (3, 5);
        let centre = vec2(3.5, 5.5);
        for dir in Direction::ALL {
            let seg = Segment::tile_face(dir, tile, 1.0, 0.0);
            let (ox, oy) = dir.offset();
            let outside = centre + vec2(ox as f32, oy as f32);
            assert!(side_value(seg.a, seg.b, outside) > 0.0, "{dir:?}");
            assert!(side_value(seg.a, seg.b, centre) < 0.0, "{dir:?}");
            assert!((seg.length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn split_reconstructs_original() {
        let seg = Segment::tile_face(Direction::North, (0, 0), 1.0, 0.0);
        let (l, r) = seg.split_at(0.25);
        assert_eq!(l.a, seg.a);
        assert_eq!(r.b, seg.b);
        assert_eq!(l.b, r.a);
        assert!((l.length() + r.length() - seg.length()).abs() < EPSILON);
    }

    #[test]
    fn merged_run_lists_every_tile() {
        let seg = Segment::axis_face(Direction::South, 2.0, 1.0, 4.0, (1, 2), 1.0, 0.0);
        assert_eq!(seg.tiles().as_slice(), &[(1, 2), (2, 2), (3, 2)]);

        let seg = Segment::axis_face(Direction::East, 6.0, 0.0, 2.0, (5, 0), 1.0, 0.0);
        assert_eq!(seg.tiles().as_slice(), &[(5, 0), (5, 1)]);
    }

    #[test]
    fn split_piece_lists_its_tile() {
        let seg = Segment::axis_face(Direction::North, 1.0, 0.0, 2.0, (0, 0), 1.0, 0.0);
        let (l, r) = seg.split_at(0.75);
        assert_eq!(l.tiles().as_slice(), &[(0, 0), (1, 0)]);
        assert_eq!(r.tiles().as_slice(), &[(1, 0)]);
    }

    #[test]
    fn degenerate_threshold_is_epsilon() {
        let mut seg = Segment::tile_face(Direction::North, (0, 0), 1.0, 0.0);
        seg.b = seg.a + vec2(EPSILON * 0.5, 0.0);
        assert!(seg.is_degenerate());
        seg.b = seg.a + vec2(EPSILON * 2.0, 0.0);
        assert!(!seg.is_degenerate());
    }
}
