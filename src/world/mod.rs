pub mod bsp;
pub mod camera;
pub mod geometry;
pub mod grid;
pub mod movement;
pub mod segments;

pub use bsp::{BspNode, BspTree, Classified, Side, classify};
pub use camera::Camera;
pub use geometry::{Direction, EPSILON, FULL_WALL_HEIGHT, Segment, TileCoord, side_value};
pub use grid::{GridError, Tile, TileFlags, TileGrid, TileKind};
pub use movement::{MoveResult, slide_move};
pub use segments::extract_segments;
