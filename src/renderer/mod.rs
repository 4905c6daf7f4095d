//! Rendering abstraction layer.
//!
//! *The core never allocates a pixel buffer.*  The caller owns the colour
//! and depth buffers, wraps them in a [`FrameTarget`] and hands that to a
//! type implementing [`Renderer`] once per frame.
//!
//! * A helper blanket‐impl [`RendererExt`] adds `draw_frame`, which renders
//!   and then **loans** the finished buffers to a submit closure (window
//!   blit, debug overlays, …).

use serde::Deserialize;
use thiserror::Error;

use crate::world::{bsp::BspTree, camera::Camera, grid::TileGrid};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Value of a pixel no surface has written yet.  Palette colours are opaque,
/// so they never collide with it.
pub const UNPAINTED: Rgba = 0x00_000000;

/// Depth of a column no wall has claimed.
pub const DEPTH_CLEAR: f32 = f32::MAX;

/// Flat colours used by the software renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub ceiling: Rgba,
    pub floor: Rgba,
    /// walls running mostly along X
    pub wall_x: Rgba,
    /// walls running mostly along Y
    pub wall_y: Rgba,
    pub wall_top: Rgba,
    pub pit_floor: Rgba,
    pub lava: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ceiling: 0xFF_383838,
            floor: 0xFF_5A4A3A,
            wall_x: 0xFF_A0A0A0,
            wall_y: 0xFF_787878,
            wall_top: 0xFF_B4B4B4,
            pit_floor: 0xFF_202020,
            lava: 0xFF_D04010,
        }
    }
}

/// Tunables for one renderer instance, loadable from JSON.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub palette: Palette,
    /// Camera-space depth at which walls are clipped.
    pub near_clip: f32,
    /// Skip pit faces seen from outside the pit.
    pub cull_pit_faces: bool,
    /// Hide the part of a pit floor below the rim it is seen across.
    pub clip_pit_rims: bool,
}

/// Default near-plane distance (tiles).
pub const NEAR_CLIP: f32 = 0.05;

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            near_clip: NEAR_CLIP,
            cull_pit_faces: false,
            clip_pit_rims: false,
        }
    }
}

/// Caller buffers that don't match the declared resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("viewport {width}x{height} has no pixels")]
    EmptyViewport { width: usize, height: usize },

    #[error("pixel buffer holds {got} entries, expected {expected}")]
    PixelSize { got: usize, expected: usize },

    #[error("depth buffer holds {got} entries, expected {expected}")]
    DepthSize { got: usize, expected: usize },
}

/// Borrowed colour buffer (`width * height`, row-major) plus one nearest
/// depth per column (`width`).
pub struct FrameTarget<'a> {
    pixels: &'a mut [Rgba],
    depth: &'a mut [f32],
    width: usize,
    height: usize,
}

impl<'a> FrameTarget<'a> {
    pub fn new(
        pixels: &'a mut [Rgba],
        depth: &'a mut [f32],
        width: usize,
        height: usize,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyViewport { width, height });
        }
        if pixels.len() != width * height {
            return Err(FrameError::PixelSize {
                got: pixels.len(),
                expected: width * height,
            });
        }
        if depth.len() != width {
            return Err(FrameError::DepthSize {
                got: depth.len(),
                expected: width,
            });
        }
        Ok(Self {
            pixels,
            depth,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &*self.pixels
    }

    #[inline]
    pub fn depth(&self) -> &[f32] {
        &*self.depth
    }

    #[inline]
    pub fn depth_at(&self, x: usize) -> f32 {
        self.depth[x]
    }

    #[inline]
    pub fn set_depth(&mut self, x: usize, z: f32) {
        self.depth[x] = z;
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    /// Reset every pixel to [`UNPAINTED`] and every column to [`DEPTH_CLEAR`].
    pub fn clear(&mut self) {
        self.pixels.fill(UNPAINTED);
        self.depth.fill(DEPTH_CLEAR);
    }

    /// Fill column `x` between screen rows `top` and `bottom` (either order).
    /// Rows whose centre lies inside the span are painted; the span is
    /// clamped to the viewport.
    pub fn fill_column(&mut self, x: usize, top: f32, bottom: f32, colour: Rgba) {
        let (top, bottom) = if top <= bottom {
            (top, bottom)
        } else {
            (bottom, top)
        };
        let h = self.height as f32;
        let y0 = (top - 0.5).ceil().clamp(0.0, h) as usize;
        let y1 = (bottom - 0.5).ceil().clamp(0.0, h) as usize;
        for y in y0..y1 {
            self.pixels[y * self.width + x] = colour;
        }
    }

    /// Replace every still-unpainted pixel: ceiling colour in the upper
    /// half, floor colour in the lower half.
    pub fn fill_background(&mut self, palette: &Palette) {
        let half = self.height / 2;
        for (y, row) in self.pixels.chunks_exact_mut(self.width).enumerate() {
            let colour = if y < half {
                palette.ceiling
            } else {
                palette.floor
            };
            for px in row.iter_mut().filter(|px| **px == UNPAINTED) {
                *px = colour;
            }
        }
    }
}

/// A renderer drawing one complete frame into caller-owned buffers.
pub trait Renderer {
    fn render(
        &mut self,
        frame: &mut FrameTarget<'_>,
        camera: &Camera,
        grid: &TileGrid,
        tree: &BspTree,
    );
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    /// Render, then loan `(pixels, depth, width, height)` to `submit`.
    fn draw_frame<F, T>(
        &mut self,
        frame: &mut FrameTarget<'_>,
        camera: &Camera,
        grid: &TileGrid,
        tree: &BspTree,
        submit: F,
    ) -> T
    where
        F: FnOnce(&[Rgba], &[f32], usize, usize) -> T,
    {
        self.render(frame, camera, grid, tree);
        submit(frame.pixels(), frame.depth(), frame.width(), frame.height())
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;

pub use software::Software;

/*──────────────────────────────── Tests ───────────────────────────────*/
