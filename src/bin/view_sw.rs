//! First-person viewer for ASCII tile maps.
//!
//! ```bash
//! cargo run --release --bin view_sw -- --map maps/demo.txt
//! ```
//!
//! Controls W/S = forward/back A/D = strafe ←/→ = turn Esc = quit

use anyhow::Context;
use clap::Parser;
use log::info;
use minifb::{Key, Window, WindowOptions};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use yagrid_rs::{
    renderer::{DEPTH_CLEAR, FrameTarget, RenderConfig, RendererExt, Rgba, Software, UNPAINTED},
    world::{BspTree, Camera, TileGrid, extract_segments, slide_move},
};

const DEMO_MAP: &str = include_str!("../../maps/demo.txt");

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// ASCII map file (built-in demo map when omitted)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// JSON render config (palette, near clip)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    fov: f32,
}

fn load_grid(path: Option<&PathBuf>) -> anyhow::Result<TileGrid> {
    let src = match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => DEMO_MAP.to_owned(),
    };
    Ok(TileGrid::from_ascii(&src)?)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RenderConfig> {
    let Some(p) = path else {
        return Ok(RenderConfig::default());
    };
    let text = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", p.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let grid = load_grid(opts.map.as_ref())?;
    let config = load_config(opts.config.as_ref())?;
    let tree = BspTree::build(extract_segments(&grid));
    info!(
        "{}x{} grid, {} nodes, depth {}",
        grid.size(),
        grid.size(),
        tree.node_count(),
        tree.depth()
    );

    let start = grid
        .spawn()
        .context("map has no spawn tile ('S')")?;
    let mut camera = Camera::new(start.extend(0.0), 0.0, opts.fov.to_radians());
    let mut floor_z = 0.0;

    let (w, h) = (opts.width, opts.height);
    let mut pixels: Vec<Rgba> = vec![UNPAINTED; w * h];
    let mut depth = vec![DEPTH_CLEAR; w];
    let mut renderer = Software::new(config);

    let mut win = Window::new("Grid BSP Software Render", w, h, WindowOptions::default())?;
    win.set_target_fps(60);

    /*----- movement constants --------------------------------------*/
    let speed = 3.0; // tiles / s
    let rot = std::f32::consts::PI; // 180°/s
    let dt = 1.0 / 60.0;

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO; // cumulated render time
    let mut acc_frames = 0usize; // frames in the current window
    let mut last_print = Instant::now(); // when we printed last

    while win.is_open() && !win.is_key_down(Key::Escape) {
        /*--- input --------------------------------------------------*/
        let mut forward = 0.0;
        let mut side = 0.0;
        if win.is_key_down(Key::W) || win.is_key_down(Key::Up) {
            forward += speed * dt;
        }
        if win.is_key_down(Key::S) || win.is_key_down(Key::Down) {
            forward -= speed * dt;
        }
        if win.is_key_down(Key::A) {
            side -= speed * dt;
        }
        if win.is_key_down(Key::D) {
            side += speed * dt;
        }
        if win.is_key_down(Key::Left) {
            camera.turn(rot * dt);
        }
        if win.is_key_down(Key::Right) {
            camera.turn(-rot * dt);
        }

        let delta = camera.forward() * forward + camera.right() * side;
        let moved = slide_move(&grid, camera.pos2(), floor_z, delta);
        floor_z = moved.floor_z;
        camera.pos = moved.pos.extend(floor_z);

        /*--- draw ---------------------------------------------------*/
        let t0 = Instant::now(); // ┌─ frame timer start
        let mut frame = FrameTarget::new(&mut pixels, &mut depth, w, h)?;
        renderer.draw_frame(&mut frame, &camera, &grid, &tree, |fb, _, fw, fh| {
            // ─────────── accumulate & report every ~3 s ────────────────────
            acc_time += t0.elapsed();
            acc_frames += 1;
            win.update_with_buffer(fb, fw, fh)
        })?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            let fps = 1000.0 / avg_ms;
            info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, fps);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
