//! Minimal BSP-debug viewer: top-down view of the boundary segments.
//!
//! ```bash
//! cargo run --release --bin bsp_view -- --map maps/demo.txt
//! ```
//!
//! Controls W/S = forward/back A/D = strafe ←/→ = turn Esc = quit
//!
//! Grey: every segment.  Red: splitter line of the node the player is in.
//! Yellow: that node's segments.  Pit faces are drawn blue.

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, vec2};
use log::info;
use minifb::{Key, Window, WindowOptions};
use std::path::PathBuf;

use yagrid_rs::world::{BspTree, Camera, Segment, TileGrid, extract_segments};

const WIDTH: usize = 768;
const HEIGHT: usize = 768;
const DEMO_MAP: &str = include_str!("../../maps/demo.txt");

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// ASCII map file (built-in demo map when omitted)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,
}

/*───────────────────────── drawing helpers ─────────────────────────*/

fn to_screen(v: Vec2, scale: f32, off: Vec2) -> (i32, i32) {
    (
        (v.x * scale + off.x).round() as i32,
        HEIGHT as i32 - (v.y * scale + off.y).round() as i32,
    )
}

fn draw_line(buf: &mut [u32], x0: i32, y0: i32, x1: i32, y1: i32, col: u32) {
    let mut x0 = x0;
    let mut y0 = y0;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if (0..WIDTH as i32).contains(&x0) && (0..HEIGHT as i32).contains(&y0) {
            buf[y0 as usize * WIDTH + x0 as usize] = col;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_seg(buf: &mut [u32], seg: &Segment, scale: f32, off: Vec2, col: u32) {
    let (x0, y0) = to_screen(seg.a, scale, off);
    let (x1, y1) = to_screen(seg.b, scale, off);
    draw_line(buf, x0, y0, x1, y1, col);
}

/*──────────────────────────── main ────────────────────────────────*/
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    /*----- load map -------------------------------------------------*/
    let src = match &opts.map {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => DEMO_MAP.to_owned(),
    };
    let grid = TileGrid::from_ascii(&src)?;
    let segments = extract_segments(&grid);
    let tree = BspTree::build(segments.clone());
    info!(
        "{} segments, {} nodes, depth {}",
        segments.len(),
        tree.node_count(),
        tree.depth()
    );

    /*----- viewport transform pre-calc -----------------------------*/
    let map_w = grid.size() as f32;
    let scale = (WIDTH.min(HEIGHT) as f32 / map_w) * 0.9;
    let off = vec2(
        (WIDTH as f32 - map_w * scale) * 0.5,
        (HEIGHT as f32 - map_w * scale) * 0.5,
    );

    /*----- starting position = spawn tile ---------------------------*/
    let start = grid.spawn().unwrap_or(Vec2::splat(map_w * 0.5));
    let mut camera = Camera::new(start.extend(0.0), 0.0, 90_f32.to_radians());

    /*----- window ---------------------------------------------------*/
    let mut buf = vec![0u32; WIDTH * HEIGHT];
    let mut win = Window::new("BSP viewer", WIDTH, HEIGHT, WindowOptions::default())?;
    win.set_target_fps(60);

    /*----- movement constants --------------------------------------*/
    let speed = 4.0;
    let rot = std::f32::consts::PI; // 180°/s
    let dt = 1.0 / 60.0;

    /*========================== main loop ==========================*/
    while win.is_open() && !win.is_key_down(Key::Escape) {
        /*--- input --------------------------------------------------*/
        let mut forward = 0.0;
        let mut side = 0.0;
        if win.is_key_down(Key::W) {
            forward += speed * dt;
        }
        if win.is_key_down(Key::S) {
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
        camera.step(forward, side);
        let pos = camera.pos2();

        /*--- clear --------------------------------------------------*/
        buf.fill(0x00303030);

        /*--- draw every seg ----------------------------------------*/
        for seg in &segments {
            let col = if seg.front_h < 0.0 { 0x003050A0 } else { 0x00555555 };
            draw_seg(&mut buf, seg, scale, off, col);
        }

        /*--- highlight the node we stand in ------------------------*/
        if let Some(node) = tree.locate(pos) {
            let dir = (node.split_b - node.split_a).normalize_or_zero() * map_w * 2.0;
            let (x0, y0) = to_screen(node.split_a - dir, scale, off);
            let (x1, y1) = to_screen(node.split_a + dir, scale, off);
            draw_line(&mut buf, x0, y0, x1, y1, 0x00802020);
            for seg in &node.segments {
                draw_seg(&mut buf, seg, scale, off, 0x00FFFF00);
            }
        }

        /*--- draw player + heading ---------------------------------*/
        let (px, py) = to_screen(pos, scale, off);
        for dy in -2..=2 {
            for dx in -2..=2 {
                let x = px + dx;
                let y = py + dy;
                if (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y) {
                    buf[y as usize * WIDTH + x as usize] = 0x00FFFFFF;
                }
            }
        }
        let (hx, hy) = to_screen(pos + camera.forward() * 0.6, scale, off);
        draw_line(&mut buf, px, py, hx, hy, 0x00FFFFFF);

        win.update_with_buffer(&buf, WIDTH, HEIGHT)?;
    }
    Ok(())
}
