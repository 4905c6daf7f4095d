use glam::Vec2;

use crate::world::{camera::Camera, geometry::EPSILON, geometry::Segment};

/// Per-frame projection constants shared by every raster unit.
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub width: usize,
    pub height: usize,
    pub width_f: f32,
    pub half_w: f32,
    pub half_h: f32,
    pub focal: f32,
    pub eye: Vec2,
    pub eye_z: f32,
    pub forward: Vec2,
    pub right: Vec2,
    pub near: f32,
    camera: Camera,
}

impl View {
    pub fn new(camera: &Camera, width: usize, height: usize, near: f32) -> Self {
        Self {
            width,
            height,
            width_f: width as f32,
            half_w: width as f32 * 0.5,
            half_h: height as f32 * 0.5,
            focal: camera.screen_scale(width),
            eye: camera.pos2(),
            eye_z: camera.eye_z(),
            forward: camera.forward(),
            right: camera.right(),
            near,
            camera: *camera,
        }
    }

    /// World point → camera space (`.x` lateral, `.y` depth).
    #[inline]
    pub fn to_cam(&self, p: Vec2) -> Vec2 {
        self.camera.to_cam(p)
    }

    /// Pinhole projection of a camera-space point to screen X.
    #[inline]
    pub fn screen_x(&self, p: Vec2) -> f32 {
        self.half_w + p.x * self.focal / p.y
    }

    /// Screen Y of world height `z` seen at camera depth `depth`.
    #[inline]
    pub fn screen_y(&self, z: f32, depth: f32) -> f32 {
        self.half_h - (z - self.eye_z) * self.focal / depth
    }

    /// World-space direction of the ray through the centre of column `x`,
    /// scaled so its forward component is 1 (ray parameter = depth).
    #[inline]
    pub fn column_ray(&self, x: usize) -> Vec2 {
        let lateral = (x as f32 + 0.5 - self.half_w) / self.focal;
        self.forward + self.right * lateral
    }
}

/// A segment after near clipping and projection, ordered left → right.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    /// first / last screen column whose centre the edge covers
    pub x_l: i32,
    pub x_r: i32,
    /// projected screen X of both endpoints
    pub sx_l: f32,
    pub sx_r: f32,
    /// camera-space depth of both endpoints
    pub z_l: f32,
    pub z_r: f32,
}

impl Edge {
    /// Interpolation parameter of column `x` between the two endpoints.
    #[inline]
    pub fn t_at(&self, x: i32) -> f32 {
        let span = self.sx_r - self.sx_l;
        if span < EPSILON {
            return 0.0;
        }
        ((x as f32 + 0.5 - self.sx_l) / span).clamp(0.0, 1.0)
    }

    /// Linear (screen-space) depth at parameter `t`.
    #[inline]
    pub fn depth_at(&self, t: f32) -> f32 {
        self.z_l + (self.z_r - self.z_l) * t
    }
}

/// Clip and project `seg`.  `None` when it's behind the near plane, off
/// screen, or narrower than a column centre.
pub fn project_segment(seg: &Segment, view: &View) -> Option<Edge> {
    // ──────────────────────────────────────────────────────────────────────
    // 1. camera-space endpoints
    // ──────────────────────────────────────────────────────────────────────
    let mut p1 = view.to_cam(seg.a);
    let mut p2 = view.to_cam(seg.b);

    // ──────────────────────────────────────────────────────────────────────
    // 2. near-plane clip
    // ──────────────────────────────────────────────────────────────────────
    if !clip_near(&mut p1, &mut p2, view.near) {
        return None;
    }

    // ──────────────────────────────────────────────────────────────────────
    // 3. screen-x mapping, forced left-to-right
    // ──────────────────────────────────────────────────────────────────────
    let sx1 = view.screen_x(p1);
    let sx2 = view.screen_x(p2);
    let (sx_l, sx_r, z_l, z_r) = if sx1 <= sx2 {
        (sx1, sx2, p1.y, p2.y)
    } else {
        (sx2, sx1, p2.y, p1.y)
    };

    // Entirely to the left OR right of the viewport?
    if sx_r < 0.0 || sx_l > view.width_f {
        return None;
    }

    // ──────────────────────────────────────────────────────────────────────
    // 4. columns whose centres fall inside [sx_l, sx_r), clamped
    // ──────────────────────────────────────────────────────────────────────
    let x_l = (sx_l - 0.5).ceil().max(0.0) as i32;
    let x_r = ((sx_r - 0.5).ceil() - 1.0).min(view.width_f - 1.0) as i32;
    if x_l > x_r {
        return None;
    }

    Some(Edge {
        x_l,
        x_r,
        sx_l,
        sx_r,
        z_l,
        z_r,
    })
}

/// Clip a segment to the near plane. Returns false if completely behind.
fn clip_near(p1: &mut Vec2, p2: &mut Vec2, near: f32) -> bool {
    if p1.y <= near && p2.y <= near {
        return false;
    }
    if p1.y < near {
        let t = (near - p1.y) / (p2.y - p1.y);
        *p1 += (*p2 - *p1) * t;
        p1.y = near;
    }
    if p2.y < near {
        let t = (near - p2.y) / (p1.y - p2.y);
        *p2 += (*p1 - *p2) * t;
        p2.y = near;
    }
    true
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::Direction;
    use assert_approx_eq::assert_approx_eq;
    use glam::{Vec3, vec2};
    use std::f32::consts::FRAC_PI_2;

    fn view_east(w: usize) -> View {
        // at origin, looking +X
        View::new(&Camera::new(Vec3::ZERO, 0.0, FRAC_PI_2), w, w, 0.05)
    }

    fn wall(a: Vec2, b: Vec2) -> Segment {
        Segment {
            a,
            b,
            tile_x: 0,
            tile_y: 0,
            front_h: 1.0,
            back_h: 0.0,
            dir: Direction::West,
        }
    }

    #[test]
    fn facing_wall_spans_expected_columns() {
        // wall at x = 2 from y = -1 .. 1 → camera x ±1 at depth 2
        let view = view_east(100);
        let edge = project_segment(&wall(vec2(2.0, -1.0), vec2(2.0, 1.0)), &view).unwrap();
        assert_approx_eq!(edge.sx_l, 25.0, 1e-4);
        assert_approx_eq!(edge.sx_r, 75.0, 1e-4);
        assert_eq!((edge.x_l, edge.x_r), (25, 74));
        assert_approx_eq!(edge.z_l, 2.0, 1e-5);
        assert_approx_eq!(edge.z_r, 2.0, 1e-5);
    }

    #[test]
    fn behind_camera_is_skipped() {
        let view = view_east(100);
        assert!(project_segment(&wall(vec2(-2.0, -1.0), vec2(-2.0, 1.0)), &view).is_none());
        // exactly on the near plane counts as behind
        assert!(project_segment(&wall(vec2(0.05, -1.0), vec2(0.05, 1.0)), &view).is_none());
    }

    #[test]
    fn crossing_near_plane_is_clipped() {
        let view = view_east(100);
        let edge = project_segment(&wall(vec2(-1.0, 1.0), vec2(3.0, 1.0)), &view).unwrap();
        // left endpoint (y=+1 is left when facing east) is clipped to near
        assert_approx_eq!(edge.z_l.min(edge.z_r), 0.05, 1e-5);
        assert_eq!(edge.x_l, 0);
    }

    #[test]
    fn zero_width_span_does_not_divide() {
        let edge = Edge {
            x_l: 3,
            x_r: 3,
            sx_l: 3.2,
            sx_r: 3.2,
            z_l: 1.0,
            z_r: 4.0,
        };
        assert_eq!(edge.t_at(3), 0.0);
        assert_eq!(edge.depth_at(edge.t_at(3)), 1.0);
    }

    #[test]
    fn column_ray_has_unit_forward_component() {
        let view = view_east(64);
        for x in [0, 31, 63] {
            let d = view.column_ray(x);
            assert_approx_eq!(d.dot(view.forward), 1.0, 1e-6);
        }
    }
}
