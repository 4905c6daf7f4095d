use glam::{Vec2, Vec3, vec2};

/// Player view-point in world space.
///
/// * Only **yaw** (heading) is simulated – the view never tilts up/down.
/// * `pos.z` is the height the player stands on; the eye sits
///   `eye_offset` above it.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vec3,       // x,y in tiles; z = floor height under the player
    pub yaw: f32,        // radians (0 = east, counter-clockwise)
    pub fov: f32,        // horizontal FoV (radians)
    pub eye_offset: f32, // eye height above `pos.z`
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`, with horizontal FoV `fov`.
    pub fn new(pos: Vec3, yaw: f32, fov: f32) -> Self {
        Self {
            pos,
            yaw,
            fov,
            eye_offset: 0.5,
        }
    }

    pub fn with_eye_offset(mut self, eye_offset: f32) -> Self {
        self.eye_offset = eye_offset;
        self
    }

    /// World-space height of the eye.
    #[inline]
    pub fn eye_z(&self) -> f32 {
        self.pos.z + self.eye_offset
    }

    /// Position on the map plane.
    #[inline]
    pub fn pos2(&self) -> Vec2 {
        self.pos.truncate()
    }

    /// Transform an X–Y point `p` into camera‐local coords:
    ///  .x = lateral offset (+ right)
    ///  .y = depth along forward axis
    #[inline]
    pub fn to_cam(&self, p: Vec2) -> Vec2 {
        let d = p - self.pos2();
        vec2(d.dot(self.right()), d.dot(self.forward()))
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s) // 0 rad = +X (east), CCW positive
    }

    /// Unit vector pointing to the camera's right on the X-Y plane.
    #[inline(always)]
    pub fn right(&self) -> Vec2 {
        // forward rotated by -90°
        let f = self.forward();
        Vec2::new(f.y, -f.x)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe), preserving height.
    pub fn step(&mut self, forward: f32, side: f32) {
        let delta = self.forward() * forward + self.right() * side;
        self.pos.x += delta.x;
        self.pos.y += delta.y;
    }

    /// Rotate around Z-axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    /*───────────────── projection helpers ───────────────────────────*/

    /// Pixel-per-unit scale for viewport width `w`.
    ///
    /// ```text
    /// focal = w / (2 * tan(fov/2))      // = w/2 at 90°
    /// ```
    #[inline]
    pub fn screen_scale(&self, w: usize) -> f32 {
        (w as f32) * 0.5 / (self.fov * 0.5).tan()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn forward_and_right_are_orthonormal() {
        let cam = Camera::new(Vec3::ZERO, 0.3, 1.57);
        let f = cam.forward();
        let r = cam.right();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((f.dot(r)).abs() < 1e-5);
        // right-handed: right is clockwise from forward
        assert!(f.perp_dot(r) < 0.0);
    }

    #[test]
    fn screen_scale_at_90_deg() {
        let cam = Camera::new(Vec3::ZERO, 0.0, FRAC_PI_2);
        assert!((cam.screen_scale(640) - 320.0).abs() < 1e-3);
    }

    #[test]
    fn to_cam_axes_align() {
        let cam = Camera::new(Vec3::ZERO, 0.0, FRAC_PI_2);
        // Point straight ahead at (10, 0) → (lateral=0, forward=10)
        assert!((cam.to_cam(vec2(10.0, 0.0)) - vec2(0.0, 10.0)).length() < 1e-5);
        // Facing east, -Y is on the right
        assert!((cam.to_cam(vec2(0.0, -5.0)) - vec2(5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn to_cam_rotated_yaw() {
        let cam = Camera::new(Vec3::ZERO, FRAC_PI_2, FRAC_PI_2);
        // Yaw = 90°: forward is +Y; (0,10) → (lateral=0, forward=10)
        assert!((cam.to_cam(vec2(0.0, 10.0)) - vec2(0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn step_and_turn() {
        let mut cam = Camera::new(Vec3::new(1.0, 1.0, 0.0), 0.0, FRAC_PI_2);
        cam.step(2.0, 1.0);
        assert!((cam.pos2() - vec2(3.0, 0.0)).length() < 1e-5);
        cam.turn(-FRAC_PI_2);
        assert!((cam.yaw - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert!((cam.eye_z() - 0.5).abs() < 1e-6);
    }
}
