use glam::Vec2;

use crate::collision::can_occupy;
use crate::raycast::Ray;
use crate::world::GridMap;

/// Player speeds, in tiles per second and radians per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub move_speed: f32,
    pub rotate_speed: f32,
}

/// Per-frame intents, each in {-1, 0, +1}.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    pub forward: f32,
    pub rotate: f32,
    pub focused: bool,
}

impl FrameInput {
    /// `positive` wins when both are held.
    pub fn intent(negative: bool, positive: bool) -> f32 {
        if positive {
            1.0
        } else if negative {
            -1.0
        } else {
            0.0
        }
    }
}

/// Player position plus the view basis. `plane` stays perpendicular to
/// `direction` since the only mutation rotates both by the same angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub footprint: Vec2,
    direction: Vec2,
    plane: Vec2,
}

impl Camera {
    pub fn new(position: Vec2, direction: Vec2, plane: Vec2, footprint: Vec2) -> Self {
        Self {
            position,
            direction,
            plane,
            footprint,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    /// Next frame's camera. Translation is checked one axis at a time so a
    /// blocked axis does not stop motion along the other.
    pub fn update(self, input: &FrameInput, dt: f32, motion: &Motion, map: &GridMap) -> Self {
        if !input.focused {
            return self;
        }
        let mut next = self;

        if input.forward != 0.0 {
            let step = next.direction() * motion.move_speed * input.forward * dt;

            let along_x = Vec2::new(next.position.x + step.x, next.position.y);
            if can_occupy(along_x, next.footprint, map) {
                next.position = along_x;
            }
            let along_y = Vec2::new(next.position.x, next.position.y + step.y);
            if can_occupy(along_y, next.footprint, map) {
                next.position = along_y;
            }
        }

        if input.rotate != 0.0 {
            next = next.rotated(motion.rotate_speed * input.rotate * dt);
        }

        next
    }

    pub fn rotated(self, angle: f32) -> Self {
        Self {
            direction: rotate(self.direction, angle),
            plane: rotate(self.plane, angle),
            ..self
        }
    }

    /// Ray through `column`, camera-space x running -1..+1 across the screen.
    /// `None` for the rare axis-aligned ray.
    pub fn ray_for_column(&self, column: usize, screen_width: usize) -> Option<Ray> {
        let camera_x = 2.0 * column as f32 / screen_width as f32 - 1.0;
        Ray::new(self.position, self.direction() + self.plane() * camera_x)
    }
}

#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::world::MapSource;

    const MOTION: Motion = Motion {
        move_speed: 5.0,
        rotate_speed: 3.0,
    };

    fn start() -> Camera {
        Camera::new(
            Vec2::new(2.5, 2.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-0.66, 0.0),
            Vec2::splat(0.375),
        )
    }

    fn room() -> GridMap {
        let source = MapSource {
            width: 6,
            height: 5,
            rows: ["######", "#....#", "#....#", "#....#", "######"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
        };
        GridMap::load(&source).unwrap()
    }

    fn focused(forward: f32, rotate: f32) -> FrameInput {
        FrameInput {
            forward,
            rotate,
            focused: true,
        }
    }

    #[test]
    fn quarter_turn_rotates_direction_and_plane() {
        let cam = start().rotated(FRAC_PI_2);
        assert!(cam.direction().abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-6));
        assert!(cam.plane().abs_diff_eq(Vec2::new(0.0, -0.66), 1e-6));
        assert!((cam.plane().length() - 0.66).abs() < 1e-6);
        assert!(cam.direction().dot(cam.plane()).abs() < 1e-6);
    }

    #[test]
    fn repeated_rotation_keeps_basis_perpendicular() {
        let map = room();
        let mut cam = start();
        for i in 0..2000 {
            let dt = 0.001 * (i % 37) as f32;
            let turn = if i % 3 == 0 { -1.0 } else { 1.0 };
            cam = cam.update(&focused(0.0, turn), dt, &MOTION, &map);
        }
        assert!(cam.direction().dot(cam.plane()).abs() < 1e-3);
        assert!((cam.direction().length() - 1.0).abs() < 1e-3);
        assert!((cam.plane().length() - 0.66).abs() < 1e-3);
    }

    #[test]
    fn rotation_intent_scales_with_speed_and_time() {
        let map = room();
        let cam = start().update(&focused(0.0, 1.0), PI / 6.0, &MOTION, &map);
        assert!(cam.direction().abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-5));
        assert_eq!(cam.position, start().position);
    }

    #[test]
    fn forward_moves_along_direction() {
        let map = room();
        let cam = start().update(&focused(1.0, 0.0), 0.1, &MOTION, &map);
        assert!(cam.position.abs_diff_eq(Vec2::new(2.5, 2.5), 1e-6));

        let back = cam.update(&focused(-1.0, 0.0), 0.1, &MOTION, &map);
        assert!(back.position.abs_diff_eq(Vec2::new(2.5, 2.0), 1e-6));
    }

    #[test]
    fn blocked_axis_slides_along_wall() {
        let map = room();
        let cam = Camera::new(
            Vec2::new(4.5, 2.0),
            Vec2::new(1.0, 1.0).normalize(),
            Vec2::new(-0.66, 0.66).normalize() * 0.66,
            Vec2::splat(0.375),
        );
        let next = cam.update(&focused(1.0, 0.0), 0.1, &MOTION, &map);
        assert_eq!(next.position.x, 4.5);
        assert!(next.position.y > 2.3);
    }

    #[test]
    fn fully_blocked_move_leaves_player_in_place() {
        let map = room();
        let cam = Camera::new(
            Vec2::new(4.5, 3.5),
            Vec2::new(1.0, 1.0).normalize(),
            Vec2::new(-0.66, 0.66).normalize() * 0.66,
            Vec2::splat(0.375),
        );
        let next = cam.update(&focused(1.0, 0.0), 0.1, &MOTION, &map);
        assert_eq!(next.position, cam.position);
    }

    #[test]
    fn unfocused_input_is_ignored() {
        let map = room();
        let input = FrameInput {
            forward: 1.0,
            rotate: 1.0,
            focused: false,
        };
        assert_eq!(start().update(&input, 0.1, &MOTION, &map), start());
    }

    #[test]
    fn center_column_ray_is_degenerate() {
        let cam = start();
        assert!(cam.ray_for_column(640, 1280).is_none());

        let left = cam.ray_for_column(0, 1280).unwrap();
        assert!(left.dir().abs_diff_eq(Vec2::new(0.66, 1.0), 1e-6));
        assert_eq!(left.origin(), cam.position);
    }

    #[test]
    fn forward_intent_prefers_positive_key() {
        assert_eq!(FrameInput::intent(true, true), 1.0);
        assert_eq!(FrameInput::intent(true, false), -1.0);
        assert_eq!(FrameInput::intent(false, false), 0.0);
    }
}
