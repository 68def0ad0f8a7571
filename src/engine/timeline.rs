//! Turns a sprite's action list into a sequence of timed tweens.

use bevy::math::Vec2;
use bevy::log::info;
use interpolation::{Ease, EaseFunction};
use rand::Rng;

use crate::actions::ActionKind;
use crate::config::Config;
use crate::engine::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    /// Clockwise, in degrees.
    pub rotation_deg: f32,
}

impl Pose {
    #[cfg(test)]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation_deg: 0.0,
        }
    }

    fn lerp(self, other: Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            rotation_deg: self.rotation_deg + (other.rotation_deg - self.rotation_deg) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    pub step_secs: f32,
    pub move_distance: f32,
    pub rotate_deg: f32,
    pub repeat_secs: f32,
    pub repeat_iterations: u32,
    pub repeat_distance: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            step_secs: 1.0,
            move_distance: 50.0,
            rotate_deg: 30.0,
            repeat_secs: 0.5,
            repeat_iterations: 3,
            repeat_distance: 50.0,
        }
    }
}

impl From<&Config> for MotionSettings {
    fn from(config: &Config) -> Self {
        Self {
            step_secs: config.step_ms as f32 / 1000.0,
            move_distance: config.move_distance,
            rotate_deg: config.rotate_degrees,
            repeat_secs: config.repeat_ms as f32 / 1000.0,
            repeat_iterations: config.repeat_iterations.max(1),
            repeat_distance: config.repeat_distance,
        }
    }
}

/// One tween. With more than one iteration the tween loops, jumping back
/// to `from` at the start of every pass.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    from: Pose,
    to: Pose,
    duration: f32,
    iterations: u32,
}

impl Step {
    fn total(&self) -> f32 {
        self.duration * self.iterations as f32
    }

    fn sample(&self, local: f32) -> Pose {
        if self.duration <= 0.0 || local >= self.total() {
            return self.to;
        }
        let pass = local % self.duration;
        self.from.lerp(self.to, ease_in_out(pass / self.duration))
    }
}

fn ease_in_out(t: f32) -> f32 {
    t.calc(EaseFunction::CubicInOut)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    start: Pose,
    steps: Vec<Step>,
}

impl Timeline {
    pub fn compile<R: Rng + ?Sized>(
        start: Pose,
        actions: &[ActionKind],
        canvas: &Canvas,
        settings: &MotionSettings,
        rng: &mut R,
    ) -> Self {
        let mut steps = Vec::with_capacity(actions.len());
        let mut pose = start;

        // Relative targets are measured from where the sprite stood when
        // play was pressed, not from the previous step's end.
        let from_start = |pose: Pose, delta: Vec2| Pose {
            position: start.position + delta,
            ..pose
        };

        for &action in actions {
            info!("Running action: {}", action);
            let (to, duration, iterations) = match action {
                ActionKind::MoveRight => (
                    from_start(pose, Vec2::new(settings.move_distance, 0.0)),
                    settings.step_secs,
                    1,
                ),
                ActionKind::MoveLeft => (
                    from_start(pose, Vec2::new(-settings.move_distance, 0.0)),
                    settings.step_secs,
                    1,
                ),
                ActionKind::Rotate => (
                    Pose {
                        rotation_deg: start.rotation_deg + settings.rotate_deg,
                        ..pose
                    },
                    settings.step_secs,
                    1,
                ),
                ActionKind::GoHome => (
                    Pose {
                        position: Vec2::ZERO,
                        ..pose
                    },
                    settings.step_secs,
                    1,
                ),
                ActionKind::MoveDiagonal => (
                    from_start(
                        pose,
                        Vec2::new(settings.move_distance, settings.move_distance),
                    ),
                    settings.step_secs,
                    1,
                ),
                ActionKind::GoRandom => (
                    Pose {
                        position: canvas.random_position(rng),
                        ..pose
                    },
                    settings.step_secs,
                    1,
                ),
                ActionKind::Repeat => (
                    from_start(pose, Vec2::new(settings.repeat_distance, 0.0)),
                    settings.repeat_secs,
                    settings.repeat_iterations,
                ),
            };
            steps.push(Step {
                from: pose,
                to,
                duration,
                iterations,
            });
            pose = to;
        }

        Self { start, steps }
    }

    pub fn duration(&self) -> f32 {
        self.steps.iter().map(Step::total).sum()
    }

    pub fn is_finished(&self, elapsed: f32) -> bool {
        elapsed >= self.duration()
    }

    pub fn end_pose(&self) -> Pose {
        self.steps.last().map(|step| step.to).unwrap_or(self.start)
    }

    pub fn sample(&self, elapsed: f32) -> Pose {
        if elapsed <= 0.0 {
            return self.steps.first().map(|s| s.from).unwrap_or(self.start);
        }
        let mut offset = 0.0;
        for step in &self.steps {
            let total = step.total();
            if elapsed < offset + total {
                return step.sample(elapsed - offset);
            }
            offset += total;
        }
        self.end_pose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn compile(start: Vec2, actions: &[ActionKind]) -> Timeline {
        let canvas = Canvas::new(400.0, 300.0, 50.0);
        let mut rng = StdRng::seed_from_u64(1);
        Timeline::compile(
            Pose::at(start),
            actions,
            &canvas,
            &MotionSettings::default(),
            &mut rng,
        )
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn empty_script_stays_put() {
        let t = compile(Vec2::new(5.0, 5.0), &[]);
        assert_eq!(t.duration(), 0.0);
        assert_eq!(t.sample(3.0).position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn relative_moves_resolve_against_the_start_pose() {
        let t = compile(
            Vec2::ZERO,
            &[
                ActionKind::MoveRight,
                ActionKind::MoveRight,
                ActionKind::MoveLeft,
                ActionKind::MoveDiagonal,
            ],
        );
        assert_eq!(t.duration(), 4.0);
        assert!(close(t.sample(1.0).position, Vec2::new(50.0, 0.0)));
        assert!(close(t.sample(2.0).position, Vec2::new(50.0, 0.0)));
        assert!(close(t.sample(3.0).position, Vec2::new(-50.0, 0.0)));
        assert!(close(t.end_pose().position, Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn move_after_go_home_lands_next_to_the_start() {
        let t = compile(
            Vec2::new(30.0, 20.0),
            &[ActionKind::GoHome, ActionKind::MoveRight],
        );
        assert!(close(t.sample(1.0).position, Vec2::ZERO));
        assert!(close(t.sample(1.5).position, Vec2::new(40.0, 10.0)));
        assert!(close(t.end_pose().position, Vec2::new(80.0, 20.0)));
    }

    #[test]
    fn midpoint_of_a_step_is_halfway() {
        let t = compile(Vec2::ZERO, &[ActionKind::MoveRight]);
        assert!(close(t.sample(0.5).position, Vec2::new(25.0, 0.0)));
        assert!(t.sample(0.25).position.x < 12.5);
    }

    #[test]
    fn rotate_and_go_home() {
        let t = compile(
            Vec2::new(80.0, -20.0),
            &[ActionKind::Rotate, ActionKind::Rotate, ActionKind::GoHome],
        );
        let end = t.end_pose();
        assert_eq!(end.rotation_deg, 30.0);
        assert_eq!(end.position, Vec2::ZERO);
        assert!(close(t.sample(2.0).position, Vec2::new(80.0, -20.0)));
    }

    #[test]
    fn repeat_loops_three_times_from_the_same_start() {
        let t = compile(Vec2::ZERO, &[ActionKind::Repeat]);
        assert_eq!(t.duration(), 1.5);

        let first = t.sample(0.49).position.x;
        let second_start = t.sample(0.5).position.x;
        let third_mid = t.sample(1.25).position.x;

        assert!(first > 45.0);
        assert!(second_start.abs() < 1e-3);
        assert!((third_mid - 25.0).abs() < 1e-3);
        assert!(close(t.end_pose().position, Vec2::new(50.0, 0.0)));
        assert!(close(t.sample(10.0).position, Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn random_target_is_on_canvas() {
        let t = compile(Vec2::ZERO, &[ActionKind::GoRandom]);
        let p = t.end_pose().position;
        assert!(p.x >= -200.0 && p.x < 200.0);
        assert!(p.y >= -150.0 && p.y < 150.0);
    }

    #[test]
    fn easing_is_monotonic_and_pinned() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        // Cubic in-out: 4t³ on the way in, symmetric on the way out.
        assert!((ease_in_out(0.25) - 0.0625).abs() < 1e-6);
        assert!((ease_in_out(0.75) - 0.9375).abs() < 1e-6);
        let mut last = 0.0;
        for i in 1..=20 {
            let v = ease_in_out(i as f32 / 20.0);
            assert!(v >= last);
            last = v;
        }
    }
}
