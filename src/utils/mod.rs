pub mod loader;
pub use loader::*;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::{Canvas, Pose};
use crate::types::MainCamera;

/// Cursor position in world space, if the cursor is over the window.
pub fn world_cursor(
    windows: &Query<&Window, With<PrimaryWindow>>,
    q_camera: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Vec2> {
    let window = windows.get_single().ok()?;
    let cursor_pos = window.cursor_position()?;
    let (camera, camera_transform) = q_camera.get_single().ok()?;
    camera.viewport_to_world_2d(camera_transform, cursor_pos)
}

pub fn hit(center: &GlobalTransform, size: Vec2, point: Vec2) -> bool {
    Rect::from_center_size(center.translation().truncate(), size).contains(point)
}

/// Picks the entity drawn on top among the candidates under `point`.
pub fn topmost<'a, I>(candidates: I, point: Vec2) -> Option<Entity>
where
    I: Iterator<Item = (Entity, &'a GlobalTransform, Vec2)>,
{
    candidates
        .filter(|(_, transform, size)| hit(transform, *size, point))
        .max_by(|a, b| {
            a.1.translation()
                .z
                .total_cmp(&b.1.translation().z)
        })
        .map(|(entity, _, _)| entity)
}

/// Places a pose from authoring coordinates into a world transform,
/// keeping the given depth and scale.
pub fn pose_transform(canvas: &Canvas, origin: Vec2, pose: Pose, z: f32) -> Transform {
    Transform {
        translation: canvas.to_world(origin, pose.position).extend(z),
        rotation: Quat::from_rotation_z(-pose.rotation_deg.to_radians()),
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topmost_prefers_higher_z() {
        let low = GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 1.0));
        let high = GlobalTransform::from_translation(Vec3::new(5.0, 0.0, 9.0));
        let far = GlobalTransform::from_translation(Vec3::new(500.0, 0.0, 50.0));
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let c = Entity::from_raw(3);
        let size = Vec2::splat(40.0);

        let picked = topmost(
            [(a, &low, size), (b, &high, size), (c, &far, size)].into_iter(),
            Vec2::new(2.0, 2.0),
        );
        assert_eq!(picked, Some(b));
        assert_eq!(
            topmost([(a, &low, size)].into_iter(), Vec2::new(300.0, 0.0)),
            None
        );
    }

    #[test]
    fn pose_transform_flips_y_and_rotation() {
        let canvas = Canvas::new(400.0, 300.0, 50.0);
        let origin = Vec2::new(0.0, 100.0);
        let t = pose_transform(
            &canvas,
            origin,
            Pose {
                position: Vec2::new(10.0, 30.0),
                rotation_deg: 90.0,
            },
            4.0,
        );
        assert_eq!(t.translation, Vec3::new(10.0, 70.0, 4.0));
        assert_eq!(
            canvas.from_world(origin, t.translation.truncate()),
            Vec2::new(10.0, 30.0)
        );
        let (_, angle) = t.rotation.to_axis_angle();
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }
}
