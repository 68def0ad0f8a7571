use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::types::{Clickable, ClickBlocker, Dragging, HoverTarget, MainCamera, UiState};
use crate::utils::{topmost, world_cursor};

const HOVER_SCALE: f32 = 1.08;
const ANIMATION_SMOOTHNESS: f32 = 0.85;

pub fn hover_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_buttons: Query<(Entity, &GlobalTransform, &Clickable, &mut HoverTarget)>,
    q_blockers: Query<(Entity, &GlobalTransform, &ClickBlocker)>,
    ui_state: Res<UiState>,
) {
    let hovered = if ui_state.dragging.is_some() {
        None
    } else {
        world_cursor(&windows, &q_camera).and_then(|point| {
            let buttons = q_buttons.iter().map(|(e, t, c, _)| (e, t, c.size));
            let blockers = q_blockers.iter().map(|(e, t, b)| (e, t, b.size));
            topmost(buttons.chain(blockers), point)
        })
    };

    for (entity, _, _, mut hover) in &mut q_buttons {
        let is_hovered = hovered == Some(entity);
        if hover.is_hovered != is_hovered {
            hover.is_hovered = is_hovered;
        }
    }
}

pub fn hover_animation_system(
    time: Res<Time>,
    mut q: Query<(&mut Transform, &HoverTarget), Without<Dragging>>,
) {
    let blend = 1.0 - ANIMATION_SMOOTHNESS.powf(time.delta_seconds() * 60.0);
    for (mut transform, hover) in &mut q {
        let target_scale = if hover.is_hovered {
            hover.base_scale * HOVER_SCALE
        } else {
            hover.base_scale
        };
        let current_scale = transform.scale.x;
        if (target_scale - current_scale).abs() < 1e-4 {
            continue;
        }
        let new_scale = current_scale + (target_scale - current_scale) * blend;
        transform.scale = Vec3::splat(new_scale);
    }
}
