use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_easings::EasingComponent;

use crate::config::Config;
use crate::types::*;
use crate::utils::{topmost, world_cursor};

const DRAG_LIFT: f32 = 50.0;

pub fn drag_register_click_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<Input<MouseButton>>,
    q_clickable: Query<(Entity, &GlobalTransform, &Clickable)>,
    q_blockers: Query<(Entity, &GlobalTransform, &ClickBlocker)>,
    mut ui_state: ResMut<UiState>,
) {
    if mouse_button.just_pressed(MouseButton::Left) {
        ui_state.click_origin = world_cursor(&windows, &q_camera);
        ui_state.pressed = ui_state.click_origin.and_then(|point| {
            let buttons = q_clickable.iter().map(|(e, t, c)| (e, t, c.size));
            let blockers = q_blockers.iter().map(|(e, t, b)| (e, t, b.size));
            topmost(buttons.chain(blockers), point)
        });
    }
}

/// Fires a `UiEvent` when a press and release land on the same button
/// without turning into a drag.
pub fn click_dispatch_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<Input<MouseButton>>,
    q_clickable: Query<(Entity, &GlobalTransform, &Clickable)>,
    q_blockers: Query<(Entity, &GlobalTransform, &ClickBlocker)>,
    ui_state: Res<UiState>,
    mut events: EventWriter<UiEvent>,
) {
    if !mouse_button.just_released(MouseButton::Left) || ui_state.dragging.is_some() {
        return;
    }
    let (Some(pressed), Some(point)) = (ui_state.pressed, world_cursor(&windows, &q_camera)) else {
        return;
    };
    let buttons = q_clickable.iter().map(|(e, t, c)| (e, t, c.size));
    let blockers = q_blockers.iter().map(|(e, t, b)| (e, t, b.size));
    if topmost(buttons.chain(blockers), point) != Some(pressed) {
        return;
    }
    if let Ok((_, _, clickable)) = q_clickable.get(pressed) {
        events.send(UiEvent(clickable.action));
    }
}

pub fn drag_check_system(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    q_draggable: Query<(Entity, &GlobalTransform, &Draggable)>,
    mouse_button: Res<Input<MouseButton>>,
    config: Res<Config>,
    mut ui_state: ResMut<UiState>,
) {
    if !mouse_button.pressed(MouseButton::Left)
        || ui_state.dragging.is_some()
        || ui_state.picker_open
    {
        return;
    }
    let (Some(click_origin), Some(world_pos)) =
        (ui_state.click_origin, world_cursor(&windows, &q_camera))
    else {
        return;
    };
    if click_origin.distance(world_pos) <= config.drag_threshold {
        return;
    }

    let candidates = q_draggable.iter().map(|(e, t, d)| (e, t, d.size));
    if let Some(entity) = topmost(candidates, click_origin) {
        if let Ok((_, transform, _)) = q_draggable.get(entity) {
            let offset = click_origin - transform.translation().truncate();
            commands
                .entity(entity)
                .remove::<EasingComponent<Transform>>()
                .insert(Dragging { offset });
            ui_state.dragging = Some(entity);
            ui_state.pressed = None;
        }
    }
    // A press that moved off its button and onto nothing is not a click.
    if ui_state.dragging.is_none() {
        ui_state.click_origin = None;
    }
}

pub fn drag_update_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_dragging: Query<(&mut Transform, &Dragging)>,
    ui_state: Res<UiState>,
) {
    let Some(entity) = ui_state.dragging else {
        return;
    };
    let Ok((mut transform, dragging)) = q_dragging.get_mut(entity) else {
        return;
    };
    if let Some(world_cursor) = world_cursor(&windows, &q_camera) {
        let new_pos = world_cursor - dragging.offset;
        transform.translation = Vec3::new(new_pos.x, new_pos.y, DRAG_LIFT);
    }
}

/// Runs after the screen-specific drop handlers have looked at the
/// released entity.
pub fn drag_end_system(
    mut commands: Commands,
    mouse_button: Res<Input<MouseButton>>,
    mut ui_state: ResMut<UiState>,
) {
    if !mouse_button.just_released(MouseButton::Left) {
        return;
    }
    if let Some(dragged_entity) = ui_state.dragging.take() {
        if let Some(mut entity) = commands.get_entity(dragged_entity) {
            entity.remove::<Dragging>();
        }
    }
    ui_state.click_origin = None;
    ui_state.pressed = None;
}

/// Escape while dragging abandons the drag; drop handlers never see it.
pub fn cancel_drag_system(
    mut commands: Commands,
    keyboard_input: Res<Input<KeyCode>>,
    mut ui_state: ResMut<UiState>,
) {
    if keyboard_input.just_pressed(KeyCode::Escape) {
        if let Some(entity) = ui_state.dragging.take() {
            if let Some(mut entity) = commands.get_entity(entity) {
                entity.remove::<Dragging>();
            }
            ui_state.click_origin = None;
            ui_state.needs_rebuild = true;
        }
    }
}
