use bevy::app::AppExit;
use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

use crate::project::save_project;
use crate::stage::Stage;
use crate::types::*;

/// Stage shortcuts. They go through `UiEvent` so a key does exactly what
/// the matching button does.
pub fn stage_keybinds(
    keyboard: Res<Input<KeyCode>>,
    stage: Res<Stage>,
    ui_state: Res<UiState>,
    mut events: EventWriter<UiEvent>,
) {
    if ui_state.picker_open {
        if keyboard.just_pressed(KeyCode::Escape) {
            events.send(UiEvent(UiAction::ClosePicker));
        }
        return;
    }
    if ui_state.dragging.is_some() {
        return;
    }

    if keyboard.just_pressed(KeyCode::Space) {
        events.send(UiEvent(UiAction::Play));
    }
    if keyboard.just_pressed(KeyCode::R) {
        events.send(UiEvent(UiAction::Reset));
    }
    if keyboard.any_just_pressed([KeyCode::Delete, KeyCode::Back]) {
        if let Some(sprite) = stage.selected() {
            events.send(UiEvent(UiAction::DeleteSprite(sprite.id)));
        }
    }
}

pub fn save_project_keybind(keyboard: Res<Input<KeyCode>>, stage: Res<Stage>) {
    if !keyboard.just_pressed(KeyCode::S) {
        return;
    }
    match save_project(&stage) {
        Ok(path) => info!("Saved {} sprites to {}", stage.len(), path.display()),
        Err(e) => error!("Could not save project: {}", e),
    }
}

pub fn exit_on_q(mut keys: EventReader<KeyboardInput>, mut exit: EventWriter<AppExit>) {
    for key_event in keys.read() {
        if let Some(key_code) = key_event.key_code {
            if key_event.state == ButtonState::Pressed && key_code == KeyCode::Q {
                exit.send(AppExit);
            }
        }
    }
}
