use bevy::prelude::*;

/// Top-level System Sets that define the main execution phases
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum AppSystemSet {
    Input,
    Logic,
    Render,
}

/// Pointer handling runs before keyboard shortcuts so a drag in progress
/// is already known when a key is read.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum InputSystemSet {
    Pointer,
    Keyboard,
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum LogicSystemSet {
    Screen,
    DragLogic,
    Playback,
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum RenderSystemSet {
    TransformUpdate,
    UIUpdate,
}

pub fn configure_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            AppSystemSet::Input,
            AppSystemSet::Logic,
            AppSystemSet::Render,
        )
            .chain(),
    )
    .configure_sets(
        Update,
        (InputSystemSet::Pointer, InputSystemSet::Keyboard)
            .chain()
            .in_set(AppSystemSet::Input),
    )
    .configure_sets(
        Update,
        (
            LogicSystemSet::Screen,
            LogicSystemSet::DragLogic,
            LogicSystemSet::Playback,
        )
            .chain()
            .in_set(AppSystemSet::Logic),
    )
    .configure_sets(
        Update,
        (RenderSystemSet::TransformUpdate, RenderSystemSet::UIUpdate)
            .chain()
            .in_set(AppSystemSet::Render),
    );
}
