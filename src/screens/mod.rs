use bevy::prelude::*;

use crate::types::ScreenEntity;

mod panel;
mod picker;
mod splash;
mod stage;

pub use panel::ActionPanelPlugin;
pub use splash::SplashPlugin;
pub use stage::StagePlugin;

/// Removes everything the screen being left had spawned. Children go with
/// their parents.
pub fn despawn_screen(
    mut commands: Commands,
    query: Query<Entity, (With<ScreenEntity>, Without<Parent>)>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
