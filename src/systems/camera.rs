use bevy::prelude::*;

use crate::types::MainCamera;

/// The window centre is the world origin and one world unit is one pixel.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2dBundle {
            transform: Transform::from_xyz(0.0, 0.0, 999.0),
            ..default()
        },
        MainCamera,
        Name::new("main camera"),
    ));
}
