use bevy::prelude::*;

use crate::components::{label_bundle, rect_bundle, spawn_button};
use crate::config::Config;
use crate::layout::Layout;
use crate::sets::RenderSystemSet;
use crate::stage::SpriteKind;
use crate::types::*;

const OVERLAY_Z: f32 = 100.0;
const PANEL_WIDTH: f32 = 300.0;
const ENTRY_HEIGHT: f32 = 60.0;
const ICON_SIZE: f32 = 40.0;

/// Modal list of every sprite kind, shown over the stage while
/// `UiState::picker_open` is set.
pub struct PickerPlugin;

impl Plugin for PickerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            picker_overlay_system
                .in_set(RenderSystemSet::UIUpdate)
                .run_if(in_state(AppScreen::Stage)),
        );
    }
}

fn panel_height() -> f32 {
    // Title, one row per kind, then the close button.
    ENTRY_HEIGHT * (SpriteKind::ALL.len() as f32 + 2.0) + 20.0
}

fn picker_overlay_system(
    mut commands: Commands,
    ui_state: Res<UiState>,
    art: Res<ArtLibrary>,
    layout: Res<Layout>,
    config: Res<Config>,
    q_overlay: Query<Entity, With<PickerOverlay>>,
) {
    let shown = !q_overlay.is_empty();
    if ui_state.picker_open == shown {
        return;
    }
    if !ui_state.picker_open {
        for entity in &q_overlay {
            commands.entity(entity).despawn_recursive();
        }
        return;
    }

    let height = panel_height();
    let top = height / 2.0;
    let backdrop = commands
        .spawn(rect_bundle(
            Color::rgba(0.0, 0.0, 0.0, 0.5),
            layout.window,
            Vec3::new(0.0, 0.0, OVERLAY_Z),
        ))
        .insert((
            ClickBlocker {
                size: layout.window,
            },
            PickerOverlay,
            ScreenEntity,
            Name::new("sprite picker"),
        ))
        .id();

    let mut children = vec![commands
        .spawn(rect_bundle(
            Color::WHITE,
            Vec2::new(PANEL_WIDTH, height),
            Vec3::new(0.0, 0.0, 0.5),
        ))
        .id()];
    children.push(
        commands
            .spawn(label_bundle(
                "Select a Sprite",
                config.font_size + 4.0,
                TEXT_DARK,
                Vec3::new(0.0, top - ENTRY_HEIGHT / 2.0, 1.0),
            ))
            .id(),
    );

    for (i, kind) in SpriteKind::ALL.into_iter().enumerate() {
        let y = top - ENTRY_HEIGHT * (i as f32 + 1.5);
        let entry = spawn_button(
            &mut commands,
            UiAction::PickSprite(kind),
            kind.name(),
            BLUE,
            Vec2::new(PANEL_WIDTH - 40.0, ENTRY_HEIGHT - 10.0),
            Vec3::new(0.0, y, 1.0),
            config.font_size,
        );
        let icon = commands
            .spawn(SpriteBundle {
                texture: art.sprites.get(&kind).cloned().unwrap_or_default(),
                sprite: Sprite {
                    custom_size: Some(Vec2::splat(ICON_SIZE)),
                    ..default()
                },
                transform: Transform::from_xyz(-PANEL_WIDTH / 2.0 + 50.0, 0.0, 0.2),
                ..default()
            })
            .id();
        commands.entity(entry).add_child(icon);
        children.push(entry);
    }

    children.push(spawn_button(
        &mut commands,
        UiAction::ClosePicker,
        "Close",
        RED,
        Vec2::new(100.0, 36.0),
        Vec3::new(0.0, -top + ENTRY_HEIGHT / 2.0 + 10.0, 1.0),
        config.font_size,
    ));

    commands.entity(backdrop).push_children(&children);
    debug!("Sprite picker opened");
}
