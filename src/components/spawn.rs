use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::text::Text2dBounds;

use crate::engine::Pose;
use crate::layout::Layout;
use crate::stage::StageSprite;
use crate::types::{
    ArtLibrary, Clickable, Draggable, HoverTarget, ScreenEntity, SpriteHandle, UiAction,
};
use crate::utils::pose_transform;

const SPRITE_Z: f32 = 10.0;
const LABEL_Z: f32 = 0.1;

pub(crate) fn rect_bundle(color: Color, size: Vec2, translation: Vec3) -> SpriteBundle {
    SpriteBundle {
        sprite: Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        transform: Transform::from_translation(translation),
        ..default()
    }
}

pub(crate) fn label_bundle(
    value: impl Into<String>,
    font_size: f32,
    color: Color,
    translation: Vec3,
) -> Text2dBundle {
    Text2dBundle {
        text: Text::from_section(
            value,
            TextStyle {
                font_size,
                color,
                ..default()
            },
        )
        .with_alignment(TextAlignment::Center),
        transform: Transform::from_translation(translation),
        ..default()
    }
}

/// Text that wraps inside `width`, anchored at its centre.
pub(crate) fn wrapped_label_bundle(
    value: impl Into<String>,
    font_size: f32,
    color: Color,
    width: f32,
    translation: Vec3,
) -> Text2dBundle {
    Text2dBundle {
        text_2d_bounds: Text2dBounds {
            size: Vec2::new(width, f32::INFINITY),
        },
        text_anchor: Anchor::Center,
        ..label_bundle(value, font_size, color, translation)
    }
}

/// A filled rectangle with a centred caption that emits `action` when
/// clicked.
pub(crate) fn spawn_button(
    commands: &mut Commands,
    action: UiAction,
    caption: &str,
    color: Color,
    size: Vec2,
    translation: Vec3,
    font_size: f32,
) -> Entity {
    commands
        .spawn(rect_bundle(color, size, translation))
        .insert((
            Clickable { action, size },
            HoverTarget::default(),
            ScreenEntity,
            Name::new(caption.to_string()),
        ))
        .with_children(|parent| {
            parent.spawn(wrapped_label_bundle(
                caption,
                font_size,
                Color::WHITE,
                size.x - 4.0,
                Vec3::new(0.0, 0.0, LABEL_Z),
            ));
        })
        .id()
}

/// A rectangle with a one-pixel-ish outline drawn behind it.
pub(crate) fn spawn_outlined(
    commands: &mut Commands,
    fill: Color,
    border: Color,
    size: Vec2,
    translation: Vec3,
) -> Entity {
    commands
        .spawn(rect_bundle(border, size + Vec2::splat(2.0), translation))
        .insert(ScreenEntity)
        .with_children(|parent| {
            parent.spawn(rect_bundle(fill, size, Vec3::new(0.0, 0.0, 0.01)));
        })
        .id()
}

pub(crate) fn spawn_stage_sprite(
    commands: &mut Commands,
    art: &ArtLibrary,
    sprite: &StageSprite,
    layout: &Layout,
    size: f32,
    index: usize,
) -> Entity {
    let transform = pose_for(layout, sprite.pose, index);
    commands
        .spawn(SpriteBundle {
            texture: art.sprites.get(&sprite.kind).cloned().unwrap_or_default(),
            sprite: Sprite {
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            transform,
            ..default()
        })
        .insert((
            SpriteHandle(sprite.id),
            Draggable {
                size: Vec2::splat(size),
            },
            ScreenEntity,
            Name::new(sprite.kind.name()),
        ))
        .id()
}

pub(crate) fn sprite_depth(index: usize) -> f32 {
    SPRITE_Z + index as f32
}

pub(crate) fn pose_for(layout: &Layout, pose: Pose, index: usize) -> Transform {
    pose_transform(&layout.canvas, layout.canvas_origin, pose, sprite_depth(index))
}
