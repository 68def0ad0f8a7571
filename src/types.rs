use bevy::prelude::*;
use std::collections::HashMap;

use crate::actions::{ActionKind, BlockId, ScriptBook};
use crate::engine::Timeline;
use crate::stage::{SpriteId, SpriteKind};

#[derive(States, Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum AppScreen {
    #[default]
    Splash,
    Stage,
    ActionPanel,
}

#[derive(Component)]
pub struct MainCamera;

/// Despawned whenever the screen it was spawned for is left.
#[derive(Component)]
pub struct ScreenEntity;

#[derive(Component, Debug, Clone, Copy)]
pub struct SpriteHandle(pub SpriteId);

#[derive(Component)]
pub struct CarouselRoot;

#[derive(Component)]
pub struct DetailsText;

#[derive(Component)]
pub struct PickerOverlay;

#[derive(Component)]
pub struct ActionListEntity;

/// Swallows clicks so nothing underneath it reacts.
#[derive(Component)]
pub struct ClickBlocker {
    pub size: Vec2,
}

#[derive(Component)]
pub struct Clickable {
    pub action: UiAction,
    pub size: Vec2,
}

#[derive(Component)]
pub struct Draggable {
    pub size: Vec2,
}

#[derive(Component)]
pub struct Dragging {
    pub offset: Vec2,
}

#[derive(Component)]
pub struct PaletteBlock {
    pub kind: ActionKind,
    pub home: Vec3,
}

#[derive(Component)]
pub struct ActionItem {
    pub id: BlockId,
    pub index: usize,
}

#[derive(Component)]
pub struct HoverTarget {
    pub base_scale: f32,
    pub is_hovered: bool,
}

impl Default for HoverTarget {
    fn default() -> Self {
        Self {
            base_scale: 1.0,
            is_hovered: false,
        }
    }
}

#[derive(Component)]
pub struct Playback {
    pub timeline: Timeline,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    Play,
    Reset,
    OpenPicker,
    ClosePicker,
    PickSprite(SpriteKind),
    DeleteSprite(SpriteId),
    EditActions(usize),
    SelectTab(usize),
    DeleteAction(BlockId),
    Done,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct UiEvent(pub UiAction);

#[derive(Resource, Default)]
pub struct UiState {
    pub dragging: Option<Entity>,
    pub click_origin: Option<Vec2>,
    pub pressed: Option<Entity>,
    pub picker_open: bool,
    pub needs_rebuild: bool,
}

#[derive(Resource, Default)]
pub struct PlaybackState {
    pub running: bool,
    /// Set until the freshly inserted `Playback` components are visible.
    pub pending: bool,
    /// Set for the frame a reset tween is queued on.
    pub settling: bool,
}

#[derive(Resource, Default)]
pub struct ScrollState {
    pub offset: f32,
}

/// Working copy of every sprite's script while the action panel is open.
#[derive(Resource, Default)]
pub struct PanelState {
    pub book: ScriptBook,
    pub active_tab: usize,
    /// Index of the first action row on screen.
    pub list_scroll: usize,
    pub needs_rebuild: bool,
}

#[derive(Resource)]
pub struct SplashTimer(pub Timer);

#[derive(Resource, Default)]
pub struct ArtLibrary {
    pub sprites: HashMap<SpriteKind, Handle<Image>>,
    pub logo: Handle<Image>,
}

pub const BLUE: Color = Color::rgb(0.0, 0.478, 1.0);
pub const GREEN: Color = Color::rgb(0.298, 0.686, 0.314);
pub const RESET_GREEN: Color = Color::rgb(0.157, 0.655, 0.271);
pub const RED: Color = Color::rgb(0.957, 0.263, 0.212);
pub const LIGHT_GREY: Color = Color::rgb(0.969, 0.969, 0.969);
pub const BORDER_GREY: Color = Color::rgb(0.8, 0.8, 0.8);
pub const TEXT_DARK: Color = Color::rgb(0.2, 0.2, 0.2);
