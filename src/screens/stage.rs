use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::components::{
    label_bundle, rect_bundle, spawn_button, spawn_outlined, spawn_stage_sprite,
};
use crate::config::Config;
use crate::layout::{Layout, CAROUSEL_BOX, HEADER_HEIGHT, ROUND_BUTTON};
use crate::sets::{InputSystemSet, LogicSystemSet, RenderSystemSet};
use crate::stage::Stage;
use crate::systems::{
    apply_carousel_scroll, playback_finish_system, playback_system, reset_stage,
    save_project_keybind, scroll_system, stage_keybinds, start_playback, sync_sprite_transforms,
};
use crate::types::*;
use crate::utils::{topmost, world_cursor};

use super::despawn_screen;
use super::picker::PickerPlugin;

const CANVAS_Z: f32 = 1.0;
const CHROME_Z: f32 = 30.0;

/// Which slot the action panel should open on.
#[derive(Resource, Default)]
pub struct PanelRequest(pub usize);

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelRequest>()
            .add_plugins(PickerPlugin)
            .add_systems(OnEnter(AppScreen::Stage), spawn_stage_screen)
            .add_systems(
                Update,
                (stage_keybinds, save_project_keybind)
                    .in_set(InputSystemSet::Keyboard)
                    .run_if(in_state(AppScreen::Stage)),
            )
            .add_systems(
                Update,
                (
                    stage_event_system,
                    sprite_select_system,
                    scroll_system,
                )
                    .in_set(LogicSystemSet::Screen)
                    .run_if(in_state(AppScreen::Stage)),
            )
            .add_systems(
                Update,
                (sprite_drag_clamp_system, sprite_drop_system)
                    .chain()
                    .in_set(LogicSystemSet::DragLogic)
                    .run_if(in_state(AppScreen::Stage)),
            )
            .add_systems(
                Update,
                (playback_system, playback_finish_system)
                    .chain()
                    .in_set(LogicSystemSet::Playback)
                    .run_if(in_state(AppScreen::Stage)),
            )
            .add_systems(
                Update,
                (rebuild_stage_system, sync_sprite_transforms, apply_carousel_scroll)
                    .chain()
                    .in_set(RenderSystemSet::TransformUpdate)
                    .run_if(in_state(AppScreen::Stage)),
            )
            .add_systems(
                Update,
                details_text_system
                    .in_set(RenderSystemSet::UIUpdate)
                    .run_if(in_state(AppScreen::Stage)),
            )
            .add_systems(OnExit(AppScreen::Stage), (despawn_screen, leave_stage));
    }
}

fn spawn_stage_screen(
    mut commands: Commands,
    art: Res<ArtLibrary>,
    layout: Res<Layout>,
    config: Res<Config>,
    mut ui_state: ResMut<UiState>,
) {
    // Header bar: logo on the left, an inert "Sign In" on the right.
    let header_size = Vec2::new(layout.window.x, HEADER_HEIGHT);
    commands
        .spawn(rect_bundle(BLUE, header_size, layout.header_center.extend(CHROME_Z)))
        .insert(ScreenEntity)
        .with_children(|parent| {
            parent.spawn(SpriteBundle {
                texture: art.logo.clone(),
                sprite: Sprite {
                    custom_size: Some(Vec2::splat(HEADER_HEIGHT - 10.0)),
                    ..default()
                },
                transform: Transform::from_xyz(-layout.window.x / 2.0 + 40.0, 0.0, 0.1),
                ..default()
            });
            parent.spawn(label_bundle(
                "Sign In",
                config.font_size,
                Color::WHITE,
                Vec3::new(layout.window.x / 2.0 - 50.0, 0.0, 0.1),
            ));
        });

    let canvas_size = Vec2::new(layout.canvas.width, layout.canvas.height);
    spawn_outlined(
        &mut commands,
        Color::WHITE,
        BORDER_GREY,
        canvas_size,
        layout.canvas_origin.extend(CANVAS_Z),
    );

    spawn_button(
        &mut commands,
        UiAction::Reset,
        "Reset",
        RESET_GREEN,
        Vec2::splat(ROUND_BUTTON),
        layout.reset_button.extend(CHROME_Z),
        12.0,
    );
    spawn_button(
        &mut commands,
        UiAction::Play,
        "Play",
        BLUE,
        Vec2::splat(ROUND_BUTTON),
        layout.play_button.extend(CHROME_Z),
        14.0,
    );

    commands.spawn((
        label_bundle(
            "",
            config.font_size,
            TEXT_DARK,
            layout.details_center.extend(CHROME_Z),
        ),
        DetailsText,
        ScreenEntity,
    ));

    commands.spawn((
        SpatialBundle::default(),
        CarouselRoot,
        ScreenEntity,
        Name::new("carousel"),
    ));

    ui_state.needs_rebuild = true;
}

/// Timelines do not survive leaving the screen; poses already reached do.
fn leave_stage(mut ui_state: ResMut<UiState>, mut playback_state: ResMut<PlaybackState>) {
    ui_state.picker_open = false;
    ui_state.dragging = None;
    playback_state.running = false;
    playback_state.pending = false;
}

#[allow(clippy::too_many_arguments)]
fn stage_event_system(
    mut commands: Commands,
    mut events: EventReader<UiEvent>,
    mut stage: ResMut<Stage>,
    mut ui_state: ResMut<UiState>,
    mut playback_state: ResMut<PlaybackState>,
    mut panel_request: ResMut<PanelRequest>,
    mut next_screen: ResMut<NextState<AppScreen>>,
    layout: Res<Layout>,
    config: Res<Config>,
    q_sprites: Query<(Entity, &SpriteHandle, &Transform)>,
) {
    for UiEvent(action) in events.read() {
        match *action {
            UiAction::Play => start_playback(
                &mut commands,
                &stage,
                &layout,
                &config,
                &q_sprites,
                &mut playback_state,
            ),
            UiAction::Reset => reset_stage(
                &mut commands,
                &mut stage,
                &layout,
                &config,
                &q_sprites,
                &mut playback_state,
            ),
            UiAction::OpenPicker => ui_state.picker_open = true,
            UiAction::ClosePicker => ui_state.picker_open = false,
            UiAction::PickSprite(kind) => {
                match stage.add_sprite(kind) {
                    Ok(_) => info!("Added sprite {}", kind.name()),
                    Err(e) => warn!("Cannot add {}: {}", kind.name(), e),
                }
                ui_state.picker_open = false;
                ui_state.needs_rebuild = true;
            }
            UiAction::DeleteSprite(id) => {
                if let Some(sprite) = stage.remove_sprite(id) {
                    info!("Removed sprite {}", sprite.kind.name());
                    ui_state.needs_rebuild = true;
                }
            }
            UiAction::EditActions(slot) => {
                panel_request.0 = slot;
                next_screen.set(AppScreen::ActionPanel);
            }
            UiAction::SelectTab(_) | UiAction::DeleteAction(_) | UiAction::Done => {}
        }
    }
}

/// Pressing a sprite selects it, before any drag begins.
fn sprite_select_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<Input<MouseButton>>,
    q_sprites: Query<(Entity, &GlobalTransform, &Draggable, &SpriteHandle)>,
    ui_state: Res<UiState>,
    mut stage: ResMut<Stage>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) || ui_state.picker_open {
        return;
    }
    let Some(point) = world_cursor(&windows, &q_camera) else {
        return;
    };
    let candidates = q_sprites.iter().map(|(e, t, d, _)| (e, t, d.size));
    if let Some(entity) = topmost(candidates, point) {
        if let Ok((_, _, _, handle)) = q_sprites.get(entity) {
            stage.select(handle.0);
        }
    }
}

fn sprite_drag_clamp_system(
    layout: Res<Layout>,
    ui_state: Res<UiState>,
    mut q_sprites: Query<&mut Transform, (With<SpriteHandle>, With<Dragging>)>,
) {
    let Some(entity) = ui_state.dragging else {
        return;
    };
    if let Ok(mut transform) = q_sprites.get_mut(entity) {
        let canvas = layout.canvas;
        let point = canvas.from_world(layout.canvas_origin, transform.translation.truncate());
        let clamped = canvas.to_world(layout.canvas_origin, canvas.clamp_drag(point));
        transform.translation.x = clamped.x;
        transform.translation.y = clamped.y;
    }
}

/// Records where a dragged sprite was let go and checks for collisions.
#[allow(clippy::too_many_arguments)]
fn sprite_drop_system(
    mut commands: Commands,
    mouse_button: Res<Input<MouseButton>>,
    ui_state: Res<UiState>,
    layout: Res<Layout>,
    config: Res<Config>,
    mut stage: ResMut<Stage>,
    mut playback_state: ResMut<PlaybackState>,
    q_sprites: Query<(&Transform, &SpriteHandle), With<Dragging>>,
    q_playing: Query<Entity, With<Playback>>,
) {
    if !mouse_button.just_released(MouseButton::Left) {
        return;
    }
    let Some(entity) = ui_state.dragging else {
        return;
    };
    let Ok((transform, handle)) = q_sprites.get(entity) else {
        return;
    };
    let canvas = layout.canvas;
    let point = canvas.from_world(layout.canvas_origin, transform.translation.truncate());
    stage.set_position(handle.0, canvas.clamp_drag(point));
    commands.entity(entity).remove::<Playback>();
    stage.swap_on_collision(config.sprite_size);

    // Dropping the last playing sprite ends playback here, and the check
    // above already covered the final positions.
    if playback_state.running && q_playing.iter().all(|playing| playing == entity) {
        playback_state.running = false;
        playback_state.pending = false;
    }
}

#[allow(clippy::too_many_arguments)]
fn rebuild_stage_system(
    mut commands: Commands,
    mut ui_state: ResMut<UiState>,
    mut scroll_state: ResMut<ScrollState>,
    stage: Res<Stage>,
    art: Res<ArtLibrary>,
    layout: Res<Layout>,
    config: Res<Config>,
    q_sprites: Query<(Entity, &SpriteHandle)>,
    q_root: Query<Entity, With<CarouselRoot>>,
) {
    if !ui_state.needs_rebuild {
        return;
    }
    let Ok(root) = q_root.get_single() else {
        return;
    };
    ui_state.needs_rebuild = false;

    // Sprites that are still on stage keep their entity, and with it any
    // running timeline.
    let mut present = Vec::new();
    for (entity, handle) in &q_sprites {
        if stage.index_of(handle.0).is_some() {
            present.push(handle.0);
        } else {
            commands.entity(entity).despawn_recursive();
        }
    }
    for (index, sprite) in stage.sprites().iter().enumerate() {
        if !present.contains(&sprite.id) {
            spawn_stage_sprite(
                &mut commands,
                &art,
                sprite,
                &layout,
                config.sprite_size,
                index,
            );
        }
    }

    commands.entity(root).despawn_descendants();
    let mut children = Vec::new();
    for (index, sprite) in stage.sprites().iter().enumerate() {
        let slot = layout.carousel_slot(index);
        let frame = spawn_outlined(
            &mut commands,
            Color::WHITE,
            BORDER_GREY,
            CAROUSEL_BOX,
            slot.extend(CHROME_Z),
        );
        let icon = commands
            .spawn(SpriteBundle {
                texture: art.sprites.get(&sprite.kind).cloned().unwrap_or_default(),
                sprite: Sprite {
                    custom_size: Some(Vec2::splat(config.sprite_size)),
                    ..default()
                },
                transform: Transform::from_xyz(0.0, 30.0, 0.1),
                ..default()
            })
            .id();
        commands.entity(frame).add_child(icon);

        let add = spawn_button(
            &mut commands,
            UiAction::EditActions(index),
            "Add Action",
            BLUE,
            Vec2::new(CAROUSEL_BOX.x - 10.0, 24.0),
            Vec3::new(slot.x, slot.y - 20.0, CHROME_Z + 1.0),
            12.0,
        );
        let delete = spawn_button(
            &mut commands,
            UiAction::DeleteSprite(sprite.id),
            "Delete",
            RED,
            Vec2::new(60.0, 22.0),
            Vec3::new(slot.x, slot.y - 50.0, CHROME_Z + 1.0),
            12.0,
        );
        children.extend([frame, add, delete]);
    }

    if !stage.is_full() {
        let slot = layout.carousel_slot(stage.len());
        let frame = spawn_outlined(
            &mut commands,
            Color::WHITE,
            BORDER_GREY,
            CAROUSEL_BOX,
            slot.extend(CHROME_Z),
        );
        let add = spawn_button(
            &mut commands,
            UiAction::OpenPicker,
            "+",
            BLUE,
            Vec2::splat(ROUND_BUTTON),
            slot.extend(CHROME_Z + 1.0),
            32.0,
        );
        children.extend([frame, add]);
    }

    // Children carry ScreenEntity too, but only roots are despawned directly.
    commands.entity(root).push_children(&children);

    let boxes = stage.len() + usize::from(!stage.is_full());
    scroll_state.offset = scroll_state
        .offset
        .min(layout.carousel_max_scroll(boxes));
}

fn details_text_system(stage: Res<Stage>, mut q_text: Query<&mut Text, With<DetailsText>>) {
    let value = stage
        .selected()
        .map(|sprite| {
            format!(
                "Name: {}    X: {:.2}    Y: {:.2}",
                sprite.kind.name(),
                sprite.pose.position.x,
                sprite.pose.position.y
            )
        })
        .unwrap_or_default();
    for mut text in &mut q_text {
        if let Some(section) = text.sections.first_mut() {
            if section.value != value {
                section.value = value.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionBlock, ActionKind};
    use crate::engine::{MotionSettings, Pose, Timeline};
    use crate::stage::SpriteKind;
    use crate::systems::drag_end_system;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn block(id: u64, kind: ActionKind) -> ActionBlock {
        ActionBlock { id, kind }
    }

    fn playing(layout: &Layout, start: Pose, kinds: &[ActionKind]) -> Playback {
        let mut rng = StdRng::seed_from_u64(1);
        Playback {
            timeline: Timeline::compile(
                start,
                kinds,
                &layout.canvas,
                &MotionSettings::default(),
                &mut rng,
            ),
            elapsed: 0.0,
        }
    }

    fn stage_app(stage: Stage) -> App {
        let config = Config::default();
        let layout = Layout::new(config.window_width, config.window_height, &config);
        let mut app = App::new();
        app.insert_resource(layout)
            .insert_resource(config)
            .insert_resource(stage)
            .init_resource::<UiState>()
            .init_resource::<PlaybackState>()
            .init_resource::<ScrollState>()
            .init_resource::<ArtLibrary>();
        app
    }

    fn release_left(app: &mut App) {
        let mut mouse = Input::<MouseButton>::default();
        mouse.press(MouseButton::Left);
        mouse.release(MouseButton::Left);
        app.insert_resource(mouse);
    }

    fn spawn_sprite(app: &mut App, id: u64, at: Vec2) -> Entity {
        let layout = *app.world.resource::<Layout>();
        let world = layout.canvas.to_world(layout.canvas_origin, at);
        app.world
            .spawn((Transform::from_translation(world.extend(5.0)), SpriteHandle(id)))
            .id()
    }

    fn scripts(app: &App) -> Vec<Vec<ActionKind>> {
        app.world
            .resource::<Stage>()
            .sprites()
            .iter()
            .map(|s| s.actions.iter().map(|a| a.kind).collect())
            .collect()
    }

    /// A and B overlap; A is mid-timeline and is being dragged.
    fn overlapping_pair() -> (Stage, u64, u64) {
        let mut stage = Stage::default();
        let a = stage
            .restore_sprite(
                SpriteKind::Cat,
                Pose::at(Vec2::new(10.0, 0.0)),
                vec![block(1, ActionKind::MoveRight)],
            )
            .unwrap();
        let b = stage
            .restore_sprite(SpriteKind::Dragon, Pose::default(), vec![block(2, ActionKind::Rotate)])
            .unwrap();
        (stage, a, b)
    }

    fn drop_app(stage: Stage) -> App {
        let mut app = stage_app(stage);
        release_left(&mut app);
        app.add_systems(
            Update,
            (sprite_drop_system, drag_end_system, playback_finish_system).chain(),
        );
        app
    }

    #[test]
    fn dropping_the_last_playing_sprite_swaps_scripts_once() {
        let (stage, a, _) = overlapping_pair();
        let mut app = drop_app(stage);
        let layout = *app.world.resource::<Layout>();
        let dragged = spawn_sprite(&mut app, a, Vec2::new(10.0, 0.0));
        app.world.entity_mut(dragged).insert((
            Dragging { offset: Vec2::ZERO },
            playing(&layout, Pose::at(Vec2::new(10.0, 0.0)), &[ActionKind::MoveRight]),
        ));
        app.world.resource_mut::<UiState>().dragging = Some(dragged);
        app.world.resource_mut::<PlaybackState>().running = true;

        app.update();
        app.update();
        app.update();

        assert_eq!(
            scripts(&app),
            vec![vec![ActionKind::Rotate], vec![ActionKind::MoveRight]]
        );
        assert!(!app.world.resource::<PlaybackState>().running);
        assert!(app.world.get::<Playback>(dragged).is_none());
        assert!(app.world.get::<Dragging>(dragged).is_none());
    }

    #[test]
    fn dropping_while_another_sprite_plays_keeps_playback_running() {
        let (stage, a, b) = overlapping_pair();
        let mut app = drop_app(stage);
        let layout = *app.world.resource::<Layout>();
        let dragged = spawn_sprite(&mut app, a, Vec2::new(10.0, 0.0));
        app.world.entity_mut(dragged).insert((
            Dragging { offset: Vec2::ZERO },
            playing(&layout, Pose::at(Vec2::new(10.0, 0.0)), &[ActionKind::MoveRight]),
        ));
        let other = spawn_sprite(&mut app, b, Vec2::ZERO);
        app.world
            .entity_mut(other)
            .insert(playing(&layout, Pose::default(), &[ActionKind::Rotate]));
        app.world.resource_mut::<UiState>().dragging = Some(dragged);
        app.world.resource_mut::<PlaybackState>().running = true;

        app.update();
        app.update();

        assert_eq!(
            scripts(&app),
            vec![vec![ActionKind::Rotate], vec![ActionKind::MoveRight]]
        );
        assert!(app.world.resource::<PlaybackState>().running);
        assert!(app.world.get::<Playback>(other).is_some());
    }

    #[test]
    fn drop_records_the_clamped_authoring_position() {
        let mut stage = Stage::default();
        let id = stage.add_sprite(SpriteKind::Crab).unwrap();
        let mut app = drop_app(stage);
        let far_right = Vec2::new(10_000.0, 0.0);
        let dragged = spawn_sprite(&mut app, id, far_right);
        app.world
            .entity_mut(dragged)
            .insert(Dragging { offset: Vec2::ZERO });
        app.world.resource_mut::<UiState>().dragging = Some(dragged);

        app.update();

        let layout = *app.world.resource::<Layout>();
        let expected = layout.canvas.clamp_drag(far_right);
        let stage = app.world.resource::<Stage>();
        assert_eq!(stage.sprites()[0].pose.position, expected);
    }

    fn rebuild_app(stage: Stage) -> App {
        let mut app = stage_app(stage);
        app.world.spawn((SpatialBundle::default(), CarouselRoot));
        app.world.resource_mut::<UiState>().needs_rebuild = true;
        app.add_systems(Update, rebuild_stage_system);
        app
    }

    fn handles(app: &mut App) -> Vec<(Entity, u64)> {
        let mut query = app.world.query::<(Entity, &SpriteHandle)>();
        let mut found: Vec<_> = query.iter(&app.world).map(|(e, h)| (e, h.0)).collect();
        found.sort_by_key(|(_, id)| *id);
        found
    }

    #[test]
    fn rebuild_keeps_surviving_sprites_and_their_timelines() {
        let (mut stage, a, b) = overlapping_pair();
        let layout = Layout::new(480.0, 860.0, &Config::default());
        let mut app = rebuild_app(stage.clone());
        let kept = spawn_sprite(&mut app, a, Vec2::new(10.0, 0.0));
        app.world
            .entity_mut(kept)
            .insert(playing(&layout, Pose::default(), &[ActionKind::MoveRight]));
        let removed = spawn_sprite(&mut app, b, Vec2::ZERO);

        stage.remove_sprite(b);
        let c = stage.add_sprite(SpriteKind::Dog).unwrap();
        app.insert_resource(stage);
        app.update();

        let found = handles(&mut app);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (kept, a));
        assert_eq!(found[1].1, c);
        assert!(app.world.get_entity(removed).is_none());
        assert!(app.world.get::<Playback>(kept).is_some());
        assert!(!app.world.resource::<UiState>().needs_rebuild);
    }

    #[test]
    fn rebuild_waits_for_the_flag() {
        let (stage, _, _) = overlapping_pair();
        let mut app = rebuild_app(stage);
        app.world.resource_mut::<UiState>().needs_rebuild = false;

        app.update();

        assert!(handles(&mut app).is_empty());
    }
}
