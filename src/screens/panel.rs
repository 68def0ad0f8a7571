use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_easings::{Ease, EaseFunction, EasingComponent, EasingType};
use std::time::Duration;

use crate::actions::ActionKind;
use crate::components::{
    label_bundle, rect_bundle, spawn_button, spawn_outlined, wrapped_label_bundle,
};
use crate::config::Config;
use crate::layout::{Layout, ACTION_ROW_HEIGHT, PALETTE_BLOCK_HEIGHT, TAB_SIZE};
use crate::sets::{InputSystemSet, LogicSystemSet, RenderSystemSet};
use crate::stage::Stage;
use crate::systems::cancel_drag_system;
use crate::types::*;
use crate::utils::world_cursor;

use super::despawn_screen;
use super::stage::PanelRequest;

const BACKGROUND_Z: f32 = 1.0;
const BLOCK_Z: f32 = 5.0;
const SNAP_BACK_MS: u64 = 300;
const EMPTY_LIST: &str = "No actions added for this sprite.";
const NO_SPRITES: &str = "Add a sprite to the stage first.";

pub struct ActionPanelPlugin;

impl Plugin for ActionPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppScreen::ActionPanel), spawn_panel_screen)
            .add_systems(
                Update,
                panel_escape_system
                    .in_set(InputSystemSet::Keyboard)
                    .before(cancel_drag_system)
                    .run_if(in_state(AppScreen::ActionPanel)),
            )
            .add_systems(
                Update,
                (panel_event_system, panel_scroll_system)
                    .in_set(LogicSystemSet::Screen)
                    .run_if(in_state(AppScreen::ActionPanel)),
            )
            .add_systems(
                Update,
                (palette_drop_system, item_drop_system)
                    .in_set(LogicSystemSet::DragLogic)
                    .run_if(in_state(AppScreen::ActionPanel)),
            )
            .add_systems(
                Update,
                (rebuild_action_list, highlight_tabs)
                    .chain()
                    .in_set(RenderSystemSet::UIUpdate)
                    .run_if(in_state(AppScreen::ActionPanel)),
            )
            .add_systems(OnExit(AppScreen::ActionPanel), (despawn_screen, leave_panel));
    }
}

fn block_size(layout: &Layout) -> Vec2 {
    Vec2::new(layout.palette_width - 20.0, PALETTE_BLOCK_HEIGHT)
}

fn row_size(layout: &Layout) -> Vec2 {
    Vec2::new(layout.panel_width - 20.0, ACTION_ROW_HEIGHT - 6.0)
}

fn spawn_panel_screen(
    mut commands: Commands,
    stage: Res<Stage>,
    request: Res<PanelRequest>,
    layout: Res<Layout>,
    config: Res<Config>,
    mut panel: ResMut<PanelState>,
) {
    panel.book = stage.script_book();
    panel.active_tab = request.0.min(panel.book.slot_count().saturating_sub(1));
    panel.needs_rebuild = true;
    info!(
        "Editing actions for sprite {} of {}",
        panel.active_tab + 1,
        panel.book.slot_count()
    );

    // Palette column.
    spawn_outlined(
        &mut commands,
        LIGHT_GREY,
        BORDER_GREY,
        Vec2::new(layout.palette_width - 6.0, layout.window.y - 20.0),
        Vec3::new(layout.palette_x, 0.0, BACKGROUND_Z),
    );
    commands.spawn((
        label_bundle(
            "CODE",
            config.font_size + 4.0,
            TEXT_DARK,
            Vec3::new(layout.palette_x, layout.palette_top, BLOCK_Z),
        ),
        ScreenEntity,
    ));

    let size = block_size(&layout);
    for (i, kind) in ActionKind::ALL.into_iter().enumerate() {
        let home = layout.palette_slot(i).extend(BLOCK_Z);
        commands
            .spawn(rect_bundle(BLUE, size, home))
            .insert((
                PaletteBlock { kind, home },
                Draggable { size },
                ScreenEntity,
                Name::new(kind.label()),
            ))
            .with_children(|parent| {
                parent.spawn(wrapped_label_bundle(
                    kind.label(),
                    config.font_size - 2.0,
                    Color::WHITE,
                    size.x - 8.0,
                    Vec3::new(0.0, 0.0, 0.1),
                ));
            });
    }

    let tabs = panel.book.slot_count();
    let tab_size = Vec2::new(layout.tab_width(tabs), TAB_SIZE.y);
    for slot in 0..tabs {
        spawn_button(
            &mut commands,
            UiAction::SelectTab(slot),
            &format!("Sprite {}", slot + 1),
            BORDER_GREY,
            tab_size,
            layout.tab_center(slot, tabs).extend(BLOCK_Z),
            12.0,
        );
    }

    let list = layout.action_list;
    spawn_outlined(
        &mut commands,
        Color::WHITE,
        BORDER_GREY,
        list.size(),
        list.center().extend(BACKGROUND_Z),
    );

    spawn_button(
        &mut commands,
        UiAction::Done,
        "Done",
        GREEN,
        Vec2::new(120.0, 40.0),
        layout.done_button.extend(BLOCK_Z),
        config.font_size,
    );
}

/// The working copy is dropped unless "Done" already committed it.
fn leave_panel(mut panel: ResMut<PanelState>, mut ui_state: ResMut<UiState>) {
    *panel = PanelState::default();
    ui_state.dragging = None;
    ui_state.needs_rebuild = true;
}

fn panel_escape_system(
    keyboard_input: Res<Input<KeyCode>>,
    ui_state: Res<UiState>,
    mut next_screen: ResMut<NextState<AppScreen>>,
) {
    if keyboard_input.just_pressed(KeyCode::Escape) && ui_state.dragging.is_none() {
        info!("Leaving the action panel without saving");
        next_screen.set(AppScreen::Stage);
    }
}

fn panel_event_system(
    mut events: EventReader<UiEvent>,
    mut panel: ResMut<PanelState>,
    mut stage: ResMut<Stage>,
    mut next_screen: ResMut<NextState<AppScreen>>,
) {
    for UiEvent(action) in events.read() {
        match *action {
            UiAction::SelectTab(slot) if slot < panel.book.slot_count() => {
                panel.active_tab = slot;
                panel.list_scroll = 0;
                panel.needs_rebuild = true;
            }
            UiAction::DeleteAction(id) => {
                let tab = panel.active_tab;
                if panel.book.delete(tab, id) {
                    panel.needs_rebuild = true;
                }
            }
            UiAction::Done => {
                stage.apply_script_book(panel.book.clone());
                info!("Saved actions for {} sprites", panel.book.slot_count());
                next_screen.set(AppScreen::Stage);
            }
            _ => {}
        }
    }
}

/// A palette block released inside the action list appends its action to
/// the active tab. Anywhere else it eases back to the palette.
#[allow(clippy::too_many_arguments)]
fn palette_drop_system(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<Input<MouseButton>>,
    ui_state: Res<UiState>,
    layout: Res<Layout>,
    mut panel: ResMut<PanelState>,
    mut q_blocks: Query<(&mut Transform, &PaletteBlock), With<Dragging>>,
) {
    if !mouse_button.just_released(MouseButton::Left) {
        return;
    }
    let Some(entity) = ui_state.dragging else {
        return;
    };
    let Ok((mut transform, block)) = q_blocks.get_mut(entity) else {
        return;
    };
    let point =
        world_cursor(&windows, &q_camera).unwrap_or_else(|| transform.translation.truncate());
    let tab = panel.active_tab;
    if let Some(id) = panel
        .book
        .handle_drop(tab, block.kind, point, layout.action_list)
    {
        debug!("Appended {} (block {}) to sprite {}", block.kind, id, tab + 1);
        // Keep the new row in view.
        panel.list_scroll = layout.max_first_row(panel.book.slot(tab).len());
        transform.translation = block.home;
        panel.needs_rebuild = true;
        return;
    }

    let target = Transform {
        translation: block.home,
        ..*transform
    };
    commands.entity(entity).insert((*transform).ease_to(
        target,
        EaseFunction::QuadraticInOut,
        EasingType::Once {
            duration: Duration::from_millis(SNAP_BACK_MS),
        },
    ));
}

/// Dropping a listed action moves it to the row under its new position.
fn item_drop_system(
    mouse_button: Res<Input<MouseButton>>,
    ui_state: Res<UiState>,
    layout: Res<Layout>,
    mut panel: ResMut<PanelState>,
    q_items: Query<(&Transform, &ActionItem), With<Dragging>>,
) {
    if !mouse_button.just_released(MouseButton::Left) {
        return;
    }
    let Some(entity) = ui_state.dragging else {
        return;
    };
    let Ok((transform, item)) = q_items.get(entity) else {
        return;
    };
    let tab = panel.active_tab;
    let rows = panel.book.slot(tab).len();
    let to = layout.row_for_y(transform.translation.y, panel.list_scroll, rows);
    if to != item.index {
        debug!("Moving block {} from row {} to row {}", item.id, item.index, to);
        panel.book.move_block(tab, item.index, to);
    }
    // Rebuilt either way so the row snaps into its slot.
    panel.needs_rebuild = true;
}

/// The wheel scrolls the action list one row per line.
fn panel_scroll_system(
    mut scroll_events: EventReader<MouseWheel>,
    layout: Res<Layout>,
    ui_state: Res<UiState>,
    mut panel: ResMut<PanelState>,
) {
    let lines: f32 = scroll_events
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / ACTION_ROW_HEIGHT,
        })
        .sum();
    if lines == 0.0 || ui_state.dragging.is_some() {
        return;
    }
    let rows = panel.book.slot(panel.active_tab).len();
    let steps = lines.abs().ceil() as usize;
    // Wheel up shows earlier rows.
    let first = if lines > 0.0 {
        panel.list_scroll.saturating_sub(steps)
    } else {
        (panel.list_scroll + steps).min(layout.max_first_row(rows))
    };
    if first != panel.list_scroll {
        panel.list_scroll = first;
        panel.needs_rebuild = true;
    }
}

#[allow(clippy::too_many_arguments)]
fn rebuild_action_list(
    mut commands: Commands,
    mut panel: ResMut<PanelState>,
    mut ui_state: ResMut<UiState>,
    layout: Res<Layout>,
    config: Res<Config>,
    q_rows: Query<Entity, With<ActionListEntity>>,
    mut q_blocks: Query<
        (&mut Transform, &PaletteBlock),
        (Without<Dragging>, Without<EasingComponent<Transform>>),
    >,
) {
    if !panel.needs_rebuild && !ui_state.needs_rebuild {
        return;
    }
    panel.needs_rebuild = false;
    ui_state.needs_rebuild = false;

    for entity in &q_rows {
        commands.entity(entity).despawn_recursive();
    }
    // A cancelled drag can leave a palette block stranded.
    for (mut transform, block) in &mut q_blocks {
        transform.translation = block.home;
    }

    let tab = panel.active_tab;
    // Deletions can leave the list scrolled past its end.
    let rows = panel.book.slot(tab).len();
    panel.list_scroll = panel.list_scroll.min(layout.max_first_row(rows));
    let first = panel.list_scroll;
    let blocks = panel.book.slot(tab);
    if blocks.is_empty() {
        let message = if panel.book.slot_count() == 0 {
            NO_SPRITES
        } else {
            EMPTY_LIST
        };
        commands.spawn((
            wrapped_label_bundle(
                message,
                config.font_size,
                TEXT_DARK,
                layout.action_list.width() - 20.0,
                layout.action_row(0).extend(BLOCK_Z),
            ),
            ActionListEntity,
            ScreenEntity,
        ));
        return;
    }

    let size = row_size(&layout);
    let on_screen = blocks
        .iter()
        .enumerate()
        .skip(first)
        .take(layout.visible_rows());
    for (index, block) in on_screen {
        let home = layout.action_row(index - first).extend(BLOCK_Z);
        let delete = spawn_button(
            &mut commands,
            UiAction::DeleteAction(block.id),
            "Delete",
            RED,
            Vec2::new(56.0, size.y - 8.0),
            Vec3::new(size.x / 2.0 - 34.0, 0.0, 1.0),
            12.0,
        );
        commands
            .spawn(rect_bundle(GREEN, size, home))
            .insert((
                ActionItem {
                    id: block.id,
                    index,
                },
                Draggable { size },
                ActionListEntity,
                ScreenEntity,
                Name::new(format!("action {}", block.id)),
            ))
            .with_children(|parent| {
                parent.spawn(label_bundle(
                    block.kind.label(),
                    config.font_size - 2.0,
                    Color::WHITE,
                    Vec3::new(-34.0, 0.0, 0.1),
                ));
            })
            .add_child(delete);
    }
}

fn highlight_tabs(panel: Res<PanelState>, mut q_tabs: Query<(&Clickable, &mut Sprite)>) {
    if !panel.is_changed() {
        return;
    }
    for (clickable, mut sprite) in &mut q_tabs {
        if let UiAction::SelectTab(slot) = clickable.action {
            let color = if slot == panel.active_tab {
                BLUE
            } else {
                BORDER_GREY
            };
            if sprite.color != color {
                sprite.color = color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::configure_sets;
    use crate::stage::SpriteKind;

    fn two_sprite_stage() -> Stage {
        let mut stage = Stage::default();
        stage.add_sprite(SpriteKind::Cat).unwrap();
        stage.add_sprite(SpriteKind::Beetle).unwrap();
        stage
    }

    /// An app already switched to the action panel.
    fn panel_app(stage: Stage) -> App {
        let config = Config::default();
        let layout = Layout::new(config.window_width, config.window_height, &config);
        let mut app = App::new();
        app.add_state::<AppScreen>()
            .add_event::<UiEvent>()
            .add_event::<MouseWheel>()
            .insert_resource(layout)
            .insert_resource(config)
            .insert_resource(stage)
            .init_resource::<PanelRequest>()
            .init_resource::<PanelState>()
            .init_resource::<UiState>()
            .init_resource::<Input<KeyCode>>()
            .init_resource::<Input<MouseButton>>();
        configure_sets(&mut app);
        app.add_systems(Update, cancel_drag_system.in_set(InputSystemSet::Keyboard))
            .add_plugins(ActionPanelPlugin);
        app.world
            .resource_mut::<NextState<AppScreen>>()
            .set(AppScreen::ActionPanel);
        app.update();
        app
    }

    fn screen(app: &App) -> AppScreen {
        *app.world.resource::<State<AppScreen>>().get()
    }

    fn stage_scripts(app: &App) -> Vec<Vec<ActionKind>> {
        app.world
            .resource::<Stage>()
            .sprites()
            .iter()
            .map(|s| s.actions.iter().map(|a| a.kind).collect())
            .collect()
    }

    fn listed_rows(app: &mut App) -> Vec<usize> {
        let mut query = app.world.query::<&ActionItem>();
        let mut rows: Vec<_> = query.iter(&app.world).map(|item| item.index).collect();
        rows.sort_unstable();
        rows
    }

    fn wheel(app: &mut App, y: f32) {
        app.world.send_event(MouseWheel {
            unit: MouseScrollUnit::Line,
            x: 0.0,
            y,
            window: Entity::PLACEHOLDER,
        });
        app.update();
    }

    #[test]
    fn done_commits_the_working_copy() {
        let mut app = panel_app(two_sprite_stage());
        assert_eq!(screen(&app), AppScreen::ActionPanel);
        {
            let mut panel = app.world.resource_mut::<PanelState>();
            panel.book.push(1, ActionKind::GoRandom);
            panel.book.push(0, ActionKind::Rotate);
        }

        app.world.send_event(UiEvent(UiAction::Done));
        app.update();
        app.update();

        assert_eq!(screen(&app), AppScreen::Stage);
        assert_eq!(
            stage_scripts(&app),
            vec![vec![ActionKind::Rotate], vec![ActionKind::GoRandom]]
        );
        assert_eq!(app.world.resource::<PanelState>().book.slot_count(), 0);
        assert!(app.world.resource::<UiState>().needs_rebuild);
    }

    #[test]
    fn escape_discards_the_working_copy() {
        let mut app = panel_app(two_sprite_stage());
        app.world
            .resource_mut::<PanelState>()
            .book
            .push(0, ActionKind::MoveLeft);

        app.world
            .resource_mut::<Input<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        app.update();

        assert_eq!(screen(&app), AppScreen::Stage);
        assert_eq!(stage_scripts(&app), vec![Vec::new(), Vec::new()]);
        assert_eq!(app.world.resource::<PanelState>().book.slot_count(), 0);
    }

    #[test]
    fn long_lists_show_one_page_and_scroll_by_row() {
        let mut app = panel_app(two_sprite_stage());
        let visible = app.world.resource::<Layout>().visible_rows();
        let total = visible + 4;
        {
            let mut panel = app.world.resource_mut::<PanelState>();
            for _ in 0..total {
                panel.book.push(0, ActionKind::MoveRight);
            }
            panel.needs_rebuild = true;
        }
        app.update();
        assert_eq!(listed_rows(&mut app), (0..visible).collect::<Vec<_>>());

        wheel(&mut app, -3.0);
        assert_eq!(app.world.resource::<PanelState>().list_scroll, 3);
        assert_eq!(listed_rows(&mut app), (3..visible + 3).collect::<Vec<_>>());

        // Scrolling stops once the last row is on screen.
        wheel(&mut app, -10.0);
        assert_eq!(app.world.resource::<PanelState>().list_scroll, 4);
        assert_eq!(listed_rows(&mut app), (4..total).collect::<Vec<_>>());

        wheel(&mut app, 10.0);
        assert_eq!(listed_rows(&mut app), (0..visible).collect::<Vec<_>>());
    }

    #[test]
    fn switching_tabs_scrolls_back_to_the_top() {
        let mut app = panel_app(two_sprite_stage());
        app.world.resource_mut::<PanelState>().list_scroll = 5;

        app.world.send_event(UiEvent(UiAction::SelectTab(1)));
        app.update();

        let panel = app.world.resource::<PanelState>();
        assert_eq!(panel.active_tab, 1);
        assert_eq!(panel.list_scroll, 0);
    }

    #[test]
    fn palette_blocks_stay_inside_the_window() {
        let layout = Layout::new(480.0, 860.0, &Config::default());
        let size = block_size(&layout);
        let last = layout.palette_slot(ActionKind::ALL.len() - 1);
        assert!(last.y - size.y / 2.0 > -layout.window.y / 2.0);
        assert!(size.x > 0.0);
    }

    #[test]
    fn palette_blocks_start_outside_the_drop_area() {
        let layout = Layout::new(480.0, 860.0, &Config::default());
        for i in 0..ActionKind::ALL.len() {
            assert!(!layout.action_list.contains(layout.palette_slot(i)));
        }
    }

    #[test]
    fn rows_fit_inside_the_action_list() {
        let layout = Layout::new(480.0, 860.0, &Config::default());
        let size = row_size(&layout);
        assert!(size.x < layout.action_list.width());
        assert!(layout.action_list.contains(layout.action_row(0)));
    }
}
