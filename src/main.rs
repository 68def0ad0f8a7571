use bevy::prelude::*;
use bevy::window::{Window, WindowPlugin, WindowResolution};
use bevy_easings::EasingsPlugin;

mod actions;
mod components;
mod config;
mod engine;
mod layout;
mod project;
mod screens;
mod sets;
mod stage;
mod systems;
mod types;
mod utils;

use config::{load_config, Config};
use layout::Layout;
use project::load_project;
use screens::{ActionPanelPlugin, SplashPlugin, StagePlugin};
use sets::{configure_sets, InputSystemSet, LogicSystemSet, RenderSystemSet};
use stage::{SpriteKind, Stage};
use systems::*;
use types::*;
use utils::{load_logo_image, load_sprite_image};

fn main() {
    let (config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e.to_string())),
    };
    let layout = Layout::new(config.window_width, config.window_height, &config);
    let stage = Stage::new(config.max_sprites);

    let mut app = App::new();
    app.insert_resource(Msaa::Sample4)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Sprite Stage".into(),
                resolution: WindowResolution::new(config.window_width, config.window_height),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EasingsPlugin)
        .add_state::<AppScreen>()
        .add_event::<UiEvent>()
        .insert_resource(ClearColor(LIGHT_GREY))
        .insert_resource(config)
        .insert_resource(layout)
        .insert_resource(stage)
        .init_resource::<UiState>()
        .init_resource::<PlaybackState>()
        .init_resource::<ScrollState>()
        .init_resource::<PanelState>()
        .init_resource::<ArtLibrary>()
        .add_systems(Startup, (setup_camera, load_art, restore_project))
        // Logging only exists once the plugins are built.
        .add_systems(Startup, move || {
            if let Some(e) = &config_error {
                warn!("{}, using default config", e);
            }
        });

    configure_sets(&mut app);

    app.add_systems(
        Update,
        (
            drag_register_click_system,
            drag_check_system,
            drag_update_system,
            click_dispatch_system,
        )
            .chain()
            .in_set(InputSystemSet::Pointer),
    )
    .add_systems(
        Update,
        (cancel_drag_system, exit_on_q).in_set(InputSystemSet::Keyboard),
    )
    // Screen drop handlers see the released entity before this clears it.
    .add_systems(
        Update,
        drag_end_system
            .after(LogicSystemSet::DragLogic)
            .before(LogicSystemSet::Playback),
    )
    .add_systems(
        Update,
        (hover_system, hover_animation_system)
            .chain()
            .in_set(RenderSystemSet::UIUpdate),
    )
    .add_plugins((SplashPlugin, StagePlugin, ActionPanelPlugin))
    .run();
}

fn load_art(mut images: ResMut<Assets<Image>>, mut art: ResMut<ArtLibrary>) {
    for kind in SpriteKind::ALL {
        let handle = images.add(load_sprite_image(kind));
        art.sprites.insert(kind, handle);
    }
    art.logo = images.add(load_logo_image());
    info!("Loaded art for {} sprites", art.sprites.len());
}

/// Brings back the last saved stage when `autoload_project` is set.
fn restore_project(config: Res<Config>, mut stage: ResMut<Stage>) {
    if !config.autoload_project {
        return;
    }
    match load_project(config.max_sprites) {
        Ok(Some(saved)) => {
            info!("Restored {} sprites from the last session", saved.len());
            *stage = saved;
        }
        Ok(None) => {}
        Err(e) => warn!("Could not load saved project: {}", e),
    }
}
