use bevy::prelude::*;

use crate::config::Config;
use crate::types::{AppScreen, ArtLibrary, ScreenEntity, SplashTimer};

use super::despawn_screen;

const LOGO_SIZE: f32 = 200.0;

pub struct SplashPlugin;

impl Plugin for SplashPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppScreen::Splash), spawn_splash)
            .add_systems(Update, splash_timer_system.run_if(in_state(AppScreen::Splash)))
            .add_systems(OnExit(AppScreen::Splash), despawn_screen);
    }
}

fn spawn_splash(mut commands: Commands, art: Res<ArtLibrary>, config: Res<Config>) {
    commands.spawn((
        SpriteBundle {
            texture: art.logo.clone(),
            sprite: Sprite {
                custom_size: Some(Vec2::splat(LOGO_SIZE)),
                ..default()
            },
            ..default()
        },
        ScreenEntity,
    ));
    commands.insert_resource(SplashTimer(Timer::from_seconds(
        config.splash_secs.max(0.0),
        TimerMode::Once,
    )));
}

/// Replaces the splash with the stage once the timer runs out.
fn splash_timer_system(
    time: Res<Time>,
    mut timer: ResMut<SplashTimer>,
    mut next_screen: ResMut<NextState<AppScreen>>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        next_screen.set(AppScreen::Stage);
    }
}
