use bevy::prelude::*;
use bevy_easings::{Ease, EaseFunction, EasingComponent, EasingType};
use std::time::Duration;

use crate::components::pose_for;
use crate::config::Config;
use crate::engine::{MotionSettings, Pose};
use crate::layout::Layout;
use crate::stage::Stage;
use crate::types::*;

/// Compiles every sprite's script and sets all of them running at once.
pub fn start_playback(
    commands: &mut Commands,
    stage: &Stage,
    layout: &Layout,
    config: &Config,
    q_sprites: &Query<(Entity, &SpriteHandle, &Transform)>,
    playback_state: &mut PlaybackState,
) {
    if stage.is_empty() {
        return;
    }
    let settings = MotionSettings::from(config);
    let mut rng = rand::thread_rng();
    let timelines = stage.build_timelines(&layout.canvas, &settings, &mut rng);
    if timelines.is_empty() {
        info!("Nothing to play, no sprite has actions");
        return;
    }

    let mut started = 0;
    for (id, timeline) in timelines {
        if let Some((entity, _, _)) = q_sprites.iter().find(|(_, handle, _)| handle.0 == id) {
            commands
                .entity(entity)
                .remove::<EasingComponent<Transform>>()
                .insert(Playback {
                    timeline,
                    elapsed: 0.0,
                });
            started += 1;
        }
    }
    if started > 0 {
        playback_state.running = true;
        playback_state.pending = true;
    }
}

/// Tweens every sprite back to the canvas origin.
pub fn reset_stage(
    commands: &mut Commands,
    stage: &mut Stage,
    layout: &Layout,
    config: &Config,
    q_sprites: &Query<(Entity, &SpriteHandle, &Transform)>,
    playback_state: &mut PlaybackState,
) {
    stage.reset();
    for (entity, handle, transform) in q_sprites.iter() {
        let Some(index) = stage.index_of(handle.0) else {
            continue;
        };
        let pose = stage.sprites()[index].pose;
        let target = Transform {
            scale: transform.scale,
            ..pose_for(layout, pose, index)
        };
        commands.entity(entity).remove::<Playback>().insert((*transform).ease_to(
            target,
            EaseFunction::QuadraticInOut,
            EasingType::Once {
                duration: Duration::from_millis(config.reset_ms),
            },
        ));
    }
    playback_state.running = false;
    playback_state.pending = false;
    playback_state.settling = true;
}

pub fn playback_system(
    mut commands: Commands,
    time: Res<Time>,
    mut stage: ResMut<Stage>,
    mut q_playing: Query<(Entity, &SpriteHandle, &mut Playback), Without<Dragging>>,
) {
    let delta = time.delta_seconds();
    for (entity, handle, mut playback) in &mut q_playing {
        playback.elapsed += delta;
        let pose: Pose = playback.timeline.sample(playback.elapsed);
        stage.set_pose(handle.0, pose);
        if playback.timeline.is_finished(playback.elapsed) {
            commands.entity(entity).remove::<Playback>();
        }
    }
}

/// Once the last timeline has finished, overlapping sprites trade scripts.
pub fn playback_finish_system(
    mut playback_state: ResMut<PlaybackState>,
    mut stage: ResMut<Stage>,
    config: Res<Config>,
    q_playing: Query<(), With<Playback>>,
) {
    if playback_state.pending {
        if !q_playing.is_empty() {
            playback_state.pending = false;
        }
        return;
    }
    if playback_state.running && q_playing.is_empty() {
        playback_state.running = false;
        info!("Playback finished");
        stage.swap_on_collision(config.sprite_size);
    }
}

pub fn sync_sprite_transforms(
    mut playback_state: ResMut<PlaybackState>,
    stage: Res<Stage>,
    layout: Res<Layout>,
    mut q_sprites: Query<
        (&SpriteHandle, &mut Transform),
        (Without<Dragging>, Without<EasingComponent<Transform>>),
    >,
) {
    // The reset tweens are not attached until the end of this frame.
    if std::mem::take(&mut playback_state.settling) {
        return;
    }
    for (handle, mut transform) in &mut q_sprites {
        let Some(index) = stage.index_of(handle.0) else {
            continue;
        };
        let target = Transform {
            scale: transform.scale,
            ..pose_for(&layout, stage.sprites()[index].pose, index)
        };
        if *transform != target {
            *transform = target;
        }
    }
}
