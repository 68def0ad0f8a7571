use bevy::log::warn;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::actions::{ActionBlock, ActionKind};
use crate::engine::Pose;
use crate::stage::{SpriteKind, Stage, StageError};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no data directory available")]
    NoDataDir,
    #[error("could not access project file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed project file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Stage(#[from] StageError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedSprite {
    pub kind: SpriteKind,
    pub position: [f32; 2],
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Project {
    pub sprites: Vec<SavedSprite>,
}

impl Project {
    pub fn from_stage(stage: &Stage) -> Self {
        let sprites = stage
            .sprites()
            .iter()
            .map(|sprite| SavedSprite {
                kind: sprite.kind,
                position: sprite.pose.position.to_array(),
                rotation: sprite.pose.rotation_deg,
                actions: sprite
                    .actions
                    .iter()
                    .map(|a| a.kind.label().to_string())
                    .collect(),
            })
            .collect();
        Self { sprites }
    }

    /// Rebuilds a stage. Unknown action labels are dropped.
    pub fn into_stage(self, max_sprites: usize) -> Result<Stage, ProjectError> {
        let mut stage = Stage::new(max_sprites);
        let mut next_block = 1;
        for saved in self.sprites {
            let mut actions = Vec::with_capacity(saved.actions.len());
            for label in &saved.actions {
                match ActionKind::from_label(label) {
                    Some(kind) => {
                        actions.push(ActionBlock {
                            id: next_block,
                            kind,
                        });
                        next_block += 1;
                    }
                    None => warn!("Skipping unknown action {:?}", label),
                }
            }
            let pose = Pose {
                position: Vec2::from_array(saved.position),
                rotation_deg: saved.rotation,
            };
            stage.restore_sprite(saved.kind, pose, actions)?;
        }
        Ok(stage)
    }
}

fn project_path() -> Result<PathBuf, ProjectError> {
    let mut path = dirs::data_dir().ok_or(ProjectError::NoDataDir)?;
    path.push("sprite-stage");
    fs::create_dir_all(&path)?;
    path.push("project.json");
    Ok(path)
}

pub fn save_project(stage: &Stage) -> Result<PathBuf, ProjectError> {
    let path = project_path()?;
    let json = serde_json::to_string_pretty(&Project::from_stage(stage))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Returns `Ok(None)` when nothing has been saved yet.
pub fn load_project(max_sprites: usize) -> Result<Option<Stage>, ProjectError> {
    let path = project_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let project: Project = serde_json::from_str(&fs::read_to_string(path)?)?;
    project.into_stage(max_sprites).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_survives_json() {
        let mut stage = Stage::default();
        let cat = stage.add_sprite(SpriteKind::Cat).unwrap();
        stage.add_sprite(SpriteKind::Crab).unwrap();
        stage.set_pose(
            cat,
            Pose {
                position: Vec2::new(12.0, -8.0),
                rotation_deg: 30.0,
            },
        );
        let mut book = stage.script_book();
        book.push(0, ActionKind::Repeat);
        book.push(0, ActionKind::GoRandom);
        stage.apply_script_book(book);

        let json = serde_json::to_string(&Project::from_stage(&stage)).unwrap();
        let restored = serde_json::from_str::<Project>(&json)
            .unwrap()
            .into_stage(5)
            .unwrap();

        assert_eq!(restored.len(), 2);
        let first = &restored.sprites()[0];
        assert_eq!(first.kind, SpriteKind::Cat);
        assert_eq!(first.pose.position, Vec2::new(12.0, -8.0));
        assert_eq!(first.pose.rotation_deg, 30.0);
        let kinds: Vec<_> = first.actions.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::Repeat, ActionKind::GoRandom]);
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let json = r#"{"sprites":[{"kind":"Dog","position":[0.0,0.0],"actions":["Jump","Rotate 30"]}]}"#;
        let stage = serde_json::from_str::<Project>(json)
            .unwrap()
            .into_stage(5)
            .unwrap();
        let actions = &stage.sprites()[0].actions;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Rotate);
    }

    #[test]
    fn too_many_sprites_is_an_error() {
        let saved = SavedSprite {
            kind: SpriteKind::Beetle,
            position: [0.0, 0.0],
            rotation: 0.0,
            actions: Vec::new(),
        };
        let project = Project {
            sprites: vec![saved; 3],
        };
        assert!(matches!(
            project.into_stage(2),
            Err(ProjectError::Stage(StageError::StageFull(2)))
        ));
    }
}
