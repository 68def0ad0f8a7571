use bevy::log::info;
use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::{ActionBlock, ScriptBook};
use crate::engine::{collision, Canvas, MotionSettings, Pose, Timeline};

pub const MAX_SPRITES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Cat,
    Dragon,
    Beetle,
    Crab,
    Dog,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 5] = [
        SpriteKind::Cat,
        SpriteKind::Dragon,
        SpriteKind::Beetle,
        SpriteKind::Crab,
        SpriteKind::Dog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpriteKind::Cat => "Cat",
            SpriteKind::Dragon => "Dragon",
            SpriteKind::Beetle => "Beetle",
            SpriteKind::Crab => "Crab",
            SpriteKind::Dog => "Dog",
        }
    }
}

pub type SpriteId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct StageSprite {
    pub id: SpriteId,
    pub kind: SpriteKind,
    pub pose: Pose,
    pub actions: Vec<ActionBlock>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("the stage already holds {0} sprites")]
    StageFull(usize),
}

/// Every sprite on the canvas, in carousel order.
#[derive(Resource, Debug, Clone)]
pub struct Stage {
    sprites: Vec<StageSprite>,
    selected: Option<SpriteId>,
    next_id: SpriteId,
    max_sprites: usize,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(MAX_SPRITES)
    }
}

impl Stage {
    pub fn new(max_sprites: usize) -> Self {
        Self {
            sprites: Vec::new(),
            selected: None,
            next_id: 1,
            max_sprites,
        }
    }

    pub fn sprites(&self) -> &[StageSprite] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sprites.len() >= self.max_sprites
    }

    pub fn get(&self, id: SpriteId) -> Option<&StageSprite> {
        self.sprites.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut StageSprite> {
        self.sprites.iter_mut().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: SpriteId) -> Option<usize> {
        self.sprites.iter().position(|s| s.id == id)
    }

    pub fn add_sprite(&mut self, kind: SpriteKind) -> Result<SpriteId, StageError> {
        if self.is_full() {
            return Err(StageError::StageFull(self.max_sprites));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.sprites.push(StageSprite {
            id,
            kind,
            pose: Pose::default(),
            actions: Vec::new(),
        });
        self.selected = Some(id);
        Ok(id)
    }

    /// Inserts a sprite restored from disk, keeping its pose and script.
    pub fn restore_sprite(
        &mut self,
        kind: SpriteKind,
        pose: Pose,
        actions: Vec<ActionBlock>,
    ) -> Result<SpriteId, StageError> {
        let id = self.add_sprite(kind)?;
        if let Some(sprite) = self.get_mut(id) {
            sprite.pose = pose;
            sprite.actions = actions;
        }
        Ok(id)
    }

    pub fn remove_sprite(&mut self, id: SpriteId) -> Option<StageSprite> {
        let index = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.sprites.remove(index))
    }

    pub fn select(&mut self, id: SpriteId) {
        if self.get(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn selected(&self) -> Option<&StageSprite> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn set_position(&mut self, id: SpriteId, position: Vec2) {
        if let Some(sprite) = self.get_mut(id) {
            sprite.pose.position = position;
        }
    }

    pub fn set_pose(&mut self, id: SpriteId, pose: Pose) {
        if let Some(sprite) = self.get_mut(id) {
            sprite.pose = pose;
        }
    }

    /// Sends every sprite back to the canvas origin. Rotation is kept.
    pub fn reset(&mut self) {
        for sprite in &mut self.sprites {
            sprite.pose.position = Vec2::ZERO;
        }
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.sprites.iter().map(|s| s.pose.position).collect()
    }

    pub fn script_book(&self) -> ScriptBook {
        ScriptBook::from_lists(self.sprites.iter().map(|s| s.actions.clone()).collect())
    }

    /// Commits edited scripts back to the sprites by slot index.
    pub fn apply_script_book(&mut self, book: ScriptBook) {
        for (sprite, actions) in self.sprites.iter_mut().zip(book.into_lists()) {
            sprite.actions = actions;
        }
    }

    /// When any two sprites overlap, every sprite takes over the script of
    /// the next one in carousel order.
    pub fn swap_on_collision(&mut self, min_distance: f32) -> bool {
        let positions = self.positions();
        let Some((a, b)) = collision::first_collision(&positions, min_distance) else {
            return false;
        };
        info!(
            "Collision detected between {} and {}, swapping animations",
            self.sprites[a].kind.name(),
            self.sprites[b].kind.name()
        );
        let mut book = self.script_book();
        book.rotate_left();
        self.apply_script_book(book);
        true
    }

    pub fn build_timelines<R: Rng + ?Sized>(
        &self,
        canvas: &Canvas,
        settings: &MotionSettings,
        rng: &mut R,
    ) -> Vec<(SpriteId, Timeline)> {
        self.sprites
            .iter()
            .filter(|sprite| !sprite.actions.is_empty())
            .map(|sprite| {
                info!(
                    "Executing {} actions for sprite {}",
                    sprite.actions.len(),
                    sprite.kind.name()
                );
                let kinds: Vec<_> = sprite.actions.iter().map(|a| a.kind).collect();
                (
                    sprite.id,
                    Timeline::compile(sprite.pose, &kinds, canvas, settings, rng),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stage_with(kinds: &[SpriteKind]) -> (Stage, Vec<SpriteId>) {
        let mut stage = Stage::default();
        let ids = kinds
            .iter()
            .map(|&k| stage.add_sprite(k).unwrap())
            .collect();
        (stage, ids)
    }

    #[test]
    fn sixth_sprite_is_rejected() {
        let (mut stage, _) = stage_with(&SpriteKind::ALL);
        assert!(stage.is_full());
        assert_eq!(
            stage.add_sprite(SpriteKind::Cat),
            Err(StageError::StageFull(MAX_SPRITES))
        );
        assert_eq!(stage.len(), 5);
    }

    #[test]
    fn new_sprite_starts_at_origin_and_is_selected() {
        let (stage, ids) = stage_with(&[SpriteKind::Cat, SpriteKind::Dog]);
        let dog = stage.get(ids[1]).unwrap();
        assert_eq!(dog.pose.position, Vec2::ZERO);
        assert_eq!(stage.selected().map(|s| s.id), Some(ids[1]));
    }

    #[test]
    fn removing_selected_clears_selection() {
        let (mut stage, ids) = stage_with(&[SpriteKind::Cat, SpriteKind::Dog]);
        stage.select(ids[0]);
        stage.remove_sprite(ids[1]);
        assert_eq!(stage.selected().map(|s| s.id), Some(ids[0]));
        stage.remove_sprite(ids[0]);
        assert!(stage.selected().is_none());
        assert!(stage.is_empty());
    }

    #[test]
    fn reset_returns_everyone_home() {
        let (mut stage, ids) = stage_with(&[SpriteKind::Cat, SpriteKind::Crab]);
        stage.set_position(ids[0], Vec2::new(40.0, 40.0));
        stage.set_position(ids[1], Vec2::new(-90.0, 10.0));
        stage.reset();
        assert!(stage.positions().iter().all(|p| *p == Vec2::ZERO));
    }

    #[test]
    fn script_book_round_trip_by_slot() {
        let (mut stage, ids) = stage_with(&[SpriteKind::Cat, SpriteKind::Dragon]);
        let mut book = stage.script_book();
        book.push(1, ActionKind::Rotate);
        stage.apply_script_book(book);

        assert!(stage.get(ids[0]).unwrap().actions.is_empty());
        assert_eq!(stage.get(ids[1]).unwrap().actions[0].kind, ActionKind::Rotate);
    }

    #[test]
    fn collision_rotates_scripts() {
        let (mut stage, ids) =
            stage_with(&[SpriteKind::Cat, SpriteKind::Dragon, SpriteKind::Beetle]);
        let mut book = stage.script_book();
        book.push(0, ActionKind::MoveRight);
        book.push(1, ActionKind::MoveLeft);
        book.push(2, ActionKind::GoHome);
        stage.apply_script_book(book);

        stage.set_position(ids[0], Vec2::new(-150.0, 0.0));
        stage.set_position(ids[1], Vec2::new(150.0, 0.0));
        assert!(!stage.swap_on_collision(50.0));

        stage.set_position(ids[2], Vec2::new(140.0, 20.0));
        assert!(stage.swap_on_collision(50.0));

        let first = |id| stage.get(id).unwrap().actions[0].kind;
        assert_eq!(first(ids[0]), ActionKind::MoveLeft);
        assert_eq!(first(ids[1]), ActionKind::GoHome);
        assert_eq!(first(ids[2]), ActionKind::MoveRight);
    }

    #[test]
    fn timelines_only_for_scripted_sprites() {
        let (mut stage, ids) = stage_with(&[SpriteKind::Cat, SpriteKind::Dog]);
        let mut book = stage.script_book();
        book.push(1, ActionKind::MoveRight);
        stage.apply_script_book(book);
        stage.set_position(ids[1], Vec2::new(10.0, 0.0));

        let canvas = Canvas::new(400.0, 300.0, 50.0);
        let mut rng = StdRng::seed_from_u64(3);
        let timelines = stage.build_timelines(&canvas, &MotionSettings::default(), &mut rng);

        assert_eq!(timelines.len(), 1);
        assert_eq!(timelines[0].0, ids[1]);
        assert_eq!(timelines[0].1.end_pose().position, Vec2::new(60.0, 0.0));
    }
}
