use bevy::math::Vec2;
use rand::Rng;

use crate::config::Config;

/// The drawing area sprites live on.
///
/// Positions are in authoring coordinates: origin at the centre of the
/// canvas, +x to the right and +y downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub sprite_size: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32, sprite_size: f32) -> Self {
        Self {
            width,
            height,
            sprite_size,
        }
    }

    pub fn from_window(window_width: f32, window_height: f32, config: &Config) -> Self {
        Self::new(
            window_width * config.canvas_width_ratio,
            window_height * config.canvas_height_ratio,
            config.sprite_size,
        )
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Keeps a dragged sprite one sprite-size away from every edge.
    pub fn clamp_drag(&self, point: Vec2) -> Vec2 {
        let half = self.half_extents();
        let x = point
            .x
            .max(-half.x + self.sprite_size)
            .min(half.x - self.sprite_size);
        let y = point
            .y
            .max(-half.y + self.sprite_size)
            .min(half.y - self.sprite_size);
        Vec2::new(x, y)
    }

    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let x = (rng.gen::<f32>() * self.width).floor() - self.width / 2.0;
        let y = (rng.gen::<f32>() * self.height).floor() - self.height / 2.0;
        Vec2::new(x, y)
    }

    /// Converts authoring coordinates into world space for a canvas whose
    /// centre sits at `origin`.
    pub fn to_world(&self, origin: Vec2, point: Vec2) -> Vec2 {
        Vec2::new(origin.x + point.x, origin.y - point.y)
    }

    pub fn from_world(&self, origin: Vec2, world: Vec2) -> Vec2 {
        Vec2::new(world.x - origin.x, origin.y - world.y)
    }
}
