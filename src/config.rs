use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window_width: f32,
    pub window_height: f32,
    pub canvas_width_ratio: f32,
    pub canvas_height_ratio: f32,
    pub sprite_size: f32,
    pub max_sprites: usize,
    pub splash_secs: f32,
    pub step_ms: u64,
    pub move_distance: f32,
    pub rotate_degrees: f32,
    pub repeat_ms: u64,
    pub repeat_iterations: u32,
    pub repeat_distance: f32,
    pub reset_ms: u64,
    pub drag_threshold: f32,
    pub scroll_speed: f32,
    pub font_size: f32,
    pub autoload_project: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 480.0,
            window_height: 860.0,
            canvas_width_ratio: 0.95,
            canvas_height_ratio: 0.6,
            sprite_size: 50.0,
            max_sprites: 5,
            splash_secs: 2.0,
            step_ms: 1000,
            move_distance: 50.0,
            rotate_degrees: 30.0,
            repeat_ms: 500,
            repeat_iterations: 3,
            repeat_distance: 50.0,
            reset_ms: 500,
            drag_threshold: 4.0,
            scroll_speed: 30.0,
            font_size: 16.0,
            autoload_project: true,
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("sprite-stage");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(contents)?)
}

fn read_or_create(path: &PathBuf) -> Result<Config, ConfigError> {
    if path.exists() {
        parse_config(&fs::read_to_string(path)?)
    } else {
        let config = Config::default();
        fs::write(path, toml::to_string_pretty(&config)?)?;
        Ok(config)
    }
}

/// Reads the user config, writing the defaults on first run. Runs before
/// the app exists, so errors are handed back for logging at startup.
pub fn load_config() -> Result<Config, ConfigError> {
    match get_config_path() {
        Some(path) => read_or_create(&path),
        None => Ok(Config::default()),
    }
}
