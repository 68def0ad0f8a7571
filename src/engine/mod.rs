mod canvas;
pub mod collision;
mod timeline;

pub use canvas::Canvas;
pub use timeline::{MotionSettings, Pose, Timeline};
