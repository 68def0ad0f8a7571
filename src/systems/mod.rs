mod camera;
mod drag;
mod hover;
mod keybinds;
mod playback;
mod scroll;

pub use camera::*;
pub use drag::*;
pub use hover::*;
pub use keybinds::*;
pub use playback::*;
pub use scroll::*;
