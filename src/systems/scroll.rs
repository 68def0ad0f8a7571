use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::config::Config;
use crate::layout::Layout;
use crate::stage::Stage;
use crate::types::*;

pub fn scroll_system(
    mut scroll_state: ResMut<ScrollState>,
    mut scroll_events: EventReader<MouseWheel>,
    stage: Res<Stage>,
    layout: Res<Layout>,
    config: Res<Config>,
    ui_state: Res<UiState>,
) {
    if ui_state.picker_open {
        scroll_events.clear();
        return;
    }
    // One box per sprite plus the "+" box while there is room.
    let boxes = stage.len() + usize::from(!stage.is_full());
    let max_scroll = layout.carousel_max_scroll(boxes);

    for event in scroll_events.read() {
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y + event.x,
            MouseScrollUnit::Pixel => (event.y + event.x) / 20.0,
        };
        scroll_state.offset -= lines * config.scroll_speed;
    }
    scroll_state.offset = scroll_state.offset.clamp(0.0, max_scroll);
}

pub fn apply_carousel_scroll(
    scroll_state: Res<ScrollState>,
    mut q_root: Query<&mut Transform, With<CarouselRoot>>,
) {
    for mut transform in &mut q_root {
        transform.translation.x = -scroll_state.offset;
    }
}
