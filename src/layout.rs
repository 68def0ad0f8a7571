use bevy::math::{Rect, Vec2};
use bevy::prelude::Resource;

use crate::config::Config;
use crate::engine::Canvas;

pub const HEADER_HEIGHT: f32 = 50.0;
pub const ROUND_BUTTON: f32 = 50.0;
pub const CAROUSEL_BOX: Vec2 = Vec2::new(100.0, 130.0);
pub const CAROUSEL_GAP: f32 = 10.0;
pub const PALETTE_BLOCK_HEIGHT: f32 = 50.0;
pub const PALETTE_GAP: f32 = 20.0;
pub const ACTION_ROW_HEIGHT: f32 = 44.0;
pub const TAB_SIZE: Vec2 = Vec2::new(60.0, 30.0);
pub const TAB_GAP: f32 = 4.0;

/// World-space placement of every screen region for one window size.
/// The window centre is the world origin.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Layout {
    pub window: Vec2,
    pub header_center: Vec2,
    pub canvas: Canvas,
    pub canvas_origin: Vec2,
    pub reset_button: Vec2,
    pub play_button: Vec2,
    pub details_center: Vec2,
    pub carousel_y: f32,
    pub palette_x: f32,
    pub palette_width: f32,
    pub palette_top: f32,
    pub tabs_y: f32,
    pub panel_x: f32,
    pub panel_width: f32,
    pub action_list: Rect,
    pub done_button: Vec2,
}

impl Layout {
    pub fn new(width: f32, height: f32, config: &Config) -> Self {
        let top = height / 2.0;
        let left = -width / 2.0;
        let canvas = Canvas::from_window(width, height, config);

        let header_center = Vec2::new(0.0, top - HEADER_HEIGHT / 2.0);
        let canvas_origin = Vec2::new(0.0, top - HEADER_HEIGHT - 10.0 - canvas.height / 2.0);
        let canvas_half = canvas.half_extents();
        let canvas_bottom = canvas_origin.y - canvas_half.y;

        let reset_button = Vec2::new(
            canvas_half.x - 10.0 - ROUND_BUTTON / 2.0,
            canvas_origin.y + canvas_half.y - 10.0 - ROUND_BUTTON / 2.0,
        );
        let details_center = Vec2::new(0.0, canvas_bottom - 20.0);
        let play_button = Vec2::new(
            width / 2.0 - 20.0 - ROUND_BUTTON / 2.0,
            canvas_bottom - 40.0 - ROUND_BUTTON / 2.0,
        );
        let carousel_y = canvas_bottom - 70.0 - ROUND_BUTTON - CAROUSEL_BOX.y / 2.0;

        // Code palette takes a third of the width, the action section the rest.
        let palette_width = width / 3.0;
        let palette_x = left + palette_width / 2.0;
        let palette_top = top - 60.0;
        let panel_width = width - palette_width - 20.0;
        let panel_x = left + palette_width + 10.0 + panel_width / 2.0;
        let tabs_y = top - 40.0;
        let list_top = tabs_y - TAB_SIZE.y / 2.0 - 10.0;
        let done_button = Vec2::new(panel_x, -top + 45.0);
        let list_bottom = done_button.y + 35.0;
        let action_list = Rect::new(
            panel_x - panel_width / 2.0,
            list_bottom,
            panel_x + panel_width / 2.0,
            list_top,
        );

        Self {
            window: Vec2::new(width, height),
            header_center,
            canvas,
            canvas_origin,
            reset_button,
            play_button,
            details_center,
            carousel_y,
            palette_x,
            palette_width,
            palette_top,
            tabs_y,
            panel_x,
            panel_width,
            action_list,
            done_button,
        }
    }

    pub fn palette_slot(&self, index: usize) -> Vec2 {
        let step = PALETTE_BLOCK_HEIGHT + PALETTE_GAP;
        Vec2::new(
            self.palette_x,
            self.palette_top - 40.0 - PALETTE_BLOCK_HEIGHT / 2.0 - index as f32 * step,
        )
    }

    /// Tabs shrink so that `count` of them span the action section at most.
    pub fn tab_width(&self, count: usize) -> f32 {
        let count = count.max(1) as f32;
        ((self.panel_width - TAB_GAP * (count - 1.0)) / count).min(TAB_SIZE.x)
    }

    pub fn tab_center(&self, index: usize, count: usize) -> Vec2 {
        let left = self.panel_x - self.panel_width / 2.0;
        let width = self.tab_width(count);
        Vec2::new(
            left + width / 2.0 + index as f32 * (width + TAB_GAP),
            self.tabs_y,
        )
    }

    /// Rows that fit in the action list above the Done button.
    pub fn visible_rows(&self) -> usize {
        ((self.action_list.height() - 8.0) / ACTION_ROW_HEIGHT)
            .floor()
            .max(1.0) as usize
    }

    /// The furthest the list can scroll and still show a full page.
    pub fn max_first_row(&self, rows: usize) -> usize {
        rows.saturating_sub(self.visible_rows())
    }

    pub fn action_row(&self, index: usize) -> Vec2 {
        Vec2::new(
            self.panel_x,
            self.action_list.max.y - 8.0 - ACTION_ROW_HEIGHT / 2.0 - index as f32 * ACTION_ROW_HEIGHT,
        )
    }

    /// List index a dragged item should land on, given its world y and
    /// the index of the first row on screen.
    pub fn row_for_y(&self, y: f32, first: usize, rows: usize) -> usize {
        let from_top = self.action_list.max.y - 8.0 - y;
        let slot = (from_top / ACTION_ROW_HEIGHT).floor().max(0.0) as usize;
        (first + slot).min(rows.saturating_sub(1))
    }

    pub fn carousel_slot(&self, index: usize) -> Vec2 {
        let left = -self.window.x / 2.0 + CAROUSEL_GAP;
        Vec2::new(
            left + CAROUSEL_BOX.x / 2.0 + index as f32 * (CAROUSEL_BOX.x + CAROUSEL_GAP),
            self.carousel_y,
        )
    }

    /// How far the carousel can scroll before its last box is flush with
    /// the right edge.
    pub fn carousel_max_scroll(&self, boxes: usize) -> f32 {
        let content = boxes as f32 * (CAROUSEL_BOX.x + CAROUSEL_GAP) + CAROUSEL_GAP;
        (content - self.window.x).max(0.0)
    }
}
