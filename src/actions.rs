use bevy::math::{Rect, Vec2};
use std::fmt;

/// The fixed set of code blocks a sprite script is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MoveRight,
    MoveLeft,
    Rotate,
    GoHome,
    MoveDiagonal,
    GoRandom,
    Repeat,
}

impl ActionKind {
    /// Palette order.
    pub const ALL: [ActionKind; 7] = [
        ActionKind::MoveRight,
        ActionKind::MoveLeft,
        ActionKind::Rotate,
        ActionKind::GoHome,
        ActionKind::MoveDiagonal,
        ActionKind::GoRandom,
        ActionKind::Repeat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::MoveRight => "Move X by 50",
            ActionKind::MoveLeft => "Move X by -50",
            ActionKind::Rotate => "Rotate 30",
            ActionKind::GoHome => "Go to (0,0)",
            ActionKind::MoveDiagonal => "Move X=50, Y=50",
            ActionKind::GoRandom => "Go to random position",
            ActionKind::Repeat => "Repeat",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub type BlockId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBlock {
    pub id: BlockId,
    pub kind: ActionKind,
}

/// Editable action lists for every sprite slot, keyed by carousel order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptBook {
    slots: Vec<Vec<ActionBlock>>,
    next_id: BlockId,
}

impl ScriptBook {
    #[cfg(test)]
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![Vec::new(); count],
            next_id: 1,
        }
    }

    pub fn from_lists(lists: Vec<Vec<ActionBlock>>) -> Self {
        let next_id = lists
            .iter()
            .flatten()
            .map(|block| block.id)
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            slots: lists,
            next_id,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: usize) -> &[ActionBlock] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_lists(self) -> Vec<Vec<ActionBlock>> {
        self.slots
    }

    pub fn push(&mut self, slot: usize, kind: ActionKind) -> Option<BlockId> {
        let list = self.slots.get_mut(slot)?;
        let id = self.next_id;
        self.next_id += 1;
        list.push(ActionBlock { id, kind });
        Some(id)
    }

    /// Appends `kind` when a palette block is released strictly inside
    /// `drop_area`.
    pub fn handle_drop(
        &mut self,
        slot: usize,
        kind: ActionKind,
        point: Vec2,
        drop_area: Rect,
    ) -> Option<BlockId> {
        let inside = point.x > drop_area.min.x
            && point.x < drop_area.max.x
            && point.y > drop_area.min.y
            && point.y < drop_area.max.y;
        if inside {
            self.push(slot, kind)
        } else {
            None
        }
    }

    pub fn delete(&mut self, slot: usize, id: BlockId) -> bool {
        let Some(list) = self.slots.get_mut(slot) else {
            return false;
        };
        let before = list.len();
        list.retain(|block| block.id != id);
        list.len() != before
    }

    /// Moves the block at `from` so that it ends up at index `to`.
    pub fn move_block(&mut self, slot: usize, from: usize, to: usize) {
        let Some(list) = self.slots.get_mut(slot) else {
            return;
        };
        if from >= list.len() {
            return;
        }
        let block = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, block);
    }

    /// Shifts every list one slot towards the front; the first list wraps
    /// to the last slot.
    pub fn rotate_left(&mut self) {
        if self.slots.len() > 1 {
            self.slots.rotate_left(1);
        }
    }
}
