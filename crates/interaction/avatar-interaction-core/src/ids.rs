//! Identifiers for interactable entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PanelId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GrabbableId(pub u32);

/// Anything a drag session can own.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DragTarget {
    Grabbable(GrabbableId),
    Panel(PanelId),
}

/// Monotonic allocator for panel and grabbable ids.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_panel: u32,
    next_grabbable: u32,
}

impl IdAllocator {
    #[inline]
    pub fn alloc_panel(&mut self) -> PanelId {
        let id = PanelId(self.next_panel);
        self.next_panel = self.next_panel.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_grabbable(&mut self) -> GrabbableId {
        let id = GrabbableId(self.next_grabbable);
        self.next_grabbable = self.next_grabbable.wrapping_add(1);
        id
    }
}
