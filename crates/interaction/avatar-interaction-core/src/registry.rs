//! Everything a ray can hit: UI panels and grabbable world objects.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::ids::{GrabbableId, IdAllocator, PanelId};
use crate::panel::Panel;

/// World object that can be spun about +Y by an avatar-rotate drag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grabbable {
    pub key: String,
    /// Bounding-sphere center, world space.
    pub center: Vec3,
    pub radius: f32,
    /// Accumulated yaw in radians.
    #[serde(default)]
    pub yaw: f32,
    /// Only rotatable grabbables are hit by world rays.
    #[serde(default = "rotatable_default")]
    pub rotatable: bool,
}

fn rotatable_default() -> bool {
    true
}

impl Grabbable {
    pub fn new(key: impl Into<String>, center: Vec3, radius: f32) -> Self {
        Self {
            key: key.into(),
            center,
            radius,
            yaw: 0.0,
            rotatable: true,
        }
    }

    pub fn with_rotatable(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }
}

#[derive(Debug, Default)]
pub struct InteractableRegistry {
    ids: IdAllocator,
    panels: Vec<(PanelId, Panel)>,
    grabbables: Vec<(GrabbableId, Grabbable)>,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_panel(&mut self, panel: Panel) -> PanelId {
        let id = self.ids.alloc_panel();
        debug!("panel {id:?} added with {} regions", panel.regions.len());
        self.panels.push((id, panel));
        id
    }

    pub fn remove_panel(&mut self, id: PanelId) -> Option<Panel> {
        let idx = self.panels.iter().position(|(p, _)| *p == id)?;
        Some(self.panels.remove(idx).1)
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels
            .iter()
            .find_map(|(p, panel)| (*p == id).then_some(panel))
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels
            .iter_mut()
            .find_map(|(p, panel)| (*p == id).then_some(panel))
    }

    /// Panels in registration order.
    pub fn panels(&self) -> impl Iterator<Item = (PanelId, &Panel)> {
        self.panels.iter().map(|(id, p)| (*id, p))
    }

    /// Returns `false` for unknown panels.
    pub fn set_pinned(&mut self, id: PanelId, pinned: bool) -> bool {
        match self.panel_mut(id) {
            Some(panel) => {
                panel.placement.pinned = pinned;
                true
            }
            None => false,
        }
    }

    pub fn add_grabbable(&mut self, grabbable: Grabbable) -> GrabbableId {
        let id = self.ids.alloc_grabbable();
        debug!("grabbable {id:?} '{}' added", grabbable.key);
        self.grabbables.push((id, grabbable));
        id
    }

    pub fn remove_grabbable(&mut self, id: GrabbableId) -> Option<Grabbable> {
        let idx = self.grabbables.iter().position(|(g, _)| *g == id)?;
        Some(self.grabbables.remove(idx).1)
    }

    pub fn grabbable(&self, id: GrabbableId) -> Option<&Grabbable> {
        self.grabbables
            .iter()
            .find_map(|(g, item)| (*g == id).then_some(item))
    }

    pub fn grabbable_mut(&mut self, id: GrabbableId) -> Option<&mut Grabbable> {
        self.grabbables
            .iter_mut()
            .find_map(|(g, item)| (*g == id).then_some(item))
    }

    pub fn grabbables(&self) -> impl Iterator<Item = (GrabbableId, &Grabbable)> {
        self.grabbables.iter().map(|(id, g)| (*id, g))
    }
}
