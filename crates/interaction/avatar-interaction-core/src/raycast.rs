//! Select-time and hover-time hit resolution.
//!
//! [`hit_ui`] and [`hit_world`] are independent queries; neither keeps state
//! between calls. [`resolve_select`] applies the priority: UI regions first,
//! then world objects.

use glam::Vec3;
use serde_json::Value;

use crate::ids::{GrabbableId, PanelId};
use crate::panel::RegionRole;
use crate::ray::{ray_rect, ray_sphere, Ray};
use crate::registry::InteractableRegistry;

#[derive(Clone, Debug, PartialEq)]
pub struct UiHit {
    pub panel: PanelId,
    /// Index into the panel's region list.
    pub region: usize,
    pub key: String,
    pub role: RegionRole,
    pub pinned: bool,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldHit {
    pub grabbable: GrabbableId,
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest UI region along `ray`. Ties keep the earlier registration.
pub fn hit_ui(ray: &Ray, registry: &InteractableRegistry, max_distance: f32) -> Option<UiHit> {
    let mut best: Option<UiHit> = None;
    for (panel_id, panel) in registry.panels() {
        let placement = &panel.placement;
        for (idx, region) in panel.regions.iter().enumerate() {
            let Some(hit) = ray_rect(
                ray,
                placement.position,
                placement.orientation,
                region.center,
                region.half_extents,
                max_distance,
            ) else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.distance <= hit.distance) {
                continue;
            }
            best = Some(UiHit {
                panel: panel_id,
                region: idx,
                key: region.key.clone(),
                role: region.role,
                pinned: placement.pinned,
                distance: hit.distance,
                point: hit.point,
            });
        }
    }
    best
}

/// Nearest rotatable grabbable bounding sphere along `ray`.
pub fn hit_world(ray: &Ray, registry: &InteractableRegistry, max_distance: f32) -> Option<WorldHit> {
    registry
        .grabbables()
        .filter(|(_, g)| g.rotatable)
        .filter_map(|(id, g)| {
            ray_sphere(ray, g.center, g.radius, max_distance).map(|t| WorldHit {
                grabbable: id,
                distance: t,
                point: ray.at(t),
            })
        })
        .fold(None, |best: Option<WorldHit>, hit| match best {
            Some(b) if b.distance <= hit.distance => Some(b),
            _ => Some(hit),
        })
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    Click {
        panel: PanelId,
        key: String,
        payload: Value,
    },
    BeginPanelMove(UiHit),
    BeginRotate(WorldHit),
    Miss,
}

pub fn resolve_select(ray: &Ray, registry: &InteractableRegistry, max_distance: f32) -> SelectOutcome {
    if let Some(hit) = hit_ui(ray, registry, max_distance) {
        if hit.role == RegionRole::MoveHandle && !hit.pinned {
            return SelectOutcome::BeginPanelMove(hit);
        }
        let payload = registry
            .panel(hit.panel)
            .and_then(|p| p.regions.get(hit.region))
            .map(|r| r.payload.clone())
            .unwrap_or(Value::Null);
        return SelectOutcome::Click {
            panel: hit.panel,
            key: hit.key,
            payload,
        };
    }
    match hit_world(ray, registry, max_distance) {
        Some(hit) => SelectOutcome::BeginRotate(hit),
        None => SelectOutcome::Miss,
    }
}
