//! Hover enter/exit tracking for the non-acting hand.

use crate::events::InteractionEvent;
use crate::ids::PanelId;
use crate::raycast::UiHit;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverTarget {
    pub panel: PanelId,
    pub key: String,
}

/// Remembers the hovered region so enter and exit fire once per transition.
#[derive(Debug, Default)]
pub struct HoverTracker {
    current: Option<HoverTarget>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<&HoverTarget> {
        self.current.as_ref()
    }

    pub fn update(&mut self, hit: Option<&UiHit>, events: &mut Vec<InteractionEvent>) {
        let next = hit.map(|h| HoverTarget {
            panel: h.panel,
            key: h.key.clone(),
        });
        if next == self.current {
            return;
        }
        if let Some(prev) = self.current.take() {
            events.push(InteractionEvent::HoverExit {
                panel: prev.panel,
                key: prev.key,
            });
        }
        if let Some(target) = &next {
            events.push(InteractionEvent::HoverEnter {
                panel: target.panel,
                key: target.key.clone(),
            });
        }
        self.current = next;
    }

    pub fn clear(&mut self, events: &mut Vec<InteractionEvent>) {
        self.update(None, events);
    }
}
