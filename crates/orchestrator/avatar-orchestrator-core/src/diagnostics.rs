use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-frame diagnostics switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsCfg {
    /// Record per-phase wall-clock timings into each frame.
    pub enabled: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg { enabled: true }
    }
}

/// Collects phase durations in insertion order. `Instant` is unavailable on
/// wasm32-unknown-unknown, so timings are only taken on native targets.
#[derive(Debug)]
pub(crate) struct PhaseTimer {
    enabled: bool,
    #[cfg(not(target_arch = "wasm32"))]
    frame_start: std::time::Instant,
    #[cfg(not(target_arch = "wasm32"))]
    phase_start: std::time::Instant,
    timings: IndexMap<String, f32>,
}

impl PhaseTimer {
    pub(crate) fn start(cfg: &DiagnosticsCfg) -> Self {
        Self {
            enabled: cfg.enabled,
            #[cfg(not(target_arch = "wasm32"))]
            frame_start: std::time::Instant::now(),
            #[cfg(not(target_arch = "wasm32"))]
            phase_start: std::time::Instant::now(),
            timings: IndexMap::new(),
        }
    }

    /// Close the running phase under `name` and start the next one.
    pub(crate) fn lap(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let now = std::time::Instant::now();
            let ms = (now - self.phase_start).as_secs_f32() * 1000.0;
            self.timings.insert(format!("{name}_ms"), ms);
            self.phase_start = now;
        }
        #[cfg(target_arch = "wasm32")]
        self.timings.insert(format!("{name}_ms"), 0.0);
    }

    pub(crate) fn finish(mut self) -> IndexMap<String, f32> {
        if self.enabled {
            #[cfg(not(target_arch = "wasm32"))]
            let total = self.frame_start.elapsed().as_secs_f32() * 1000.0;
            #[cfg(target_arch = "wasm32")]
            let total = 0.0;
            self.timings.insert("total_ms".to_string(), total);
        }
        self.timings
    }
}
