use anyhow::anyhow;
use js_sys::Function;
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use avatar_interaction_core::{Panel, PanelId};
use avatar_orchestrator::{ClickHandler, FrameInput, Orchestrator, OrchestratorConfig};

#[wasm_bindgen]
pub struct AvatarRuntime {
    core: Orchestrator,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js<T: Serialize>(value: &T, what: &str) -> Result<JsValue, JsError> {
    // Plain objects rather than JS Maps for serde_json payloads.
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

/// Forwards clicks to a JS callback `(key: string, payload: any) => void`.
/// A thrown exception is reported in the frame's `click_failures`.
struct JsClickHandler {
    f: Function,
}

impl ClickHandler for JsClickHandler {
    fn on_click(&mut self, key: &str, payload: &Value) -> anyhow::Result<()> {
        let payload = payload
            .serialize(&swb::Serializer::json_compatible())
            .map_err(|e| anyhow!("click payload for '{key}': {e}"))?;
        self.f
            .call2(&JsValue::UNDEFINED, &JsValue::from_str(key), &payload)
            .map(|_| ())
            .map_err(|e| anyhow!("click callback threw: {e:?}"))
    }
}

#[wasm_bindgen]
impl AvatarRuntime {
    /// Create a runtime. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new AvatarRuntime({ max_dt: 0.033, procedural: { hybrid: true } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AvatarRuntime, JsError> {
        console_error_panic_hook::set_once();

        let cfg: OrchestratorConfig = if jsvalue_is_undefined_or_null(&config) {
            OrchestratorConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        cfg.validate()
            .map_err(|e| JsError::new(&format!("config error: {e}")))?;

        Ok(AvatarRuntime {
            core: Orchestrator::new(cfg),
        })
    }

    /// Register the avatar hierarchy (`{ name, translation, rotation?, children }`).
    /// Replaces any previously registered avatar.
    #[wasm_bindgen(js_name = registerAvatar)]
    pub fn register_avatar(&mut self, rig: JsValue, has_baked_clips: bool) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&rig) {
            return Err(JsError::new("registerAvatar: rig is null/undefined"));
        }
        let rig: Value =
            swb::from_value(rig).map_err(|e| JsError::new(&format!("registerAvatar: {e}")))?;
        self.core
            .register_avatar_json(&rig.to_string(), has_baked_clips)
            .map_err(|e| JsError::new(&format!("registerAvatar: {e:#}")))
    }

    /// Activate a mood by name; `durationMs` defaults to the configured duration.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: String, duration_ms: Option<f64>) -> Result<(), JsError> {
        self.core
            .set_mode(&mode, duration_ms)
            .map_err(|e| JsError::new(&format!("{e:#}")))
    }

    /// Normalized pointer in [-1, 1] on both axes.
    #[wasm_bindgen(js_name = setPointer)]
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.core.set_pointer(x, y);
    }

    #[wasm_bindgen(js_name = setHybrid)]
    pub fn set_hybrid(&mut self, hybrid: bool) {
        self.core.set_hybrid(hybrid);
    }

    /// Register a UI panel (`{ placement, regions }`). Returns its id.
    #[wasm_bindgen(js_name = addPanel)]
    pub fn add_panel(&mut self, panel: JsValue) -> Result<u32, JsError> {
        let panel: Panel =
            swb::from_value(panel).map_err(|e| JsError::new(&format!("addPanel: {e}")))?;
        Ok(self.core.add_panel(panel).0)
    }

    /// Returns false for unknown panel ids.
    #[wasm_bindgen(js_name = setPanelPinned)]
    pub fn set_panel_pinned(&mut self, panel: u32, pinned: bool) -> bool {
        self.core.set_panel_pinned(PanelId(panel), pinned)
    }

    /// Install `(key, payload) => void` as the click callback; null/undefined clears it.
    #[wasm_bindgen(js_name = setClickHandler)]
    pub fn set_click_handler(&mut self, handler: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&handler) {
            self.core.clear_click_handler();
            return Ok(());
        }
        let f: Function = handler
            .dyn_into()
            .map_err(|_| JsError::new("setClickHandler: expected a function"))?;
        self.core.set_click_handler(Box::new(JsClickHandler { f }));
        Ok(())
    }

    /// Step by `dt` seconds. `frame` is `{ sources, head? }` or undefined.
    /// Returns the frame object: joint writes, player, panels, events,
    /// click failures, timings.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32, frame: JsValue) -> Result<JsValue, JsError> {
        let input: FrameInput = if jsvalue_is_undefined_or_null(&frame) {
            FrameInput::default()
        } else {
            swb::from_value(frame).map_err(|e| JsError::new(&format!("frame input error: {e}")))?
        };
        let out = self.core.step(dt, input);
        to_js(&out, "frame output")
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.core.driver().mode().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn epoch(&self) -> f64 {
        self.core.epoch as f64
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
