//! Procedural "idle life" animation for rigged avatars.
//!
//! Engine-agnostic: the driver mutates an [`avatar_rig_core::Rig`] and
//! reports the joints it wrote so host adapters can mirror them.

pub mod config;
pub mod damping;
pub mod driver;
pub mod mode;
pub mod offsets;
pub mod outputs;
pub mod overlay;

pub use config::{clamp_dt, BreathingConfig, GazeConfig, ProceduralConfig};
pub use damping::{damp, GazeSmoothing};
pub use driver::ProceduralDriver;
pub use mode::{AnimationMode, ModeChangeCause, ModeError, ModeMachine, ModeTransition};
pub use offsets::OffsetAccumulator;
pub use outputs::{AnimationEvent, JointWrite, Outputs};
pub use overlay::{Channel, ModeOverlays, OverlayTerm};
