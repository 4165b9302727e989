//! Mood mode state machine.
//!
//! Exactly one [`AnimationMode`] is active. Non-idle modes carry an expiry on
//! the driver clock and fall back to idle on the first tick past it; setting a
//! new mode always replaces whatever was left of the previous one.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    #[default]
    Idle,
    Happy,
    Thinking,
    Dance,
    Talk,
}

impl AnimationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationMode::Idle => "idle",
            AnimationMode::Happy => "happy",
            AnimationMode::Thinking => "thinking",
            AnimationMode::Dance => "dance",
            AnimationMode::Talk => "talk",
        }
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("unknown animation mode '{0}'")]
    Unknown(String),
}

impl FromStr for AnimationMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(AnimationMode::Idle),
            "happy" => Ok(AnimationMode::Happy),
            "thinking" => Ok(AnimationMode::Thinking),
            "dance" => Ok(AnimationMode::Dance),
            "talk" => Ok(AnimationMode::Talk),
            _ => Err(ModeError::Unknown(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeChangeCause {
    Set,
    Expired,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeTransition {
    pub from: AnimationMode,
    pub to: AnimationMode,
    pub cause: ModeChangeCause,
}

/// Active mode plus its expiry, on a clock advanced by [`ModeMachine::tick`].
#[derive(Clone, Debug, Default)]
pub struct ModeMachine {
    active: AnimationMode,
    /// Seconds on the driver clock; `None` for idle.
    expires_at: Option<f64>,
    now: f64,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn active(&self) -> AnimationMode {
        self.active
    }

    #[inline]
    pub fn expires_at(&self) -> Option<f64> {
        self.expires_at
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Activate `mode` for `duration_ms` starting at the current clock.
    /// Negative or non-finite durations count as zero.
    pub fn set(&mut self, mode: AnimationMode, duration_ms: f64) -> ModeTransition {
        let duration_s = if duration_ms.is_finite() {
            duration_ms.max(0.0) / 1000.0
        } else {
            0.0
        };
        let from = self.active;
        self.active = mode;
        self.expires_at = match mode {
            AnimationMode::Idle => None,
            _ => Some(self.now + duration_s),
        };
        debug!(
            "mode {from} -> {mode} (expires at {:?}, now {:.3})",
            self.expires_at, self.now
        );
        ModeTransition {
            from,
            to: mode,
            cause: ModeChangeCause::Set,
        }
    }

    /// Advance the clock and revert to idle once strictly past the expiry.
    pub fn tick(&mut self, now: f64) -> Option<ModeTransition> {
        if now.is_finite() {
            self.now = now;
        }
        match self.expires_at {
            Some(expiry) if self.active != AnimationMode::Idle && self.now > expiry => {
                let from = self.active;
                self.active = AnimationMode::Idle;
                self.expires_at = None;
                debug!("mode {from} expired at {:.3}", self.now);
                Some(ModeTransition {
                    from,
                    to: AnimationMode::Idle,
                    cause: ModeChangeCause::Expired,
                })
            }
            _ => None,
        }
    }
}
