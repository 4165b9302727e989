//! Errors raised while building or parsing a rig.

use thiserror::Error;

use crate::rig::JointId;

#[derive(Debug, Error)]
pub enum RigError {
    #[error("rig json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("joint '{joint}' has a non-finite or degenerate transform")]
    InvalidTransform { joint: String },
    #[error("unknown joint {0:?}")]
    UnknownJoint(JointId),
}
