//! Continuous control vectors

use crate::core::types::Position;
use serde::{Deserialize, Serialize};

/// Gripper command; encodes as 1 (open) or 0 (closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GripperState {
    Open,
    Closed,
}

impl GripperState {
    pub fn as_f32(&self) -> f32 {
        match self {
            GripperState::Open => 1.0,
            GripperState::Closed => 0.0,
        }
    }
}

/// One control step: `(terminate, x, y, z, roll, pitch, yaw, gripper)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionVector {
    pub terminate: bool,
    pub position: Position,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub gripper: GripperState,
}

impl ActionVector {
    pub fn new(position: Position, orientation: [f32; 3], gripper: GripperState) -> Self {
        let [roll, pitch, yaw] = orientation;
        Self {
            terminate: false,
            position,
            roll,
            pitch,
            yaw,
            gripper,
        }
    }

    pub fn with_terminate(mut self, terminate: bool) -> Self {
        self.terminate = terminate;
        self
    }

    pub fn to_array(&self) -> [f32; 8] {
        [
            if self.terminate { 1.0 } else { 0.0 },
            self.position.x,
            self.position.y,
            self.position.z,
            self.roll,
            self.pitch,
            self.yaw,
            self.gripper.as_f32(),
        ]
    }
}

impl std::fmt::Display for ActionVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {:.2}, {})",
            u8::from(self.terminate),
            self.position.x,
            self.position.y,
            self.position.z,
            self.roll,
            self.pitch,
            self.yaw,
            self.gripper.as_f32() as u8
        )
    }
}
