//! Pick and place motion primitives
//!
//! Vectors are replayed FIFO by the actuator, so their order is part of the
//! contract. Only the last vector of a subtask may carry the terminate flag,
//! and only when the caller marks that subtask as final.

use crate::action::vector::{ActionVector, GripperState};
use crate::core::config::MotionConfig;
use crate::core::types::Position;

/// Vectors emitted by [`ActionSequenceGenerator::generate_pick`]
pub const PICK_STEPS: usize = 4;
/// Vectors emitted by [`ActionSequenceGenerator::generate_place`]
pub const PLACE_STEPS: usize = 5;

#[derive(Debug, Clone)]
pub struct ActionSequenceGenerator {
    motion: MotionConfig,
}

impl ActionSequenceGenerator {
    pub fn new(motion: MotionConfig) -> Self {
        Self { motion }
    }

    pub fn motion(&self) -> &MotionConfig {
        &self.motion
    }

    fn vector(&self, position: Position, gripper: GripperState) -> ActionVector {
        ActionVector::new(position, self.motion.neutral_orientation, gripper)
    }

    /// Approach, descend, grasp, lift
    pub fn generate_pick(&self, target: Position, is_final: bool) -> Vec<ActionVector> {
        let approach = target.lifted(self.motion.clearance);
        let grasp = target.lifted(self.motion.grasp_offset);

        vec![
            self.vector(approach, GripperState::Open),
            self.vector(grasp, GripperState::Open),
            self.vector(grasp, GripperState::Closed),
            self.vector(approach, GripperState::Closed).with_terminate(is_final),
        ]
    }

    /// Approach, descend, release, lift, return home
    pub fn generate_place(&self, target: Position, is_final: bool) -> Vec<ActionVector> {
        let approach = target.lifted(self.motion.clearance);
        let release = target.lifted(self.motion.release_offset);

        vec![
            self.vector(approach, GripperState::Closed),
            self.vector(release, GripperState::Closed),
            self.vector(release, GripperState::Open),
            self.vector(approach, GripperState::Open),
            self.vector(self.motion.home, GripperState::Open).with_terminate(is_final),
        ]
    }
}

impl Default for ActionSequenceGenerator {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_shape() {
        let generator = ActionSequenceGenerator::default();
        let seq = generator.generate_pick(Position::new(0.5, 0.0, 0.1), false);

        assert_eq!(seq.len(), PICK_STEPS);
        assert!((seq[0].position.z - 0.2).abs() < 1e-6);
        assert_eq!(seq[0].gripper, GripperState::Open);
        assert_eq!(seq[1].position, Position::new(0.5, 0.0, 0.1));
        assert_eq!(seq[2].gripper, GripperState::Closed);
        assert_eq!(seq[3].gripper, GripperState::Closed);
        assert!(seq.iter().all(|v| !v.terminate));
    }

    #[test]
    fn test_pick_final_terminates_last() {
        let generator = ActionSequenceGenerator::default();
        let seq = generator.generate_pick(Position::new(0.5, 0.0, 0.1), true);
        assert!(seq[3].terminate);
        assert!(seq[..3].iter().all(|v| !v.terminate));
    }

    #[test]
    fn test_place_shape() {
        let generator = ActionSequenceGenerator::default();
        let seq = generator.generate_place(Position::new(0.55, 0.15, 0.09), true);

        assert_eq!(seq.len(), PLACE_STEPS);
        assert_eq!(seq[0].gripper, GripperState::Closed);
        assert_eq!(seq[1].gripper, GripperState::Closed);
        assert_eq!(seq[2].gripper, GripperState::Open);
        assert_eq!(seq[4].position, Position::new(0.0, 0.0, 0.7));
        assert_eq!(seq.iter().filter(|v| v.terminate).count(), 1);
        assert!(seq[4].terminate);
    }

    #[test]
    fn test_orientation_is_neutral() {
        let generator = ActionSequenceGenerator::default();
        let seq = generator.generate_place(Position::default(), false);
        assert!(seq.iter().all(|v| v.roll == 0.0 && v.pitch == 0.0 && v.yaw == 0.0));
    }

    #[test]
    fn test_release_offset() {
        let generator = ActionSequenceGenerator::new(MotionConfig {
            release_offset: 0.02,
            ..MotionConfig::default()
        });
        let seq = generator.generate_place(Position::new(0.4, 0.0, 0.03), false);
        assert!((seq[1].position.z - 0.05).abs() < 1e-6);
    }
}
