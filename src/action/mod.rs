//! Action encodings for a resolved target
//!
//! Two independent views of the same motion: discrete tokens for logging and
//! training, continuous vectors for control.

pub mod discretizer;
pub mod sequence;
pub mod vector;

pub use discretizer::{ActionToken, Axis, AxisRange, SpatialDiscretizer, BIN_COUNT};
pub use sequence::ActionSequenceGenerator;
pub use vector::{ActionVector, GripperState};
