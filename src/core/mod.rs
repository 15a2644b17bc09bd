pub mod config;
pub mod error;
pub mod types;

pub use config::GroundingConfig;
pub use error::{GroundingError, Result};
pub use types::{ObjectDescriptor, ObjectId, Position, SceneSnapshot};
