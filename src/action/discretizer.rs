//! Continuous pose to centred integer bin tokens
//!
//! Each axis range is covered by 11 evenly spaced representative points.
//! A value maps to the nearest point, recentred to `-5..=5`.

use crate::core::config::DiscretizerConfig;
use crate::core::types::Position;
use serde::{Deserialize, Serialize};

/// Bins per axis
pub const BIN_COUNT: usize = 11;

/// Index offset that centres bins on zero
const CENTER_BIN: i8 = (BIN_COUNT / 2) as i8;

/// Closed value range of one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub lo: f32,
    pub hi: f32,
}

impl AxisRange {
    pub fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    /// The 11 representative points, `lo` and `hi` included
    pub fn centers(&self) -> [f32; BIN_COUNT] {
        let step = (self.hi - self.lo) / (BIN_COUNT - 1) as f32;
        std::array::from_fn(|i| self.lo + i as f32 * step)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.lo && value <= self.hi
    }
}

/// Discretized pose dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    Yaw,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::Yaw];

    /// Token prefix for this axis
    pub fn prefix(&self) -> &'static str {
        match self {
            Axis::X => "POS_X",
            Axis::Y => "POS_Y",
            Axis::Z => "POS_Z",
            Axis::Yaw => "ROT_YAW",
        }
    }
}

/// Symbol from the fixed action vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionToken {
    /// `ACTION_<LABEL>`
    Action(String),
    /// `<PREFIX>_<±n>`, n in -5..=5
    Bin { axis: Axis, value: i8 },
}

impl std::fmt::Display for ActionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionToken::Action(label) => write!(f, "ACTION_{}", label),
            ActionToken::Bin { axis, value } => write!(f, "{}_{:+}", axis.prefix(), value),
        }
    }
}

/// Maps positions and yaw to bin tokens
#[derive(Debug, Clone)]
pub struct SpatialDiscretizer {
    ranges: [AxisRange; 4],
    centers: [[f32; BIN_COUNT]; 4],
}

impl SpatialDiscretizer {
    /// Ranges are assumed valid (`lo < hi`); `GroundingConfig::validate` checks them
    pub fn new(config: &DiscretizerConfig) -> Self {
        let ranges = [config.x, config.y, config.z, config.yaw];
        Self {
            ranges,
            centers: ranges.map(|r| r.centers()),
        }
    }

    pub fn range(&self, axis: Axis) -> AxisRange {
        self.ranges[axis as usize]
    }

    pub fn centers(&self, axis: Axis) -> &[f32; BIN_COUNT] {
        &self.centers[axis as usize]
    }

    /// Centred bin of the nearest representative point
    ///
    /// Out-of-range values clamp to the edge bins. Exact midpoints go to the
    /// lower bin. NaN maps to the centre bin.
    pub fn discretize(&self, value: f32, axis: Axis) -> i8 {
        if value.is_nan() {
            tracing::warn!("NaN on axis {:?}, using centre bin", axis);
            return 0;
        }

        let range = self.range(axis);
        if !range.contains(value) {
            tracing::debug!(
                "Clamping {:?} value {} into [{}, {}]",
                axis,
                value,
                range.lo,
                range.hi
            );
        }

        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, center) in self.centers(axis).iter().enumerate() {
            let dist = (value - center).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }

        best as i8 - CENTER_BIN
    }

    pub fn token(&self, value: f32, axis: Axis) -> ActionToken {
        ActionToken::Bin {
            axis,
            value: self.discretize(value, axis),
        }
    }

    /// `[ACTION_<LABEL>, POS_X, POS_Y, POS_Z, ROT_YAW]`
    pub fn action_to_tokens(&self, label: &str, position: Position, yaw: f32) -> Vec<ActionToken> {
        vec![
            ActionToken::Action(label.trim().to_uppercase()),
            self.token(position.x, Axis::X),
            self.token(position.y, Axis::Y),
            self.token(position.z, Axis::Z),
            self.token(yaw, Axis::Yaw),
        ]
    }
}

impl Default for SpatialDiscretizer {
    fn default() -> Self {
        Self::new(&DiscretizerConfig::default())
    }
}

/// Render tokens as their text forms
pub fn token_strings(tokens: &[ActionToken]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}
