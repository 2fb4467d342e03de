use std::fmt;

use serde::{Deserialize, Serialize};

/// Four-element board descriptor in fixed order:
/// `[aggregate height, holes, bumpiness, max height]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f32; FeatureVector::LEN]);

impl FeatureVector {
    pub const LEN: usize = 4;

    pub const AGGREGATE_HEIGHT: usize = 0;
    pub const HOLES: usize = 1;
    pub const BUMPINESS: usize = 2;
    pub const MAX_HEIGHT: usize = 3;

    #[must_use]
    pub const fn new(aggregate_height: f32, holes: f32, bumpiness: f32, max_height: f32) -> Self {
        Self([aggregate_height, holes, bumpiness, max_height])
    }

    #[must_use]
    pub const fn aggregate_height(&self) -> f32 {
        self.0[Self::AGGREGATE_HEIGHT]
    }

    #[must_use]
    pub const fn holes(&self) -> f32 {
        self.0[Self::HOLES]
    }

    #[must_use]
    pub const fn bumpiness(&self) -> f32 {
        self.0[Self::BUMPINESS]
    }

    #[must_use]
    pub const fn max_height(&self) -> f32 {
        self.0[Self::MAX_HEIGHT]
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; Self::LEN] {
        self.0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl From<[f32; FeatureVector::LEN]> for FeatureVector {
    fn from(values: [f32; FeatureVector::LEN]) -> Self {
        Self(values)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[agg={}, holes={}, bump={}, max={}]",
            self.aggregate_height(),
            self.holes(),
            self.bumpiness(),
            self.max_height()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_follow_fixed_order() {
        let features = FeatureVector::new(5.0, 1.0, 4.0, 3.0);
        assert_eq!(features.aggregate_height(), 5.0);
        assert_eq!(features.holes(), 1.0);
        assert_eq!(features.bumpiness(), 4.0);
        assert_eq!(features.max_height(), 3.0);
        assert_eq!(features.to_array(), [5.0, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let features = FeatureVector::new(5.0, 1.0, 4.0, 3.0);
        assert_eq!(serde_json::to_string(&features).unwrap(), "[5.0,1.0,4.0,3.0]");
    }
}
