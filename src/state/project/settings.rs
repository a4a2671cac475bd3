use serde::{Deserialize, Serialize};

use crate::utils::parse_ratio_or_default;

/// Aspect ratio as written in project files: either a number (`1.78`) or a
/// `"W:H"` string (`"16:9"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AspectRatio {
    Ratio(f64),
    Named(String),
}

impl AspectRatio {
    /// Numeric width/height ratio; unparsable strings fall back to 16:9.
    pub fn value(&self) -> f64 {
        match self {
            AspectRatio::Ratio(ratio) => *ratio,
            AspectRatio::Named(name) => parse_ratio_or_default(name),
        }
    }
}

impl From<f64> for AspectRatio {
    fn from(ratio: f64) -> Self {
        AspectRatio::Ratio(ratio)
    }
}
