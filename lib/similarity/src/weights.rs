use serde::{Deserialize, Serialize};
use tabrec_core::{Error, Result};

/// Fusion weights for the three similarity signals
///
/// Weights are applied exactly as given. [`Weights::normalized`] is available
/// for callers that want them to sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Weights {
    pub text: f32,
    pub num: f32,
    pub cluster: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            text: 0.5,
            num: 0.3,
            cluster: 0.2,
        }
    }
}

impl Weights {
    pub fn new(text: f32, num: f32, cluster: f32) -> Self {
        Self { text, num, cluster }
    }

    /// Reject negative or non-finite weights
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [("text", self.text), ("num", self.num), ("cluster", self.cluster)] {
            if !w.is_finite() {
                return Err(Error::InvalidWeights(format!("{} weight is not finite", name)));
            }
            if w < 0.0 {
                return Err(Error::InvalidWeights(format!(
                    "{} weight must be non-negative, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> f32 {
        self.text + self.num + self.cluster
    }

    /// Copy scaled to sum to 1.0
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;
        let total = self.total();
        if total <= 0.0 {
            return Err(Error::InvalidWeights("weights sum to zero".to_string()));
        }
        Ok(Self {
            text: self.text / total,
            num: self.num / total,
            cluster: self.cluster / total,
        })
    }

    /// Parse a partial JSON override; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let weights: Weights = serde_json::from_str(json)?;
        weights.validate()?;
        Ok(weights)
    }
}
