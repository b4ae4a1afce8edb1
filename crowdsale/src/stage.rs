//! Sale stages and derived status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pricing stage. Ordered, forward-only: PreICO then ICO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrowdsaleStage {
    #[default]
    PreICO,
    ICO,
}

impl CrowdsaleStage {
    /// Whether moving from `self` to `next` is allowed
    pub fn can_advance_to(&self, next: CrowdsaleStage) -> bool {
        matches!((self, next), (CrowdsaleStage::PreICO, CrowdsaleStage::ICO))
    }
}

impl fmt::Display for CrowdsaleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrowdsaleStage::PreICO => write!(f, "PreICO"),
            CrowdsaleStage::ICO => write!(f, "ICO"),
        }
    }
}

/// Status derived from the clock, the raised total and finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleStatus {
    /// Before the opening time
    NotStarted,
    /// Within the window and below the cap
    Open,
    /// Past the closing time, or the cap was reached
    Closed,
    /// `finalize()` has run
    Finalized { goal_reached: bool },
}
