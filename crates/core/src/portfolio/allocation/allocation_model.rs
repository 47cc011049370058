//! Allocation models for the portfolio breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio segment shown in the breakdown chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationKind {
    BasicInvestment,
    YieldFarming,
    PendingRewards,
}

/// Share of a single segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSegment {
    pub kind: AllocationKind,
    /// Amount in display units
    pub amount: Decimal,
    /// Percentage of the portfolio value (0-100)
    pub percentage: Decimal,
    /// Advertised APY of the segment, if it earns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apy_pct: Option<Decimal>,
}

/// Breakdown of the connected investor's on-chain position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAllocation {
    /// Sum of all segments
    pub total_value: Decimal,
    pub segments: Vec<AllocationSegment>,
}

impl PortfolioAllocation {
    pub fn segment(&self, kind: AllocationKind) -> Option<&AllocationSegment> {
        self.segments.iter().find(|s| s.kind == kind)
    }
}
