//! Read-surface availability check.

use alloy_primitives::Address;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::InvestmentContractTrait;

/// Result of probing every read method the dashboard relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub available: Vec<String>,
    pub missing: Vec<String>,
}

impl ProbeReport {
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    fn record<T, E: std::fmt::Display>(&mut self, method: &str, result: Result<T, E>) {
        match result {
            Ok(_) => self.available.push(method.to_string()),
            Err(e) => {
                warn!("Contract method '{}' is unavailable: {}", method, e);
                self.missing.push(method.to_string());
            }
        }
    }
}

/// Calls each read method once and reports which ones answered.
///
/// Write methods are never called. `investor` defaults to the zero address,
/// which every deployment answers with zero balances.
pub async fn probe_contract(
    contract: &dyn InvestmentContractTrait,
    investor: Option<Address>,
) -> ProbeReport {
    let investor = investor.unwrap_or(Address::ZERO);
    let mut report = ProbeReport::default();

    report.record("investments", contract.investments(investor).await);
    report.record("rewards", contract.rewards(investor).await);
    report.record(
        "yieldFarmingBalances",
        contract.yield_farming_balances(investor).await,
    );
    report.record("totalInvested", contract.total_invested().await);
    report.record("totalYieldFarming", contract.total_yield_farming().await);
    report.record("getInvestors", contract.get_investors().await);

    debug!(
        "Contract probe finished: {} available, {} missing",
        report.available.len(),
        report.missing.len()
    );
    report
}
