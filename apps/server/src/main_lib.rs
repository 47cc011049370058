use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yieldfolio_chain::{JsonRpcClient, ReceiptPolling, RpcInvestmentContract, RpcWallet};
use yieldfolio_core::{
    accounts::{AccountService, NetworkGuard, WalletProviderTrait},
    constants::DEFAULT_CHAIN_ID,
    contract::InvestmentContractTrait,
    market_trend::{MarketTrendSource, SimulatedMarketFeed, Timeframe, TimeframePolicy},
    portfolio::{PortfolioService, RefreshConfig},
    transactions::{RefreshTrigger, TrackerConfig, TransactionTracker},
};

use crate::{
    config::{Config, LogFormat},
    events::{EventBus, EventBusNotificationSink},
    scheduler,
};

const EVENT_BUS_CAPACITY: usize = 256;

pub struct AppState {
    pub portfolio: PortfolioService,
    pub accounts: AccountService,
    /// Invest and withdraw
    pub basic_tracker: Arc<TransactionTracker>,
    /// Deposit, withdraw and claim on the yield farming pool
    pub yield_farming_tracker: Arc<TransactionTracker>,
    pub contract: Arc<dyn InvestmentContractTrait>,
    pub event_bus: EventBus,
}

/// Contract, wallet and trend feed the state is assembled from.
pub struct Collaborators {
    pub contract: Arc<dyn InvestmentContractTrait>,
    pub wallet: Arc<dyn WalletProviderTrait>,
    pub trend_source: Arc<dyn MarketTrendSource>,
}

/// Timing and network settings handed to the core services.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub refresh: RefreshConfig,
    pub tracker: TrackerConfig,
    pub expected_chain_id: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            refresh: RefreshConfig::default(),
            tracker: TrackerConfig::default(),
            expected_chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refresh: RefreshConfig {
                delay: config.refresh_delay,
                ..RefreshConfig::default()
            },
            tracker: TrackerConfig {
                confirmed_display_window: config.confirmed_display,
            },
            expected_chain_id: config.chain_id,
        }
    }
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Wires the core services around the given collaborators. Starts nothing in
/// the background.
pub fn build_state_with(collaborators: Collaborators, settings: ServiceSettings) -> Arc<AppState> {
    let Collaborators {
        contract,
        wallet,
        trend_source,
    } = collaborators;

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let sink = Arc::new(EventBusNotificationSink::new(event_bus.clone()));
    let accounts = AccountService::new(wallet.clone());
    let portfolio = PortfolioService::new(
        contract.clone(),
        accounts.clone(),
        trend_source,
        sink.clone(),
        settings.refresh,
    );

    let refresh: Arc<dyn RefreshTrigger> = Arc::new(portfolio.clone());
    let guard = NetworkGuard::new(settings.expected_chain_id);
    let tracker = |label: &str| {
        Arc::new(
            TransactionTracker::new(
                label,
                contract.clone(),
                refresh.clone(),
                sink.clone(),
                settings.tracker,
            )
            .with_network_guard(guard, wallet.clone()),
        )
    };
    let basic_tracker = tracker("basic");
    let yield_farming_tracker = tracker("yield-farming");

    Arc::new(AppState {
        portfolio,
        accounts,
        basic_tracker,
        yield_farming_tracker,
        contract,
        event_bus,
    })
}

/// Connects to the configured node and starts the background tasks.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let rpc = Arc::new(JsonRpcClient::new(
        config.rpc_url.clone(),
        config.request_timeout,
    ));
    let wallet = Arc::new(RpcWallet::new(rpc.clone()));
    let contract = Arc::new(RpcInvestmentContract::new(
        rpc.clone(),
        config.contract_address,
        wallet.clone(),
        ReceiptPolling {
            interval: config.receipt_poll_interval,
            timeout: config.receipt_timeout,
        },
    ));
    tracing::info!(
        "Using contract {} via {} (expected chain {})",
        contract.address(),
        rpc.url(),
        config.chain_id
    );

    let state = build_state_with(
        Collaborators {
            contract,
            wallet: wallet.clone(),
            trend_source: Arc::new(SimulatedMarketFeed::new(TimeframePolicy::Fixed(
                Timeframe::Days30,
            ))),
        },
        ServiceSettings::from_config(config),
    );

    scheduler::start_background_tasks(state.clone(), config.trend_interval);
    scheduler::start_wallet_poller(wallet, config.wallet_poll_interval);

    // First read; a node that is still starting is not fatal
    if let Err(e) = state.portfolio.refresh().await {
        tracing::warn!("Initial portfolio refresh failed: {}", e);
    }
    Ok(state)
}
