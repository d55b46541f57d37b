// =============================================================================
// Application State - shared by every HTTP handler
// =============================================================================
//
// Holds only immutable configuration and the shared provider/throttle
// handles.  No market data is cached between requests.
// =============================================================================

use std::sync::Arc;

use crate::config::AppConfig;
use crate::provider::throttle::ThrottleSnapshot;
use crate::provider::{FixedDelayThrottle, PriceHistoryProvider};
use crate::service::AnalysisService;

pub struct AppState {
    pub config: AppConfig,
    pub service: AnalysisService,
    /// Kept separately from the service so the health endpoint can report it.
    throttle: Arc<FixedDelayThrottle>,
}

impl AppState {
    pub fn new(config: AppConfig, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        let throttle = Arc::new(FixedDelayThrottle::new(config.inter_request_delay()));
        let service = AnalysisService::new(provider, throttle.clone(), config.request_timeout());
        Self {
            config,
            service,
            throttle,
        }
    }

    pub fn throttle_snapshot(&self) -> ThrottleSnapshot {
        self.throttle.snapshot()
    }
}
