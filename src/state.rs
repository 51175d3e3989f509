use std::sync::Arc;

use crate::engine::lifecycle::TransitionPolicy;
use crate::observability::metrics::Metrics;
use crate::service::Brokerage;
use crate::store::memory::MemoryRepository;

pub struct AppState {
    pub brokerage: Brokerage<MemoryRepository>,
}

impl AppState {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self {
            brokerage: Brokerage::new(
                Arc::new(MemoryRepository::new()),
                policy,
                Metrics::new(),
            ),
        }
    }
}
