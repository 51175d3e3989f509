pub mod drivers;
pub mod orders;
pub mod users;

use std::sync::Arc;

use serde::Serialize;

use crate::engine::access::Principal;
use crate::engine::lifecycle::{Lifecycle, TransitionPolicy};
use crate::error::AppError;
use crate::models::order::OrderScope;
use crate::models::user::UserId;
use crate::observability::metrics::Metrics;
use crate::store::Repository;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    pub orders: usize,
    pub drivers: usize,
    pub applications: usize,
}

pub struct Brokerage<R> {
    repo: Arc<R>,
    lifecycle: Lifecycle,
    metrics: Metrics,
}

impl<R: Repository> Brokerage<R> {
    pub fn new(repo: Arc<R>, policy: TransitionPolicy, metrics: Metrics) -> Self {
        Self {
            repo,
            lifecycle: Lifecycle::new(policy),
            metrics,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.lifecycle.policy()
    }

    pub async fn principal(&self, user_id: UserId) -> Result<Principal, AppError> {
        self.repo
            .transact(move |tx| {
                tx.user(user_id)
                    .map(|user| Principal::from(&user))
                    .ok_or(AppError::Unauthenticated)
            })
            .await
    }

    pub async fn summary(&self) -> Result<Summary, AppError> {
        self.repo
            .transact(|tx| {
                Ok(Summary {
                    orders: tx.orders(OrderScope::All).len(),
                    drivers: tx.drivers().len(),
                    applications: tx.applications().len(),
                })
            })
            .await
    }

    fn observe<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(err) = &result {
            self.metrics.record_error(err);
        }
        result
    }
}
