use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::engine::access::Role;
use crate::error::AppError;
use crate::models::order::{Cancellation, ClientStatus, Decision, Order, OrderStatus};
use crate::models::user::UserId;

const CANCELLATION_FEE_RATE: f64 = 0.10;
const DEFAULT_CANCELLATION_REASON: &str = "cancelled by customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Strict,
    Permissive,
}

impl TransitionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Strict => "strict",
            TransitionPolicy::Permissive => "permissive",
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            other => Err(format!("unknown transition policy: {other}")),
        }
    }
}

pub fn is_legal(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    matches!(
        (from, to),
        (New, Confirmed)
            | (New, Rejected)
            | (New, Cancelled)
            | (Confirmed, Assigned)
            | (Confirmed, Cancelled)
            | (Assigned, InTransit)
            | (Assigned, Cancelled)
            | (InTransit, Delivered)
            | (InTransit, Cancelled)
    )
}

fn role_may_take(role: Role, from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    match role {
        Role::Admin => true,
        Role::Driver => matches!((from, to), (Assigned, InTransit) | (InTransit, Delivered)),
        Role::Customer => to == Cancelled,
    }
}

/// Follow-up work the caller must persist alongside the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEffect {
    None,
    Delivered { driver_id: Option<UserId> },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    policy: TransitionPolicy,
}

impl Lifecycle {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    fn check(&self, order: &Order, to: OrderStatus) -> Result<(), AppError> {
        if self.policy == TransitionPolicy::Strict && !is_legal(order.status, to) {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to,
            });
        }
        Ok(())
    }

    pub fn decide(
        &self,
        order: &mut Order,
        decision: Decision,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OrderStatus, AppError> {
        let to = match decision {
            Decision::Confirm => OrderStatus::Confirmed,
            Decision::Reject => OrderStatus::Rejected,
        };
        self.check(order, to)?;

        order.status = to;
        order.client_status = ClientStatus::from(to);
        order.admin_comment = comment.filter(|text| !text.trim().is_empty());
        order.timeline.processed_at = Some(now);
        Ok(to)
    }

    pub fn assign(
        &self,
        order: &mut Order,
        driver_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.policy == TransitionPolicy::Strict {
            match order.status {
                OrderStatus::Confirmed | OrderStatus::Assigned => {
                    order.status = OrderStatus::Assigned;
                }
                from => {
                    return Err(AppError::InvalidTransition {
                        from,
                        to: OrderStatus::Assigned,
                    });
                }
            }
        }

        order.driver_id = Some(driver_id);
        order.timeline.assigned_at = Some(now);
        Ok(())
    }

    pub fn accept(&self, order: &mut Order, now: DateTime<Utc>) -> Result<(), AppError> {
        self.check(order, OrderStatus::InTransit)?;

        order.status = OrderStatus::InTransit;
        order.client_status = ClientStatus::InTransit;
        order.timeline.accepted_at = Some(now);
        order.timeline.in_transit_at = Some(now);
        Ok(())
    }

    pub fn update_status(
        &self,
        order: &mut Order,
        role: Role,
        to: OrderStatus,
        client_status: Option<ClientStatus>,
        now: DateTime<Utc>,
    ) -> Result<StatusEffect, AppError> {
        let from = order.status;

        if self.policy == TransitionPolicy::Strict {
            self.check(order, to)?;
            if !role_may_take(role, from, to) {
                return Err(AppError::Forbidden(format!(
                    "{role:?} cannot move an order from {from} to {to}"
                )));
            }
            if to == OrderStatus::Assigned && order.driver_id.is_none() {
                return Err(AppError::InvalidTransition { from, to });
            }
        }

        let already_delivered = order.timeline.delivered_at.is_some();

        order.status = to;
        match (client_status, self.policy) {
            (Some(explicit), _) => order.client_status = explicit,
            (None, TransitionPolicy::Strict) => order.client_status = ClientStatus::from(to),
            (None, TransitionPolicy::Permissive) => {}
        }

        let effect = match to {
            OrderStatus::Confirmed | OrderStatus::Rejected => {
                order.timeline.processed_at = Some(now);
                StatusEffect::None
            }
            OrderStatus::InTransit => {
                order.timeline.in_transit_at = Some(now);
                StatusEffect::None
            }
            OrderStatus::Delivered => {
                order.timeline.delivered_at = Some(now);
                if already_delivered {
                    StatusEffect::None
                } else {
                    StatusEffect::Delivered {
                        driver_id: order.driver_id,
                    }
                }
            }
            OrderStatus::Cancelled => {
                apply_cancellation(order, None, now);
                StatusEffect::None
            }
            OrderStatus::New | OrderStatus::Assigned => StatusEffect::None,
        };

        Ok(effect)
    }

    pub fn cancel(
        &self,
        order: &mut Order,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.check(order, OrderStatus::Cancelled)?;
        apply_cancellation(order, reason, now);
        Ok(())
    }
}

fn apply_cancellation(order: &mut Order, reason: Option<String>, now: DateTime<Utc>) {
    let fee = round_cents(order.price as f64 * CANCELLATION_FEE_RATE);

    order.status = OrderStatus::Cancelled;
    order.client_status = ClientStatus::Cancelled;
    order.timeline.cancelled_at = Some(now);
    order.cancellation = Some(Cancellation {
        reason: reason
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_string()),
        fee,
        refund: round_cents(order.price as f64 - fee),
    });
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
