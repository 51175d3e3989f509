use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::UserId;

pub type OrderId = i64;

pub const DEFAULT_DISTANCE_KM: f64 = 100.0;
pub const DEFAULT_CARGO_TYPE: &str = "general";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Confirmed,
    Rejected,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Assigned => "assigned",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Processing,
    Confirmed,
    InTransit,
    Delivered,
    Rejected,
    Cancelled,
}

impl From<OrderStatus> for ClientStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::New => ClientStatus::Processing,
            OrderStatus::Confirmed | OrderStatus::Assigned => ClientStatus::Confirmed,
            OrderStatus::Rejected => ClientStatus::Rejected,
            OrderStatus::InTransit => ClientStatus::InTransit,
            OrderStatus::Delivered => ClientStatus::Delivered,
            OrderStatus::Cancelled => ClientStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Confirm,
    Reject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderTimeline {
    pub processed_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub in_transit_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cancellation {
    pub reason: String,
    pub fee: f64,
    pub refund: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub driver_id: Option<UserId>,
    pub sender_name: String,
    pub sender_phone: String,
    pub sender_email: Option<String>,
    pub cargo_description: String,
    pub product_category: Option<String>,
    pub cargo_weight: f64,
    pub cargo_volume: f64,
    pub cargo_type: String,
    pub shipping_date: Option<NaiveDate>,
    pub pickup_address: String,
    pub delivery_address: String,
    pub distance: f64,
    pub price: i64,
    pub insurance: bool,
    pub packaging: bool,
    pub comments: Option<String>,
    pub status: OrderStatus,
    pub client_status: ClientStatus,
    pub admin_comment: Option<String>,
    pub cancellation: Option<Cancellation>,
    pub timeline: OrderTimeline,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OrderInput {
    #[validate(length(min = 1, message = "sender name is required"))]
    pub sender_name: String,
    #[validate(length(min = 1, message = "sender phone is required"))]
    pub sender_phone: String,
    #[validate(email(message = "sender email is not a valid address"))]
    pub sender_email: Option<String>,
    #[validate(length(min = 1, message = "cargo description is required"))]
    pub cargo_description: String,
    pub product_category: Option<String>,
    pub cargo_weight: Option<f64>,
    pub cargo_volume: Option<f64>,
    pub cargo_type: Option<String>,
    pub shipping_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "pickup address is required"))]
    pub pickup_address: String,
    #[validate(length(min = 1, message = "delivery address is required"))]
    pub delivery_address: String,
    pub distance: Option<f64>,
    #[serde(default)]
    pub insurance: bool,
    #[serde(default)]
    pub packaging: bool,
    pub comments: Option<String>,
}

impl OrderInput {
    pub fn normalized(self) -> Self {
        Self {
            sender_name: self.sender_name.trim().to_string(),
            sender_phone: self.sender_phone.trim().to_string(),
            sender_email: non_empty(self.sender_email),
            cargo_description: self.cargo_description.trim().to_string(),
            product_category: non_empty(self.product_category),
            cargo_type: non_empty(self.cargo_type),
            pickup_address: self.pickup_address.trim().to_string(),
            delivery_address: self.delivery_address.trim().to_string(),
            comments: non_empty(self.comments),
            ..self
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    AssignedTo(UserId),
    OwnedBy(UserId),
}

impl OrderScope {
    pub fn includes(&self, order: &Order) -> bool {
        match self {
            OrderScope::All => true,
            OrderScope::AssignedTo(driver_id) => order.driver_id == Some(*driver_id),
            OrderScope::OwnedBy(user_id) => order.user_id == *user_id,
        }
    }
}
