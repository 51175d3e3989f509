use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::{ContactCard, UserId};

pub type DriverId = i64;

pub const DEFAULT_VEHICLE_TYPE: &str = "tent";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Active,
    Dismissed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleProfile {
    pub license_number: String,
    pub experience: u32,
    pub car_model: String,
    pub car_number: String,
    pub max_weight: f64,
    pub car_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub vehicle: VehicleProfile,
    pub status: DriverStatus,
    pub work_status: WorkStatus,
    pub completed_deliveries: u32,
    pub hire_date: NaiveDate,
    pub inactive_since: Option<DateTime<Utc>>,
    pub inactive_reason: Option<String>,
    pub dismissal_reason: Option<String>,
    pub dismissed_by: Option<UserId>,
}

impl Driver {
    pub fn is_active(&self) -> bool {
        self.status == DriverStatus::Active
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverView {
    #[serde(flatten)]
    pub driver: Driver,
    #[serde(flatten)]
    pub contact: ContactCard,
}
