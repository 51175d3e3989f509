use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::driver::{DEFAULT_VEHICLE_TYPE, VehicleProfile};
use crate::models::user::{ContactCard, UserId};

pub type ApplicationId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub vehicle: VehicleProfile,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: DriverApplication,
    #[serde(flatten)]
    pub applicant: ContactCard,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApplicationInput {
    #[validate(length(min = 1, message = "license number is required"))]
    pub license_number: String,
    #[serde(default)]
    pub experience: u32,
    #[validate(length(min = 1, message = "car model is required"))]
    pub car_model: String,
    #[validate(length(min = 1, message = "car number is required"))]
    pub car_number: String,
    #[validate(range(min = 0.0, message = "max weight cannot be negative"))]
    #[serde(default)]
    pub max_weight: f64,
    pub car_type: Option<String>,
}

impl ApplicationInput {
    pub fn normalized(self) -> Self {
        Self {
            license_number: self.license_number.trim().to_string(),
            car_model: self.car_model.trim().to_string(),
            car_number: self.car_number.trim().to_string(),
            car_type: self
                .car_type
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty()),
            ..self
        }
    }

    pub fn into_vehicle(self) -> VehicleProfile {
        VehicleProfile {
            license_number: self.license_number,
            experience: self.experience,
            car_model: self.car_model,
            car_number: self.car_number,
            max_weight: self.max_weight,
            car_type: self
                .car_type
                .unwrap_or_else(|| DEFAULT_VEHICLE_TYPE.to_string()),
        }
    }
}
