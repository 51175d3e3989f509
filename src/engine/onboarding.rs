use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::application::{ApplicationStatus, DriverApplication};
use crate::models::driver::{Driver, DriverId, DriverStatus, WorkStatus};
use crate::models::user::UserId;

pub fn ensure_pending(application: &DriverApplication) -> Result<(), AppError> {
    if application.status == ApplicationStatus::Pending {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "application {} was already processed",
            application.id
        )))
    }
}

pub fn approve(application: &mut DriverApplication, processor: UserId, now: DateTime<Utc>) {
    application.status = ApplicationStatus::Approved;
    application.processed_at = Some(now);
    application.processed_by = Some(processor);
}

pub fn reject(application: &mut DriverApplication, processor: UserId, now: DateTime<Utc>) {
    application.status = ApplicationStatus::Rejected;
    application.processed_at = Some(now);
    application.processed_by = Some(processor);
}

pub fn hire(
    existing: Option<&Driver>,
    id: DriverId,
    application: &DriverApplication,
    now: DateTime<Utc>,
) -> Driver {
    let completed_deliveries = existing.map_or(0, |driver| driver.completed_deliveries);

    Driver {
        id,
        user_id: application.user_id,
        vehicle: application.vehicle.clone(),
        status: DriverStatus::Active,
        work_status: WorkStatus::Active,
        completed_deliveries,
        hire_date: now.date_naive(),
        inactive_since: None,
        inactive_reason: None,
        dismissal_reason: None,
        dismissed_by: None,
    }
}

pub fn dismiss(driver: &mut Driver, reason: Option<String>, by: UserId, now: DateTime<Utc>) {
    driver.status = DriverStatus::Dismissed;
    driver.work_status = WorkStatus::Inactive;
    driver.inactive_since = Some(now);
    driver.dismissal_reason = reason.filter(|text| !text.trim().is_empty());
    driver.dismissed_by = Some(by);
}

pub fn restore(driver: &mut Driver) {
    driver.status = DriverStatus::Active;
    driver.work_status = WorkStatus::Active;
    driver.inactive_since = None;
    driver.inactive_reason = None;
    driver.dismissal_reason = None;
    driver.dismissed_by = None;
}

pub fn set_work_status(
    driver: &mut Driver,
    work_status: WorkStatus,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !driver.is_active() {
        return Err(AppError::Conflict(
            "dismissed drivers cannot change work status".to_string(),
        ));
    }

    driver.work_status = work_status;
    match work_status {
        WorkStatus::Active => {
            driver.inactive_since = None;
            driver.inactive_reason = None;
        }
        WorkStatus::Inactive => {
            driver.inactive_since = Some(now);
            driver.inactive_reason = reason.filter(|text| !text.trim().is_empty());
        }
    }
    Ok(())
}
