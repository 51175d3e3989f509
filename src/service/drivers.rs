use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::engine::access::{self, Principal};
use crate::engine::onboarding;
use crate::error::AppError;
use crate::models::application::{
    ApplicationId, ApplicationInput, ApplicationStatus, ApplicationView, DriverApplication,
};
use crate::models::driver::{Driver, DriverView, WorkStatus};
use crate::models::user::{User, UserId};
use crate::service::Brokerage;
use crate::store::{Repository, Table, UnitOfWork};

fn load_application(
    tx: &dyn UnitOfWork,
    application_id: ApplicationId,
) -> Result<DriverApplication, AppError> {
    tx.application(application_id)
        .ok_or_else(|| AppError::NotFound(format!("application {application_id} not found")))
}

fn load_user(tx: &dyn UnitOfWork, user_id: UserId) -> Result<User, AppError> {
    tx.user(user_id)
        .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
}

fn load_driver(tx: &dyn UnitOfWork, user_id: UserId) -> Result<Driver, AppError> {
    tx.driver_for_user(user_id)
        .ok_or_else(|| AppError::NotFound(format!("driver {user_id} not found")))
}

impl<R: Repository> Brokerage<R> {
    pub async fn submit_driver_application(
        &self,
        principal: &Principal,
        input: ApplicationInput,
    ) -> Result<ApplicationId, AppError> {
        let result = async {
            let input = input.normalized();
            input.validate()?;

            let user_id = principal.user_id;
            let vehicle = input.into_vehicle();
            let application_id = self
                .repo
                .transact(move |tx| {
                    load_user(tx, user_id)?;
                    let has_pending = tx
                        .applications_for_user(user_id)
                        .iter()
                        .any(|application| application.status == ApplicationStatus::Pending);
                    if has_pending {
                        return Err(AppError::Conflict(
                            "a pending application already exists".to_string(),
                        ));
                    }

                    let application = DriverApplication {
                        id: tx.next_id(Table::Applications),
                        user_id,
                        vehicle,
                        status: ApplicationStatus::Pending,
                        applied_at: Utc::now(),
                        processed_at: None,
                        processed_by: None,
                    };
                    let id = application.id;
                    tx.save_application(application)?;
                    Ok(id)
                })
                .await?;

            self.metrics
                .driver_applications_total
                .with_label_values(&["submitted"])
                .inc();
            info!(application_id, user_id, "driver application submitted");
            Ok::<_, AppError>(application_id)
        }
        .await;

        self.observe(result)
    }

    pub async fn own_driver_application(
        &self,
        principal: &Principal,
    ) -> Result<Option<DriverApplication>, AppError> {
        let user_id = principal.user_id;
        let result = self
            .repo
            .transact(move |tx| {
                Ok(tx
                    .applications_for_user(user_id)
                    .into_iter()
                    .max_by(|a, b| a.applied_at.cmp(&b.applied_at).then(a.id.cmp(&b.id))))
            })
            .await;

        self.observe(result)
    }

    pub async fn list_driver_applications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationView>, AppError> {
        let result = async {
            access::require_admin(principal)?;

            self.repo
                .transact(|tx| {
                    let tx: &dyn UnitOfWork = tx;
                    let mut applications = tx.applications();
                    applications
                        .sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));

                    applications
                        .into_iter()
                        .map(|application| {
                            let applicant = load_user(tx, application.user_id)?.contact_card();
                            Ok(ApplicationView {
                                application,
                                applicant,
                            })
                        })
                        .collect::<Result<Vec<_>, AppError>>()
                })
                .await
        }
        .await;

        self.observe(result)
    }

    /// Approves a pending application: the driver record, the user's driver
    /// flag and the application status change together.
    pub async fn approve_driver_application(
        &self,
        principal: &Principal,
        application_id: ApplicationId,
    ) -> Result<Driver, AppError> {
        let result = async {
            access::require_admin(principal)?;

            let admin_id = principal.user_id;
            let driver = self
                .repo
                .transact(move |tx| {
                    let mut application = load_application(tx, application_id)?;
                    onboarding::ensure_pending(&application)?;
                    let mut user = load_user(tx, application.user_id)?;

                    let now = Utc::now();
                    let existing = tx.driver_for_user(application.user_id);
                    let driver_id = existing
                        .as_ref()
                        .map(|driver| driver.id)
                        .unwrap_or_else(|| tx.next_id(Table::Drivers));
                    let driver = onboarding::hire(existing.as_ref(), driver_id, &application, now);
                    onboarding::approve(&mut application, admin_id, now);
                    user.is_driver = true;

                    tx.save_driver(driver.clone())?;
                    tx.save_user(user)?;
                    tx.save_application(application)?;
                    Ok(driver)
                })
                .await?;

            self.metrics
                .driver_applications_total
                .with_label_values(&["approved"])
                .inc();
            info!(
                application_id,
                user_id = driver.user_id,
                driver_id = driver.id,
                admin_id,
                "driver application approved"
            );
            Ok::<_, AppError>(driver)
        }
        .await;

        self.observe(result)
    }

    pub async fn reject_driver_application(
        &self,
        principal: &Principal,
        application_id: ApplicationId,
    ) -> Result<DriverApplication, AppError> {
        let result = async {
            access::require_admin(principal)?;

            let admin_id = principal.user_id;
            let application = self
                .repo
                .transact(move |tx| {
                    let mut application = load_application(tx, application_id)?;
                    onboarding::reject(&mut application, admin_id, Utc::now());
                    tx.save_application(application.clone())?;
                    Ok(application)
                })
                .await?;

            self.metrics
                .driver_applications_total
                .with_label_values(&["rejected"])
                .inc();
            info!(application_id, admin_id, "driver application rejected");
            Ok::<_, AppError>(application)
        }
        .await;

        self.observe(result)
    }

    pub async fn list_drivers(&self, principal: &Principal) -> Result<Vec<DriverView>, AppError> {
        let result = async {
            access::require_admin(principal)?;

            self.repo
                .transact(|tx| {
                    let tx: &dyn UnitOfWork = tx;
                    let mut drivers = tx.drivers();
                    drivers.sort_by(|a, b| b.id.cmp(&a.id));

                    drivers
                        .into_iter()
                        .map(|driver| {
                            let contact = load_user(tx, driver.user_id)?.contact_card();
                            Ok(DriverView { driver, contact })
                        })
                        .collect::<Result<Vec<_>, AppError>>()
                })
                .await
        }
        .await;

        self.observe(result)
    }

    pub async fn dismiss_driver(
        &self,
        principal: &Principal,
        driver_user_id: UserId,
        reason: Option<String>,
    ) -> Result<Driver, AppError> {
        let result = async {
            access::require_admin(principal)?;

            let admin_id = principal.user_id;
            let driver = self
                .repo
                .transact(move |tx| {
                    let mut driver = load_driver(tx, driver_user_id)?;
                    if !driver.is_active() {
                        return Err(AppError::Conflict(format!(
                            "driver {driver_user_id} is already dismissed"
                        )));
                    }
                    let mut user = load_user(tx, driver_user_id)?;

                    onboarding::dismiss(&mut driver, reason, admin_id, Utc::now());
                    user.is_driver = false;

                    tx.save_driver(driver.clone())?;
                    tx.save_user(user)?;
                    Ok(driver)
                })
                .await?;

            self.metrics
                .driver_roster_changes_total
                .with_label_values(&["dismissed"])
                .inc();
            warn!(driver_user_id, admin_id, "driver dismissed");
            Ok::<_, AppError>(driver)
        }
        .await;

        self.observe(result)
    }

    pub async fn restore_driver(
        &self,
        principal: &Principal,
        driver_user_id: UserId,
    ) -> Result<Driver, AppError> {
        let result = async {
            access::require_admin(principal)?;

            let driver = self
                .repo
                .transact(move |tx| {
                    let mut driver = load_driver(tx, driver_user_id)?;
                    let mut user = load_user(tx, driver_user_id)?;

                    onboarding::restore(&mut driver);
                    user.is_driver = true;

                    tx.save_driver(driver.clone())?;
                    tx.save_user(user)?;
                    Ok(driver)
                })
                .await?;

            self.metrics
                .driver_roster_changes_total
                .with_label_values(&["restored"])
                .inc();
            info!(driver_user_id, admin_id = principal.user_id, "driver restored");
            Ok::<_, AppError>(driver)
        }
        .await;

        self.observe(result)
    }

    pub async fn set_driver_work_status(
        &self,
        principal: &Principal,
        work_status: WorkStatus,
        reason: Option<String>,
    ) -> Result<Driver, AppError> {
        let result = async {
            access::require_driver(principal)?;

            let user_id = principal.user_id;
            let driver = self
                .repo
                .transact(move |tx| {
                    let mut driver = load_driver(tx, user_id)?;
                    onboarding::set_work_status(&mut driver, work_status, reason, Utc::now())?;
                    tx.save_driver(driver.clone())?;
                    Ok(driver)
                })
                .await?;

            info!(user_id, work_status = ?driver.work_status, "driver work status changed");
            Ok::<_, AppError>(driver)
        }
        .await;

        self.observe(result)
    }

    pub async fn own_driver(&self, principal: &Principal) -> Result<Driver, AppError> {
        let result = async {
            access::require_driver(principal)?;

            let user_id = principal.user_id;
            self.repo
                .transact(move |tx| load_driver(tx, user_id))
                .await
        }
        .await;

        self.observe(result)
    }
}
