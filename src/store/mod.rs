pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::models::application::{ApplicationId, DriverApplication};
use crate::models::driver::{Driver, DriverId};
use crate::models::order::{Order, OrderId, OrderScope};
use crate::models::user::{User, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    UniqueViolation(&'static str),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(what) => AppError::Conflict(format!("{what} already exists")),
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Orders,
    Drivers,
    Applications,
}

pub trait UnitOfWork {
    fn next_id(&mut self, table: Table) -> i64;

    fn user(&self, id: UserId) -> Option<User>;
    fn user_by_email(&self, email: &str) -> Option<User>;
    fn user_by_phone(&self, phone: &str) -> Option<User>;
    fn save_user(&mut self, user: User) -> Result<(), StoreError>;

    fn order(&self, id: OrderId) -> Option<Order>;
    fn orders(&self, scope: OrderScope) -> Vec<Order>;
    fn save_order(&mut self, order: Order) -> Result<(), StoreError>;

    fn driver(&self, id: DriverId) -> Option<Driver>;
    fn driver_for_user(&self, user_id: UserId) -> Option<Driver>;
    fn drivers(&self) -> Vec<Driver>;
    fn save_driver(&mut self, driver: Driver) -> Result<(), StoreError>;

    fn application(&self, id: ApplicationId) -> Option<DriverApplication>;
    fn applications(&self) -> Vec<DriverApplication>;
    fn applications_for_user(&self, user_id: UserId) -> Vec<DriverApplication>;
    fn save_application(&mut self, application: DriverApplication) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Runs `op` as one atomic unit of work. Transactions are serialized
    /// against each other.
    async fn transact<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, AppError> + Send,
        T: Send;
}
