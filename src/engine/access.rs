use serde::Serialize;

use crate::error::AppError;
use crate::models::order::{Order, OrderScope};
use crate::models::user::{User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Driver,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub is_admin: bool,
    pub is_driver: bool,
}

impl Principal {
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
            is_driver: false,
        }
    }

    pub fn driver(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
            is_driver: true,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
            is_driver: false,
        }
    }

    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else if self.is_driver {
            Role::Driver
        } else {
            Role::Customer
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.is_admin,
            is_driver: user.is_driver,
        }
    }
}

pub fn order_scope(principal: &Principal) -> OrderScope {
    match principal.role() {
        Role::Admin => OrderScope::All,
        Role::Driver => OrderScope::AssignedTo(principal.user_id),
        Role::Customer => OrderScope::OwnedBy(principal.user_id),
    }
}

pub fn ensure_can_read(principal: &Principal, order: &Order) -> Result<(), AppError> {
    if principal.is_admin || principal.is_driver || order.user_id == principal.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("order belongs to another customer".to_string()))
    }
}

pub fn ensure_can_create_order(principal: &Principal) -> Result<(), AppError> {
    if principal.is_admin || principal.is_driver {
        return Err(AppError::Forbidden(
            "only customers can place orders".to_string(),
        ));
    }
    Ok(())
}

/// Admins always pass. A driver who is not an admin must be the assigned
/// driver, even when they also own the order.
pub fn ensure_can_update_status(principal: &Principal, order: &Order) -> Result<(), AppError> {
    if principal.is_admin {
        return Ok(());
    }

    if principal.is_driver {
        return if order.driver_id == Some(principal.user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("order is not assigned to you".to_string()))
        };
    }

    if order.user_id == principal.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("order belongs to another customer".to_string()))
    }
}

pub fn ensure_can_cancel(principal: &Principal, order: &Order) -> Result<(), AppError> {
    if principal.is_admin || order.user_id == principal.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only the owner or an admin can cancel an order".to_string(),
        ))
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin access required".to_string()))
    }
}

pub fn require_driver(principal: &Principal) -> Result<(), AppError> {
    if principal.is_driver {
        Ok(())
    } else {
        Err(AppError::Forbidden("driver access required".to_string()))
    }
}

pub fn ensure_assigned_driver(principal: &Principal, order: &Order) -> Result<(), AppError> {
    require_driver(principal)?;
    if order.driver_id == Some(principal.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("order is not assigned to you".to_string()))
    }
}
