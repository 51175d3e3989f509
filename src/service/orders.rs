use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::engine::access::{self, Principal};
use crate::engine::lifecycle::StatusEffect;
use crate::engine::pricing::{Quote, compute_price};
use crate::error::AppError;
use crate::models::order::{
    ClientStatus, DEFAULT_CARGO_TYPE, DEFAULT_DISTANCE_KM, Decision, Order, OrderId, OrderInput,
    OrderStatus, OrderTimeline,
};
use crate::models::user::UserId;
use crate::service::Brokerage;
use crate::store::{Repository, Table, UnitOfWork};

fn load_order(tx: &dyn UnitOfWork, order_id: OrderId) -> Result<Order, AppError> {
    tx.order(order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))
}

impl<R: Repository> Brokerage<R> {
    pub async fn create_order(
        &self,
        principal: &Principal,
        input: OrderInput,
    ) -> Result<Order, AppError> {
        let result = async {
            access::ensure_can_create_order(principal)?;
            let input = input.normalized();
            input.validate()?;

            let cargo_type = input
                .cargo_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CARGO_TYPE.to_string());
            let quote = Quote {
                distance: input.distance.unwrap_or(DEFAULT_DISTANCE_KM),
                cargo_weight: input.cargo_weight.unwrap_or(0.0),
                cargo_volume: input.cargo_volume.unwrap_or(0.0),
                cargo_type: &cargo_type,
                insurance: input.insurance,
                packaging: input.packaging,
            }
            .sanitized();
            let price = compute_price(&quote);
            let (distance, cargo_weight, cargo_volume) =
                (quote.distance, quote.cargo_weight, quote.cargo_volume);

            let owner = principal.user_id;
            let now = Utc::now();
            let order = self
                .repo
                .transact(move |tx| {
                    let order = Order {
                        id: tx.next_id(Table::Orders),
                        user_id: owner,
                        driver_id: None,
                        sender_name: input.sender_name,
                        sender_phone: input.sender_phone,
                        sender_email: input.sender_email,
                        cargo_description: input.cargo_description,
                        product_category: input.product_category,
                        cargo_weight,
                        cargo_volume,
                        cargo_type,
                        shipping_date: input.shipping_date,
                        pickup_address: input.pickup_address,
                        delivery_address: input.delivery_address,
                        distance,
                        price,
                        insurance: input.insurance,
                        packaging: input.packaging,
                        comments: input.comments,
                        status: OrderStatus::New,
                        client_status: ClientStatus::Processing,
                        admin_comment: None,
                        cancellation: None,
                        timeline: OrderTimeline::default(),
                        created_at: now,
                    };
                    tx.save_order(order.clone())?;
                    Ok(order)
                })
                .await?;

            self.metrics.orders_created_total.inc();
            info!(order_id = order.id, user_id = owner, price, "order created");
            Ok::<_, AppError>(order)
        }
        .await;

        self.observe(result)
    }

    pub async fn list_orders(&self, principal: &Principal) -> Result<Vec<Order>, AppError> {
        let scope = access::order_scope(principal);
        let result = self
            .repo
            .transact(move |tx| {
                let mut orders = tx.orders(scope);
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                Ok(orders)
            })
            .await;

        self.observe(result)
    }

    pub async fn get_order(
        &self,
        principal: &Principal,
        order_id: OrderId,
    ) -> Result<Order, AppError> {
        let principal = *principal;
        let result = self
            .repo
            .transact(move |tx| {
                let order = load_order(tx, order_id)?;
                access::ensure_can_read(&principal, &order)?;
                Ok(order)
            })
            .await;

        self.observe(result)
    }

    pub async fn decide_order(
        &self,
        principal: &Principal,
        order_id: OrderId,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<OrderStatus, AppError> {
        let result = async {
            access::require_admin(principal)?;

            let lifecycle = self.lifecycle;
            let status = self
                .repo
                .transact(move |tx| {
                    let mut order = load_order(tx, order_id)?;
                    let status = lifecycle.decide(&mut order, decision, comment, Utc::now())?;
                    tx.save_order(order)?;
                    Ok(status)
                })
                .await?;

            self.metrics.record_transition(status);
            info!(order_id, admin_id = principal.user_id, %status, "order decided");
            Ok::<_, AppError>(status)
        }
        .await;

        self.observe(result)
    }

    pub async fn assign_driver(
        &self,
        principal: &Principal,
        order_id: OrderId,
        driver_id: UserId,
    ) -> Result<Order, AppError> {
        let result = async {
            access::require_admin(principal)?;

            let lifecycle = self.lifecycle;
            let (order, previous) = self
                .repo
                .transact(move |tx| {
                    let mut order = load_order(tx, order_id)?;
                    tx.user(driver_id)
                        .filter(|user| user.is_driver)
                        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

                    let previous = order.status;
                    lifecycle.assign(&mut order, driver_id, Utc::now())?;
                    tx.save_order(order.clone())?;
                    Ok((order, previous))
                })
                .await?;

            if order.status != previous {
                self.metrics.record_transition(order.status);
            }
            info!(order_id, driver_id, admin_id = principal.user_id, "driver assigned");
            Ok::<_, AppError>(order)
        }
        .await;

        self.observe(result)
    }

    pub async fn accept_order(
        &self,
        principal: &Principal,
        order_id: OrderId,
    ) -> Result<Order, AppError> {
        let result = async {
            access::require_driver(principal)?;

            let principal = *principal;
            let lifecycle = self.lifecycle;
            let order = self
                .repo
                .transact(move |tx| {
                    let mut order = load_order(tx, order_id)?;
                    access::ensure_assigned_driver(&principal, &order)?;
                    lifecycle.accept(&mut order, Utc::now())?;
                    tx.save_order(order.clone())?;
                    Ok(order)
                })
                .await?;

            self.metrics.record_transition(order.status);
            info!(order_id, driver_id = principal.user_id, "order accepted");
            Ok::<_, AppError>(order)
        }
        .await;

        self.observe(result)
    }

    pub async fn update_order_status(
        &self,
        principal: &Principal,
        order_id: OrderId,
        status: OrderStatus,
        client_status: Option<ClientStatus>,
    ) -> Result<Order, AppError> {
        let principal = *principal;
        let lifecycle = self.lifecycle;
        let result = self
            .repo
            .transact(move |tx| {
                let mut order = load_order(tx, order_id)?;
                access::ensure_can_update_status(&principal, &order)?;

                let effect = lifecycle.update_status(
                    &mut order,
                    principal.role(),
                    status,
                    client_status,
                    Utc::now(),
                )?;

                if let StatusEffect::Delivered {
                    driver_id: Some(driver_user),
                } = effect
                {
                    if let Some(mut driver) = tx.driver_for_user(driver_user) {
                        driver.completed_deliveries += 1;
                        tx.save_driver(driver)?;
                    }
                }

                tx.save_order(order.clone())?;
                Ok(order)
            })
            .await;

        if let Ok(order) = &result {
            self.metrics.record_transition(order.status);
            info!(
                order_id,
                user_id = principal.user_id,
                status = %order.status,
                "order status updated"
            );
        }
        self.observe(result)
    }

    pub async fn cancel_order(
        &self,
        principal: &Principal,
        order_id: OrderId,
        reason: Option<String>,
    ) -> Result<Order, AppError> {
        let principal = *principal;
        let lifecycle = self.lifecycle;
        let result = self
            .repo
            .transact(move |tx| {
                let mut order = load_order(tx, order_id)?;
                access::ensure_can_cancel(&principal, &order)?;
                lifecycle.cancel(&mut order, reason, Utc::now())?;
                tx.save_order(order.clone())?;
                Ok(order)
            })
            .await;

        if let Ok(order) = &result {
            self.metrics.record_transition(order.status);
            info!(order_id, user_id = principal.user_id, "order cancelled");
        }
        self.observe(result)
    }
}
