mod common;

use std::sync::Arc;

use transport_desk::engine::lifecycle::TransitionPolicy;
use transport_desk::error::AppError;
use transport_desk::models::order::{ClientStatus, Decision, OrderInput, OrderStatus};

use common::{brokerage, order_input, seed_admin, seed_customer, seed_driver};

#[tokio::test]
async fn order_is_priced_once_at_creation() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    assert_eq!(order.price, 16_200);
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.client_status, ClientStatus::Processing);
    assert!(order.driver_id.is_none());

    let fragile = OrderInput {
        cargo_type: Some("fragile".to_string()),
        insurance: true,
        ..order_input()
    };
    let order = desk.create_order(&customer, fragile).await.unwrap();
    assert_eq!(order.price, 21_271);
}

#[tokio::test]
async fn missing_cargo_fields_fall_back_to_defaults() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;

    let input = OrderInput {
        distance: None,
        cargo_weight: None,
        cargo_volume: None,
        cargo_type: None,
        ..order_input()
    };
    let order = desk.create_order(&customer, input).await.unwrap();

    assert_eq!(order.distance, 100.0);
    assert_eq!(order.cargo_type, "general");
    assert_eq!(order.price, 3_000);
}

#[tokio::test]
async fn blank_required_fields_are_rejected() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;

    let input = OrderInput {
        pickup_address: "   ".to_string(),
        ..order_input()
    };
    let result = desk.create_order(&customer, input).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(desk.list_orders(&customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn admins_and_drivers_cannot_place_orders() {
    let desk = brokerage(TransitionPolicy::Strict);
    let admin = seed_admin(&desk).await;
    let driver = seed_driver(&desk, &admin, "boris").await;

    assert!(matches!(
        desk.create_order(&admin, order_input()).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        desk.create_order(&driver, order_input()).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn customers_only_see_their_own_orders() {
    let desk = brokerage(TransitionPolicy::Strict);
    let anna = seed_customer(&desk, "anna").await;
    let oleg = seed_customer(&desk, "oleg").await;
    let admin = seed_admin(&desk).await;

    let first = desk.create_order(&anna, order_input()).await.unwrap();
    let second = desk.create_order(&oleg, order_input()).await.unwrap();

    let mine = desk.list_orders(&anna).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, first.id);

    assert!(matches!(
        desk.get_order(&anna, second.id).await,
        Err(AppError::Forbidden(_))
    ));

    let all = desk.list_orders(&admin).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
}

#[tokio::test]
async fn customer_cannot_decide_but_admin_can() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let order = desk.create_order(&customer, order_input()).await.unwrap();

    let denied = desk
        .decide_order(&customer, order.id, Decision::Confirm, None)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert_eq!(
        desk.get_order(&customer, order.id).await.unwrap().status,
        OrderStatus::New
    );

    let status = desk
        .decide_order(&admin, order.id, Decision::Confirm, Some("ok".to_string()))
        .await
        .unwrap();
    assert_eq!(status, OrderStatus::Confirmed);

    let order = desk.get_order(&customer, order.id).await.unwrap();
    assert_eq!(order.client_status, ClientStatus::Confirmed);
    assert_eq!(order.admin_comment.as_deref(), Some("ok"));
    assert!(order.timeline.processed_at.is_some());
}

#[tokio::test]
async fn deciding_a_missing_order_is_not_found() {
    let desk = brokerage(TransitionPolicy::Strict);
    let admin = seed_admin(&desk).await;

    let result = desk.decide_order(&admin, 404, Decision::Reject, None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn full_delivery_credits_the_driver_once() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let driver = seed_driver(&desk, &admin, "boris").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    desk.decide_order(&admin, order.id, Decision::Confirm, None)
        .await
        .unwrap();

    let assigned = desk
        .assign_driver(&admin, order.id, driver.user_id)
        .await
        .unwrap();
    assert_eq!(assigned.status, OrderStatus::Assigned);
    assert_eq!(assigned.driver_id, Some(driver.user_id));

    let accepted = desk.accept_order(&driver, order.id).await.unwrap();
    assert_eq!(accepted.status, OrderStatus::InTransit);
    assert!(accepted.timeline.accepted_at.is_some());

    let delivered = desk
        .update_order_status(&driver, order.id, OrderStatus::Delivered, None)
        .await
        .unwrap();
    assert_eq!(delivered.client_status, ClientStatus::Delivered);
    assert_eq!(desk.own_driver(&driver).await.unwrap().completed_deliveries, 1);

    let again = desk
        .update_order_status(&admin, order.id, OrderStatus::Delivered, None)
        .await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));
    assert_eq!(desk.own_driver(&driver).await.unwrap().completed_deliveries, 1);
}

#[tokio::test]
async fn permissive_policy_still_counts_delivery_once() {
    let desk = brokerage(TransitionPolicy::Permissive);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let driver = seed_driver(&desk, &admin, "boris").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    desk.assign_driver(&admin, order.id, driver.user_id)
        .await
        .unwrap();

    for _ in 0..2 {
        desk.update_order_status(&driver, order.id, OrderStatus::Delivered, None)
            .await
            .unwrap();
    }
    assert_eq!(desk.own_driver(&driver).await.unwrap().completed_deliveries, 1);
}

#[tokio::test]
async fn unassigned_driver_cannot_touch_order() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let assigned = seed_driver(&desk, &admin, "boris").await;
    let other = seed_driver(&desk, &admin, "gleb").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    desk.decide_order(&admin, order.id, Decision::Confirm, None)
        .await
        .unwrap();
    desk.assign_driver(&admin, order.id, assigned.user_id)
        .await
        .unwrap();

    assert!(matches!(
        desk.accept_order(&other, order.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        desk.update_order_status(&other, order.id, OrderStatus::InTransit, None)
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(desk.list_orders(&other).await.unwrap().is_empty());
    assert_eq!(desk.list_orders(&assigned).await.unwrap().len(), 1);
}

#[tokio::test]
async fn assigning_requires_an_active_driver_role() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    desk.decide_order(&admin, order.id, Decision::Confirm, None)
        .await
        .unwrap();

    let result = desk.assign_driver(&admin, order.id, customer.user_id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(
        desk.get_order(&admin, order.id)
            .await
            .unwrap()
            .driver_id
            .is_none()
    );
}

#[tokio::test]
async fn strict_policy_refuses_to_assign_unconfirmed_orders() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let driver = seed_driver(&desk, &admin, "boris").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    let result = desk.assign_driver(&admin, order.id, driver.user_id).await;
    assert!(matches!(
        result,
        Err(AppError::InvalidTransition {
            from: OrderStatus::New,
            to: OrderStatus::Assigned,
        })
    ));
}

#[tokio::test]
async fn customer_cancellation_withholds_fee() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let stranger = seed_customer(&desk, "oleg").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();

    assert!(matches!(
        desk.cancel_order(&stranger, order.id, None).await,
        Err(AppError::Forbidden(_))
    ));

    let cancelled = desk
        .cancel_order(&customer, order.id, Some("plans changed".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.client_status, ClientStatus::Cancelled);

    let cancellation = cancelled.cancellation.unwrap();
    assert_eq!(cancellation.reason, "plans changed");
    assert_eq!(cancellation.fee, 1_620.0);
    assert_eq!(cancellation.refund, 14_580.0);

    assert!(matches!(
        desk.cancel_order(&customer, order.id, None).await,
        Err(AppError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn customers_cannot_advance_their_own_orders() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    let result = desk
        .update_order_status(&customer, order.id, OrderStatus::Confirmed, None)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn explicit_client_status_wins() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    let updated = desk
        .update_order_status(
            &admin,
            order.id,
            OrderStatus::Confirmed,
            Some(ClientStatus::Processing),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Confirmed);
    assert_eq!(updated.client_status, ClientStatus::Processing);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deliveries_credit_once_under_strict_policy() {
    let desk = brokerage(TransitionPolicy::Strict);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let driver = seed_driver(&desk, &admin, "boris").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    desk.decide_order(&admin, order.id, Decision::Confirm, None)
        .await
        .unwrap();
    desk.assign_driver(&admin, order.id, driver.user_id)
        .await
        .unwrap();
    desk.accept_order(&driver, order.id).await.unwrap();

    let order_id = order.id;
    let desk = Arc::new(desk);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let desk = desk.clone();
            tokio::spawn(async move {
                desk.update_order_status(&driver, order_id, OrderStatus::Delivered, None)
                    .await
            })
        })
        .collect();

    let (mut delivered, mut rejected) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => delivered += 1,
            Err(AppError::InvalidTransition { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(delivered, 1);
    assert_eq!(rejected, 7);
    assert_eq!(desk.own_driver(&driver).await.unwrap().completed_deliveries, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deliveries_credit_once_under_permissive_policy() {
    let desk = brokerage(TransitionPolicy::Permissive);
    let customer = seed_customer(&desk, "anna").await;
    let admin = seed_admin(&desk).await;
    let driver = seed_driver(&desk, &admin, "boris").await;

    let order = desk.create_order(&customer, order_input()).await.unwrap();
    desk.assign_driver(&admin, order.id, driver.user_id)
        .await
        .unwrap();

    let order_id = order.id;
    let desk = Arc::new(desk);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let desk = desk.clone();
            tokio::spawn(async move {
                desk.update_order_status(&driver, order_id, OrderStatus::Delivered, None)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(desk.own_driver(&driver).await.unwrap().completed_deliveries, 1);
}
