#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;

use transport_desk::engine::access::Principal;
use transport_desk::engine::lifecycle::TransitionPolicy;
use transport_desk::models::application::ApplicationInput;
use transport_desk::models::order::OrderInput;
use transport_desk::models::user::{User, UserId};
use transport_desk::observability::metrics::Metrics;
use transport_desk::service::Brokerage;
use transport_desk::store::memory::MemoryRepository;
use transport_desk::store::{Repository, Table};

pub fn brokerage(policy: TransitionPolicy) -> Brokerage<MemoryRepository> {
    Brokerage::new(Arc::new(MemoryRepository::new()), policy, Metrics::new())
}

/// Inserts a user directly, skipping password hashing.
pub async fn seed_user<R: Repository>(
    brokerage: &Brokerage<R>,
    name: &str,
    is_admin: bool,
) -> UserId {
    let email = format!("{name}@example.com");
    let phone = format!("+7-900-{name}");
    let first_name = name.to_string();

    brokerage
        .repository()
        .transact(move |tx| {
            let user = User {
                id: tx.next_id(Table::Users),
                email,
                phone,
                password_hash: String::new(),
                first_name,
                last_name: "Tester".to_string(),
                verified: true,
                is_admin,
                is_driver: false,
                created_at: Utc::now(),
            };
            let id = user.id;
            tx.save_user(user)?;
            Ok(id)
        })
        .await
        .unwrap()
}

pub async fn seed_customer<R: Repository>(brokerage: &Brokerage<R>, name: &str) -> Principal {
    Principal::customer(seed_user(brokerage, name, false).await)
}

pub async fn seed_admin<R: Repository>(brokerage: &Brokerage<R>) -> Principal {
    Principal::admin(seed_user(brokerage, "admin", true).await)
}

/// Registers a user and walks them through application and approval.
pub async fn seed_driver<R: Repository>(
    brokerage: &Brokerage<R>,
    admin: &Principal,
    name: &str,
) -> Principal {
    let applicant = seed_customer(brokerage, name).await;
    let application_id = brokerage
        .submit_driver_application(&applicant, application_input())
        .await
        .unwrap();
    brokerage
        .approve_driver_application(admin, application_id)
        .await
        .unwrap();

    brokerage.principal(applicant.user_id).await.unwrap()
}

pub fn application_input() -> ApplicationInput {
    ApplicationInput {
        license_number: "77 AB 123456".to_string(),
        experience: 4,
        car_model: "GAZelle Next".to_string(),
        car_number: "A123BC77".to_string(),
        max_weight: 1_500.0,
        car_type: None,
    }
}

pub fn order_input() -> OrderInput {
    OrderInput {
        sender_name: "Ivan Petrov".to_string(),
        sender_phone: "+7-900-000-00-00".to_string(),
        cargo_description: "office furniture".to_string(),
        cargo_weight: Some(10.0),
        cargo_volume: Some(1.0),
        cargo_type: Some("general".to_string()),
        pickup_address: "Moscow, Tverskaya 1".to_string(),
        delivery_address: "Kazan, Baumana 5".to_string(),
        distance: Some(700.0),
        ..OrderInput::default()
    }
}
