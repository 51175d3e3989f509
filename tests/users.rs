mod common;

use transport_desk::engine::access::Principal;
use transport_desk::engine::lifecycle::TransitionPolicy;
use transport_desk::error::AppError;
use transport_desk::models::user::{PasswordChange, PasswordReset, RegistrationInput};
use transport_desk::service::Brokerage;
use transport_desk::store::memory::MemoryRepository;

use common::brokerage;

async fn register(desk: &Brokerage<MemoryRepository>, password: &str) -> Principal {
    let user = desk
        .register_user(RegistrationInput {
            email: "Anna@Example.com".to_string(),
            phone: "+7-900-111-22-33".to_string(),
            password: password.to_string(),
            first_name: "Anna".to_string(),
            last_name: "Ivanova".to_string(),
        })
        .await
        .unwrap();
    Principal::from(&user)
}

fn change(current: &str, new: &str) -> PasswordChange {
    PasswordChange {
        current_password: current.to_string(),
        new_password: new.to_string(),
    }
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let desk = brokerage(TransitionPolicy::Strict);
    let user = register(&desk, "secret1").await;

    let wrong = desk.change_password(&user, change("nope", "secret2")).await;
    assert!(matches!(wrong, Err(AppError::Validation(_))));

    let short = desk.change_password(&user, change("secret1", "123")).await;
    assert!(matches!(short, Err(AppError::Validation(_))));

    desk.change_password(&user, change("secret1", "secret2"))
        .await
        .unwrap();

    let stale = desk.change_password(&user, change("secret1", "secret3")).await;
    assert!(matches!(stale, Err(AppError::Validation(_))));
    desk.change_password(&user, change("secret2", "secret3"))
        .await
        .unwrap();
}

#[tokio::test]
async fn password_reset_finds_account_by_email_or_phone() {
    let desk = brokerage(TransitionPolicy::Strict);
    let user = register(&desk, "secret1").await;

    desk.reset_password(PasswordReset {
        contact: " ANNA@example.com ".to_string(),
        new_password: "fresh-1".to_string(),
    })
    .await
    .unwrap();
    desk.change_password(&user, change("fresh-1", "fresh-2"))
        .await
        .unwrap();

    desk.reset_password(PasswordReset {
        contact: "+7-900-111-22-33".to_string(),
        new_password: "fresh-3".to_string(),
    })
    .await
    .unwrap();
    desk.change_password(&user, change("fresh-3", "fresh-4"))
        .await
        .unwrap();
}

#[tokio::test]
async fn password_reset_for_unknown_contact_is_not_found() {
    let desk = brokerage(TransitionPolicy::Strict);

    let result = desk
        .reset_password(PasswordReset {
            contact: "ghost@example.com".to_string(),
            new_password: "secret1".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let blank = desk
        .reset_password(PasswordReset {
            contact: "  ".to_string(),
            new_password: "secret1".to_string(),
        })
        .await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
}
