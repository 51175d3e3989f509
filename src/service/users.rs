use argon2::Argon2;
use chrono::Utc;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::{info, warn};
use validator::Validate;

use crate::engine::access::Principal;
use crate::error::AppError;
use crate::models::user::{PasswordChange, PasswordReset, ProfileInput, RegistrationInput, User};
use crate::service::Brokerage;
use crate::store::{Repository, Table};

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))
}

pub(crate) fn verify_password(password: &str, hashed: &str) -> bool {
    let hashed = match PasswordHash::new(hashed) {
        Ok(hashed) => hashed,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &hashed)
        .is_ok()
}

impl<R: Repository> Brokerage<R> {
    pub async fn register_user(&self, input: RegistrationInput) -> Result<User, AppError> {
        let result = async {
            let input = input.normalized();
            input.validate()?;
            let password_hash = hash_password(&input.password)?;

            let user = self
                .repo
                .transact(move |tx| {
                    let user = User {
                        id: tx.next_id(Table::Users),
                        email: input.email,
                        phone: input.phone,
                        password_hash,
                        first_name: input.first_name,
                        last_name: input.last_name,
                        verified: true,
                        is_admin: false,
                        is_driver: false,
                        created_at: Utc::now(),
                    };
                    tx.save_user(user.clone())?;
                    Ok(user)
                })
                .await?;

            info!(user_id = user.id, "user registered");
            Ok::<_, AppError>(user)
        }
        .await;

        self.observe(result)
    }

    pub async fn seed_admin(
        &self,
        email: &str,
        phone: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        let phone = phone.trim().to_string();
        let password_hash = hash_password(password)?;

        let seeded = self
            .repo
            .transact(move |tx| {
                if tx.user_by_email(&email).is_some() {
                    return Ok(None);
                }

                let admin = User {
                    id: tx.next_id(Table::Users),
                    email,
                    phone,
                    password_hash,
                    first_name: "Admin".to_string(),
                    last_name: "Account".to_string(),
                    verified: true,
                    is_admin: true,
                    is_driver: false,
                    created_at: Utc::now(),
                };
                tx.save_user(admin.clone())?;
                Ok(Some(admin))
            })
            .await?;

        if let Some(admin) = &seeded {
            info!(user_id = admin.id, "admin account seeded");
        }
        Ok(seeded)
    }

    pub async fn profile(&self, principal: &Principal) -> Result<User, AppError> {
        let user_id = principal.user_id;
        let result = self
            .repo
            .transact(move |tx| {
                tx.user(user_id)
                    .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
            })
            .await;

        self.observe(result)
    }

    pub async fn update_profile(
        &self,
        principal: &Principal,
        input: ProfileInput,
    ) -> Result<User, AppError> {
        let result = async {
            let input = input.normalized();
            input.validate()?;

            let user_id = principal.user_id;
            let user = self
                .repo
                .transact(move |tx| {
                    let mut user = tx
                        .user(user_id)
                        .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
                    user.email = input.email;
                    user.phone = input.phone;
                    user.first_name = input.first_name;
                    user.last_name = input.last_name;
                    tx.save_user(user.clone())?;
                    Ok(user)
                })
                .await?;

            info!(user_id, "profile updated");
            Ok::<_, AppError>(user)
        }
        .await;

        self.observe(result)
    }

    pub async fn change_password(
        &self,
        principal: &Principal,
        input: PasswordChange,
    ) -> Result<(), AppError> {
        let result = async {
            input.validate()?;
            let password_hash = hash_password(&input.new_password)?;

            let user_id = principal.user_id;
            self.repo
                .transact(move |tx| {
                    let mut user = tx
                        .user(user_id)
                        .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
                    if !verify_password(&input.current_password, &user.password_hash) {
                        return Err(AppError::Validation(
                            "current password is incorrect".to_string(),
                        ));
                    }
                    user.password_hash = password_hash;
                    tx.save_user(user)?;
                    Ok(())
                })
                .await?;

            info!(user_id, "password changed");
            Ok::<_, AppError>(())
        }
        .await;

        self.observe(result)
    }

    /// Sets a new password for the account matching `contact` by email or
    /// phone. The one-time code check happens before this is reached.
    pub async fn reset_password(&self, input: PasswordReset) -> Result<(), AppError> {
        let result = async {
            let input = input.normalized();
            input.validate()?;
            let password_hash = hash_password(&input.new_password)?;

            let contact = input.contact;
            let user_id = self
                .repo
                .transact(move |tx| {
                    let mut user = tx
                        .user_by_email(&contact.to_lowercase())
                        .or_else(|| tx.user_by_phone(&contact))
                        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
                    let user_id = user.id;
                    user.password_hash = password_hash;
                    tx.save_user(user)?;
                    Ok(user_id)
                })
                .await?;

            warn!(user_id, "password reset");
            Ok::<_, AppError>(())
        }
        .await;

        self.observe(result)
    }
}
