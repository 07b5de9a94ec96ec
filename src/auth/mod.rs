//! Bearer-token authentication.
//!
//! Sessions are rows keyed by an opaque token; logout revokes every
//! session the user holds. Password digests are salted SHA-256 stored as
//! `salt$hex`.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::database::entities::{sessions, users};
use crate::errors::AuthError;

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn hash_password(password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Sha256::digest(format!("{}{}", salt, password).as_bytes());
        format!("{}${:x}", salt, digest)
    }

    pub fn verify_password(password: &str, stored: &str) -> bool {
        match stored.split_once('$') {
            Some((salt, hash)) => {
                let digest = Sha256::digest(format!("{}{}", salt, password).as_bytes());
                format!("{:x}", digest) == hash
            }
            None => false,
        }
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<users::Model, AuthError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(Self::hash_password(password)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(user.insert(&self.db).await?)
    }

    /// Validate credentials and issue a fresh session token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, users::Model), AuthError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = Uuid::new_v4().simple().to_string();
        let session = sessions::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        session.insert(&self.db).await?;

        debug!("Issued session token for user {}", user.id);
        Ok((token, user))
    }

    /// Revoke every session the user holds.
    pub async fn logout(&self, user_id: i32) -> Result<(), AuthError> {
        sessions::Entity::delete_many()
            .filter(sessions::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !Self::verify_password(old_password, &user.password_hash) {
            return Err(AuthError::PasswordMismatch);
        }

        let mut user: users::ActiveModel = user.into();
        user.password_hash = Set(Self::hash_password(new_password));
        user.updated_at = Set(Utc::now());
        user.update(&self.db).await?;
        Ok(())
    }

    /// Resolve a bearer token to its user.
    pub async fn resolve_token(&self, token: &str) -> Result<users::Model, AuthError> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .one(&self.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        users::Entity::find_by_id(session.user_id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}
