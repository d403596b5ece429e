//! User management collaborator.
//!
//! A small, schema-free user service behind a repository trait; the only
//! shipped backend is in-memory. Email validation is a shape check,
//! reported as a client-facing bad-request class.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("A user with email '{0}' already exists")]
    EmailExists(String),

    #[error("User not found: {0}")]
    NotFound(String),
}

/// Storage seam for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, name: &str, email: &str) -> Result<User, UserError>;
    async fn find_by_id(&self, id: &str) -> Option<User>;
}

/// In-memory user storage.
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, name: &str, email: &str) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(UserError::EmailExists(email.into()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }
}

pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_user(&self, name: &str, email: &str) -> Result<User, UserError> {
        if !valid_email(email) {
            return Err(UserError::InvalidEmail(email.into()));
        }
        self.repo.save(name, email).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, UserError> {
        self.repo
            .find_by_id(id)
            .await
            .ok_or_else(|| UserError::NotFound(id.into()))
    }
}

/// Shape check only: one '@', non-empty local part, dotted domain.
fn valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
}
