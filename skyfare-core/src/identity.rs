use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::UserRepository;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Unknown role names are treated as a plain user.
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Caller identity attached to a request once its token has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> CoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Admin privileges required".to_string()))
        }
    }

    /// Own resources, or anything for an admin.
    pub fn can_access(&self, user_id: &str) -> bool {
        self.is_admin() || self.id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateUser {
    pub fn validate(&self) -> CoreResult<()> {
        validate_email(&self.email)?;
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "firstName and lastName must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

fn validate_email(email: &str) -> CoreResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid {
        return Err(CoreError::ValidationError(format!("invalid email format: {}", email)));
    }
    Ok(())
}

/// Profile management with the ownership and role rules applied.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn current_user(&self, caller: &AuthenticatedUser) -> CoreResult<User> {
        self.users
            .find_by_id(&caller.id)
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }

    pub async fn list(&self, caller: &AuthenticatedUser) -> CoreResult<Vec<User>> {
        caller.require_admin()?;
        self.users.find_all().await
    }

    pub async fn get(&self, caller: &AuthenticatedUser, id: &str) -> CoreResult<User> {
        if !caller.can_access(id) {
            return Err(CoreError::Forbidden("You can only access your own profile".to_string()));
        }
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }

    pub async fn create(&self, caller: &AuthenticatedUser, mut new_user: CreateUser) -> CoreResult<User> {
        caller.require_admin()?;
        new_user.validate()?;

        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(CoreError::Conflict("User with this email already exists".to_string()));
        }

        new_user.role = Some(new_user.role.unwrap_or_default());
        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
        Ok(user)
    }

    /// Existing profile for the email, created when absent. Used when issuing
    /// development tokens, so no caller is involved.
    pub async fn ensure(&self, new_user: CreateUser) -> CoreResult<User> {
        new_user.validate()?;
        if let Some(existing) = self.users.find_by_email(&new_user.email).await? {
            return Ok(existing);
        }
        self.users.create(&new_user).await
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: &str,
        changes: UpdateUser,
    ) -> CoreResult<User> {
        if !caller.can_access(id) {
            return Err(CoreError::Forbidden("You can only update your own profile".to_string()));
        }
        if !caller.is_admin() && changes.role.is_some() {
            return Err(CoreError::Forbidden("You cannot change your role".to_string()));
        }
        self.users
            .update(id, &changes)
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: &str) -> CoreResult<()> {
        caller.require_admin()?;
        if self.users.find_by_id(id).await?.is_none() {
            return Err(CoreError::NotFound("User not found".to_string()));
        }
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
