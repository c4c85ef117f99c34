use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::USER_AUTHORITY;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn authorities() -> BTreeSet<String> {
        BTreeSet::from([USER_AUTHORITY.to_string()])
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(
        &self,
        command: RegisterCommand,
        now: DateTime<Utc>,
    ) -> Result<String, UserError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self
            .authenticator
            .hash_password(&command.password)
            .map_err(|e| UserError::Password(e.to_string()))?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            name: command.name,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!("Registered user {}", created_user.id);

        let token = self
            .authenticator
            .generate_token(created_user.email.as_str(), &Self::authorities(), now)
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(token)
    }

    async fn login(&self, command: LoginCommand, now: DateTime<Utc>) -> Result<String, UserError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            tracing::debug!("Login attempt for unknown account");
            return Err(self
                .authenticator
                .reject_unknown_account(&command.password)
                .into());
        };

        let result = self.authenticator.authenticate(
            &command.password,
            &user.password_hash,
            user.email.as_str(),
            &Self::authorities(),
            now,
        )?;

        tracing::debug!("User {} logged in", user.id);
        Ok(result.access_token)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFound(email.to_string()))
    }
}
