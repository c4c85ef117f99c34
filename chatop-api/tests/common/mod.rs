use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationGate;
use auth::Authenticator;
use auth::KeyPair;
use auth::KeyStoreConfig;
use auth::PasswordCost;
use auth::TokenSettings;
use chatop_api::domain::user::models::User;
use chatop_api::domain::user::models::UserId;
use chatop_api::domain::user::ports::UserRepository;
use chatop_api::domain::user::service::UserService;
use chatop_api::inbound::http::router::create_router;
use chatop_api::inbound::http::routes::public_routes;
use chatop_api::user::errors::UserError;

/// Test application that spawns a real server over an in-memory user store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

/// User store keyed by id, enforcing unique emails like the users table does
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }
}

pub fn keystore_config() -> KeyStoreConfig {
    KeyStoreConfig {
        path: concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../auth/tests/fixtures/keystore.p12"
        )
        .into(),
        store_password: "changeit".to_string(),
        key_alias: "chatop".to_string(),
        key_password: "changeit".to_string(),
    }
}

impl TestApp {
    /// Spawn the application with one-hour tokens
    pub async fn spawn() -> Self {
        Self::spawn_with_lifetime(Duration::from_secs(3600)).await
    }

    /// Spawn the application in a background task with the given token lifetime
    pub async fn spawn_with_lifetime(lifetime: Duration) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let key_pair = KeyPair::load(&keystore_config()).expect("Failed to load key store");
        let authenticator = Arc::new(
            Authenticator::new(
                key_pair,
                TokenSettings {
                    lifetime,
                    leeway: Duration::from_secs(60),
                },
                PasswordCost {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                },
            )
            .expect("Failed to build authenticator"),
        );

        let user_repository = Arc::new(InMemoryUserRepository::default());
        let user_service = Arc::new(UserService::new(
            user_repository,
            Arc::clone(&authenticator),
        ));
        let gate = Arc::new(AuthenticationGate::new(
            public_routes(),
            authenticator.validator(),
        ));

        let router = create_router(user_service, gate);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account and return its token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "email": email,
                "name": "Test User",
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["token"]
            .as_str()
            .expect("Missing token in response")
            .to_string()
    }
}
