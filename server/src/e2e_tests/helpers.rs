//! Common helpers for end-to-end tests.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthService;
use crate::client_connection::ClientConnection;
use crate::proto;
use crate::storage::MemoryStorage;
use crate::testing::{new_test_service, register_admin};
use crate::types::UserId;

/// Request deadline used by test clients.
pub const TEST_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A connection to a fresh in-memory auth service, with its own runtime.
pub struct TestClient {
    pub client: ClientConnection<MemoryStorage>,
    pub runtime: tokio::runtime::Runtime,
    pub service: Arc<AuthService<MemoryStorage>>,
    pub storage: Arc<MemoryStorage>,
}

impl TestClient {
    /// Create a new test client over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (service, storage) = new_test_service();
        let client = ClientConnection::new(Arc::clone(&service), TEST_REQUEST_TIMEOUT);

        #[allow(clippy::expect_used)]
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");

        Self {
            client,
            runtime,
            service,
            storage,
        }
    }

    /// Create a second connection to the same service.
    #[must_use]
    pub fn create_sibling(&self) -> ClientConnection<MemoryStorage> {
        ClientConnection::new(Arc::clone(&self.service), TEST_REQUEST_TIMEOUT)
    }

    /// Send a message and return the response.
    pub fn send(&self, message: proto::ClientMessage) -> proto::ServerResponse {
        let response = self
            .runtime
            .block_on(async { self.client.handle_message(message).await });

        #[allow(clippy::expect_used)]
        response.response.expect("Response should be present")
    }

    /// Register `email` directly through the service and make it an admin.
    pub fn seed_admin(&self, email: &str, password: &str) -> UserId {
        self.runtime.block_on(register_admin(
            &self.service,
            &self.storage,
            email,
            password,
        ))
    }

    /// Seed an admin, create an app through the wire, and return its id.
    pub fn seed_app(&self, app_name: &str, app_secret: &str) -> i64 {
        self.seed_admin("root@x.com", "rootpw");
        let resp = self.send(create_app(
            1000,
            "root@x.com",
            "rootpw",
            app_name,
            app_secret,
        ));
        assert!(is_ok(&resp), "seed_app failed: {:?}", resp.status);
        created_app_id(&resp)
    }
}

// =============================================================================
// Request Builders
// =============================================================================

#[must_use]
pub fn register(request_id: u32, email: &str, password: &str) -> proto::ClientMessage {
    proto::ClientMessage {
        request_id: Some(request_id),
        payload: Some(proto::client_message::Payload::Register(
            proto::RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )),
    }
}

#[must_use]
pub fn login(request_id: u32, email: &str, password: &str, app_id: i64) -> proto::ClientMessage {
    proto::ClientMessage {
        request_id: Some(request_id),
        payload: Some(proto::client_message::Payload::Login(proto::LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            app_id,
        })),
    }
}

#[must_use]
pub fn is_admin(request_id: u32, user_id: i64) -> proto::ClientMessage {
    proto::ClientMessage {
        request_id: Some(request_id),
        payload: Some(proto::client_message::Payload::IsAdmin(
            proto::IsAdminRequest { user_id },
        )),
    }
}

#[must_use]
pub fn create_app(
    request_id: u32,
    email: &str,
    password: &str,
    app_name: &str,
    app_secret: &str,
) -> proto::ClientMessage {
    proto::ClientMessage {
        request_id: Some(request_id),
        payload: Some(proto::client_message::Payload::CreateApp(
            proto::CreateAppRequest {
                email: email.to_string(),
                password: password.to_string(),
                app_name: app_name.to_string(),
                app_secret: app_secret.to_string(),
            },
        )),
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

/// Check if response has OK status.
#[must_use]
pub fn is_ok(response: &proto::ServerResponse) -> bool {
    response
        .status
        .as_ref()
        .is_some_and(|s| s.code == proto::google::rpc::Code::Ok as i32)
}

/// Get the status code from a response.
#[must_use]
pub fn status_code(response: &proto::ServerResponse) -> i32 {
    response.status.as_ref().map_or(-1, |s| s.code)
}

/// Get the status message from a response.
#[must_use]
pub fn status_message(response: &proto::ServerResponse) -> &str {
    response.status.as_ref().map_or("", |s| s.message.as_str())
}

/// Extract the user id from a register response.
#[must_use]
pub fn registered_user_id(response: &proto::ServerResponse) -> i64 {
    match &response.payload {
        Some(proto::server_response::Payload::Register(r)) => r.user_id,
        other => panic!("Expected Register payload, got {other:?}"),
    }
}

/// Extract the token from a login response.
#[must_use]
pub fn login_token(response: &proto::ServerResponse) -> String {
    match &response.payload {
        Some(proto::server_response::Payload::Login(r)) => r.token.clone(),
        other => panic!("Expected Login payload, got {other:?}"),
    }
}

/// Extract the flag from an is-admin response.
#[must_use]
pub fn admin_flag(response: &proto::ServerResponse) -> bool {
    match &response.payload {
        Some(proto::server_response::Payload::IsAdmin(r)) => r.is_admin,
        other => panic!("Expected IsAdmin payload, got {other:?}"),
    }
}

/// Extract the app id from a create-app response.
#[must_use]
pub fn created_app_id(response: &proto::ServerResponse) -> i64 {
    match &response.payload {
        Some(proto::server_response::Payload::CreateApp(r)) => r.app_id,
        other => panic!("Expected CreateApp payload, got {other:?}"),
    }
}
