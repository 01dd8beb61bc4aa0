use std::sync::Arc;
use std::time::Duration;

use crate::{
    auth::{AuthError, AuthService, ErrorKind},
    proto::{self, google::rpc::Code, server_response::Payload},
    storage::Storage,
    types::{
        ProtoDeserializable,
        client_message::{
            ClientMessage, ClientMessagePayload, CreateAppRequest, IsAdminRequest, LoginRequest,
            RegisterRequest,
        },
    },
};

/// Status code reported to the client for each error kind.
#[must_use]
pub const fn status_code(kind: ErrorKind) -> Code {
    match kind {
        ErrorKind::InvalidArgument(_) => Code::InvalidArgument,
        ErrorKind::InvalidCredentials | ErrorKind::ExpiredToken | ErrorKind::InvalidToken => {
            Code::Unauthenticated
        }
        ErrorKind::NotAdminRights => Code::PermissionDenied,
        ErrorKind::NotFound => Code::NotFound,
        ErrorKind::AlreadyExists => Code::AlreadyExists,
        ErrorKind::Internal => Code::Internal,
    }
}

fn status_response(code: Code, message: String) -> proto::ServerResponse {
    proto::ServerResponse {
        status: Some(proto::google::rpc::Status {
            code: code.into(),
            message,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn ok_response(payload: Payload) -> proto::ServerResponse {
    proto::ServerResponse {
        status: Some(proto::google::rpc::Status {
            code: Code::Ok.into(),
            ..Default::default()
        }),
        payload: Some(payload),
        ..Default::default()
    }
}

fn error_response(request_id: u32, error: &AuthError) -> proto::ServerResponse {
    if error.kind() == ErrorKind::Internal {
        let cause = std::error::Error::source(error).map(ToString::to_string);
        tracing::error!(request_id, op = error.op(), cause = ?cause, "request failed");
    } else {
        tracing::info!(request_id, op = error.op(), error = %error.kind(), "request rejected");
    }
    // The kind's text never carries the underlying cause.
    status_response(status_code(error.kind()), error.kind().to_string())
}

/// Serves requests from one client against a shared auth service.
pub struct ClientConnection<S> {
    auth: Arc<AuthService<S>>,
    request_timeout: Duration,
}

impl<S: Storage> ClientConnection<S> {
    #[must_use]
    pub const fn new(auth: Arc<AuthService<S>>, request_timeout: Duration) -> Self {
        Self {
            auth,
            request_timeout,
        }
    }

    /// Decode, validate and serve one request. Always produces exactly one
    /// response carrying the request's id.
    pub async fn handle_message(
        &self,
        proto_message: proto::ClientMessage,
    ) -> proto::ServerMessage {
        let request_id = proto_message.request_id;
        let message = match ClientMessage::from_proto(proto_message) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(?request_id, error = %err, "rejected malformed request");
                let mut response = status_response(Code::InvalidArgument, err);
                response.request_id = request_id;
                return proto::ServerMessage {
                    response: Some(response),
                };
            }
        };

        let mut response = match tokio::time::timeout(
            self.request_timeout,
            self.dispatch(message.request_id, message.payload),
        )
        .await
        {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(
                    request_id = message.request_id,
                    timeout_ms = self.request_timeout.as_millis(),
                    "request timed out"
                );
                status_response(Code::DeadlineExceeded, "request timed out".to_string())
            }
        };
        response.request_id = request_id;
        proto::ServerMessage {
            response: Some(response),
        }
    }

    async fn dispatch(&self, request_id: u32, payload: ClientMessagePayload) -> proto::ServerResponse {
        match payload {
            ClientMessagePayload::Login(request) => self.login(request_id, request).await,
            ClientMessagePayload::Register(request) => self.register(request_id, request).await,
            ClientMessagePayload::IsAdmin(request) => self.is_admin(request_id, request).await,
            ClientMessagePayload::CreateApp(request) => self.create_app(request_id, request).await,
        }
    }

    async fn login(&self, request_id: u32, request: LoginRequest) -> proto::ServerResponse {
        let LoginRequest {
            credentials,
            app_id,
        } = request;
        match self
            .auth
            .login(&credentials.email, &credentials.password, app_id)
            .await
        {
            Ok(token) => {
                tracing::info!(request_id, email = %credentials.email, %app_id, "user logged in");
                ok_response(Payload::Login(proto::LoginResponse { token }))
            }
            Err(e) => error_response(request_id, &e),
        }
    }

    async fn register(&self, request_id: u32, request: RegisterRequest) -> proto::ServerResponse {
        let credentials = request.credentials;
        match self
            .auth
            .register_new_user(&credentials.email, &credentials.password)
            .await
        {
            Ok(user_id) => {
                tracing::info!(request_id, email = %credentials.email, %user_id, "user registered");
                ok_response(Payload::Register(proto::RegisterResponse {
                    user_id: user_id.get(),
                }))
            }
            Err(e) => error_response(request_id, &e),
        }
    }

    async fn is_admin(&self, request_id: u32, request: IsAdminRequest) -> proto::ServerResponse {
        match self.auth.is_admin(request.user_id).await {
            Ok(is_admin) => {
                tracing::debug!(request_id, user_id = %request.user_id, is_admin, "checked admin rights");
                ok_response(Payload::IsAdmin(proto::IsAdminResponse { is_admin }))
            }
            Err(e) => error_response(request_id, &e),
        }
    }

    async fn create_app(&self, request_id: u32, request: CreateAppRequest) -> proto::ServerResponse {
        let CreateAppRequest {
            credentials,
            app_name,
            app_secret,
        } = request;
        match self
            .auth
            .create_app(
                &credentials.email,
                &credentials.password,
                &app_name,
                &app_secret,
            )
            .await
        {
            Ok(app_id) => {
                tracing::info!(request_id, email = %credentials.email, app_name = %app_name, %app_id, "app created");
                ok_response(Payload::CreateApp(proto::CreateAppResponse {
                    app_id: app_id.get(),
                }))
            }
            Err(e) => error_response(request_id, &e),
        }
    }
}
