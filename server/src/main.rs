use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth_server::{
    ClientConnection,
    auth::AuthService,
    config::{Environment, ServerConfig},
    proto,
    storage::{FileStorage, StorageError},
};
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::any,
};
use prost::Message as ProstMessage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct AppState {
    /// Auth service shared by every connection.
    auth: Arc<AuthService<FileStorage>>,
    /// Deadline for serving a single request.
    request_timeout: Duration,
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(env: Environment) {
    let default_filter = match env {
        Environment::Local | Environment::Dev => "auth_server=debug",
        Environment::Prod => "auth_server=info",
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()),
    );
    match env {
        Environment::Local | Environment::Dev => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
        Environment::Prod => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(Environment::Local);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.env);

    tracing::info!(
        env = ?config.env,
        storage_path = %config.storage_path.display(),
        token_ttl_secs = config.token_ttl.as_secs(),
        listen_port = config.listen_port,
        "Loaded configuration"
    );

    // Post-condition: the directory holding the credential log exists.
    if let Some(parent) = config.storage_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::error!("Failed to create storage directory: {e}");
        std::process::exit(1);
    }

    let storage = match FileStorage::open(&config.storage_path) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to open credential store: {e}");
            std::process::exit(1);
        }
    };

    for email in &config.admin_emails {
        match storage.promote_admin(email) {
            Ok(user_id) => tracing::info!(%email, %user_id, "granted admin rights"),
            Err(StorageError::UserNotFound) => {
                tracing::warn!(%email, "admin email is not registered, skipping");
            }
            Err(e) => {
                tracing::error!("Failed to grant admin rights to {email}: {e}");
                std::process::exit(1);
            }
        }
    }

    let state = AppState {
        auth: Arc::new(AuthService::new(Arc::new(storage), config.token_ttl)),
        request_timeout: config.request_timeout,
    };

    let app = Router::new()
        .route("/ws", any(ws_handler))
        .with_state(state);

    // Connect to the websocket on ws://127.0.0.1:<port>/ws
    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });

    tracing::info!("server stopped");
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    tracing::debug!("got a websocket connection");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let client_connection = ClientConnection::new(Arc::clone(&state.auth), state.request_timeout);

    loop {
        let msg = match socket.recv().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("websocket receive error: {e}");
                return;
            }
            None => {
                tracing::debug!("client disconnected");
                return;
            }
        };

        // Only process binary messages (protobuf)
        let data = match msg {
            Message::Binary(data) => data,
            Message::Text(_) => {
                tracing::debug!("received text message (ignoring)");
                continue;
            }
            Message::Ping(data) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    return;
                }
                continue;
            }
            Message::Pong(_) => continue,
            Message::Close(_) => {
                tracing::debug!("client sent close");
                return;
            }
        };

        let client_message = match proto::ClientMessage::decode(data.as_ref()) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("failed to decode ClientMessage: {e}");
                if send_error_response(&mut socket, &format!("Failed to decode message: {e}"))
                    .await
                    .is_err()
                {
                    return;
                }
                continue;
            }
        };

        let response = client_connection.handle_message(client_message).await;
        if socket
            .send(Message::Binary(response.encode_to_vec().into()))
            .await
            .is_err()
        {
            tracing::debug!("client disconnected");
            return;
        }
    }
}

/// Send an error response for a frame that could not be decoded.
async fn send_error_response(socket: &mut WebSocket, message: &str) -> Result<(), ()> {
    let error_response = proto::ServerMessage {
        response: Some(proto::ServerResponse {
            request_id: None,
            status: Some(proto::google::rpc::Status {
                code: proto::google::rpc::Code::InvalidArgument.into(),
                message: message.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
    };
    socket
        .send(Message::Binary(error_response.encode_to_vec().into()))
        .await
        .map_err(|_| ())
}
