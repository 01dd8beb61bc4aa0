//! Test that credentials survive a restart of the file-backed store.

use std::sync::Arc;

use crate::auth::{AuthService, ErrorKind, PasswordHasher};
use crate::client_connection::ClientConnection;
use crate::e2e_tests::helpers::*;
use crate::proto;
use crate::storage::FileStorage;
use crate::testing::TEST_TOKEN_TTL;
use crate::types::AppId;

fn open(path: &std::path::Path) -> (ClientConnection<FileStorage>, Arc<AuthService<FileStorage>>) {
    let storage = FileStorage::open(path).expect("open store");
    let service = Arc::new(
        AuthService::new(Arc::new(storage), TEST_TOKEN_TTL)
            .with_hasher(PasswordHasher::insecure_fast()),
    );
    (
        ClientConnection::new(Arc::clone(&service), TEST_REQUEST_TIMEOUT),
        service,
    )
}

fn send(
    runtime: &tokio::runtime::Runtime,
    conn: &ClientConnection<FileStorage>,
    message: proto::ClientMessage,
) -> proto::ServerResponse {
    runtime
        .block_on(conn.handle_message(message))
        .response
        .expect("response")
}

#[test]
fn test_login_after_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credentials.log");
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    {
        let (conn, _service) = open(&path);
        assert!(is_ok(&send(&runtime, &conn, register(1, "root@x.com", "rootpw"))));
    }
    FileStorage::open(&path)
        .expect("reopen store")
        .promote_admin("root@x.com")
        .expect("promote");
    let app_id = {
        let (conn, _service) = open(&path);
        created_app_id(&send(
            &runtime,
            &conn,
            create_app(2, "root@x.com", "rootpw", "mobile", "s3cr3t"),
        ))
    };

    let (conn, service) = open(&path);
    let token = login_token(&send(&runtime, &conn, login(3, "root@x.com", "rootpw", app_id)));
    let claims = runtime
        .block_on(service.verify_token(&token, AppId(app_id)))
        .expect("verify");
    assert_eq!(claims.email, "root@x.com");

    let resp = send(&runtime, &conn, register(4, "root@x.com", "again"));
    assert_eq!(
        status_code(&resp),
        proto::google::rpc::Code::AlreadyExists as i32
    );

    let error = runtime
        .block_on(service.verify_token("garbage", AppId(app_id)))
        .expect_err("garbage token");
    assert_eq!(error.kind(), ErrorKind::InvalidToken);
}
