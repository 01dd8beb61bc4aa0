//! Test app creation and its admin gate.

use crate::e2e_tests::helpers::*;
use crate::proto::google::rpc::Code;

#[test]
fn test_admin_creates_app() {
    let test = TestClient::new();
    test.seed_admin("root@x.com", "rootpw");

    let resp = test.send(create_app(1, "root@x.com", "rootpw", "mobile", "s3cr3t"));
    assert!(is_ok(&resp));
    assert_eq!(created_app_id(&resp), 1);

    let app = test
        .storage
        .app_by_name("mobile")
        .expect("lookup")
        .expect("app stored");
    assert_eq!(app.secret, b"s3cr3t");
}

#[test]
fn test_non_admin_is_denied() {
    let test = TestClient::new();
    assert!(is_ok(&test.send(register(1, "a@x.com", "pw123"))));

    let resp = test.send(create_app(2, "a@x.com", "pw123", "mobile", "s3cr3t"));
    assert_eq!(status_code(&resp), Code::PermissionDenied as i32);
    assert_eq!(status_message(&resp), "user doesn't have admin rights");
    assert_eq!(test.storage.app_count().expect("count"), 0);
}

#[test]
fn test_wrong_password_is_unauthenticated() {
    let test = TestClient::new();
    test.seed_admin("root@x.com", "rootpw");

    let resp = test.send(create_app(1, "root@x.com", "wrong", "mobile", "s3cr3t"));
    assert_eq!(status_code(&resp), Code::Unauthenticated as i32);
    assert_eq!(test.storage.app_count().expect("count"), 0);
}

#[test]
fn test_duplicate_app_name() {
    let test = TestClient::new();
    test.seed_app("mobile", "s3cr3t");

    let resp = test.send(create_app(1, "root@x.com", "rootpw", "mobile", "other"));
    assert_eq!(status_code(&resp), Code::AlreadyExists as i32);
    assert_eq!(test.storage.app_count().expect("count"), 1);
}

#[test]
fn test_app_ids_are_sequential() {
    let test = TestClient::new();
    let first = test.seed_app("web", "w");

    let second = test.send(create_app(1, "root@x.com", "rootpw", "mobile", "m"));
    assert_eq!(first, 1);
    assert_eq!(created_app_id(&second), 2);
}
