//! Test that missing required fields are rejected.

use crate::e2e_tests::helpers::*;
use crate::proto;
use crate::proto::google::rpc::Code;

fn assert_invalid(resp: &proto::ServerResponse, message: &str) {
    assert_eq!(status_code(resp), Code::InvalidArgument as i32);
    assert_eq!(status_message(resp), message);
    assert_eq!(resp.payload, None);
}

#[test]
fn test_login_missing_fields() {
    let test = TestClient::new();
    assert_invalid(&test.send(login(1, "", "pw", 1)), "email is required");
    assert_invalid(&test.send(login(2, "a@x.com", "", 1)), "password is required");
    assert_invalid(&test.send(login(3, "a@x.com", "pw", 0)), "app_id is required");
}

#[test]
fn test_register_missing_fields() {
    let test = TestClient::new();
    assert_invalid(&test.send(register(1, "", "pw")), "email is required");
    assert_invalid(&test.send(register(2, "a@x.com", "")), "password is required");
    assert!(test.storage.user_by_id(crate::types::UserId(1)).is_err());
}

#[test]
fn test_is_admin_missing_user_id() {
    let test = TestClient::new();
    assert_invalid(&test.send(is_admin(1, 0)), "user_id is required");
}

#[test]
fn test_create_app_missing_fields() {
    let test = TestClient::new();
    test.seed_admin("root@x.com", "rootpw");

    assert_invalid(
        &test.send(create_app(1, "root@x.com", "rootpw", "", "s")),
        "app_name is required",
    );
    assert_invalid(
        &test.send(create_app(2, "root@x.com", "rootpw", "mobile", "")),
        "app_secret is required",
    );
    assert_invalid(
        &test.send(create_app(3, "", "rootpw", "mobile", "s")),
        "email is required",
    );
    assert_eq!(test.storage.app_count().expect("count"), 0);
}

#[test]
fn test_no_payload() {
    let test = TestClient::new();

    let resp = test.send(proto::ClientMessage {
        request_id: Some(1),
        payload: None,
    });
    assert_invalid(&resp, "Client message must have a payload");
}
