//! Test user registration over the wire.

use crate::e2e_tests::helpers::*;
use crate::proto::google::rpc::Code;

#[test]
fn test_register_assigns_sequential_ids() {
    let test = TestClient::new();

    let first = test.send(register(1, "a@x.com", "pw123"));
    let second = test.send(register(2, "b@x.com", "pw456"));

    assert!(is_ok(&first));
    assert!(is_ok(&second));
    assert_eq!(registered_user_id(&first), 1);
    assert_eq!(registered_user_id(&second), 2);
}

#[test]
fn test_register_duplicate_email() {
    let test = TestClient::new();
    assert!(is_ok(&test.send(register(1, "a@x.com", "pw123"))));

    let resp = test.send(register(2, "a@x.com", "different"));
    assert_eq!(status_code(&resp), Code::AlreadyExists as i32);
    assert_eq!(status_message(&resp), "already exists");
    assert_eq!(resp.payload, None);
}

#[test]
fn test_register_never_stores_plaintext() {
    let test = TestClient::new();
    let resp = test.send(register(1, "a@x.com", "pw123"));
    let user_id = crate::types::UserId(registered_user_id(&resp));

    let user = test.storage.user_by_id(user_id).expect("stored user");
    assert_eq!(user.email, "a@x.com");
    assert_ne!(user.pass_hash, b"pw123");
    assert!(
        !String::from_utf8_lossy(&user.pass_hash).contains("pw123"),
        "hash must not embed the password"
    );
}
