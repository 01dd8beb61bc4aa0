//! Test login and the tokens it issues.

use crate::e2e_tests::helpers::*;
use crate::proto::google::rpc::Code;
use crate::time::{SystemTimeSource, TimeSource};
use crate::types::AppId;

#[test]
fn test_login_token_carries_claims() {
    let test = TestClient::new();
    let app_id = test.seed_app("mobile", "s3cr3t");
    let user_id = registered_user_id(&test.send(register(1, "a@x.com", "pw123")));

    let resp = test.send(login(2, "a@x.com", "pw123", app_id));
    assert!(is_ok(&resp), "login failed: {:?}", resp.status);
    let token = login_token(&resp);

    let claims = test
        .runtime
        .block_on(test.service.verify_token(&token, AppId(app_id)))
        .expect("token verifies with the app secret");
    assert_eq!(claims.uid, user_id);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.app_id, app_id);
    assert!(claims.exp > SystemTimeSource.now_secs());
}

#[test]
fn test_login_wrong_password_and_unknown_email_look_the_same() {
    let test = TestClient::new();
    let app_id = test.seed_app("mobile", "s3cr3t");
    assert!(is_ok(&test.send(register(1, "a@x.com", "pw123"))));

    let wrong_password = test.send(login(2, "a@x.com", "nope", app_id));
    let unknown_email = test.send(login(3, "ghost@x.com", "pw123", app_id));

    assert_eq!(status_code(&wrong_password), Code::Unauthenticated as i32);
    assert_eq!(status_code(&unknown_email), Code::Unauthenticated as i32);
    assert_eq!(wrong_password.status, unknown_email.status);
    assert_eq!(wrong_password.payload, None);
}

#[test]
fn test_login_unknown_app() {
    let test = TestClient::new();
    assert!(is_ok(&test.send(register(1, "a@x.com", "pw123"))));

    let resp = test.send(login(2, "a@x.com", "pw123", 42));
    assert_eq!(status_code(&resp), Code::NotFound as i32);
}

#[test]
fn test_token_does_not_verify_for_another_app() {
    let test = TestClient::new();
    let web = test.seed_app("web", "web-secret");
    let mobile = created_app_id(&test.send(create_app(
        1,
        "root@x.com",
        "rootpw",
        "mobile",
        "mobile-secret",
    )));

    let token = login_token(&test.send(login(2, "root@x.com", "rootpw", web)));
    let error = test
        .runtime
        .block_on(test.service.verify_token(&token, AppId(mobile)))
        .expect_err("token is scoped to web");
    assert_eq!(error.kind(), crate::auth::ErrorKind::InvalidToken);
}
