//! Test the full register, promote, create app, login sequence.

use crate::e2e_tests::helpers::*;
use crate::types::{AppId, UserId};

#[test]
fn test_full_sequence() {
    let test = TestClient::new();

    let user_id = registered_user_id(&test.send(register(1, "a@x.com", "pw123")));
    assert_eq!(user_id, 1);
    assert!(!admin_flag(&test.send(is_admin(2, user_id))));

    test.storage
        .set_admin(UserId(user_id), true)
        .expect("grant admin");
    assert!(admin_flag(&test.send(is_admin(3, user_id))));

    let app_id = created_app_id(&test.send(create_app(4, "a@x.com", "pw123", "mobile", "s3cr3t")));
    assert_eq!(app_id, 1);

    let token = login_token(&test.send(login(5, "a@x.com", "pw123", app_id)));
    let claims = test
        .runtime
        .block_on(test.service.verify_token(&token, AppId(app_id)))
        .expect("verify");
    assert_eq!(claims.uid, user_id);
    assert_eq!(claims.app_id, app_id);
}
