//! Test that request IDs are correctly echoed in responses.

use crate::e2e_tests::helpers::*;
use crate::proto;

#[test]
fn test_request_id_preserved() {
    let test = TestClient::new();

    for request_id in [1, 100, 999, u32::MAX] {
        let resp = test.send(is_admin(request_id, 5));
        assert_eq!(resp.request_id, Some(request_id));
    }
}

#[test]
fn test_request_id_preserved_on_validation_error() {
    let test = TestClient::new();

    let resp = test.send(register(41, "", ""));
    assert_eq!(resp.request_id, Some(41));
}

#[test]
fn test_request_id_none() {
    let test = TestClient::new();

    let resp = test.send(proto::ClientMessage {
        request_id: None,
        payload: Some(proto::client_message::Payload::IsAdmin(
            proto::IsAdminRequest { user_id: 1 },
        )),
    });
    assert_eq!(resp.request_id, None);
    assert_eq!(
        status_code(&resp),
        proto::google::rpc::Code::InvalidArgument as i32
    );
}
