//! Test that racing registrations for one email yield exactly one user.

use crate::e2e_tests::helpers::*;
use crate::proto::google::rpc::Code;

#[test]
fn test_concurrent_duplicate_registration() {
    let test = TestClient::new();
    let siblings: Vec<_> = (0..8).map(|_| test.create_sibling()).collect();

    let responses = test.runtime.block_on(futures::future::join_all(
        siblings
            .iter()
            .zip(1..)
            .map(|(client, request_id)| client.handle_message(register(request_id, "a@x.com", "pw"))),
    ));

    let codes: Vec<i32> = responses
        .iter()
        .map(|msg| status_code(msg.response.as_ref().expect("response")))
        .collect();
    assert_eq!(codes.iter().filter(|c| **c == Code::Ok as i32).count(), 1);
    assert_eq!(
        codes
            .iter()
            .filter(|c| **c == Code::AlreadyExists as i32)
            .count(),
        7
    );
}

#[test]
fn test_concurrent_distinct_registration() {
    let test = TestClient::new();
    let siblings: Vec<_> = (0..8).map(|_| test.create_sibling()).collect();

    let responses = test.runtime.block_on(futures::future::join_all(
        siblings.iter().zip(1_u32..).map(|(client, n)| {
            client.handle_message(register(n, &format!("user{n}@x.com"), "pw"))
        }),
    ));

    let mut ids: Vec<i64> = responses
        .iter()
        .map(|msg| registered_user_id(msg.response.as_ref().expect("response")))
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
}
