//! End-to-end tests at the proto request/response level.
//!
//! Each test file covers a specific scenario, using deterministic inputs
//! to verify the complete request/response cycle.

#![cfg(test)]

mod helpers;

mod test_concurrent_register;
mod test_create_app;
mod test_login;
mod test_missing_fields;
mod test_persistence;
mod test_register;
mod test_request_id;
mod test_sequence;
