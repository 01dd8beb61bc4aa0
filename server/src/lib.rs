// Life of a request:
// 1. Protobuf comes in over the websocket
// 2. Convert / validate proto into internal request format
// 3. Dispatch to the auth service under the request deadline:
//     - Login: authenticate, look up the app, sign a token with its secret
//     - Register: hash the password, insert the user
//     - IsAdmin: read the admin flag
//     - CreateApp: authenticate, check admin rights, insert the app
// 4. Map the result or error kind to a google.rpc status and respond
//
// System components:
//  - Credential store (in-memory index + append-only log)
//  - Password hasher
//  - Token issuer

pub mod auth;
pub mod client_connection;
pub mod config;
pub mod proto;
pub mod storage;
pub mod time;
pub mod types;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod testing;

pub use client_connection::ClientConnection;
