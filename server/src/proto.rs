//! Wire protocol for the auth server.
//!
//! Messages are declared with prost derives directly instead of being
//! generated, so building the server does not require `protoc`. The schema
//! for clients lives in `proto/auth.proto` at the repository root and must
//! match these declarations. Field tags are part of the wire contract and
//! must never be reused.

#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![allow(clippy::all)]

/// A request sent by a client. Exactly one payload per message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientMessage {
    #[prost(uint32, optional, tag = "1")]
    pub request_id: ::core::option::Option<u32>,
    #[prost(oneof = "client_message::Payload", tags = "2, 3, 4, 5")]
    pub payload: ::core::option::Option<client_message::Payload>,
}

pub mod client_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        Login(super::LoginRequest),
        #[prost(message, tag = "3")]
        Register(super::RegisterRequest),
        #[prost(message, tag = "4")]
        IsAdmin(super::IsAdminRequest),
        #[prost(message, tag = "5")]
        CreateApp(super::CreateAppRequest),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    pub email: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub password: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub app_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginResponse {
    #[prost(string, tag = "1")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterRequest {
    #[prost(string, tag = "1")]
    pub email: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub password: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterResponse {
    #[prost(int64, tag = "1")]
    pub user_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IsAdminRequest {
    #[prost(int64, tag = "1")]
    pub user_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IsAdminResponse {
    #[prost(bool, tag = "1")]
    pub is_admin: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateAppRequest {
    #[prost(string, tag = "1")]
    pub email: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub password: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub app_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub app_secret: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateAppResponse {
    #[prost(int64, tag = "1")]
    pub app_id: i64,
}

/// A message sent by the server in reply to a `ClientMessage`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerMessage {
    #[prost(message, optional, tag = "1")]
    pub response: ::core::option::Option<ServerResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerResponse {
    #[prost(uint32, optional, tag = "1")]
    pub request_id: ::core::option::Option<u32>,
    #[prost(message, optional, tag = "2")]
    pub status: ::core::option::Option<google::rpc::Status>,
    #[prost(oneof = "server_response::Payload", tags = "3, 4, 5, 6")]
    pub payload: ::core::option::Option<server_response::Payload>,
}

pub mod server_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "3")]
        Login(super::LoginResponse),
        #[prost(message, tag = "4")]
        Register(super::RegisterResponse),
        #[prost(message, tag = "5")]
        IsAdmin(super::IsAdminResponse),
        #[prost(message, tag = "6")]
        CreateApp(super::CreateAppResponse),
    }
}

pub mod google {
    pub mod rpc {
        /// `google.rpc.Status`, wire-compatible with the canonical definition.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Status {
            #[prost(int32, tag = "1")]
            pub code: i32,
            #[prost(string, tag = "2")]
            pub message: ::prost::alloc::string::String,
            #[prost(message, repeated, tag = "3")]
            pub details: ::prost::alloc::vec::Vec<::prost_types::Any>,
        }

        /// `google.rpc.Code`.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Code {
            Ok = 0,
            Cancelled = 1,
            Unknown = 2,
            InvalidArgument = 3,
            DeadlineExceeded = 4,
            NotFound = 5,
            AlreadyExists = 6,
            PermissionDenied = 7,
            ResourceExhausted = 8,
            FailedPrecondition = 9,
            Aborted = 10,
            OutOfRange = 11,
            Unimplemented = 12,
            Internal = 13,
            Unavailable = 14,
            DataLoss = 15,
            Unauthenticated = 16,
        }
    }
}
