//! Validated client requests.
//!
//! Conversion from the wire messages rejects missing fields before anything
//! reaches the auth service. Proto3 scalars cannot be absent, so an empty
//! string or a zero id counts as missing.

use std::fmt;

use crate::{
    proto,
    types::{AppId, ProtoDeserializable, UserId},
};

/// An email/password pair. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub struct LoginRequest {
    pub credentials: Credentials,
    pub app_id: AppId,
}

#[derive(Debug)]
pub struct RegisterRequest {
    pub credentials: Credentials,
}

#[derive(Debug)]
pub struct IsAdminRequest {
    pub user_id: UserId,
}

pub struct CreateAppRequest {
    pub credentials: Credentials,
    pub app_name: String,
    pub app_secret: String,
}

impl fmt::Debug for CreateAppRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAppRequest")
            .field("credentials", &self.credentials)
            .field("app_name", &self.app_name)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ClientMessagePayload {
    Login(LoginRequest),
    Register(RegisterRequest),
    IsAdmin(IsAdminRequest),
    CreateApp(CreateAppRequest),
}

#[derive(Debug)]
pub struct ClientMessage {
    pub request_id: u32,
    pub payload: ClientMessagePayload,
}

fn require_string(value: String, field: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(value)
}

const fn require_id(value: i64) -> Option<i64> {
    if value == 0 { None } else { Some(value) }
}

fn require_credentials(email: String, password: String) -> Result<Credentials, String> {
    Ok(Credentials {
        email: require_string(email, "email")?,
        password: require_string(password, "password")?,
    })
}

impl ProtoDeserializable<proto::LoginRequest> for LoginRequest {
    fn from_proto(request: proto::LoginRequest) -> Result<Self, String> {
        let app_id = require_id(request.app_id).ok_or_else(|| "app_id is required".to_string())?;
        Ok(Self {
            credentials: require_credentials(request.email, request.password)?,
            app_id: AppId(app_id),
        })
    }
}

impl ProtoDeserializable<proto::RegisterRequest> for RegisterRequest {
    fn from_proto(request: proto::RegisterRequest) -> Result<Self, String> {
        Ok(Self {
            credentials: require_credentials(request.email, request.password)?,
        })
    }
}

impl ProtoDeserializable<proto::IsAdminRequest> for IsAdminRequest {
    fn from_proto(request: proto::IsAdminRequest) -> Result<Self, String> {
        let user_id =
            require_id(request.user_id).ok_or_else(|| "user_id is required".to_string())?;
        Ok(Self {
            user_id: UserId(user_id),
        })
    }
}

impl ProtoDeserializable<proto::CreateAppRequest> for CreateAppRequest {
    fn from_proto(request: proto::CreateAppRequest) -> Result<Self, String> {
        let app_name = require_string(request.app_name, "app_name")?;
        let app_secret = require_string(request.app_secret, "app_secret")?;
        Ok(Self {
            credentials: require_credentials(request.email, request.password)?,
            app_name,
            app_secret,
        })
    }
}

impl ProtoDeserializable<proto::ClientMessage> for ClientMessage {
    fn from_proto(proto_message: proto::ClientMessage) -> Result<Self, String> {
        let Some(request_id) = proto_message.request_id else {
            return Err("Client message must have a request_id".to_string());
        };
        let payload = match proto_message.payload {
            Some(proto::client_message::Payload::Login(request)) => {
                ClientMessagePayload::Login(LoginRequest::from_proto(request)?)
            }
            Some(proto::client_message::Payload::Register(request)) => {
                ClientMessagePayload::Register(RegisterRequest::from_proto(request)?)
            }
            Some(proto::client_message::Payload::IsAdmin(request)) => {
                ClientMessagePayload::IsAdmin(IsAdminRequest::from_proto(request)?)
            }
            Some(proto::client_message::Payload::CreateApp(request)) => {
                ClientMessagePayload::CreateApp(CreateAppRequest::from_proto(request)?)
            }
            None => return Err("Client message must have a payload".to_string()),
        };
        Ok(Self {
            request_id,
            payload,
        })
    }
}
