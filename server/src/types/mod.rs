pub mod app;
pub mod client_message;
pub mod ids;
pub mod user;

pub use app::App;
pub use ids::{AppId, UserId};
pub use user::User;

pub trait ProtoDeserializable<T> {
    fn from_proto(proto_obj: T) -> Result<Self, String>
    where
        Self: Sized;
}
