mod ban;
mod timestamp;
mod user;

pub use ban::BanState;
pub use timestamp::Timestamp;
pub use user::{UserId, UserRecord};
