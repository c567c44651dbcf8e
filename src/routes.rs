mod health_check;
mod helpers;
mod home;
mod subscriptions;

pub use health_check::health_check;
pub use helpers::error_chain_fmt;
pub use home::home;
pub use subscriptions::{FormData, SubscribeError, subscribe};
