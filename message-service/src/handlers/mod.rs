pub mod health;
pub mod messages;

pub use health::{health_check, metrics_endpoint};
pub use messages::{handle_messages, PARTIAL_RESULT_HEADER};
