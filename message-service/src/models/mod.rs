pub mod message;
pub mod render;

pub use message::{Message, NewMessage};
pub use render::documents_to_json;
