pub mod database;
pub mod metrics;
pub mod store;

pub use database::{MongoConnector, MongoStore};
pub use self::metrics::{get_metrics, init_metrics};
pub use store::{Listing, MessageStore, StoreConnector};
