//! MongoDB persistence implementation

mod connection;
mod store;

pub use connection::{init_mongodb, MongoConnection};
pub use store::MongoStore;
