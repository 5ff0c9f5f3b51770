pub mod connection;
pub mod migrations;
pub mod models;

pub use connection::*;
pub use migrations::*;
pub use models::*;
