pub mod access;
pub mod jwt;

pub use access::*;
pub use jwt::*;
