pub mod openapi;
pub mod server;

pub use server::{router, ChatServer};
