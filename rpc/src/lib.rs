//! HTTP/JSON API for the PoAW node.
//!
//! Serves both clients (transactions, chain queries, manual mining) and peer
//! nodes (`GET /chain` for sync, `POST /blocks` for announcements).

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
