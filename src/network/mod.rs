//! HTTP façade over a string-valued cache, plus the matching client.

pub mod client;
pub mod rpc;
pub mod server;

pub use client::{CacheClient, DEFAULT_SERVER_URL};
pub use rpc::{ErrorResponse, GetResponse, MessageResponse, OwnerDataResponse, SetRequest};
pub use server::{router, ApiError, HttpServer, SharedCache};
