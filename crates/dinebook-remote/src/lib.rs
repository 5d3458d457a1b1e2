//! HTTP gateway to the dinebook origin API.
//!
//! [`HttpGateway`] implements [`dinebook_core::gateway::RemoteGateway`]. It is
//! stateless: every call is one request, decoded through
//! [`dinebook_core::wire`], with no retries.

mod gateway;

pub mod error;

pub use error::{Error, Result};
pub use gateway::{GatewayConfig, HttpGateway};
