//! Farm-Side Communication
//!
//! Talks to the Deadline Web Service: a transport seam for HTTP and a
//! client that submits job payloads.

pub mod client;
pub mod transport;

pub use client::{ClientError, ClientResult, DeadlineClient};
pub use transport::{
    basic_auth_header, HttpConfig, HttpTransport, MockTransport, Transport, TransportError,
};
