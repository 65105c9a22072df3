//! Network layer subsystem.
//!
//! The listener itself is a plain `tokio::net::TcpListener` bound during
//! startup. TLS termination is optional and configured here.

pub mod tls;
