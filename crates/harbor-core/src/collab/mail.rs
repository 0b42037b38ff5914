//! Mail collaborator: connect to a relay, send messages

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Relay connection parameters
#[derive(Debug, Clone)]
pub struct MailServer {
    /// Relay hostname
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Whether the relay requires authentication
    pub auth: bool,
    /// Username when `auth` is set
    pub username: String,
    /// Password when `auth` is set
    pub password: String,
}

/// Opaque mail collaborator
#[async_trait]
pub trait Mail: Send + Sync {
    /// Open a session against a relay
    async fn connect(&self, server: &MailServer) -> Result<Arc<dyn MailSession>>;
}

/// An open mail session
#[async_trait]
pub trait MailSession: Send + Sync {
    /// Send one message
    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result<()>;
}
