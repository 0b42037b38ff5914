//! Narrow interfaces for the external collaborators handlers call into.
//!
//! The routing core treats every collaborator as an opaque, potentially
//! blocking operation whose result or fault is handled entirely within one
//! handler invocation. No wire formats or algorithms are specified here.

pub mod crypto;
pub mod db;
pub mod mail;
pub mod money;
pub mod static_assets;
pub mod templates;

pub use crypto::{Crypto, HashConfig, HashedPassword};
pub use db::{Connection, Database, DbResult, Row, SqlParam, Statement};
pub use mail::{Mail, MailServer, MailSession};
pub use money::{Money, MoneyFormat};
pub use static_assets::{StaticAsset, StaticAssets};
pub use templates::Templates;

use std::fmt;
use std::sync::Arc;

/// Collaborator handles bundled into every dispatch context.
///
/// Each handle is optional: a deployment without, say, a mail relay simply
/// leaves the slot empty and handlers that ask for it get a collaborator
/// error instead of a wired service.
#[derive(Default, Clone)]
pub struct Collaborators {
    /// Database driver
    pub database: Option<Arc<dyn Database>>,
    /// Password hashing and random values
    pub crypto: Option<Arc<dyn Crypto>>,
    /// Outbound mail
    pub mail: Option<Arc<dyn Mail>>,
    /// Currency formatting
    pub money: Option<Arc<dyn Money>>,
    /// Template rendering
    pub templates: Option<Arc<dyn Templates>>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("database", &self.database.is_some())
            .field("crypto", &self.crypto.is_some())
            .field("mail", &self.mail.is_some())
            .field("money", &self.money.is_some())
            .field("templates", &self.templates.is_some())
            .finish()
    }
}
