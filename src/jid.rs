use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{IdentityError, Result};

/// Address of a contact or group in the messaging network,
/// shaped `local@server` (e.g. `554796643900@s.whatsapp.net`).
#[derive(
    Eq, PartialEq, Hash, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Jid {
    local: String,
    server: Option<String>,
}

impl Jid {
    pub fn new(local: &str, server: Option<&str>) -> Self {
        Self {
            local: local.to_owned(),
            server: server.map(str::to_owned),
        }
    }

    /// The part before `@`.
    pub fn local_part(&self) -> &str {
        &self.local
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Last-resort display label: the local part.
    pub fn pretty_name(&self) -> &str {
        &self.local
    }

    pub fn is_group(&self) -> bool {
        self.server.as_deref() == Some("g.us")
    }
}

impl FromStr for Jid {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(IdentityError::Config("empty JID".to_owned()));
        }
        match s.split_once('@') {
            Some((local, server)) => Ok(Jid::new(local, Some(server))),
            None => Ok(Jid::new(s, None)),
        }
    }
}

impl TryFrom<String> for Jid {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Jid> for String {
    fn from(jid: Jid) -> Self {
        jid.to_string()
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.server {
            Some(server) => write!(f, "{}@{}", self.local, server),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Strips everything from `@` onward; empty for an empty input.
pub fn jid_to_pretty(jid: &str) -> &str {
    match jid.split_once('@') {
        Some((local, _)) => local,
        None => jid,
    }
}
