use core::str::FromStr;

use serde::{Deserialize, Serialize};

use bookshelf_core::DomainError;

/// Role of a principal. The set is closed: authorization decisions match
/// exhaustively over it, so adding a variant forces every decision site to
/// be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Super,
    Admin,
    Reader,
    Guest,
}

impl Role {
    /// Total order over roles: SUPER(4) > ADMIN(3) > READER(2) > GUEST(1).
    ///
    /// The rank is descriptive only. Permission checks are explicit per-pair
    /// rules (see [`crate::policy`]), because several pairs carry bespoke
    /// exceptions that plain rank comparison would get wrong.
    pub fn rank(self) -> u8 {
        match self {
            Role::Super => 4,
            Role::Admin => 3,
            Role::Reader => 2,
            Role::Guest => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Super => "SUPER",
            Role::Admin => "ADMIN",
            Role::Reader => "READER",
            Role::Guest => "GUEST",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            r if r.eq_ignore_ascii_case("SUPER") => Ok(Role::Super),
            r if r.eq_ignore_ascii_case("ADMIN") => Ok(Role::Admin),
            r if r.eq_ignore_ascii_case("READER") => Ok(Role::Reader),
            r if r.eq_ignore_ascii_case("GUEST") => Ok(Role::Guest),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
