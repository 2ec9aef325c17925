//! Role-based authorization over an authenticated principal.
//!
//! Two approaches are provided:
//! 1. Set membership with [`RoleGuard::require`]
//! 2. Minimum level with [`RoleGuard::require_at_least`], using [`role_hierarchy_level`]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use awladna_core::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Parent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Parent => "parent",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "guest" => Ok(Role::Guest),
            "parent" => Ok(Role::Parent),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::internal(format!("Invalid role: {}", s))),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub role: Role,
}

impl Principal {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }
}

/// Get the hierarchy level of a role (higher number = more privileges)
pub fn role_hierarchy_level(role: &Role) -> u8 {
    match role {
        Role::Admin => 2,
        Role::Parent => 1,
        Role::Guest => 0,
    }
}

pub struct RoleGuard;

impl RoleGuard {
    /// Passes the principal through if its role is one of `allowed_roles`.
    /// An empty set admits nobody.
    pub fn require<'a>(
        principal: &'a Principal,
        allowed_roles: &[Role],
    ) -> Result<&'a Principal, AuthError> {
        if allowed_roles.contains(&principal.role) {
            Ok(principal)
        } else {
            Err(AuthError::InsufficientRole)
        }
    }

    pub fn require_at_least<'a>(
        principal: &'a Principal,
        minimum: Role,
    ) -> Result<&'a Principal, AuthError> {
        if role_hierarchy_level(&principal.role) < role_hierarchy_level(&minimum) {
            return Err(AuthError::InsufficientRole);
        }
        Ok(principal)
    }
}
