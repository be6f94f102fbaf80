//! Typed API key permissions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform resources an API key can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Donations,
    Campaigns,
    Artists,
    Webhooks,
    Integrations,
    Analytics,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Donations => "donations",
            Resource::Campaigns => "campaigns",
            Resource::Artists => "artists",
            Resource::Webhooks => "webhooks",
            Resource::Integrations => "integrations",
            Resource::Analytics => "analytics",
        }
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donations" => Ok(Resource::Donations),
            "campaigns" => Ok(Resource::Campaigns),
            "artists" => Ok(Resource::Artists),
            "webhooks" => Ok(Resource::Webhooks),
            "integrations" => Ok(Resource::Integrations),
            "analytics" => Ok(Resource::Analytics),
            other => Err(format!("Unknown resource: {}", other)),
        }
    }
}

/// A single grant held by an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "access", content = "resource", rename_all = "snake_case")]
pub enum Permission {
    /// Read access to one resource
    Read(Resource),
    /// Read and write access to one resource
    Write(Resource),
    /// Everything
    Admin,
}

impl Permission {
    /// Whether holding `self` satisfies `required`
    pub fn allows(&self, required: &Permission) -> bool {
        match (self, required) {
            (Permission::Admin, _) => true,
            (Permission::Write(held), Permission::Read(wanted))
            | (Permission::Write(held), Permission::Write(wanted))
            | (Permission::Read(held), Permission::Read(wanted)) => held == wanted,
            _ => false,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read(r) => write!(f, "{}:read", r.as_str()),
            Permission::Write(r) => write!(f, "{}:write", r.as_str()),
            Permission::Admin => f.write_str("admin"),
        }
    }
}

/// Parses `admin`, `<resource>:read` and `<resource>:write`
impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "admin" || s == "*" {
            return Ok(Permission::Admin);
        }

        let (resource, access) = s
            .split_once(':')
            .ok_or_else(|| format!("Malformed permission: {}", s))?;
        let resource = resource.parse::<Resource>()?;

        match access {
            "read" => Ok(Permission::Read(resource)),
            "write" => Ok(Permission::Write(resource)),
            other => Err(format!("Unknown access level: {}", other)),
        }
    }
}
