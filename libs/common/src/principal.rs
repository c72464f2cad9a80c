//! Principal kinds shared across services and the client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three kinds of authenticated actor in the system.
///
/// Stored lowercase in the database and in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Admin,
    Faculty,
    Student,
}

impl PrincipalKind {
    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Admin => "admin",
            PrincipalKind::Faculty => "faculty",
            PrincipalKind::Student => "student",
        }
    }

    /// Initial password assigned at registration for this kind.
    pub fn default_password(&self) -> &'static str {
        match self {
            PrincipalKind::Admin => "admin123",
            PrincipalKind::Faculty => "faculty123",
            PrincipalKind::Student => "student123",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrincipalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(PrincipalKind::Admin),
            "faculty" => Ok(PrincipalKind::Faculty),
            "student" => Ok(PrincipalKind::Student),
            other => Err(format!("Unknown principal kind: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for kind in [
            PrincipalKind::Admin,
            PrincipalKind::Faculty,
            PrincipalKind::Student,
        ] {
            assert_eq!(kind.as_str().parse::<PrincipalKind>().unwrap(), kind);
        }
        assert!("registrar".parse::<PrincipalKind>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PrincipalKind::Faculty).unwrap();
        assert_eq!(json, "\"faculty\"");
        let kind: PrincipalKind = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(kind, PrincipalKind::Student);
    }
}
