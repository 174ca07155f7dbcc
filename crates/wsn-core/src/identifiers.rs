//! Caller addresses and the two fixed controller roles.

use crate::errors::{ControllerError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of a caller address.
pub const ADDRESS_LEN: usize = 20;

/// Opaque caller identifier (address-equivalent).
///
/// Written as `0x`-prefixed hex. Parsing accepts either case, so checksummed
/// and lowercase spellings of the same address compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex_str = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != ADDRESS_LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut array = [0u8; ADDRESS_LEN];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One of the two roles a controller binds at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Drives deployment, estimation and the anomaly check
    Operator,
    /// Commits to production and handles detected anomalies
    Supervisor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator => f.write_str("operator"),
            Self::Supervisor => f.write_str("supervisor"),
        }
    }
}

/// Who may invoke an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Only the address bound to this role
    Role(Role),
    /// Either bound address
    AnyRole,
}

impl Access {
    /// Whether a caller holding `role` satisfies this requirement.
    pub fn admits(&self, role: Role) -> bool {
        match self {
            Self::Role(required) => *required == role,
            Self::AnyRole => true,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => write!(f, "the {role}"),
            Self::AnyRole => f.write_str("a registered role"),
        }
    }
}

/// Immutable binding of each role to exactly one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBindings {
    operator: Address,
    supervisor: Address,
}

impl RoleBindings {
    /// Bind the two roles. The addresses must differ.
    pub fn new(operator: Address, supervisor: Address) -> Result<Self> {
        let bindings = Self {
            operator,
            supervisor,
        };
        bindings.validate()?;
        Ok(bindings)
    }

    /// Re-check the distinct-address invariant (used after deserialization).
    pub fn validate(&self) -> Result<()> {
        if self.operator == self.supervisor {
            return Err(ControllerError::config(format!(
                "operator and supervisor must be distinct addresses, both are {}",
                self.operator
            )));
        }
        Ok(())
    }

    /// Address bound to [`Role::Operator`].
    pub fn operator(&self) -> Address {
        self.operator
    }

    /// Address bound to [`Role::Supervisor`].
    pub fn supervisor(&self) -> Address {
        self.supervisor
    }

    /// The role bound to `address`, if any.
    pub fn role_of(&self, address: &Address) -> Option<Role> {
        if *address == self.operator {
            Some(Role::Operator)
        } else if *address == self.supervisor {
            Some(Role::Supervisor)
        } else {
            None
        }
    }
}
