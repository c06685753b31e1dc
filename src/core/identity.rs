//! Record identity using kind-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Kinds of tracked line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Procurement log entry
    Procurement,
    /// Submittal log entry
    Submittal,
}

impl ItemKind {
    /// Get the string prefix used in IDs
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Procurement => "PRC",
            ItemKind::Submittal => "SUB",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRC" => Ok(ItemKind::Procurement),
            "SUB" => Ok(ItemKind::Submittal),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique item identifier combining a kind prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId {
    kind: ItemKind,
    ulid: Ulid,
}

impl ItemId {
    /// Create a new ItemId of the given kind
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            ulid: Ulid::new(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Parse an ItemId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    /// Parse `s` only if it is an id of `kind`
    pub fn parse_of_kind(s: &str, kind: ItemKind) -> Option<Self> {
        s.trim().parse::<ItemId>().ok().filter(|id| id.kind == kind)
    }

    /// Read a stored id, generating a fresh one when the value is missing,
    /// is not an id, or belongs to another kind
    pub fn deserialize_or_new<'de, D>(deserializer: D, kind: ItemKind) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = crate::core::fields::loose_text(deserializer)?;
        Ok(Self::parse_of_kind(&raw, kind).unwrap_or_else(|| Self::new(kind)))
    }

    /// Short display form: prefix plus the last eight ULID characters.
    ///
    /// The tail of a ULID is random, the head is a timestamp shared by
    /// items created in the same millisecond.
    pub fn short(&self) -> String {
        let ulid = self.ulid.to_string();
        format!("{}-{}", self.kind, &ulid[ulid.len() - 8..])
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.ulid)
    }
}

impl FromStr for ItemId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let kind = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { kind, ulid })
    }
}

impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing item IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid item prefix: '{0}' (valid: PRC, SUB)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in item ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
