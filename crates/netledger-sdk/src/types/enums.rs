/*
[INPUT]:  Ledger wire discriminators (integer codes or names)
[OUTPUT]: Closed Rust enums with lenient decoding and integer encoding
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the server adds entry types or enumeration orderings
*/

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Kind of ledger entry.
///
/// The server emits this either as a small integer code or as one of the
/// names `"Credit"`, `"Debit"`, `"Balance"`. Both forms decode; an unrecognized
/// name decodes to [`EntryType::Credit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryType {
    #[default]
    Credit,
    Debit,
    Balance,
}

impl EntryType {
    /// Integer code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            EntryType::Credit => 0,
            EntryType::Debit => 1,
            EntryType::Balance => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(EntryType::Credit),
            1 => Some(EntryType::Debit),
            2 => Some(EntryType::Balance),
            _ => None,
        }
    }

    /// Decode a name, falling back to `Credit` for anything unknown.
    pub fn from_name_lenient(name: &str) -> Self {
        match name.trim() {
            "Credit" => EntryType::Credit,
            "Debit" => EntryType::Debit,
            "Balance" => EntryType::Balance,
            other => {
                warn!(entry_type = other, "unrecognized entry type name, treating as Credit");
                EntryType::Credit
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Credit => "Credit",
            EntryType::Debit => "Debit",
            EntryType::Balance => "Balance",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for EntryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryTypeVisitor;

        impl Visitor<'_> for EntryTypeVisitor {
            type Value = EntryType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an entry type code (0-2) or name")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<EntryType, E> {
                EntryType::from_code(value)
                    .ok_or_else(|| E::custom(format!("unknown entry type code {value}")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<EntryType, E> {
                u64::try_from(value)
                    .ok()
                    .and_then(EntryType::from_code)
                    .ok_or_else(|| E::custom(format!("unknown entry type code {value}")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<EntryType, E> {
                Ok(EntryType::from_name_lenient(value))
            }
        }

        deserializer.deserialize_any(EntryTypeVisitor)
    }
}

/// Sort order for entry enumeration. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumerationOrder {
    CreatedAscending,
    #[default]
    CreatedDescending,
    AmountAscending,
    AmountDescending,
}

impl EnumerationOrder {
    pub fn code(self) -> u8 {
        match self {
            EnumerationOrder::CreatedAscending => 0,
            EnumerationOrder::CreatedDescending => 1,
            EnumerationOrder::AmountAscending => 2,
            EnumerationOrder::AmountDescending => 3,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(EnumerationOrder::CreatedAscending),
            1 => Some(EnumerationOrder::CreatedDescending),
            2 => Some(EnumerationOrder::AmountAscending),
            3 => Some(EnumerationOrder::AmountDescending),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CreatedAscending" => Some(EnumerationOrder::CreatedAscending),
            "CreatedDescending" => Some(EnumerationOrder::CreatedDescending),
            "AmountAscending" => Some(EnumerationOrder::AmountAscending),
            "AmountDescending" => Some(EnumerationOrder::AmountDescending),
            _ => None,
        }
    }
}

impl Serialize for EnumerationOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for EnumerationOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderVisitor;

        impl Visitor<'_> for OrderVisitor {
            type Value = EnumerationOrder;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an enumeration order code (0-3) or name")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<EnumerationOrder, E> {
                EnumerationOrder::from_code(value)
                    .ok_or_else(|| E::custom(format!("unknown enumeration order {value}")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<EnumerationOrder, E> {
                u64::try_from(value)
                    .ok()
                    .and_then(EnumerationOrder::from_code)
                    .ok_or_else(|| E::custom(format!("unknown enumeration order {value}")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<EnumerationOrder, E> {
                EnumerationOrder::from_name(value)
                    .ok_or_else(|| E::custom(format!("unknown enumeration order {value:?}")))
            }
        }

        deserializer.deserialize_any(OrderVisitor)
    }
}
