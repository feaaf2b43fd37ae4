//! Raw values as they come out of a source

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One column value of a source row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Undecoded bytes; text in a legacy encoding also ends up here
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Stringification used for identifiers and change digests.
///
/// `Null` renders empty, blobs render as lossy UTF-8.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for SqlValue {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Blob(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A source row keyed by column name
pub type Record = BTreeMap<String, SqlValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_stringifies_each_variant() {
        assert_eq!(SqlValue::Null.to_string(), "");
        assert_eq!(SqlValue::Integer(42).to_string(), "42");
        assert_eq!(SqlValue::Real(1.5).to_string(), "1.5");
        assert_eq!(SqlValue::from("abc").to_string(), "abc");
        assert_eq!(SqlValue::Blob(b"xyz".to_vec()).to_string(), "xyz");
    }

    #[test]
    fn option_none_is_null() {
        let v: SqlValue = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: SqlValue = Some(3_i64).into();
        assert_eq!(v, SqlValue::Integer(3));
    }
}
