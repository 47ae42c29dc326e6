use core::fmt;

use serde::{Deserialize, Serialize};

/// Unique identity of a data-flow edge.
///
/// Stable for the duration of one decode pass; the conversion engine uses it as the key
/// that links producers to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub usize);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl From<usize> for ValueId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

/// A literal element, as carried by constant payloads.
///
/// Untagged so that JSON graph dumps can write `7`, `2.5` or `true` directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
}

impl Scalar {
    pub(crate) fn to_f32(self) -> Option<f32> {
        self.to_f64().map(|v| v as f32)
    }

    pub(crate) fn to_f64(self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(v),
            Scalar::Int(v) => Some(v as f64),
            Scalar::Bool(_) => None,
        }
    }

    pub(crate) fn to_i64(self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn to_i32(self) -> Option<i32> {
        self.to_i64().and_then(|v| i32::try_from(v).ok())
    }

    pub(crate) fn to_i8(self) -> Option<i8> {
        self.to_i64().and_then(|v| i8::try_from(v).ok())
    }

    pub(crate) fn to_u8(self) -> Option<u8> {
        self.to_i64().and_then(|v| u8::try_from(v).ok())
    }

    pub(crate) fn to_bool(self) -> Option<bool> {
        match self {
            Scalar::Bool(v) => Some(v),
            _ => None,
        }
    }
}
