use burn_tensor::DType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Target element type of a decoded value.
///
/// This is the closed set the recognized-type table maps native type names onto. Values whose
/// native type has no mapping are reported as [`ElementType::Dynamic`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
pub enum ElementType {
    /// 32-bit float.
    #[strum(serialize = "f32")]
    #[serde(rename = "f32")]
    Float32,
    /// 64-bit float.
    #[strum(serialize = "f64")]
    #[serde(rename = "f64")]
    Float64,
    /// 8-bit signed integer.
    #[strum(serialize = "i8")]
    #[serde(rename = "i8")]
    Int8,
    /// 32-bit signed integer.
    #[strum(serialize = "i32")]
    #[serde(rename = "i32")]
    Int32,
    /// 64-bit signed integer.
    #[strum(serialize = "i64")]
    #[serde(rename = "i64")]
    Int64,
    /// 8-bit unsigned integer.
    #[strum(serialize = "u8")]
    #[serde(rename = "u8")]
    Uint8,
    /// Boolean.
    #[strum(to_string = "bool", serialize = "boolean")]
    #[serde(rename = "bool")]
    Bool,
    /// Unknown or unrecognized element type.
    #[strum(serialize = "dynamic")]
    #[serde(rename = "dynamic")]
    Dynamic,
}

impl ElementType {
    /// Whether the type carries no static information.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ElementType::Dynamic)
    }

    /// The matching tensor storage type, if any.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            ElementType::Float32 => Some(DType::F32),
            ElementType::Float64 => Some(DType::F64),
            ElementType::Int8 => Some(DType::I8),
            ElementType::Int32 => Some(DType::I32),
            ElementType::Int64 => Some(DType::I64),
            ElementType::Uint8 => Some(DType::U8),
            ElementType::Bool => Some(DType::Bool),
            ElementType::Dynamic => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn parses_short_names() {
        assert_eq!(ElementType::from_str("f32").unwrap(), ElementType::Float32);
        assert_eq!(ElementType::from_str("boolean").unwrap(), ElementType::Bool);
        assert!(ElementType::from_str("complex64").is_err());
    }

    #[test]
    fn display_matches_serde_name() {
        for ty in [ElementType::Int32, ElementType::Bool, ElementType::Dynamic] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{ty}\""));
        }
    }

    #[test]
    fn dynamic_has_no_dtype() {
        assert_eq!(ElementType::Dynamic.dtype(), None);
        assert_eq!(ElementType::Int32.dtype(), Some(DType::I32));
    }
}
