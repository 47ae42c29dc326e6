//! Capability interface between the decoder and a framework-native graph.
//!
//! A framework adapter implements [`NativeNode`] and [`NativeValue`] over its own graph
//! structures. All framework-specific access (attribute probing, container-kind checks,
//! payload conversion) happens behind these two traits; the decoder only ever sees the
//! tagged [`ValueType`] and [`Literal`] variants they produce.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ir::{Scalar, ValueId};

/// Native type metadata of a value, as reported by the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// A tensor, with whatever the framework knows statically about it.
    Tensor {
        /// Native element type name (e.g. `torch.float32`).
        #[serde(default)]
        dtype: Option<String>,
        /// Dimension sizes; `None` entries are dynamic dimensions.
        #[serde(default)]
        sizes: Option<Vec<Option<usize>>>,
    },
    /// A scalar of the named native type (e.g. `int`, `float`, `bool`).
    Scalar(String),
    /// A homogeneous list.
    List(Box<ValueType>),
    /// The designated absent/optional value.
    None,
    /// Anything else (tuples, strings, devices, objects).
    Other(String),
}

impl ValueType {
    /// A tensor with fully known element type and shape.
    pub fn tensor<I: IntoIterator<Item = usize>>(dtype: impl Into<String>, sizes: I) -> Self {
        ValueType::Tensor {
            dtype: Some(dtype.into()),
            sizes: Some(sizes.into_iter().map(Some).collect()),
        }
    }

    /// A tensor with nothing known about it.
    pub fn dynamic_tensor() -> Self {
        ValueType::Tensor {
            dtype: None,
            sizes: None,
        }
    }

    /// A scalar of the named native type.
    pub fn scalar(name: impl Into<String>) -> Self {
        ValueType::Scalar(name.into())
    }

    /// A list of `element`.
    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    /// Dimension sizes of a complete tensor: element type and every dimension known.
    pub fn complete_sizes(&self) -> Option<Vec<usize>> {
        match self {
            ValueType::Tensor {
                dtype: Some(_),
                sizes: Some(sizes),
            } => sizes.iter().copied().collect(),
            _ => None,
        }
    }

    /// Native element type name, for tensors and scalars.
    pub fn element_type_name(&self) -> Option<&str> {
        match self {
            ValueType::Tensor { dtype, .. } => dtype.as_deref(),
            ValueType::Scalar(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Compile-time payload of a literal value.
///
/// Produced once by the adapter so constant extraction is a single match instead of
/// repeated type probing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// A single element.
    Scalar(Scalar),
    /// Elements of a list.
    List(Vec<Scalar>),
    /// Tensor elements flattened in row-major order.
    Tensor(Vec<Scalar>),
    /// No payload, or one that cannot be represented (nested containers, strings, ...).
    #[default]
    Unsupported,
}

/// A data-flow edge of the native graph.
pub trait NativeValue {
    /// Process-unique identity, stable for one decode pass.
    fn unique(&self) -> ValueId;

    /// Type metadata.
    fn value_type(&self) -> Cow<'_, ValueType>;

    /// Literal payload, if the framework knows one.
    fn literal(&self) -> Literal {
        Literal::Unsupported
    }

    /// Whether this is the designated absent value.
    fn is_none(&self) -> bool {
        matches!(self.value_type().as_ref(), ValueType::None)
    }
}

/// A handle on a node, block or whole graph of the native framework.
///
/// Handles are expected to be cheap to clone (references or reference-counted pointers);
/// the decoder clones them freely and never mutates what they point to.
pub trait NativeNode: Clone {
    /// Value handle type.
    type Value: NativeValue;

    /// Operation kind tag, e.g. `aten::add` or `prim::Loop`.
    fn kind(&self) -> &str;

    /// Operator schema, when the framework exposes one.
    fn schema(&self) -> Option<&str> {
        None
    }

    /// Ordered inputs. For graphs and blocks these are the parameters.
    fn inputs(&self) -> Vec<Self::Value>;

    /// Ordered outputs. For graphs and blocks these are the returned values.
    fn outputs(&self) -> Vec<Self::Value>;

    /// Nested blocks of an operation node, in order. Empty for graphs and blocks.
    fn blocks(&self) -> Vec<Self>;

    /// Contained nodes in topological order, when this handle is a graph or block.
    ///
    /// `None` for operation nodes.
    fn body(&self) -> Option<Vec<Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_tensor_requires_dtype_and_all_sizes() {
        assert_eq!(
            ValueType::tensor("torch.float32", [2, 2]).complete_sizes(),
            Some(vec![2, 2])
        );
        let missing_dim = ValueType::Tensor {
            dtype: Some("torch.float32".to_string()),
            sizes: Some(vec![Some(2), None]),
        };
        assert_eq!(missing_dim.complete_sizes(), None);
        let missing_dtype = ValueType::Tensor {
            dtype: None,
            sizes: Some(vec![Some(2)]),
        };
        assert_eq!(missing_dtype.complete_sizes(), None);
        assert_eq!(ValueType::scalar("int").complete_sizes(), None);
    }

    #[test]
    fn element_type_name_of_lists_is_absent() {
        assert_eq!(ValueType::scalar("int").element_type_name(), Some("int"));
        assert_eq!(
            ValueType::list(ValueType::scalar("int")).element_type_name(),
            None
        );
        assert_eq!(ValueType::dynamic_tensor().element_type_name(), None);
    }

    #[test]
    fn value_type_json_layout() {
        let ty: ValueType =
            serde_json::from_str(r#"{"tensor": {"dtype": "torch.int32", "sizes": [3, null]}}"#)
                .unwrap();
        assert_eq!(
            ty,
            ValueType::Tensor {
                dtype: Some("torch.int32".to_string()),
                sizes: Some(vec![Some(3), None]),
            }
        );
        let ty: ValueType = serde_json::from_str(r#"{"list": {"scalar": "int"}}"#).unwrap();
        assert_eq!(ty, ValueType::list(ValueType::scalar("int")));
        let ty: ValueType = serde_json::from_str(r#""none""#).unwrap();
        assert_eq!(ty, ValueType::None);
    }

    #[test]
    fn literal_json_layout() {
        let literal: Literal = serde_json::from_str(r#"{"list": [1, 2, 3]}"#).unwrap();
        assert_eq!(
            literal,
            Literal::List(vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)])
        );
        let literal: Literal = serde_json::from_str(r#""unsupported""#).unwrap();
        assert_eq!(literal, Literal::Unsupported);
    }
}
