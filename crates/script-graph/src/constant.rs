use crate::ir::{ConstantValue, ElementType};
use crate::native::{Literal, NativeNode, NativeValue, ValueType};
use crate::type_table::TypeTable;

/// Kind of the literal-producing operation.
pub const CONSTANT_KIND: &str = "prim::Constant";

/// Materialize the first output of a literal-producing node.
///
/// Anything that cannot be represented yields `None` so the caller can keep treating the
/// value as a runtime computation.
pub(crate) fn extract<N: NativeNode>(node: &N, types: &TypeTable) -> Option<ConstantValue> {
    if node.kind() != CONSTANT_KIND {
        log::trace!("Requested constant value from non-constant {}", node.kind());
        return None;
    }

    let output = node.outputs().into_iter().next()?;
    let value_type = output.value_type();

    match (value_type.as_ref(), output.literal()) {
        (ValueType::Tensor { dtype, .. }, Literal::Tensor(values)) => {
            let Some(shape) = value_type.complete_sizes() else {
                log::debug!("Constant {} is not a complete tensor", output.unique());
                return None;
            };
            let elem_type = recognized(types, dtype.as_deref()?)?;
            ConstantValue::from_scalars(elem_type, shape, &values)
        }
        (ValueType::Scalar(name), Literal::Scalar(value)) => {
            let elem_type = recognized(types, name)?;
            ConstantValue::from_scalars(elem_type, Vec::new(), &[value])
        }
        (ValueType::List(element), Literal::List(values)) => {
            // Lists are exposed as rank-1 tensors.
            let ValueType::Scalar(name) = element.as_ref() else {
                log::debug!("List constant {} has non-scalar elements", output.unique());
                return None;
            };
            let elem_type = recognized(types, name)?;
            ConstantValue::from_scalars(elem_type, vec![values.len()], &values)
        }
        (ty, literal) => {
            log::debug!(
                "Left value {} not converted to constant: type {:?}, payload {:?}",
                output.unique(),
                ty,
                literal
            );
            None
        }
    }
}

fn recognized(types: &TypeTable, name: &str) -> Option<ElementType> {
    let elem_type = types.get(name);
    if elem_type.is_none() {
        log::debug!("Not a known type for a constant: {name}");
    }
    elem_type
}
