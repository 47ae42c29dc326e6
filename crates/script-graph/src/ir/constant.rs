use burn_tensor::{Element, TensorData};

use super::{ElementType, Scalar};

/// A compile-time constant ready to be folded into the target IR.
///
/// The payload is stored flattened in row-major order; rank 0 means a scalar.
#[derive(Debug, Clone)]
pub struct ConstantValue {
    /// Element type, never [`ElementType::Dynamic`].
    pub elem_type: ElementType,
    /// Payload and shape.
    pub data: TensorData,
}

impl ConstantValue {
    /// Build a constant from literal elements.
    ///
    /// Returns `None` when the element count does not match the shape or does not fit in
    /// `usize`, when `elem_type` is dynamic, or when an element cannot be represented in
    /// `elem_type` (e.g. a float literal in an integer constant, or an integer that overflows
    /// it).
    pub fn from_scalars(
        elem_type: ElementType,
        shape: Vec<usize>,
        values: &[Scalar],
    ) -> Option<Self> {
        let Some(numel) = shape.iter().try_fold(1usize, |acc, dim| acc.checked_mul(*dim)) else {
            log::debug!("Constant shape {shape:?} overflows the element count");
            return None;
        };
        if numel != values.len() {
            log::debug!(
                "Constant payload has {} elements but shape {:?} requires {}",
                values.len(),
                shape,
                numel
            );
            return None;
        }

        let data = match elem_type {
            ElementType::Float32 => tensor_data(values, shape, Scalar::to_f32)?,
            ElementType::Float64 => tensor_data(values, shape, Scalar::to_f64)?,
            ElementType::Int8 => tensor_data(values, shape, Scalar::to_i8)?,
            ElementType::Int32 => tensor_data(values, shape, Scalar::to_i32)?,
            ElementType::Int64 => tensor_data(values, shape, Scalar::to_i64)?,
            ElementType::Uint8 => tensor_data(values, shape, Scalar::to_u8)?,
            ElementType::Bool => tensor_data(values, shape, Scalar::to_bool)?,
            ElementType::Dynamic => return None,
        };

        Some(Self { elem_type, data })
    }

    /// Dimension sizes; empty for a scalar.
    pub fn shape(&self) -> &[usize] {
        &self.data.shape
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.data.shape.len()
    }

    /// The payload converted back to literal elements, in row-major order.
    ///
    /// `None` when the payload storage type disagrees with `elem_type`.
    pub fn scalars(&self) -> Option<Vec<Scalar>> {
        if self.elem_type.dtype() != Some(self.data.dtype) {
            log::warn!(
                "Constant of type {} carries {:?} data",
                self.elem_type,
                self.data.dtype
            );
            return None;
        }

        let values = match self.elem_type {
            ElementType::Float32 => map_slice::<f32>(&self.data, |v| Scalar::Float(v as f64))?,
            ElementType::Float64 => map_slice::<f64>(&self.data, Scalar::Float)?,
            ElementType::Int8 => map_slice::<i8>(&self.data, |v| Scalar::Int(v as i64))?,
            ElementType::Int32 => map_slice::<i32>(&self.data, |v| Scalar::Int(v as i64))?,
            ElementType::Int64 => map_slice::<i64>(&self.data, Scalar::Int)?,
            ElementType::Uint8 => map_slice::<u8>(&self.data, |v| Scalar::Int(v as i64))?,
            ElementType::Bool => map_slice::<bool>(&self.data, Scalar::Bool)?,
            ElementType::Dynamic => return None,
        };
        Some(values)
    }
}

fn tensor_data<E: Element>(
    values: &[Scalar],
    shape: Vec<usize>,
    convert: fn(Scalar) -> Option<E>,
) -> Option<TensorData> {
    let converted = values
        .iter()
        .map(|value| convert(*value))
        .collect::<Option<Vec<E>>>();

    match converted {
        Some(converted) => Some(TensorData::new(converted, shape)),
        None => {
            log::debug!(
                "Constant payload {:?} is not representable as {:?}",
                values,
                E::dtype()
            );
            None
        }
    }
}

fn map_slice<E: Element>(data: &TensorData, to_scalar: fn(E) -> Scalar) -> Option<Vec<Scalar>> {
    match data.as_slice::<E>() {
        Ok(slice) => Some(slice.iter().map(|v| to_scalar(*v)).collect()),
        Err(err) => {
            log::warn!("Constant data does not match its element type: {err:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_constant_has_rank_zero() {
        let constant =
            ConstantValue::from_scalars(ElementType::Int32, vec![], &[Scalar::Int(7)]).unwrap();
        assert_eq!(constant.rank(), 0);
        assert_eq!(constant.data.to_vec::<i32>().unwrap(), vec![7]);
        assert_eq!(constant.scalars().unwrap(), vec![Scalar::Int(7)]);
    }

    #[test]
    fn element_count_must_match_shape() {
        let values = [Scalar::Float(1.0), Scalar::Float(2.0), Scalar::Float(3.0)];
        assert!(ConstantValue::from_scalars(ElementType::Float32, vec![2, 2], &values).is_none());
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let huge = 1usize << (usize::BITS / 2);
        let values = [Scalar::Float(1.0)];
        let constant = ConstantValue::from_scalars(ElementType::Float32, vec![huge, huge], &values);
        assert!(constant.is_none());
    }

    #[test]
    fn integers_widen_into_float_constants() {
        let constant = ConstantValue::from_scalars(
            ElementType::Float32,
            vec![2],
            &[Scalar::Int(1), Scalar::Float(2.5)],
        )
        .unwrap();
        assert_eq!(constant.data.to_vec::<f32>().unwrap(), vec![1.0, 2.5]);
    }

    #[test]
    fn floats_do_not_narrow_into_integer_constants() {
        assert!(
            ConstantValue::from_scalars(ElementType::Int32, vec![1], &[Scalar::Float(1.5)])
                .is_none()
        );
    }

    #[test]
    fn overflowing_integer_is_rejected() {
        assert!(
            ConstantValue::from_scalars(ElementType::Int32, vec![], &[Scalar::Int(1 << 40)])
                .is_none()
        );
        let wide =
            ConstantValue::from_scalars(ElementType::Int64, vec![], &[Scalar::Int(1 << 40)])
                .unwrap();
        assert_eq!(wide.data.to_vec::<i64>().unwrap(), vec![1 << 40]);
    }

    #[test]
    fn bool_constant() {
        let constant = ConstantValue::from_scalars(
            ElementType::Bool,
            vec![2],
            &[Scalar::Bool(true), Scalar::Bool(false)],
        )
        .unwrap();
        assert_eq!(constant.data.to_vec::<bool>().unwrap(), vec![true, false]);
        assert!(
            ConstantValue::from_scalars(ElementType::Bool, vec![], &[Scalar::Int(1)]).is_none()
        );
    }

    #[test]
    fn mismatched_payload_has_no_scalars() {
        let constant = ConstantValue {
            elem_type: ElementType::Int64,
            data: TensorData::new(vec![1i32, 2], [2]),
        };
        assert!(constant.scalars().is_none());

        let constant = ConstantValue {
            elem_type: ElementType::Int32,
            data: TensorData::new(vec![1i32, 2], [2]),
        };
        assert_eq!(constant.scalars().unwrap(), [Scalar::Int(1), Scalar::Int(2)]);
    }

    #[test]
    fn dynamic_type_is_never_materialized() {
        assert!(
            ConstantValue::from_scalars(ElementType::Dynamic, vec![], &[Scalar::Int(1)]).is_none()
        );
    }
}
