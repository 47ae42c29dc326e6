use core::fmt;

use serde::{Deserialize, Serialize};

/// One dimension of a partially known shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<usize>", into = "Option<usize>")]
pub enum Dim {
    /// Size known at decode time.
    Static(usize),
    /// Size only known at run time.
    Dynamic,
}

impl From<Option<usize>> for Dim {
    fn from(size: Option<usize>) -> Self {
        size.map_or(Dim::Dynamic, Dim::Static)
    }
}

impl From<Dim> for Option<usize> {
    fn from(dim: Dim) -> Self {
        match dim {
            Dim::Static(size) => Some(size),
            Dim::Dynamic => None,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(size) => write!(f, "{size}"),
            Dim::Dynamic => f.write_str("?"),
        }
    }
}

/// Shape descriptor returned by shape queries.
///
/// A value whose complete static shape is not known is reported as [`PartialShape::Dynamic`];
/// that is a normal state for scripted graphs, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialShape {
    /// Neither rank nor dimensions are known.
    Dynamic,
    /// Rank known, dimensions possibly unknown.
    Ranked(Vec<Dim>),
}

impl PartialShape {
    /// Shape where every dimension is known.
    pub fn from_static<I: IntoIterator<Item = usize>>(dims: I) -> Self {
        Self::Ranked(dims.into_iter().map(Dim::Static).collect())
    }

    /// Number of dimensions, when the rank is known.
    pub fn rank(&self) -> Option<usize> {
        match self {
            PartialShape::Dynamic => None,
            PartialShape::Ranked(dims) => Some(dims.len()),
        }
    }

    /// Whether every dimension is known.
    pub fn is_static(&self) -> bool {
        self.to_static().is_some()
    }

    /// The dimension sizes, if all of them are known.
    pub fn to_static(&self) -> Option<Vec<usize>> {
        match self {
            PartialShape::Dynamic => None,
            PartialShape::Ranked(dims) => dims
                .iter()
                .map(|dim| Option::<usize>::from(*dim))
                .collect(),
        }
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialShape::Dynamic => f.write_str("[...]"),
            PartialShape::Ranked(dims) => {
                f.write_str("[")?;
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{dim}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_shape_round_trips_dims() {
        let shape = PartialShape::from_static([2, 3]);
        assert_eq!(shape.rank(), Some(2));
        assert_eq!(shape.to_static(), Some(vec![2, 3]));
        assert_eq!(shape.to_string(), "[2,3]");
    }

    #[test]
    fn partially_known_shape_is_not_static() {
        let shape = PartialShape::Ranked(vec![Dim::Static(1), Dim::Dynamic]);
        assert!(!shape.is_static());
        assert_eq!(shape.rank(), Some(2));
        assert_eq!(shape.to_string(), "[1,?]");
    }

    #[test]
    fn scalar_shape_is_static_rank_zero() {
        let shape = PartialShape::from_static([]);
        assert!(shape.is_static());
        assert_eq!(shape.rank(), Some(0));
    }

    #[test]
    fn dynamic_serializes_as_tag() {
        assert_eq!(
            serde_json::to_string(&PartialShape::Dynamic).unwrap(),
            "\"dynamic\""
        );
        assert_eq!(
            serde_json::to_string(&PartialShape::Ranked(vec![Dim::Static(4), Dim::Dynamic]))
                .unwrap(),
            "{\"ranked\":[4,null]}"
        );
    }
}
