use strum::Display;

use crate::ir::ValueId;

/// Which side of a node an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Slot {
    /// Node inputs.
    #[strum(serialize = "input")]
    Input,
    /// Node outputs.
    #[strum(serialize = "output")]
    Output,
}

/// Hard decoding failures.
///
/// Absent information (unknown shape, unrecognized type, non-constant value) is never an
/// error; only index violations and inconsistent graphs are.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A value index is outside `0..count`.
    #[error("{kind}: index {index} of {slot} is out of range, total number of {slot}s is {count}")]
    IndexOutOfRange {
        /// Operation kind of the node that was queried.
        kind: String,
        /// Inputs or outputs.
        slot: Slot,
        /// Offending index.
        index: usize,
        /// Valid bound.
        count: usize,
    },

    /// A region index is outside `0..region_count`.
    #[error("{kind}: index {index} of block is out of range, total number of blocks is {count}")]
    RegionOutOfRange {
        /// Operation kind of the node that was queried.
        kind: String,
        /// Offending region index.
        index: usize,
        /// Valid bound.
        count: usize,
    },

    /// Two nodes claim to produce the same value.
    #[error("{kind}: duplicated producer for value with unique id {value}")]
    DuplicateProducer {
        /// Operation kind of the second producer.
        kind: String,
        /// The value produced twice.
        value: ValueId,
    },

    /// A failure raised while visiting a node inside a region.
    #[error("{kind}: region {region}, node {position}: {source}")]
    InRegion {
        /// Operation kind of the node owning the region.
        kind: String,
        /// Region index.
        region: usize,
        /// Position of the failing node within the region.
        position: usize,
        /// Underlying failure.
        source: Box<DecodeError>,
    },

    /// A failure reported by a node visitor.
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// The innermost failure, with every [`DecodeError::InRegion`] layer stripped.
    pub fn root_cause(&self) -> &DecodeError {
        let mut current = self;
        while let DecodeError::InRegion { source, .. } = current {
            current = &**source;
        }
        current
    }

    /// Region path `(kind, region, position)` from the outermost node to the failure.
    pub fn path(&self) -> Vec<(&str, usize, usize)> {
        let mut path = Vec::new();
        let mut current = self;
        while let DecodeError::InRegion {
            kind,
            region,
            position,
            source,
        } = current
        {
            path.push((kind.as_str(), *region, *position));
            current = &**source;
        }
        path
    }
}

/// Decoder result type.
pub type Result<T> = core::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> DecodeError {
        DecodeError::InRegion {
            kind: "prim::Loop".to_string(),
            region: 0,
            position: 3,
            source: Box::new(DecodeError::InRegion {
                kind: "prim::If".to_string(),
                region: 1,
                position: 0,
                source: Box::new(DecodeError::IndexOutOfRange {
                    kind: "aten::add".to_string(),
                    slot: Slot::Input,
                    index: 4,
                    count: 2,
                }),
            }),
        }
    }

    #[test]
    fn message_names_every_level() {
        assert_eq!(
            nested().to_string(),
            "prim::Loop: region 0, node 3: prim::If: region 1, node 0: \
             aten::add: index 4 of input is out of range, total number of inputs is 2"
        );
    }

    #[test]
    fn root_cause_and_path() {
        let err = nested();
        assert!(matches!(
            err.root_cause(),
            DecodeError::IndexOutOfRange { index: 4, .. }
        ));
        assert_eq!(err.path(), vec![("prim::Loop", 0, 3), ("prim::If", 1, 0)]);
    }

    #[test]
    fn region_message() {
        let err = DecodeError::RegionOutOfRange {
            kind: "prim::If".to_string(),
            index: 2,
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "prim::If: index 2 of block is out of range, total number of blocks is 2"
        );
    }
}
