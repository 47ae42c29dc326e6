use crate::constant;
use crate::error::{DecodeError, Result, Slot};
use crate::ir::{ConstantValue, ElementType, PartialShape, ValueId};
use crate::native::{NativeNode, NativeValue};
use crate::type_table::TypeTable;

/// Framework-agnostic view over one native node, block or graph.
///
/// A decoder holds nothing but the native handle and the recognized-type table; every query
/// is answered from the handle on demand. Creating one is cheap and has no effect on the
/// graph, so two decoders over the same node always agree.
///
/// The conversion engine starts from a decoder over the whole graph and reaches every other
/// node through [`Decoder::visit_region`], which hands out a fresh decoder per child.
#[derive(Debug, Clone)]
pub struct Decoder<'t, N> {
    node: N,
    types: &'t TypeTable,
}

impl<N: NativeNode> Decoder<'static, N> {
    /// Decoder using the standard recognized-type table.
    pub fn new(node: N) -> Self {
        Self::with_types(node, TypeTable::standard())
    }
}

impl<'t, N: NativeNode> Decoder<'t, N> {
    /// Decoder using a custom recognized-type table.
    pub fn with_types(node: N, types: &'t TypeTable) -> Self {
        Self { node, types }
    }

    /// Operation kind, used by the engine to select a conversion rule.
    pub fn operation_kind(&self) -> &str {
        self.node.kind()
    }

    /// Operator schema, if the framework provides one.
    pub fn schema(&self) -> Option<&str> {
        self.node.schema()
    }

    /// Whether the schema marks an argument as written in place (`Tensor(a!)`).
    pub fn mutates_input(&self) -> bool {
        self.schema().is_some_and(|schema| schema.contains('!'))
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.node.inputs().len()
    }

    /// Number of outputs.
    pub fn output_count(&self) -> usize {
        self.node.outputs().len()
    }

    /// Identity of input `index`.
    pub fn input(&self, index: usize) -> Result<ValueId> {
        self.raw_input(index).map(|value| value.unique())
    }

    /// Identity of output `index`.
    pub fn output(&self, index: usize) -> Result<ValueId> {
        self.raw_output(index).map(|value| value.unique())
    }

    /// Identities of all inputs.
    pub fn inputs(&self) -> Vec<ValueId> {
        self.node.inputs().iter().map(|value| value.unique()).collect()
    }

    /// Identities of all outputs.
    pub fn outputs(&self) -> Vec<ValueId> {
        self.node.outputs().iter().map(|value| value.unique()).collect()
    }

    /// Native handle of input `index`.
    pub fn raw_input(&self, index: usize) -> Result<N::Value> {
        self.value_at(self.node.inputs(), Slot::Input, index)
    }

    /// Native handle of output `index`.
    pub fn raw_output(&self, index: usize) -> Result<N::Value> {
        self.value_at(self.node.outputs(), Slot::Output, index)
    }

    /// Whether input `index` is the absent-value sentinel.
    ///
    /// An index past the last input is vacuously absent: optional trailing arguments are
    /// often not materialized at all. Every other index-based query still fails for it.
    pub fn input_is_none(&self, index: usize) -> bool {
        self.node
            .inputs()
            .get(index)
            .is_none_or(|value| value.is_none())
    }

    /// Static shape of `value`, or [`PartialShape::Dynamic`] unless it is a complete tensor.
    pub fn shape_of(&self, value: &N::Value) -> PartialShape {
        match value.value_type().complete_sizes() {
            Some(sizes) => PartialShape::from_static(sizes),
            None => PartialShape::Dynamic,
        }
    }

    /// Element type of `value` through the recognized-type table.
    ///
    /// Absent or unrecognized type names give [`ElementType::Dynamic`].
    pub fn type_of(&self, value: &N::Value) -> ElementType {
        let value_type = value.value_type();
        match value_type.element_type_name() {
            Some(name) => {
                let elem_type = self.types.lookup(name);
                if elem_type.is_dynamic() {
                    log::debug!(
                        "Unrecognized element type {name} of {}, captured as dynamic",
                        value.unique()
                    );
                }
                elem_type
            }
            None => ElementType::Dynamic,
        }
    }

    /// Shape of input `index`.
    pub fn input_shape(&self, index: usize) -> Result<PartialShape> {
        self.raw_input(index).map(|value| self.shape_of(&value))
    }

    /// Element type of input `index`.
    pub fn input_type(&self, index: usize) -> Result<ElementType> {
        self.raw_input(index).map(|value| self.type_of(&value))
    }

    /// Shape of output `index`.
    pub fn output_shape(&self, index: usize) -> Result<PartialShape> {
        self.raw_output(index).map(|value| self.shape_of(&value))
    }

    /// Element type of output `index`.
    pub fn output_type(&self, index: usize) -> Result<ElementType> {
        self.raw_output(index).map(|value| self.type_of(&value))
    }

    /// The literal produced by this node, if it is a representable constant.
    pub fn as_constant(&self) -> Option<ConstantValue> {
        constant::extract(&self.node, self.types)
    }

    /// Number of regions.
    ///
    /// A graph or block is its own single region; an operation node has one region per
    /// nested block, possibly none.
    pub fn region_count(&self) -> usize {
        match self.node.body() {
            Some(_) => 1,
            None => self.node.blocks().len(),
        }
    }

    /// Decoder over the block backing region `index`.
    ///
    /// Its inputs and outputs are the block parameters and results. For a graph or block,
    /// region 0 is the handle itself.
    pub fn region_decoder(&self, index: usize) -> Result<Decoder<'t, N>> {
        if self.node.body().is_some() {
            return match index {
                0 => Ok(self.clone()),
                _ => Err(self.region_out_of_range(index, 1)),
            };
        }

        let blocks = self.node.blocks();
        let count = blocks.len();
        blocks
            .into_iter()
            .nth(index)
            .map(|block| Decoder::with_types(block, self.types))
            .ok_or_else(|| self.region_out_of_range(index, count))
    }

    /// Call `visitor` once per node of region `index`, in stored topological order.
    ///
    /// An out-of-range index fails before any node is visited. A failure returned by the
    /// visitor stops the traversal and is wrapped with this node's kind, the region index and
    /// the position of the failing child.
    pub fn visit_region<F>(&self, index: usize, mut visitor: F) -> Result<()>
    where
        F: FnMut(Decoder<'t, N>) -> Result<()>,
    {
        let nodes = self.region_nodes(index)?;
        log::trace!(
            "Visiting region {index} of {} with {} nodes",
            self.operation_kind(),
            nodes.len()
        );

        for (position, node) in nodes.into_iter().enumerate() {
            let child = Decoder::with_types(node, self.types);
            visitor(child).map_err(|source| DecodeError::InRegion {
                kind: self.operation_kind().to_string(),
                region: index,
                position,
                source: Box::new(source),
            })?;
        }

        Ok(())
    }

    fn region_nodes(&self, index: usize) -> Result<Vec<N>> {
        let region = self.region_decoder(index)?;
        match region.node.body() {
            Some(nodes) => Ok(nodes),
            None => {
                log::warn!(
                    "Block {index} of {} exposes no body, treating it as empty",
                    self.operation_kind()
                );
                Ok(Vec::new())
            }
        }
    }

    fn value_at(&self, values: Vec<N::Value>, slot: Slot, index: usize) -> Result<N::Value> {
        let count = values.len();
        values
            .into_iter()
            .nth(index)
            .ok_or_else(|| DecodeError::IndexOutOfRange {
                kind: self.operation_kind().to_string(),
                slot,
                index,
                count,
            })
    }

    fn region_out_of_range(&self, index: usize, count: usize) -> DecodeError {
        DecodeError::RegionOutOfRange {
            kind: self.operation_kind().to_string(),
            index,
            count,
        }
    }
}
