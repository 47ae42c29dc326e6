use crate::constant::CONSTANT_KIND;
use crate::ir::ValueId;
use crate::native::{Literal, ValueType};

use super::{BlockDef, GraphDef, GraphError, NodeDef, TracedGraph, ValueInfo};

/// Incremental construction of a [`TracedGraph`].
///
/// Values get consecutive identities in creation order. Nodes for nested blocks are built
/// with [`NodeDef`] and [`BlockDef`] and attached through [`GraphBuilder::node`].
///
/// ```
/// use script_graph::native::{Literal, ValueType};
/// use script_graph::ir::Scalar;
/// use script_graph::traced::{GraphBuilder, NodeDef};
///
/// let mut builder = GraphBuilder::new();
/// let x = builder.input(ValueType::tensor("torch.float32", [2, 2]));
/// let alpha = builder.constant(ValueType::scalar("int"), Literal::Scalar(Scalar::Int(1)));
/// let y = builder.value(ValueType::tensor("torch.float32", [2, 2]));
/// builder.node(NodeDef::new("aten::add").with_inputs([x, x, alpha]).with_outputs([y]));
/// builder.output(y);
/// let graph = builder.build().unwrap();
/// assert_eq!(graph.def().nodes.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    def: GraphDef,
    next_id: usize,
}

impl GraphBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value without a producer yet.
    pub fn value(&mut self, ty: ValueType) -> ValueId {
        self.push_value(ty, None)
    }

    /// Register a value carrying a literal payload.
    pub fn literal(&mut self, ty: ValueType, literal: Literal) -> ValueId {
        self.push_value(ty, Some(literal))
    }

    /// Register the absent-value sentinel.
    pub fn none(&mut self) -> ValueId {
        self.push_value(ValueType::None, None)
    }

    /// Register a graph parameter.
    pub fn input(&mut self, ty: ValueType) -> ValueId {
        let id = self.value(ty);
        self.def.inputs.push(id);
        id
    }

    /// Register a literal and the top-level constant node producing it.
    pub fn constant(&mut self, ty: ValueType, literal: Literal) -> ValueId {
        let id = self.literal(ty, literal);
        self.def.nodes.push(NodeDef::constant(id));
        id
    }

    /// Append a top-level node.
    pub fn node(&mut self, node: NodeDef) -> &mut Self {
        self.def.nodes.push(node);
        self
    }

    /// Mark a value as a graph result.
    pub fn output(&mut self, id: ValueId) -> &mut Self {
        self.def.outputs.push(id);
        self
    }

    /// Validate and finish the graph.
    pub fn build(self) -> Result<TracedGraph, GraphError> {
        TracedGraph::new(self.def)
    }

    fn push_value(&mut self, ty: ValueType, literal: Option<Literal>) -> ValueId {
        let id = ValueId(self.next_id);
        self.next_id += 1;
        self.def.values.push(ValueInfo { id, ty, literal });
        id
    }
}

impl NodeDef {
    /// Node of `kind` with no inputs, outputs or blocks.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            schema: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Literal-producing node with a single output.
    pub fn constant(output: ValueId) -> Self {
        Self::new(CONSTANT_KIND).with_outputs([output])
    }

    /// Set the operator schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Append inputs.
    pub fn with_inputs<I: IntoIterator<Item = ValueId>>(mut self, inputs: I) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Append outputs.
    pub fn with_outputs<I: IntoIterator<Item = ValueId>>(mut self, outputs: I) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// Append a nested block.
    pub fn with_block(mut self, block: BlockDef) -> Self {
        self.blocks.push(block);
        self
    }
}

impl BlockDef {
    /// Empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append block parameters.
    pub fn with_inputs<I: IntoIterator<Item = ValueId>>(mut self, inputs: I) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Append block results.
    pub fn with_outputs<I: IntoIterator<Item = ValueId>>(mut self, outputs: I) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// Append a node.
    pub fn with_node(mut self, node: NodeDef) -> Self {
        self.nodes.push(node);
        self
    }
}
