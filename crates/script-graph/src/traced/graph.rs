use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ir::ValueId;
use crate::native::{Literal, NativeNode, NativeValue, ValueType};

/// Kind reported for the top-level graph handle.
pub const GRAPH_KIND: &str = "prim::Graph";

/// Kind reported for block handles.
pub const BLOCK_KIND: &str = "prim::Block";

/// Errors raised while loading or validating a traced graph.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    /// Reading the dump failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dump is not valid JSON for the graph layout.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries of the value table share an identity.
    #[error("Value {0} is defined more than once")]
    DuplicateValue(ValueId),

    /// A node, block or the graph references a value missing from the table.
    #[error("{owner} references undefined value {value}")]
    UnknownValue {
        /// Kind of the referencing node.
        owner: String,
        /// The missing value.
        value: ValueId,
    },
}

/// One entry of the value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueInfo {
    /// Identity.
    pub id: ValueId,
    /// Native type metadata.
    #[serde(rename = "type")]
    pub ty: ValueType,
    /// Literal payload, for constants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Literal>,
}

/// An operation node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Operation kind, e.g. `aten::add`.
    pub kind: String,
    /// Operator schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Consumed values.
    #[serde(default)]
    pub inputs: Vec<ValueId>,
    /// Produced values.
    #[serde(default)]
    pub outputs: Vec<ValueId>,
    /// Nested blocks (loop bodies, conditional branches).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockDef>,
}

/// A nested block: parameters, results and an ordered node list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Block parameters.
    #[serde(default)]
    pub inputs: Vec<ValueId>,
    /// Block results.
    #[serde(default)]
    pub outputs: Vec<ValueId>,
    /// Contained nodes in topological order.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

/// Serialized layout of a whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
    /// Every value of the graph, nested blocks included.
    pub values: Vec<ValueInfo>,
    /// Graph parameters.
    #[serde(default)]
    pub inputs: Vec<ValueId>,
    /// Graph results.
    #[serde(default)]
    pub outputs: Vec<ValueId>,
    /// Top-level nodes in topological order.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

/// A validated traced graph.
///
/// Every referenced value is guaranteed to exist in the value table.
#[derive(Debug, Clone)]
pub struct TracedGraph {
    def: GraphDef,
    index: HashMap<ValueId, usize>,
}

impl TracedGraph {
    /// Validate and index a graph definition.
    pub fn new(def: GraphDef) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(def.values.len());
        for (position, value) in def.values.iter().enumerate() {
            if index.insert(value.id, position).is_some() {
                return Err(GraphError::DuplicateValue(value.id));
            }
        }

        let graph = Self { def, index };
        graph.check_refs(GRAPH_KIND, &graph.def.inputs)?;
        graph.check_refs(GRAPH_KIND, &graph.def.outputs)?;
        graph.check_nodes(&graph.def.nodes)?;

        log::debug!(
            "Loaded traced graph with {} values and {} top-level nodes",
            graph.def.values.len(),
            graph.def.nodes.len()
        );

        Ok(graph)
    }

    /// Parse and validate a JSON dump.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Read, parse and validate a JSON dump from disk.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(file.as_ref())?;
        Self::from_json(&content)
    }

    /// The underlying definition.
    pub fn def(&self) -> &GraphDef {
        &self.def
    }

    /// Value table entry for `id`.
    pub fn value(&self, id: ValueId) -> Option<&ValueInfo> {
        self.index.get(&id).map(|position| &self.def.values[*position])
    }

    /// Handle on the whole graph, to be wrapped in a [`Decoder`](crate::Decoder).
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            graph: self,
            scope: Scope::Graph,
        }
    }

    fn check_nodes(&self, nodes: &[NodeDef]) -> Result<(), GraphError> {
        for node in nodes {
            self.check_refs(&node.kind, &node.inputs)?;
            self.check_refs(&node.kind, &node.outputs)?;
            for block in node.blocks.iter() {
                self.check_refs(BLOCK_KIND, &block.inputs)?;
                self.check_refs(BLOCK_KIND, &block.outputs)?;
                self.check_nodes(&block.nodes)?;
            }
        }
        Ok(())
    }

    fn check_refs(&self, owner: &str, ids: &[ValueId]) -> Result<(), GraphError> {
        match ids.iter().find(|id| !self.index.contains_key(id)) {
            Some(missing) => Err(GraphError::UnknownValue {
                owner: owner.to_string(),
                value: *missing,
            }),
            None => Ok(()),
        }
    }

    fn values(&self, ids: &[ValueId]) -> Vec<ValueRef<'_>> {
        ids.iter()
            .map(|id| ValueRef {
                id: *id,
                info: self.value(*id),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Scope<'g> {
    Graph,
    Block(&'g BlockDef),
    Node(&'g NodeDef),
}

/// Handle on the graph, a block or a node of a [`TracedGraph`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g TracedGraph,
    scope: Scope<'g>,
}

impl<'g> NodeRef<'g> {
    fn nodes(&self, nodes: &'g [NodeDef]) -> Vec<NodeRef<'g>> {
        nodes
            .iter()
            .map(|node| NodeRef {
                graph: self.graph,
                scope: Scope::Node(node),
            })
            .collect()
    }
}

impl<'g> NativeNode for NodeRef<'g> {
    type Value = ValueRef<'g>;

    fn kind(&self) -> &str {
        match self.scope {
            Scope::Graph => GRAPH_KIND,
            Scope::Block(_) => BLOCK_KIND,
            Scope::Node(node) => &node.kind,
        }
    }

    fn schema(&self) -> Option<&str> {
        match self.scope {
            Scope::Node(node) => node.schema.as_deref(),
            _ => None,
        }
    }

    fn inputs(&self) -> Vec<ValueRef<'g>> {
        let ids = match self.scope {
            Scope::Graph => &self.graph.def.inputs,
            Scope::Block(block) => &block.inputs,
            Scope::Node(node) => &node.inputs,
        };
        self.graph.values(ids)
    }

    fn outputs(&self) -> Vec<ValueRef<'g>> {
        let ids = match self.scope {
            Scope::Graph => &self.graph.def.outputs,
            Scope::Block(block) => &block.outputs,
            Scope::Node(node) => &node.outputs,
        };
        self.graph.values(ids)
    }

    fn blocks(&self) -> Vec<NodeRef<'g>> {
        match self.scope {
            Scope::Node(node) => node
                .blocks
                .iter()
                .map(|block| NodeRef {
                    graph: self.graph,
                    scope: Scope::Block(block),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn body(&self) -> Option<Vec<NodeRef<'g>>> {
        match self.scope {
            Scope::Graph => Some(self.nodes(&self.graph.def.nodes)),
            Scope::Block(block) => Some(self.nodes(&block.nodes)),
            Scope::Node(_) => None,
        }
    }
}

/// Handle on one value of a [`TracedGraph`].
#[derive(Debug, Clone, Copy)]
pub struct ValueRef<'g> {
    id: ValueId,
    info: Option<&'g ValueInfo>,
}

impl NativeValue for ValueRef<'_> {
    fn unique(&self) -> ValueId {
        self.id
    }

    fn value_type(&self) -> Cow<'_, ValueType> {
        match self.info {
            Some(info) => Cow::Borrowed(&info.ty),
            None => Cow::Owned(ValueType::dynamic_tensor()),
        }
    }

    fn literal(&self) -> Literal {
        self.info
            .and_then(|info| info.literal.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOP_GRAPH: &str = r#"{
        "values": [
            {"id": 0, "type": {"tensor": {"dtype": "torch.float32", "sizes": [2, 2]}}},
            {"id": 1, "type": {"scalar": "int"}, "literal": {"scalar": 3}},
            {"id": 2, "type": {"scalar": "bool"}, "literal": {"scalar": true}},
            {"id": 3, "type": {"scalar": "int"}},
            {"id": 4, "type": {"tensor": {"dtype": "torch.float32", "sizes": [2, 2]}}},
            {"id": 5, "type": {"tensor": {"dtype": "torch.float32", "sizes": [2, 2]}}},
            {"id": 6, "type": {"tensor": {"dtype": "torch.float32", "sizes": [2, 2]}}}
        ],
        "inputs": [0],
        "outputs": [6],
        "nodes": [
            {"kind": "prim::Constant", "outputs": [1]},
            {"kind": "prim::Constant", "outputs": [2]},
            {
                "kind": "prim::Loop",
                "inputs": [1, 2, 0],
                "outputs": [6],
                "blocks": [{
                    "inputs": [3, 4],
                    "outputs": [2, 5],
                    "nodes": [{"kind": "aten::relu", "inputs": [4], "outputs": [5]}]
                }]
            }
        ]
    }"#;

    #[test]
    fn graph_handle_exposes_body() {
        let graph = TracedGraph::from_json(LOOP_GRAPH).unwrap();
        let root = graph.root();

        assert_eq!(root.kind(), GRAPH_KIND);
        assert!(root.blocks().is_empty());
        let kinds: Vec<_> = root
            .body()
            .unwrap()
            .iter()
            .map(|node| node.kind().to_string())
            .collect();
        assert_eq!(kinds, ["prim::Constant", "prim::Constant", "prim::Loop"]);
    }

    #[test]
    fn node_handle_exposes_blocks() {
        let graph = TracedGraph::from_json(LOOP_GRAPH).unwrap();
        let body = graph.root().body().unwrap();
        let loop_node = &body[2];

        assert!(loop_node.body().is_none());
        let blocks = loop_node.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind(), BLOCK_KIND);
        let block_inputs: Vec<_> = blocks[0].inputs().iter().map(|v| v.unique()).collect();
        assert_eq!(block_inputs, [ValueId(3), ValueId(4)]);
        assert_eq!(blocks[0].body().unwrap()[0].kind(), "aten::relu");
    }

    #[test]
    fn values_carry_type_and_literal() {
        let graph = TracedGraph::from_json(LOOP_GRAPH).unwrap();
        let body = graph.root().body().unwrap();
        let value = body[0].outputs().remove(0);

        assert_eq!(value.unique(), ValueId(1));
        assert_eq!(value.value_type().as_ref(), &ValueType::scalar("int"));
        assert_eq!(value.literal(), Literal::Scalar(crate::ir::Scalar::Int(3)));
        assert!(!value.is_none());
    }

    #[test]
    fn rejects_undefined_value() {
        let json = r#"{
            "values": [{"id": 0, "type": "none"}],
            "nodes": [{"kind": "aten::relu", "inputs": [0], "outputs": [9]}]
        }"#;
        let err = TracedGraph::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnknownValue { ref owner, value: ValueId(9) } if owner == "aten::relu"
        ));
    }

    #[test]
    fn rejects_duplicate_value() {
        let json = r#"{
            "values": [{"id": 0, "type": "none"}, {"id": 0, "type": "none"}]
        }"#;
        assert!(matches!(
            TracedGraph::from_json(json),
            Err(GraphError::DuplicateValue(ValueId(0)))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            TracedGraph::from_json("{\"nodes\": []}"),
            Err(GraphError::Json(_))
        ));
    }
}
