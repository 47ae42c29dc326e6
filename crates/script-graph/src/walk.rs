//! Whole-graph traversal.
//!
//! [`decode_graph`] drives a [`Decoder`] the way a conversion engine would: every region is
//! visited in stored order, each node is queried for its values and constant payload, and
//! every value is checked to have a single producer. The result is a plain serializable
//! summary of the graph.

use std::collections::HashSet;

use serde::Serialize;

use crate::Decoder;
use crate::error::{DecodeError, Result};
use crate::ir::{ElementType, PartialShape, Scalar, ValueId};
use crate::native::{NativeNode, NativeValue};

/// One input or output as seen by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedValue {
    /// Identity.
    pub id: ValueId,
    /// Static shape, if known.
    pub shape: PartialShape,
    /// Recognized element type.
    pub elem_type: ElementType,
    /// Whether the value is the absent-value sentinel.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub none: bool,
}

/// Materialized constant payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedConstant {
    /// Element type.
    pub elem_type: ElementType,
    /// Static shape; empty for scalars.
    pub shape: Vec<usize>,
    /// Elements in row-major order.
    pub values: Vec<Scalar>,
}

/// A decoded operation node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedNode {
    /// Operation kind.
    pub kind: String,
    /// Operator schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Inputs.
    pub inputs: Vec<DecodedValue>,
    /// Outputs.
    pub outputs: Vec<DecodedValue>,
    /// Constant payload for literal-producing nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant: Option<DecodedConstant>,
    /// Nested regions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<DecodedRegion>,
}

/// A decoded region: a graph body or a nested block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRegion {
    /// Region parameters.
    pub inputs: Vec<DecodedValue>,
    /// Region results.
    pub outputs: Vec<DecodedValue>,
    /// Values used in the region but produced outside of it, in first-use order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<ValueId>,
    /// Nodes in stored order.
    pub nodes: Vec<DecodedNode>,
}

/// A decoded graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedGraph {
    /// Kind of the graph handle.
    pub kind: String,
    /// The single top-level region.
    #[serde(flatten)]
    pub body: DecodedRegion,
}

impl DecodedGraph {
    /// Total number of nodes, nested regions included.
    pub fn node_count(&self) -> usize {
        fn count(region: &DecodedRegion) -> usize {
            region
                .nodes
                .iter()
                .map(|node| 1 + node.regions.iter().map(count).sum::<usize>())
                .sum()
        }
        count(&self.body)
    }
}

/// Decode every node reachable from `graph`.
///
/// The handle must expose exactly one region. Fails on index violations raised while
/// visiting, and when a value has more than one producer.
pub fn decode_graph<N: NativeNode>(graph: &Decoder<'_, N>) -> Result<DecodedGraph> {
    let count = graph.region_count();
    if count != 1 {
        return Err(DecodeError::Custom(format!(
            "{}: model should have exactly 1 region, found {count}",
            graph.operation_kind()
        )));
    }

    let mut walker = Walker::default();
    let body = walker.region(graph, 0)?;
    log::debug!(
        "Decoded {} with {} values produced",
        graph.operation_kind(),
        walker.produced.len()
    );

    Ok(DecodedGraph {
        kind: graph.operation_kind().to_string(),
        body,
    })
}

#[derive(Default)]
struct Walker {
    produced: HashSet<ValueId>,
}

impl Walker {
    fn region<N: NativeNode>(
        &mut self,
        owner: &Decoder<'_, N>,
        index: usize,
    ) -> Result<DecodedRegion> {
        let block = owner.region_decoder(index)?;
        let inputs = inputs_of(&block)?;
        let outputs = outputs_of(&block)?;

        let mut local = HashSet::new();
        for value in inputs.iter() {
            self.produce(block.operation_kind(), value.id)?;
            local.insert(value.id);
        }

        let mut captures = Vec::new();
        let mut nodes = Vec::new();
        owner.visit_region(index, |node| {
            let decoded = self.node(&node)?;

            let used = decoded.inputs.iter().map(|value| value.id);
            let nested = decoded
                .regions
                .iter()
                .flat_map(|region| region.captures.iter().copied());
            for id in used.chain(nested) {
                if !local.contains(&id) && !captures.contains(&id) {
                    captures.push(id);
                }
            }

            for value in decoded.outputs.iter() {
                self.produce(&decoded.kind, value.id)?;
                local.insert(value.id);
            }

            nodes.push(decoded);
            Ok(())
        })?;

        for value in outputs.iter() {
            if !local.contains(&value.id) && !captures.contains(&value.id) {
                captures.push(value.id);
            }
        }

        Ok(DecodedRegion {
            inputs,
            outputs,
            captures,
            nodes,
        })
    }

    fn node<N: NativeNode>(&mut self, node: &Decoder<'_, N>) -> Result<DecodedNode> {
        let regions = (0..node.region_count())
            .map(|index| self.region(node, index))
            .collect::<Result<Vec<_>>>()?;

        let constant = node.as_constant().map(|constant| DecodedConstant {
            elem_type: constant.elem_type,
            shape: constant.shape().to_vec(),
            values: constant.scalars().unwrap_or_default(),
        });

        Ok(DecodedNode {
            kind: node.operation_kind().to_string(),
            schema: node.schema().map(str::to_string),
            inputs: inputs_of(node)?,
            outputs: outputs_of(node)?,
            constant,
            regions,
        })
    }

    fn produce(&mut self, kind: &str, value: ValueId) -> Result<()> {
        if !self.produced.insert(value) {
            return Err(DecodeError::DuplicateProducer {
                kind: kind.to_string(),
                value,
            });
        }
        Ok(())
    }
}

fn inputs_of<N: NativeNode>(decoder: &Decoder<'_, N>) -> Result<Vec<DecodedValue>> {
    (0..decoder.input_count())
        .map(|index| {
            Ok(DecodedValue {
                id: decoder.input(index)?,
                shape: decoder.input_shape(index)?,
                elem_type: decoder.input_type(index)?,
                none: decoder.input_is_none(index),
            })
        })
        .collect()
}

fn outputs_of<N: NativeNode>(decoder: &Decoder<'_, N>) -> Result<Vec<DecodedValue>> {
    (0..decoder.output_count())
        .map(|index| {
            let value = decoder.raw_output(index)?;
            Ok(DecodedValue {
                id: value.unique(),
                shape: decoder.shape_of(&value),
                elem_type: decoder.type_of(&value),
                none: value.is_none(),
            })
        })
        .collect()
}
