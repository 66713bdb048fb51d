//! # Graph Builder / Scheduler
//!
//! [`Graph`] is the arena that owns every node. Constructors wire both edge
//! directions at creation time, and since a node can only reference nodes
//! that already exist, every inbound id is smaller than the node's own id.
//! The passes in [`run`] rely on that to borrow a node mutably while reading
//! its neighbours.

pub mod feed;
pub mod run;
pub mod topo;

pub use feed::{Binding, FeedDict, RawValue};
pub use run::Evaluated;

use crate::error::MiniflowError;
use crate::matrix::Matrix;
use crate::node::{
    Add, Gradients, Input, Linear, MeanSquaredError, Multiply, Node, NodeId, Operation, Sigmoid,
};

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, MiniflowError> {
        self.nodes
            .get(id.index())
            .ok_or(MiniflowError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, MiniflowError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(MiniflowError::UnknownNode(id))
    }

    /// Adds a node running `op` over `inbound` and registers it as a consumer
    /// of each inbound node (once per distinct inbound, however often it repeats).
    pub fn push(
        &mut self,
        inbound: Vec<NodeId>,
        op: Box<dyn Operation>,
    ) -> Result<NodeId, MiniflowError> {
        for &dep in &inbound {
            self.node(dep)?;
        }
        let id = NodeId(self.nodes.len());
        for &dep in &inbound {
            let outbound = &mut self.nodes[dep.index()].outbound;
            if !outbound.contains(&id) {
                outbound.push(id);
            }
        }
        log::trace!("created {} node {} with inbound {:?}", op.name(), id, inbound);
        self.nodes.push(Node::new(id, inbound, op));
        Ok(id)
    }

    pub fn input(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, Vec::new(), Box::new(Input)));
        id
    }

    pub fn add(&mut self, inputs: &[NodeId]) -> Result<NodeId, MiniflowError> {
        Self::require_inputs("Add", inputs)?;
        self.push(inputs.to_vec(), Box::new(Add))
    }

    pub fn multiply(&mut self, inputs: &[NodeId]) -> Result<NodeId, MiniflowError> {
        Self::require_inputs("Multiply", inputs)?;
        self.push(inputs.to_vec(), Box::new(Multiply))
    }

    pub fn linear(&mut self, x: NodeId, w: NodeId, b: NodeId) -> Result<NodeId, MiniflowError> {
        self.push(vec![x, w, b], Box::new(Linear))
    }

    pub fn sigmoid(&mut self, x: NodeId) -> Result<NodeId, MiniflowError> {
        self.push(vec![x], Box::new(Sigmoid))
    }

    /// Mean squared error of prediction `a` against target `y`.
    pub fn mse(&mut self, y: NodeId, a: NodeId) -> Result<NodeId, MiniflowError> {
        self.push(vec![y, a], Box::new(MeanSquaredError::new()))
    }

    fn require_inputs(name: &str, inputs: &[NodeId]) -> Result<(), MiniflowError> {
        if inputs.is_empty() {
            return Err(MiniflowError::InvalidValue(format!(
                "{} needs at least one inbound node",
                name
            )));
        }
        Ok(())
    }

    pub fn value(&self, id: NodeId) -> Option<&Matrix> {
        self.nodes.get(id.index()).and_then(|n| n.value.as_ref())
    }

    /// Overwrites a node's value, e.g. to swap in the next mini-batch.
    pub fn set_value(&mut self, id: NodeId, value: Matrix) -> Result<(), MiniflowError> {
        self.node_mut(id)?.value = Some(value);
        Ok(())
    }

    /// Gradient of the loss with respect to `wrt`, as computed by `node`.
    /// `gradient(n, n)` is an input node's total gradient.
    pub fn gradient(&self, node: NodeId, wrt: NodeId) -> Option<&Matrix> {
        self.nodes
            .get(node.index())
            .and_then(|n| n.gradients.get(&wrt))
    }

    pub fn gradients(&self, id: NodeId) -> Result<&Gradients, MiniflowError> {
        Ok(&self.node(id)?.gradients)
    }

    pub fn inbound(&self, id: NodeId) -> Result<&[NodeId], MiniflowError> {
        Ok(&self.node(id)?.inbound)
    }

    pub fn outbound(&self, id: NodeId) -> Result<&[NodeId], MiniflowError> {
        Ok(&self.node(id)?.outbound)
    }

    /// Diagnostic text for a node; see the `Display` impl of [`Node`].
    pub fn render(&self, id: NodeId) -> Result<String, MiniflowError> {
        Ok(self.node(id)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_transposes() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let (x, w, b) = (graph.input(), graph.input(), graph.input());
        let l = graph.linear(x, w, b)?;
        let s = graph.sigmoid(l)?;
        let t = graph.add(&[s, x])?;

        for node in graph.iter() {
            for &dep in node.inbound() {
                assert!(graph.outbound(dep)?.contains(&node.id()));
            }
            for &consumer in node.outbound() {
                assert!(graph.inbound(consumer)?.contains(&node.id()));
            }
        }
        assert_eq!(graph.outbound(x)?, &[l, t]);
        assert!(graph.outbound(t)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_inbound_is_rejected() {
        let mut graph = Graph::new();
        let x = graph.input();
        let err = graph.add(&[x, NodeId(42)]).unwrap_err();
        assert_eq!(err, MiniflowError::UnknownNode(NodeId(42)));
        assert_eq!(graph.len(), 1);
        assert!(graph.outbound(x).unwrap().is_empty());
    }

    #[test]
    fn test_variadic_nodes_need_an_input() {
        let mut graph = Graph::new();
        assert!(matches!(graph.add(&[]), Err(MiniflowError::InvalidValue(_))));
        assert!(matches!(graph.multiply(&[]), Err(MiniflowError::InvalidValue(_))));
    }

    #[test]
    fn test_render_before_and_after_value() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let x = graph.input();
        assert_eq!(graph.render(x)?, "");
        graph.set_value(x, Matrix::scalar(2.5))?;
        assert_eq!(graph.render(x)?, "2.5");
        Ok(())
    }
}
