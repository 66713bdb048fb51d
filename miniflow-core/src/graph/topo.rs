use super::{FeedDict, Graph};
use crate::error::MiniflowError;
use crate::node::NodeId;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

#[derive(Debug, Default)]
struct Adjacency {
    incoming: BTreeSet<NodeId>,
    outgoing: BTreeSet<NodeId>,
}

impl Graph {
    /// Orders every node reachable from the fed inputs so that each node comes
    /// after all of its inbound nodes, and seeds each fed input with its value.
    ///
    /// Nodes that become ready at the same time are emitted first come, first
    /// served, starting with the inputs in feed order.
    ///
    /// # Errors
    /// - `UnknownNode` if a binding names a node outside this graph.
    /// - `InvalidValue` if a binding targets a node that is not an input.
    /// - `CycleDetected` if the reachable part of the graph is not acyclic.
    pub fn topological_sort(&mut self, feed: &FeedDict) -> Result<Vec<NodeId>, MiniflowError> {
        let roots = feed.nodes();
        for &root in &roots {
            let node = self.node(root)?;
            if !node.is_input() {
                return Err(MiniflowError::InvalidValue(format!(
                    "feed binds {} which is a {} node, not an input",
                    root,
                    node.operation().name()
                )));
            }
        }

        let adjacency = self.reachable_adjacency(&roots)?;

        let mut in_degree: BTreeMap<NodeId, usize> = adjacency
            .iter()
            .map(|(&id, adj)| (id, adj.incoming.len()))
            .collect();
        let mut ready: VecDeque<NodeId> = roots
            .iter()
            .copied()
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(adjacency.len());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            if let Some(value) = feed.value_for(id) {
                self.set_value(id, value.clone())?;
            }
            // Consumers get ascending ids, so this is also edge creation order.
            let successors = adjacency.get(&id).map(|adj| &adj.outgoing);
            for &next in successors.into_iter().flatten() {
                if let Some(remaining) = in_degree.get_mut(&next) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        ready.push_back(next);
                    }
                }
            }
        }

        if order.len() != adjacency.len() {
            log::debug!(
                "topological sort ordered {} of {} reachable nodes",
                order.len(),
                adjacency.len()
            );
            return Err(MiniflowError::CycleDetected);
        }
        log::debug!("topological order: {:?}", order);
        Ok(order)
    }

    /// Breadth-first walk along outbound edges recording, for every reached
    /// node, which reached nodes feed it and which it feeds.
    fn reachable_adjacency(
        &self,
        roots: &[NodeId],
    ) -> Result<BTreeMap<NodeId, Adjacency>, MiniflowError> {
        let mut adjacency: BTreeMap<NodeId, Adjacency> = BTreeMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        for &root in roots {
            if visited.insert(root) {
                queue.push_back(root);
            }
        }
        while let Some(id) = queue.pop_front() {
            adjacency.entry(id).or_default();
            for &next in self.outbound(id)? {
                adjacency.entry(id).or_default().outgoing.insert(next);
                adjacency.entry(next).or_default().incoming.insert(id);
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(adjacency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn position(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|&n| n == id).unwrap()
    }

    #[test]
    fn test_every_edge_points_forward_in_order() {
        let mut graph = Graph::new();
        let (x, w, b, y) = (graph.input(), graph.input(), graph.input(), graph.input());
        let l = graph.linear(x, w, b).unwrap();
        let s = graph.sigmoid(l).unwrap();
        let both = graph.add(&[s, l, x]).unwrap();
        let cost = graph.mse(y, both).unwrap();

        let mut feed = FeedDict::new();
        feed.bind("y", y, 0.0).unwrap();
        feed.bind("b", b, 0.0).unwrap();
        feed.bind("w", w, 1.0).unwrap();
        feed.bind("x", x, 1.0).unwrap();
        let order = graph.topological_sort(&feed).unwrap();

        assert_eq!(order.len(), graph.len());
        assert_eq!(&order[..4], &[y, b, w, x]);
        assert_eq!(*order.last().unwrap(), cost);
        for node in graph.iter() {
            for &consumer in node.outbound() {
                assert!(position(&order, node.id()) < position(&order, consumer));
            }
        }
    }

    #[test]
    fn test_sort_seeds_fed_inputs() {
        let mut graph = Graph::new();
        let x = graph.input();
        let y = graph.input();
        let _ = graph.add(&[x, y]).unwrap();

        let mut feed = FeedDict::new();
        feed.bind("x", x, vec![vec![1.0, 2.0]]).unwrap();
        feed.bind_transposed("y", y, [3.0, 4.0]).unwrap();
        assert!(graph.value(x).is_none());

        graph.topological_sort(&feed).unwrap();
        assert_eq!(graph.value(x), Some(&Matrix::row_vector(vec![1.0, 2.0])));
        assert_eq!(graph.value(y), Some(&Matrix::column_vector(vec![3.0, 4.0])));
    }

    #[test]
    fn test_unreachable_nodes_are_left_out() {
        let mut graph = Graph::new();
        let x = graph.input();
        let other = graph.input();
        let f = graph.sigmoid(x).unwrap();
        let _g = graph.sigmoid(other).unwrap();

        let mut feed = FeedDict::new();
        feed.bind("x", x, 0.0).unwrap();
        assert_eq!(graph.topological_sort(&feed).unwrap(), vec![x, f]);
    }

    #[test]
    fn test_binding_a_computed_node_is_rejected() {
        let mut graph = Graph::new();
        let x = graph.input();
        let s = graph.sigmoid(x).unwrap();
        let mut feed = FeedDict::new();
        feed.bind("s", s, 1.0).unwrap();
        assert!(matches!(
            graph.topological_sort(&feed),
            Err(MiniflowError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_binding_an_unknown_node_is_rejected() {
        let mut graph = Graph::new();
        let mut feed = FeedDict::new();
        feed.bind("ghost", NodeId(7), 1.0).unwrap();
        assert_eq!(
            graph.topological_sort(&feed),
            Err(MiniflowError::UnknownNode(NodeId(7)))
        );
    }
}
