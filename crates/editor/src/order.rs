//! Step ordering for the flattened `actions` list.
//!
//! Topology rules:
//! 1. Only connections reachable from the trigger decide the order.
//! 2. Among steps that are ready at the same time, the higher one on the
//!    canvas (smaller `y`) runs first, then the smaller ID.
//! 3. Steps not reachable from the trigger follow, in ascending `y`.
//! 4. A cycle among reachable nodes is an error.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::ActionOrdering;
use crate::graph::WorkflowGraph;
use crate::models::Node;
use crate::EditorError;

/// Return every step (non-trigger node) in execution order.
///
/// # Errors
/// [`EditorError::CycleDetected`] when `ordering` is
/// [`ActionOrdering::Topology`] and the reachable connections form a cycle.
pub fn execution_order(
    graph: &WorkflowGraph,
    ordering: ActionOrdering,
) -> Result<Vec<&Node>, EditorError> {
    match ordering {
        ActionOrdering::Vertical => Ok(vertical_order(graph.steps())),
        ActionOrdering::Topology => topological_order(graph),
    }
}

fn by_canvas_position(a: &Node, b: &Node) -> Ordering {
    a.position
        .y
        .total_cmp(&b.position.y)
        .then_with(|| a.id.cmp(&b.id))
}

fn vertical_order<'a>(steps: impl Iterator<Item = &'a Node>) -> Vec<&'a Node> {
    let mut sorted: Vec<&Node> = steps.collect();
    sorted.sort_by(|a, b| by_canvas_position(a, b));
    sorted
}

fn topological_order(graph: &WorkflowGraph) -> Result<Vec<&Node>, EditorError> {
    let trigger = graph.trigger();

    // -----------------------------------------------------------------------
    // 1. Nodes reachable from the trigger
    // -----------------------------------------------------------------------
    let mut reachable: HashSet<&str> = HashSet::from([trigger.id.as_str()]);
    let mut frontier: VecDeque<&str> = VecDeque::from([trigger.id.as_str()]);
    while let Some(id) = frontier.pop_front() {
        for conn in graph.connections_from(id) {
            if reachable.insert(conn.target.as_str()) {
                frontier.push_back(conn.target.as_str());
            }
        }
    }

    // -----------------------------------------------------------------------
    // 2. Kahn's algorithm over the reachable subgraph
    // -----------------------------------------------------------------------
    let mut in_degree: HashMap<&str, usize> = reachable.iter().map(|&id| (id, 0)).collect();
    for conn in graph.connections() {
        if reachable.contains(conn.source.as_str()) {
            *in_degree.entry(conn.target.as_str()).or_insert(0) += 1;
        }
    }

    let mut ready: Vec<&Node> = graph
        .nodes()
        .iter()
        .filter(|n| in_degree.get(n.id.as_str()) == Some(&0))
        .collect();

    let mut sorted: Vec<&Node> = Vec::with_capacity(reachable.len());
    while !ready.is_empty() {
        ready.sort_by(|a, b| by_canvas_position(b, a));
        let Some(node) = ready.pop() else { break };
        sorted.push(node);

        for conn in graph.connections_from(&node.id) {
            if let Some(deg) = in_degree.get_mut(conn.target.as_str()) {
                *deg -= 1;
                if *deg == 0 {
                    if let Some(next) = graph.node(&conn.target) {
                        ready.push(next);
                    }
                }
            }
        }
    }

    // A reachable node still waiting on an edge sits on a cycle.
    if sorted.len() != reachable.len() {
        return Err(EditorError::CycleDetected);
    }

    // -----------------------------------------------------------------------
    // 3. Unreachable steps go last, top to bottom
    // -----------------------------------------------------------------------
    let detached = vertical_order(graph.steps().filter(|n| !reachable.contains(n.id.as_str())));

    Ok(sorted
        .into_iter()
        .filter(|n| !n.is_trigger())
        .chain(detached)
        .collect())
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodePatch, Position};
    use catalog::Catalog;

    fn make_graph(steps: &[(&str, f64)], edges: &[(&str, &str)]) -> WorkflowGraph {
        let catalog = Catalog::builtin();
        let entry = catalog.step("create_task").unwrap();
        let mut graph =
            WorkflowGraph::new(Node::unset_trigger("t", Position::new(0.0, 100.0))).unwrap();
        for (id, y) in steps {
            graph.add_node(Node::from_entry(*id, entry, Position::new(0.0, *y))).unwrap();
        }
        for (from, to) in edges {
            graph.add_connection(from, to).unwrap();
        }
        graph
    }

    fn ids(nodes: Vec<&Node>) -> Vec<&str> {
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn linear_chain_follows_connections_not_position() {
        // t → a → b, but b has been dragged above a.
        let graph = make_graph(&[("a", 400.0), ("b", 250.0)], &[("t", "a"), ("a", "b")]);

        let topo = execution_order(&graph, ActionOrdering::Topology).unwrap();
        assert_eq!(ids(topo), vec!["a", "b"]);

        let vertical = execution_order(&graph, ActionOrdering::Vertical).unwrap();
        assert_eq!(ids(vertical), vec!["b", "a"]);
    }

    #[test]
    fn branches_break_ties_by_position() {
        //     t
        //    / \
        //   a   b   (b drawn higher)
        //    \ /
        //     c
        let graph = make_graph(
            &[("a", 300.0), ("b", 250.0), ("c", 500.0)],
            &[("t", "a"), ("t", "b"), ("a", "c"), ("b", "c")],
        );
        let order = execution_order(&graph, ActionOrdering::Topology).unwrap();
        assert_eq!(ids(order), vec!["b", "a", "c"]);
    }

    #[test]
    fn detached_steps_follow_in_vertical_order() {
        let graph = make_graph(&[("a", 250.0), ("x", 600.0), ("y", 500.0)], &[("t", "a")]);
        let order = execution_order(&graph, ActionOrdering::Topology).unwrap();
        assert_eq!(ids(order), vec!["a", "y", "x"]);
    }

    #[test]
    fn unconnected_steps_sort_by_position() {
        let graph = make_graph(&[("late", 400.0), ("early", 250.0)], &[]);
        let order = execution_order(&graph, ActionOrdering::Topology).unwrap();
        assert_eq!(ids(order), vec!["early", "late"]);
    }

    #[test]
    fn cycle_is_detected() {
        // t → a → b → a  (back-edge)
        let graph = make_graph(
            &[("a", 250.0), ("b", 400.0)],
            &[("t", "a"), ("a", "b"), ("b", "a")],
        );
        assert!(matches!(
            execution_order(&graph, ActionOrdering::Topology),
            Err(EditorError::CycleDetected)
        ));
    }

    #[test]
    fn cycle_outside_trigger_reach_is_ignored() {
        let graph = make_graph(&[("a", 250.0), ("b", 400.0)], &[("a", "b"), ("b", "a")]);
        let order = execution_order(&graph, ActionOrdering::Topology).unwrap();
        assert_eq!(ids(order), vec!["a", "b"]);
    }

    #[test]
    fn moving_a_node_reorders_vertical_only() {
        let mut graph = make_graph(&[("a", 250.0), ("b", 400.0)], &[("t", "a"), ("a", "b")]);
        graph.update_node("a", NodePatch::position(Position::new(0.0, 900.0))).unwrap();

        assert_eq!(ids(execution_order(&graph, ActionOrdering::Topology).unwrap()), vec!["a", "b"]);
        assert_eq!(ids(execution_order(&graph, ActionOrdering::Vertical).unwrap()), vec!["b", "a"]);
    }
}
