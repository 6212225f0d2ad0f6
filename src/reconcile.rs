use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{info, warn};

use crate::collection::Edge;
use crate::error::ArtifactError;
use crate::friend::Friend;

/// Assembled friend graph: one node per distinct name, edges weighted by
/// mutual friend count.
#[derive(Debug, Clone)]
pub struct FriendGraph {
    graph: UnGraph<Friend, u32>,
    index: HashMap<String, NodeIndex>,
}

impl FriendGraph {
    pub fn graph(&self) -> &UnGraph<Friend, u32> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn friend(&self, name: &str) -> Option<&Friend> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    pub fn mutual_count(&self, a: &str, b: &str) -> Option<u32> {
        let (&na, &nb) = (self.index.get(a)?, self.index.get(b)?);
        self.graph.find_edge(na, nb).map(|e| self.graph[e])
    }

    /// Every edge in canonical form, in insertion order.
    pub fn edge_names(&self) -> Vec<Edge> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| Edge::new(&self.graph[a].name, &self.graph[b].name))
            .collect()
    }
}

/// Joins the reloaded vertex list with the reloaded edge and attribute
/// lists. Friends sharing a name collapse into one node holding the last
/// record seen.
pub fn assemble(
    friends: Vec<Friend>,
    edges: &[Edge],
    mutual_counts: &[u32],
) -> Result<FriendGraph, ArtifactError> {
    if edges.len() != mutual_counts.len() {
        return Err(ArtifactError::LengthMismatch {
            edges: edges.len(),
            attributes: mutual_counts.len(),
        });
    }

    let mut graph = UnGraph::<Friend, u32>::with_capacity(friends.len(), edges.len());
    let mut index: HashMap<String, NodeIndex> = HashMap::new();

    for friend in friends {
        match index.get(&friend.name) {
            Some(&node) => {
                warn!(
                    "name collision on {:?}: id {} replaces id {}",
                    friend.name, friend.id, graph[node].id
                );
                graph[node] = friend;
            }
            None => {
                let name = friend.name.clone();
                let node = graph.add_node(friend);
                index.insert(name, node);
            }
        }
    }

    for (edge, &count) in edges.iter().zip(mutual_counts) {
        let lookup = |name: &str| {
            index.get(name).copied().ok_or_else(|| {
                ArtifactError::UnknownVertex(edge.0.clone(), edge.1.clone(), name.to_string())
            })
        };
        let (a, b) = (lookup(&edge.0)?, lookup(&edge.1)?);
        graph.update_edge(a, b, count);
    }

    info!(
        "assembled graph with {} vertices and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(FriendGraph { graph, index })
}
