use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::api::SocialApi;
use crate::error::ApiError;
use crate::friend::{normalize_all, Friend, DEFAULT_FIELDS};

/// Undirected edge between two vertex names, stored in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(pub String, pub String);

impl Edge {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Edge(a.to_string(), b.to_string())
        } else {
            Edge(b.to_string(), a.to_string())
        }
    }

    pub fn touches(&self, name: &str) -> bool {
        self.0 == name || self.1 == name
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Output of edge discovery. `edges[i]` carries `mutual_counts[i]`.
#[derive(Debug, Default)]
pub struct Discovery {
    pub friends: Vec<Friend>,
    pub edges: Vec<Edge>,
    pub mutual_counts: Vec<u32>,
    pub failed: Vec<u64>,
}

/// Normalized friend list of `user`, or of the authenticated account when `None`.
pub fn fetch_neighbors<A: SocialApi + ?Sized>(
    api: &A,
    user: Option<u64>,
) -> Result<Vec<Friend>, ApiError> {
    let raw = api.get_neighbors(user, &DEFAULT_FIELDS)?;
    Ok(normalize_all(&raw))
}

/// Number of mutual friends of the two endpoints, `None` when the lookup failed.
pub fn mutual_count<A: SocialApi + ?Sized>(
    api: &A,
    edge: &Edge,
    source: u64,
    target: u64,
) -> Option<u32> {
    match api.get_mutual_neighbors(source, target) {
        Ok(ids) => Some(ids.len() as u32),
        Err(e) => {
            warn!("skipping mutual friend check for {}: {}", edge, e);
            None
        }
    }
}

/// Walks every primary vertex, keeps each neighbor that is itself a primary
/// vertex, and records one edge per unordered pair together with its mutual
/// friend count. `excluded` never becomes an endpoint.
pub fn discover_edges<A: SocialApi + ?Sized>(
    api: &A,
    primary: Vec<Friend>,
    excluded: &str,
) -> Discovery {
    let primary_ids: HashSet<u64> = primary.iter().map(|f| f.id).collect();
    let total = primary.len();
    let mut seen: HashSet<Edge> = HashSet::new();
    let mut discovery = Discovery::default();

    for (i, mut friend) in primary.into_iter().enumerate() {
        let neighbors = match fetch_neighbors(api, Some(friend.id)) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                warn!("skipping friend {} (id {}): {}", friend.name, friend.id, e);
                friend.n_friends = 0;
                discovery.failed.push(friend.id);
                discovery.friends.push(friend);
                continue;
            }
        };

        for neighbor in &neighbors {
            if !primary_ids.contains(&neighbor.id) {
                continue;
            }
            let edge = Edge::new(&friend.name, &neighbor.name);
            if edge.touches(excluded) || seen.contains(&edge) {
                continue;
            }

            let count = mutual_count(api, &edge, friend.id, neighbor.id).unwrap_or(0);
            debug!("edge {} with {} mutual friends", edge, count);
            seen.insert(edge.clone());
            discovery.edges.push(edge);
            discovery.mutual_counts.push(count);
        }

        friend.n_friends = neighbors.len();
        info!(
            "[{}/{}] {}: {} friends, {} edges so far",
            i + 1,
            total,
            friend.name,
            friend.n_friends,
            discovery.edges.len()
        );
        discovery.friends.push(friend);
    }

    discovery
}
