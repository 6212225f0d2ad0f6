//! Full pipeline against an in-memory social network: discovery, the
//! artifact checkpoint, reconciliation and export.

use std::collections::{HashMap, HashSet};

use friend_graph::artifacts::{self, ArtifactPaths};
use friend_graph::{assemble, discover_edges, export, fetch_neighbors, ApiError, Edge, SocialApi};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Friendships among ids; id 0 is the center account.
struct Network {
    people: HashMap<u64, Value>,
    friends: HashMap<u64, Vec<u64>>,
    private: HashSet<u64>,
}

impl Network {
    fn new(people: &[(u64, &str, &str)], links: &[(u64, u64)]) -> Self {
        let people = people
            .iter()
            .map(|&(id, first, last)| {
                let sex = if id % 2 == 0 { 1 } else { 2 };
                let record = json!({
                    "id": id,
                    "first_name": first,
                    "last_name": last,
                    "sex": sex,
                    "bdate": "1.1.1990",
                    "city": {"id": 1, "title": "Perm"}
                });
                (id, record)
            })
            .collect();
        let mut friends: HashMap<u64, Vec<u64>> = HashMap::new();
        for &(a, b) in links {
            friends.entry(a).or_default().push(b);
            friends.entry(b).or_default().push(a);
        }
        Network {
            people,
            friends,
            private: HashSet::new(),
        }
    }

    fn friend_ids(&self, id: u64) -> Vec<u64> {
        self.friends.get(&id).cloned().unwrap_or_default()
    }
}

impl SocialApi for Network {
    fn get_neighbors(&self, user: Option<u64>, _fields: &[&str]) -> Result<Vec<Value>, ApiError> {
        let id = user.unwrap_or(0);
        if self.private.contains(&id) {
            return Err(ApiError::Vk {
                code: 30,
                message: "This profile is private".to_string(),
            });
        }
        Ok(self
            .friend_ids(id)
            .iter()
            .filter_map(|f| self.people.get(f).cloned())
            .collect())
    }

    fn get_mutual_neighbors(&self, source: u64, target: u64) -> Result<Vec<u64>, ApiError> {
        let theirs: HashSet<u64> = self.friend_ids(target).into_iter().collect();
        Ok(self
            .friend_ids(source)
            .into_iter()
            .filter(|f| theirs.contains(f))
            .collect())
    }
}

fn sample_network() -> Network {
    Network::new(
        &[
            (0, "Me", "Center"),
            (1, "Ann", "Lee"),
            (2, "Bob", "Fox"),
            (3, "Cid", "Roe"),
            (4, "Dee", "Kay"),
            (9, "Out", "Sider"),
        ],
        &[
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (1, 2),
            (1, 3),
            (2, 3),
            (3, 9),
            (4, 9),
        ],
    )
}

#[test]
fn test_collect_checkpoint_and_assemble() {
    let api = sample_network();
    let primary = fetch_neighbors(&api, None).unwrap();
    assert_eq!(primary.len(), 4);

    let discovery = discover_edges(&api, primary, "Me Center");
    let mut expected = vec![
        Edge::new("Ann Lee", "Bob Fox"),
        Edge::new("Ann Lee", "Cid Roe"),
        Edge::new("Bob Fox", "Cid Roe"),
    ];
    expected.sort();
    let mut found = discovery.edges.clone();
    found.sort();
    assert_eq!(found, expected);
    // Ann and Bob share the center and Cid.
    assert_eq!(discovery.mutual_counts[0], 2);

    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    artifacts::store_friends(&paths.friends, &discovery.friends).unwrap();
    artifacts::store_edges(&paths, &discovery.edges, &discovery.mutual_counts).unwrap();

    let friends = artifacts::load_friends(&paths.friends).unwrap();
    let (edges, counts) = artifacts::load_edges(&paths).unwrap();
    assert_eq!(edges.len(), counts.len());

    let graph = assemble(friends, &edges, &counts).unwrap();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.friend("Cid Roe").unwrap().n_friends, 4);
    assert_eq!(graph.friend("Dee Kay").unwrap().n_friends, 2);
    assert_eq!(graph.mutual_count("Cid Roe", "Bob Fox"), Some(2));
    assert!(graph.edge_names().iter().all(|e| !e.touches("Me Center")));

    let out = dir.path().join("export");
    let written = export::export_all(&graph, &out).unwrap();
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn test_private_profile_is_skipped() {
    let mut api = sample_network();
    api.private.insert(2);

    let primary = fetch_neighbors(&api, None).unwrap();
    let discovery = discover_edges(&api, primary, "Me Center");

    assert_eq!(discovery.failed, vec![2]);
    let bob = discovery.friends.iter().find(|f| f.id == 2).unwrap();
    assert_eq!(bob.n_friends, 0);
    // Edges touching Bob are still found from Ann's and Cid's side.
    assert_eq!(discovery.edges.len(), 3);
}
