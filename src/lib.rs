//! Collects a VK user's friends and the friendships among them, then
//! assembles the result into an attributed undirected graph.
//!
//! ```text
//! friends.get (center) → normalize → discover_edges ─┬→ friends_list.json
//!                                                    ├→ edges.txt
//!                                                    └→ edges_attributes.txt
//! artifacts → assemble → FriendGraph → export_all (gexf, html, dot, csv)
//! ```

pub mod api;
pub mod artifacts;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod friend;
pub mod reconcile;

pub use api::{SocialApi, VkClient};
pub use collection::{discover_edges, fetch_neighbors, Discovery, Edge};
pub use config::{ApiConfig, CenterUser};
pub use error::{ApiError, ArtifactError, Error, ExportError, Result};
pub use friend::{Friend, Sex};
pub use reconcile::{assemble, FriendGraph};
