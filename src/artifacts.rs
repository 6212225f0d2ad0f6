//! Intermediate files handed from the collection phase to graph assembly.
//!
//! The edge list holds one edge per line as `First Last First2 Last2`, and
//! line `i` of the attribute list holds the mutual friend count of edge `i`.
//! Names are expected to contain exactly one space each; a first or last
//! name with internal whitespace cannot be read back.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::collection::Edge;
use crate::error::ArtifactError;
use crate::friend::Friend;

const FRIENDS_FILE: &str = "friends_list.json";
const EDGES_FILE: &str = "edges.txt";
const ATTRIBUTES_FILE: &str = "edges_attributes.txt";

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub friends: PathBuf,
    pub edges: PathBuf,
    pub attributes: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            friends: dir.join(FRIENDS_FILE),
            edges: dir.join(EDGES_FILE),
            attributes: dir.join(ATTRIBUTES_FILE),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub fn ensure_dir(dir: &Path) -> Result<(), ArtifactError> {
    std::fs::create_dir_all(dir).map_err(io_error(dir))
}

fn create(path: &Path) -> Result<BufWriter<File>, ArtifactError> {
    File::create(path).map(BufWriter::new).map_err(io_error(path))
}

fn open(path: &Path) -> Result<BufReader<File>, ArtifactError> {
    File::open(path).map(BufReader::new).map_err(io_error(path))
}

/// Lines of `path` numbered from 1, without trailing blank lines. Blank
/// lines in the middle are kept so the line numbers of both files line up.
fn read_lines(path: &Path) -> Result<Vec<(usize, String)>, ArtifactError> {
    let mut lines = Vec::new();
    for (i, line) in open(path)?.lines().enumerate() {
        let line = line.map_err(io_error(path))?;
        lines.push((i + 1, line));
    }
    while lines.last().is_some_and(|(_, line)| line.trim().is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

pub fn store_friends(path: &Path, friends: &[Friend]) -> Result<(), ArtifactError> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, friends)?;
    writer.flush().map_err(io_error(path))?;
    info!("stored {} friends in {}", friends.len(), path.display());
    Ok(())
}

pub fn load_friends(path: &Path) -> Result<Vec<Friend>, ArtifactError> {
    let friends: Vec<Friend> = serde_json::from_reader(open(path)?)?;
    info!("loaded {} friends from {}", friends.len(), path.display());
    Ok(friends)
}

/// Parses `Ann Lee Bob Fox` into `("Ann Lee", "Bob Fox")`. Tokens are
/// separated by single spaces, so an empty first or last name survives.
pub fn parse_edge_line(line_no: usize, line: &str) -> Result<Edge, ArtifactError> {
    let tokens: Vec<&str> = line.trim_end_matches('\r').split(' ').collect();
    if tokens.len() != 4 {
        return Err(ArtifactError::MalformedEdge {
            line: line_no,
            found: tokens.len(),
            text: line.to_string(),
        });
    }
    Ok(Edge(
        format!("{} {}", tokens[0], tokens[1]),
        format!("{} {}", tokens[2], tokens[3]),
    ))
}

fn parse_attribute_line(line_no: usize, line: &str) -> Result<u32, ArtifactError> {
    line.trim()
        .parse::<u32>()
        .map_err(|_| ArtifactError::BadAttribute {
            line: line_no,
            text: line.to_string(),
        })
}

pub fn store_edges(
    paths: &ArtifactPaths,
    edges: &[Edge],
    mutual_counts: &[u32],
) -> Result<(), ArtifactError> {
    if edges.len() != mutual_counts.len() {
        return Err(ArtifactError::LengthMismatch {
            edges: edges.len(),
            attributes: mutual_counts.len(),
        });
    }

    let mut writer = create(&paths.edges)?;
    for edge in edges {
        writeln!(writer, "{} {}", edge.0, edge.1).map_err(io_error(&paths.edges))?;
    }
    writer.flush().map_err(io_error(&paths.edges))?;

    let mut writer = create(&paths.attributes)?;
    for count in mutual_counts {
        writeln!(writer, "{}", count).map_err(io_error(&paths.attributes))?;
    }
    writer.flush().map_err(io_error(&paths.attributes))?;

    info!("stored {} edges in {}", edges.len(), paths.edges.display());
    Ok(())
}

pub fn load_edges(paths: &ArtifactPaths) -> Result<(Vec<Edge>, Vec<u32>), ArtifactError> {
    let edges = read_lines(&paths.edges)?
        .iter()
        .map(|(n, line)| parse_edge_line(*n, line))
        .collect::<Result<Vec<_>, _>>()?;
    let counts = read_lines(&paths.attributes)?
        .iter()
        .map(|(n, line)| parse_attribute_line(*n, line))
        .collect::<Result<Vec<_>, _>>()?;

    if edges.len() != counts.len() {
        return Err(ArtifactError::LengthMismatch {
            edges: edges.len(),
            attributes: counts.len(),
        });
    }

    info!("loaded {} edges from {}", edges.len(), paths.edges.display());
    Ok((edges, counts))
}
