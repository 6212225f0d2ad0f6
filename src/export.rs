//! Output formats for the assembled friend graph.
//!
//! ```text
//! FriendGraph → graph.gexf                  (Gephi)
//!             → network_visualization.html  (vis-network page)
//!             → graph.dot                   (Graphviz)
//!             → friends.csv                 (one row per vertex)
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use petgraph::dot::{Config, Dot};
use petgraph::visit::EdgeRef;
use serde_json::json;
use tracing::info;

use crate::error::ExportError;
use crate::friend::{Friend, Sex};
use crate::reconcile::FriendGraph;

const GEXF_FILE: &str = "graph.gexf";
const HTML_FILE: &str = "network_visualization.html";
const DOT_FILE: &str = "graph.dot";
const CSV_FILE: &str = "friends.csv";

/// GEXF attribute table for vertices: (title, type).
const NODE_ATTRIBUTES: [(&str, &str); 9] = [
    ("name_label", "string"),
    ("sex", "string"),
    ("byear", "string"),
    ("id", "long"),
    ("city", "string"),
    ("country", "string"),
    ("faculty_name", "string"),
    ("university_name", "string"),
    ("n_friends", "integer"),
];

fn sex_marker(sex: Sex) -> &'static str {
    match sex {
        Sex::Female => "ж",
        Sex::Male => "м",
    }
}

fn attribute_values(friend: &Friend) -> [String; 9] {
    [
        friend.name_label.clone(),
        sex_marker(friend.sex).to_string(),
        friend.byear.clone(),
        friend.id.to_string(),
        friend.city.clone(),
        friend.country.clone(),
        friend.faculty_name.clone(),
        friend.university_name.clone(),
        friend.n_friends.to_string(),
    ]
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
    out
}

pub fn write_gexf(graph: &FriendGraph, writer: &mut dyn Write) -> io::Result<()> {
    let g = graph.graph();

    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#)?;
    writeln!(writer, r#"  <graph mode="static" defaultedgetype="undirected">"#)?;

    writeln!(writer, r#"    <attributes class="node">"#)?;
    for (i, (title, kind)) in NODE_ATTRIBUTES.iter().enumerate() {
        writeln!(writer, r#"      <attribute id="{}" title="{}" type="{}"/>"#, i, title, kind)?;
    }
    writeln!(writer, "    </attributes>")?;

    writeln!(writer, "    <nodes>")?;
    for node in g.node_indices() {
        let friend = &g[node];
        writeln!(
            writer,
            r#"      <node id="{}" label="{}">"#,
            node.index(),
            escape_xml(&friend.name)
        )?;
        writeln!(writer, "        <attvalues>")?;
        for (i, value) in attribute_values(friend).iter().enumerate() {
            writeln!(
                writer,
                r#"          <attvalue for="{}" value="{}"/>"#,
                i,
                escape_xml(value)
            )?;
        }
        writeln!(writer, "        </attvalues>")?;
        writeln!(writer, "      </node>")?;
    }
    writeln!(writer, "    </nodes>")?;

    writeln!(writer, "    <edges>")?;
    for edge in g.edge_references() {
        writeln!(
            writer,
            r#"      <edge id="{}" source="{}" target="{}" weight="{}"/>"#,
            edge.id().index(),
            edge.source().index(),
            edge.target().index(),
            edge.weight()
        )?;
    }
    writeln!(writer, "    </edges>")?;

    writeln!(writer, "  </graph>")?;
    writeln!(writer, "</gexf>")
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Friend network</title>
<script src="https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js"></script>
<style>
  #network { width: 100%; height: 750px; border: 1px solid lightgray; }
</style>
</head>
<body>
<div id="network"></div>
<script>
  var nodes = new vis.DataSet(__NODES__);
  var edges = new vis.DataSet(__EDGES__);
  var options = {
    physics: { solver: "forceAtlas2Based", stabilization: { iterations: 200 } },
    edges: { scaling: { min: 1, max: 8 } }
  };
  new vis.Network(document.getElementById("network"), { nodes: nodes, edges: edges }, options);
</script>
</body>
</html>
"#;

fn tooltip(friend: &Friend) -> String {
    let mut lines = vec![friend.name.clone()];
    if !friend.city.is_empty() {
        lines.push(friend.city.clone());
    }
    if !friend.university_name.is_empty() {
        lines.push(friend.university_name.clone());
    }
    lines.push(format!("{} friends", friend.n_friends));
    lines.join("\n")
}

pub fn write_html(graph: &FriendGraph, writer: &mut dyn Write) -> Result<(), ExportError> {
    let g = graph.graph();

    let nodes: Vec<_> = g
        .node_indices()
        .map(|node| {
            let friend = &g[node];
            json!({
                "id": node.index(),
                "label": friend.name_label,
                "title": tooltip(friend),
                "group": sex_marker(friend.sex),
            })
        })
        .collect();

    let edges: Vec<_> = g
        .edge_references()
        .map(|edge| {
            json!({
                "from": edge.source().index(),
                "to": edge.target().index(),
                "value": edge.weight(),
                "title": format!("{} mutual friends", edge.weight()),
            })
        })
        .collect();

    // "</" inside a script block would close it early.
    let nodes = serde_json::to_string(&nodes)?.replace("</", "<\\/");
    let edges = serde_json::to_string(&edges)?.replace("</", "<\\/");
    let page = HTML_TEMPLATE
        .replace("__NODES__", &nodes)
        .replace("__EDGES__", &edges);

    writer.write_all(page.as_bytes()).map_err(|source| ExportError::Io {
        path: HTML_FILE.to_string(),
        source,
    })
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

pub fn to_dot(graph: &FriendGraph) -> String {
    let viz = Dot::with_attr_getters(
        graph.graph(),
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &|_, edge| format!("label=\"{}\"", edge.weight()),
        &|_, (_, friend)| format!("label=\"{}\"", escape_dot(&friend.name_label)),
    );
    format!("{:?}", viz)
}

pub fn write_csv(graph: &FriendGraph, writer: &mut dyn Write) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for friend in graph.graph().node_weights() {
        csv_writer.serialize(friend)?;
    }
    csv_writer.flush().map_err(|source| ExportError::Io {
        path: CSV_FILE.to_string(),
        source,
    })
}

fn write_file<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), ExportError>,
{
    let io_error = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    write(&mut writer)?;
    writer.flush().map_err(io_error)
}

/// Writes every output format into `dir`, creating it if needed.
pub fn export_all(graph: &FriendGraph, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let gexf = dir.join(GEXF_FILE);
    write_file(&gexf, |w| {
        write_gexf(graph, w).map_err(|source| ExportError::Io {
            path: gexf.display().to_string(),
            source,
        })
    })?;

    let html = dir.join(HTML_FILE);
    write_file(&html, |w| write_html(graph, w))?;

    let dot = dir.join(DOT_FILE);
    write_file(&dot, |w| {
        w.write_all(to_dot(graph).as_bytes())
            .map_err(|source| ExportError::Io {
                path: dot.display().to_string(),
                source,
            })
    })?;

    let csv = dir.join(CSV_FILE);
    write_file(&csv, |w| write_csv(graph, w))?;

    let written = vec![gexf, html, dot, csv];
    for path in &written {
        info!("wrote {}", path.display());
    }
    Ok(written)
}
