use crate::emit::render::{NodeStatus, RenderGraph};

fn fill_color(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Pass => "palegreen",
        NodeStatus::Fail => "salmon",
        NodeStatus::Skip => "lightgray",
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Emit a render graph as a DOT (Graphviz) diagram.
///
/// Nodes are filled by status. Dependency links are dashed and weighted so
/// they stand apart from test-to-group links.
pub fn emit_dot(graph: &RenderGraph, name: &str) -> String {
    let mut out = format!("digraph \"{}\" {{\n", escape(name));
    out.push_str("  node [style=filled];\n");

    for node in &graph.nodes {
        out.push_str(&format!(
            "  \"{}\" [fillcolor={}];\n",
            escape(&node.id),
            fill_color(node.status)
        ));
    }

    for link in &graph.links {
        let source = escape(&link.source);
        let target = escape(&link.target);
        if link.is_dependency() {
            out.push_str(&format!(
                "  \"{source}\" -> \"{target}\" [style=dashed, weight={}];\n",
                link.value
            ));
        } else {
            out.push_str(&format!("  \"{source}\" -> \"{target}\";\n"));
        }
    }

    out.push_str("}\n");
    out
}
