//! Graphviz DOT rendering of directly-follows graphs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::artifact::{Diagram, Dfg, Edge, PerformanceDfg};
use crate::config::RenderOptions;

const START_NODE: &str = "@@start";
const END_NODE: &str = "@@end";

/// Keep the `max` heaviest edges; ties go to the smaller edge key
pub fn select_edges<W: Copy>(
    edges: &BTreeMap<Edge, W>,
    weight: impl Fn(&W) -> u64,
    max: Option<usize>,
) -> Vec<(&Edge, W)> {
    let mut selected: Vec<(&Edge, W)> = edges.iter().map(|(edge, w)| (edge, *w)).collect();
    if let Some(max) = max {
        if max < selected.len() {
            // stable sort keeps key order among equal weights
            selected.sort_by(|a, b| weight(&b.1).cmp(&weight(&a.1)));
            selected.truncate(max);
            selected.sort_by(|a, b| a.0.cmp(b.0));
        }
    }
    selected
}

fn quote(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn format_seconds(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3_600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86_400.0 {
        format!("{:.1}h", seconds / 3_600.0)
    } else {
        format!("{:.1}d", seconds / 86_400.0)
    }
}

struct DotBuilder {
    out: String,
}

impl DotBuilder {
    fn new(options: &RenderOptions) -> Self {
        let mut out = String::from("digraph dfg {\n");
        let _ = writeln!(
            out,
            "  graph [rankdir={}, bgcolor={}];",
            options.rank_dir.name(),
            quote(&options.bgcolor)
        );
        out.push_str("  node [shape=box, style=\"rounded,filled\", fillcolor=\"#f2f2f2\", fontname=\"Helvetica\"];\n");
        out.push_str("  edge [fontname=\"Helvetica\"];\n");
        Self { out }
    }

    fn endpoints(&mut self) {
        let _ = writeln!(
            self.out,
            "  {} [shape=circle, label=\"\", width=0.3, fillcolor=\"#32a852\"];",
            quote(START_NODE)
        );
        let _ = writeln!(
            self.out,
            "  {} [shape=doublecircle, label=\"\", width=0.3, fillcolor=\"#e8543e\"];",
            quote(END_NODE)
        );
    }

    fn node(&mut self, activity: &str) {
        let _ = writeln!(self.out, "  {} [label={}];", quote(activity), quote(activity));
    }

    fn edge(&mut self, from: &str, to: &str, label: &str, penwidth: f64) {
        let _ = writeln!(
            self.out,
            "  {} -> {} [label={}, penwidth={:.2}];",
            quote(from),
            quote(to),
            quote(label),
            penwidth
        );
    }

    fn finish(mut self) -> Diagram {
        self.out.push_str("}\n");
        Diagram::new(self.out)
    }
}

fn penwidth(weight: u64, max_weight: u64) -> f64 {
    if max_weight == 0 {
        1.0
    } else {
        1.0 + 4.0 * weight as f64 / max_weight as f64
    }
}

/// Render the skeleton shared by both DFG flavours
fn render<W: Copy>(
    edges: &BTreeMap<Edge, W>,
    start_activities: &BTreeMap<String, u64>,
    end_activities: &BTreeMap<String, u64>,
    weight: impl Fn(&W) -> u64,
    label: impl Fn(&W) -> String,
    options: &RenderOptions,
) -> Diagram {
    let selected = select_edges(edges, &weight, options.max_num_edges);
    let max_weight = selected.iter().map(|(_, w)| weight(w)).max().unwrap_or(0);

    let activities: BTreeSet<&str> = selected
        .iter()
        .flat_map(|((pred, succ), _)| [pred.as_str(), succ.as_str()])
        .chain(start_activities.keys().map(String::as_str))
        .chain(end_activities.keys().map(String::as_str))
        .collect();

    let mut dot = DotBuilder::new(options);
    if !start_activities.is_empty() || !end_activities.is_empty() {
        dot.endpoints();
    }
    for activity in &activities {
        dot.node(activity);
    }
    for (activity, count) in start_activities {
        dot.edge(START_NODE, activity, &count.to_string(), 1.0);
    }
    for ((pred, succ), w) in &selected {
        dot.edge(pred, succ, &label(w), penwidth(weight(w), max_weight));
    }
    for (activity, count) in end_activities {
        dot.edge(activity, END_NODE, &count.to_string(), 1.0);
    }
    dot.finish()
}

/// DOT diagram of a frequency DFG, edges labelled with their counts
pub fn render_dfg(dfg: &Dfg, options: &RenderOptions) -> Diagram {
    render(
        &dfg.edges,
        &dfg.start_activities,
        &dfg.end_activities,
        |w| *w,
        |w| w.to_string(),
        options,
    )
}

/// DOT diagram of a performance DFG, edges labelled with mean waiting times
pub fn render_performance_dfg(dfg: &PerformanceDfg, options: &RenderOptions) -> Diagram {
    render(
        &dfg.edges,
        &dfg.start_activities,
        &dfg.end_activities,
        |w| w.count,
        |w| format_seconds(w.mean_seconds),
        options,
    )
}
