//! Text rendering of resolutions, ledgers, totals and graphs.
//!
//! Every function returns a `String`; printing is left to the caller.

use crate::graph::{GraphRecord, ProductionGraph};
use crate::ledger::Ledger;
use crate::resolver::{ChainNode, InputFlow};
use crate::total::{TotalLine, TotalProduction};

const INDENT: &str = "  ";

fn push_line(out: &mut String, indent: usize, line: &str) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

/// Formats a rate the way every listing shows it.
///
/// ```
/// use prodchain::display::format_rate;
///
/// assert_eq!(format_rate(7.5), " 7.50");
/// assert_eq!(format_rate(120.0), "120.00");
/// ```
pub fn format_rate(rate: f64) -> String {
    format!("{:5.2}", rate)
}

/// Renders the expansion tree, two spaces per level.
///
/// # Example
///
/// ```
/// use prodchain::catalog::Catalog;
/// use prodchain::display::format_chain;
/// use prodchain::resolver::{ResolveOptions, Resolver};
///
/// let catalog = Catalog::builtin().unwrap();
/// let resolution = Resolver::new(&catalog, ResolveOptions::default())
///     .resolve("iron plate", 20.0)
///     .unwrap();
///
/// assert_eq!(
///     format_chain(&resolution.tree),
///     "iron plate: 20.00 per minute (1.0x)\n  \
///      iron ingot: 30.00 per minute (1.0x)\n    \
///      iron ore: 30.00 per minute\n"
/// );
/// ```
pub fn format_chain(node: &ChainNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &ChainNode, indent: usize) {
    push_line(
        out,
        indent,
        &format!(
            "{}: {} per minute ({:3.1}x)",
            node.item,
            format_rate(node.requested_rate),
            node.ratio
        ),
    );
    if let Some(over) = node.overproduced {
        push_line(
            out,
            indent,
            &format!(
                "{}: OVERPRODUCING: From {} to {} per minute ({:3.1}x)",
                node.item,
                format_rate(node.requested_rate),
                format_rate(over.rate),
                over.ratio
            ),
        );
    }

    let indent = indent + 1;
    for input in &node.inputs {
        match input {
            InputFlow::Raw { item, rate } => {
                push_line(out, indent, &format!("{}: {} per minute", item, format_rate(*rate)));
            }
            InputFlow::Surplus { item, .. } => {
                push_line(out, indent, &format!("{}: already produced previously", item));
            }
            InputFlow::Produced {
                item,
                reused,
                node,
                alternates,
                ..
            } => {
                if *reused > 0.0 {
                    push_line(
                        out,
                        indent,
                        &format!("{}: USING EXTRA {} per minute", item, format_rate(*reused)),
                    );
                }
                write_node(out, node, indent);
                if !alternates.is_empty() {
                    push_line(out, indent, "alternates:");
                    for alternate in alternates {
                        write_node(out, &alternate.node, indent + 1);
                        push_line(out, indent + 2, &format!("=> {}", format_cost(&alternate.ledger)));
                    }
                }
            }
        }
    }
}

/// One-line summary of a netted ledger: external inputs and power.
pub fn format_cost(ledger: &Ledger) -> String {
    let inputs: Vec<String> = ledger
        .consumed_items()
        .map(|(name, rate)| format!("{} {:.2}", name, rate))
        .collect();
    let inputs = if inputs.is_empty() {
        "nothing".to_string()
    } else {
        inputs.join(", ")
    };
    format!("consumes {} per minute, {:.1} MW", inputs, ledger.total_power())
}

/// Renders the consumed, produced and building sections of a ledger.
pub fn format_ledger(ledger: &Ledger) -> String {
    let mut out = String::new();

    out.push_str("Consumed:\n");
    for (name, rate) in ledger.consumed_items() {
        push_line(&mut out, 1, &format!("{} : {} / minute", name, format_rate(rate)));
    }

    out.push_str("Produced:\n");
    for (name, rate) in ledger.produced_items() {
        push_line(&mut out, 1, &format!("{} : {} / minute", name, format_rate(rate)));
    }

    out.push_str("Buildings:\n");
    for (building, count) in ledger.building_usage() {
        push_line(
            &mut out,
            1,
            &format!(
                "{} : {:5.2}x, {:5.1} MW",
                building.name(count == 1.0),
                count,
                count * building.power_mw()
            ),
        );
    }
    push_line(
        &mut out,
        0,
        &format!("Total power usage: {:5.1}MW", ledger.total_power()),
    );

    out
}

fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "byproduct".to_string(), |r| format!("{:3.1}x", r))
}

/// Renders the aggregate report.
pub fn format_totals(totals: &TotalProduction) -> String {
    let mut out = String::new();
    for line in &totals.lines {
        match line {
            TotalLine::Intermediate {
                item,
                rate,
                ratio,
                extra,
            } => {
                push_line(
                    &mut out,
                    0,
                    &format!(
                        "Intermediate {}: {} per minute ({})",
                        item,
                        format_rate(*rate),
                        format_ratio(*ratio)
                    ),
                );
                if let Some(extra) = extra {
                    push_line(&mut out, 1, &format!("Extras: {} per minute", format_rate(*extra)));
                }
            }
            TotalLine::FinalProduct { item, rate, ratio } => {
                push_line(
                    &mut out,
                    0,
                    &format!(
                        "Producing {}: {} per minute ({})",
                        item,
                        format_rate(*rate),
                        format_ratio(*ratio)
                    ),
                );
            }
            TotalLine::RawInput { item, rate } => {
                push_line(&mut out, 0, &format!("Consuming {}: {} per minute", item, format_rate(*rate)));
            }
        }
    }
    out
}

/// Renders a graph as a Graphviz `digraph` with record-shaped nodes.
pub fn format_dot(graph: &ProductionGraph) -> String {
    let mut out = String::new();
    push_line(&mut out, 0, &format!("digraph {} {{", graph.name));
    push_line(&mut out, 1, "rankdir=LR;");
    push_line(&mut out, 1, "ranksep=\"1\";");
    out.push('\n');

    for record in &graph.records {
        match record {
            GraphRecord::Node(node) => {
                let inputs: Vec<String> = node
                    .inputs
                    .iter()
                    .map(|p| format!("<{}>{}", p.port, p.item))
                    .collect();
                let mut outputs = format!("<{}>{}", node.output.port, node.output.item);
                if let Some(extra) = &node.extra_output {
                    outputs.push_str(&format!("|<{}>{}", extra.port, extra.item));
                }
                push_line(
                    &mut out,
                    1,
                    &format!(
                        "{} [shape=record, label=\"{{{{{}}}|{:3.1}|{{{}}}}}\"];",
                        node.id,
                        inputs.join("|"),
                        node.scale,
                        outputs
                    ),
                );
            }
            GraphRecord::Edge(edge) => {
                push_line(
                    &mut out,
                    1,
                    &format!(
                        "{}:{} -> {}:{}",
                        edge.child_id, edge.child_port, edge.parent_id, edge.parent_port
                    ),
                );
            }
        }
    }

    push_line(&mut out, 0, "}");
    out
}
