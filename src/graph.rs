//! Structural graph emission.
//!
//! Walks a chain the same way the tree expansion does, but instead of
//! touching a ledger it emits one node record per recipe invocation and one
//! edge record per produced input. Nodes come out pre-order and each edge
//! follows its child's subtree, so an edge never refers to a node that has
//! not been emitted yet.

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::ResolveError;
use crate::models::{rates_equal, Item, Recipe};
use crate::resolver::{check_rate, round_up_ratio, ActivePath, ResolveOptions, Resolver};

/// Lowercases a name and maps every non-alphanumeric character to `_`.
///
/// ```
/// use prodchain::graph::slug;
///
/// assert_eq!(slug("High-Speed Connector"), "high_speed_connector");
/// ```
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Joins the words of a name in camel case.
///
/// ```
/// use prodchain::graph::camel;
///
/// assert_eq!(camel("heavy modular frame"), "heavyModularFrame");
/// ```
pub fn camel(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for (i, word) in name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                result.extend(first.to_lowercase());
            } else {
                result.extend(first.to_uppercase());
            }
            result.extend(chars.flat_map(char::to_lowercase));
        }
    }
    result
}

/// A named connection point on a node, carrying one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub port: String,
    pub item: String,
}

impl Port {
    fn for_item(item: &Item) -> Self {
        Self {
            port: slug(&item.name),
            item: item.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub inputs: Vec<Port>,
    pub scale: f64,
    pub output: Port,
    pub extra_output: Option<Port>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub child_id: String,
    pub child_port: String,
    pub parent_id: String,
    pub parent_port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphRecord {
    Node(GraphNode),
    Edge(GraphEdge),
}

/// Ordered node and edge records for one chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionGraph {
    /// Camel-cased root item, used as the digraph name.
    pub name: String,
    pub records: Vec<GraphRecord>,
}

impl ProductionGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.records.iter().filter_map(|record| match record {
            GraphRecord::Node(node) => Some(node),
            GraphRecord::Edge(_) => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.records.iter().filter_map(|record| match record {
            GraphRecord::Edge(edge) => Some(edge),
            GraphRecord::Node(_) => None,
        })
    }
}

struct Emitter<'a> {
    catalog: &'a Catalog,
    options: ResolveOptions,
    next_index: u32,
    records: Vec<GraphRecord>,
    path: ActivePath,
}

impl<'a> Emitter<'a> {
    fn emit(&mut self, recipe: &Recipe, requested: f64) -> Result<String, ResolveError> {
        self.path.enter(&recipe.output.name)?;

        let mut ratio = requested / recipe.output.rate;
        if self.options.overproduce {
            let rounded = round_up_ratio(ratio);
            if !rates_equal(rounded, ratio) {
                ratio = rounded;
            }
        }

        let id = format!("{}{}", slug(&recipe.output.name), self.next_index);
        self.next_index += 1;
        debug!(id = %id, scale = ratio, "emitting graph node");
        self.records.push(GraphRecord::Node(GraphNode {
            id: id.clone(),
            inputs: recipe.inputs.iter().map(Port::for_item).collect(),
            scale: ratio,
            output: Port::for_item(&recipe.output),
            extra_output: recipe.extra_output.as_ref().map(Port::for_item),
        }));

        for input in &recipe.inputs {
            if self.catalog.count_producing(&input.name) == 0 {
                continue;
            }
            let child = self.catalog.alternate(&input.name, 0)?;
            let child_id = self.emit(child, input.rate * ratio)?;
            let port = slug(&input.name);
            self.records.push(GraphRecord::Edge(GraphEdge {
                child_id,
                child_port: port.clone(),
                parent_id: id.clone(),
                parent_port: port,
            }));
        }

        self.path.leave();
        Ok(id)
    }
}

/// Emits the node/edge records for the chain rooted at `recipe`.
///
/// Only overproduction rounding is taken from `options`; surplus reuse and
/// alternates do not apply to graphs.
pub fn emit_graph(
    catalog: &Catalog,
    recipe: &Recipe,
    rate: f64,
    options: ResolveOptions,
) -> Result<ProductionGraph, ResolveError> {
    check_rate(rate)?;
    let mut emitter = Emitter {
        catalog,
        options,
        next_index: 0,
        records: Vec::new(),
        path: ActivePath::default(),
    };
    emitter.emit(recipe, rate)?;
    Ok(ProductionGraph {
        name: camel(&recipe.output.name),
        records: emitter.records,
    })
}

impl<'a> Resolver<'a> {
    /// Emits the graph for the default recipe of `item`.
    ///
    /// ```
    /// use prodchain::catalog::Catalog;
    /// use prodchain::resolver::{ResolveOptions, Resolver};
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// let resolver = Resolver::new(&catalog, ResolveOptions::default());
    /// let graph = resolver.graph("iron plate", 20.0).unwrap();
    ///
    /// let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    /// assert_eq!(ids, ["iron_plate0", "iron_ingot1"]);
    /// assert_eq!(graph.edges().count(), 1);
    /// ```
    pub fn graph(&self, item: &str, rate: f64) -> Result<ProductionGraph, ResolveError> {
        let recipe = self.catalog().default_recipe(item)?;
        emit_graph(self.catalog(), recipe, rate, self.options())
    }
}
