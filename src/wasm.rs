//! WebAssembly bindings for prodchain.
//!
//! This module exposes the resolver to JavaScript through JSON strings.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::catalog::Catalog;
use crate::display::{format_chain, format_dot};
use crate::error::ResolveError;
use crate::graph::ProductionGraph;
use crate::ledger::Ledger;
use crate::resolver::{ChainNode, ResolveOptions, Resolver};
use crate::total::TotalLine;

/// What the caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsMode {
    #[default]
    Tree,
    Total,
    Graph,
}

/// JavaScript-friendly resolution request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsResolveInput {
    pub item: String,
    /// Items per minute; the recipe's nominal rate when absent or zero.
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub mode: JsMode,
    #[serde(flatten)]
    pub options: ResolveOptions,
}

/// JavaScript-friendly resolution result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsResolveResult {
    pub success: bool,
    pub error: Option<String>,
    pub suggestion: Option<String>,
    pub rate: f64,
    pub tree: Option<ChainNode>,
    pub tree_text: Option<String>,
    pub ledger: Option<Ledger>,
    pub totals: Option<Vec<TotalLine>>,
    pub graph: Option<ProductionGraph>,
    pub dot: Option<String>,
}

impl JsResolveResult {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn log_warning(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_warning(message: &str) {
    tracing::warn!("{}", message);
}

fn run(catalog: &Catalog, input: JsResolveInput) -> Result<JsResolveResult, ResolveError> {
    let recipe = catalog.default_recipe(&input.item)?;
    let rate = match input.rate {
        Some(rate) if rate != 0.0 => rate,
        _ => recipe.output.rate,
    };
    let resolver = Resolver::new(catalog, input.options);

    let mut result = JsResolveResult {
        success: true,
        rate,
        ..JsResolveResult::default()
    };
    match input.mode {
        JsMode::Tree => {
            let resolution = resolver.resolve_recipe(recipe, rate)?;
            result.tree_text = Some(format_chain(&resolution.tree));
            result.ledger = Some(resolution.ledger.netted());
            result.tree = Some(resolution.tree);
        }
        JsMode::Total => {
            let totals = resolver.total_recipe(recipe, rate)?;
            result.totals = Some(totals.lines);
            result.ledger = Some(totals.ledger);
        }
        JsMode::Graph => {
            let graph = resolver.graph(&input.item, rate)?;
            result.dot = Some(format_dot(&graph));
            result.graph = Some(graph);
        }
    }
    Ok(result)
}

/// Resolve a production chain described by a JSON request.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn resolve(input_json: &str) -> String {
    let result = match serde_json::from_str::<JsResolveInput>(input_json) {
        Err(e) => {
            let message = format!("Invalid input: {}", e);
            log_warning(&message);
            JsResolveResult::failure(message)
        }
        Ok(input) => match Catalog::builtin() {
            Err(e) => JsResolveResult::failure(e.to_string()),
            Ok(catalog) => match run(&catalog, input) {
                Ok(result) => result,
                Err(ResolveError::NotFound { query }) => JsResolveResult {
                    suggestion: catalog.suggest(&query).map(str::to_string),
                    ..JsResolveResult::failure(ResolveError::NotFound { query }.to_string())
                },
                Err(e) => JsResolveResult::failure(e.to_string()),
            },
        },
    };

    serde_json::to_string(&result).unwrap_or_default()
}

/// Get the version of the resolver.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get every producible item with its number of recipes.
/// Returns JSON array of item names and alternate counts.
#[wasm_bindgen]
pub fn get_available_items() -> String {
    #[derive(Serialize)]
    struct ItemInfo<'a> {
        name: &'a str,
        building: &'static str,
        recipes: u32,
    }

    let catalog = match Catalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            log_warning(&e.to_string());
            return "[]".to_string();
        }
    };
    let available: Vec<ItemInfo> = catalog
        .item_names()
        .into_iter()
        .filter_map(|name| {
            catalog.recipe_for(name, 0).map(|recipe| ItemInfo {
                name,
                building: recipe.building.name(true),
                recipes: catalog.count_producing(name),
            })
        })
        .collect();

    serde_json::to_string(&available).unwrap_or_default()
}
