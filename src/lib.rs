//! # Prodchain
//!
//! A command-line tool and library for planning production chains in a
//! multi-stage crafting network.
//!
//! Given a target item and an output rate, the resolver recursively works out
//! how much of every intermediate item must be made, how many buildings of
//! each kind are needed and which raw inputs are consumed.
//!
//! ## Modules
//!
//! - [`models`] - Items, recipes and building kinds
//! - [`data`] - CSV recipe table loading
//! - [`catalog`] - Recipe lookup by output item, alternates and suggestions
//! - [`ledger`] - Consumed / produced / building accumulator and netting
//! - [`resolver`] - Tree expansion with optional overproduction and alternates
//! - [`total`] - Aggregate totals across the whole chain
//! - [`graph`] - Node/edge graph emission
//! - [`display`] - Text and Graphviz rendering
//! - [`error`] - Error types
//! - [`wasm`] - WebAssembly bindings
//!
//! ## Example Usage
//!
//! ```
//! use prodchain::{
//!     catalog::Catalog,
//!     display::{format_chain, format_ledger},
//!     resolver::{ResolveOptions, Resolver},
//! };
//!
//! let catalog = Catalog::builtin().unwrap();
//! let resolver = Resolver::new(&catalog, ResolveOptions::overproducing());
//!
//! let mut resolution = resolver.resolve("reinforced iron plate", 5.0).unwrap();
//! println!("{}", format_chain(&resolution.tree));
//!
//! resolution.ledger.net();
//! println!("{}", format_ledger(&resolution.ledger));
//! ```
//!
//! ## Modes
//!
//! 1. **Tree** (default): one invocation per branch, with optional rounding
//!    up to whole buildings and reuse of the resulting surplus.
//!
//! 2. **Total**: demand summed per item across the chain, classified as
//!    intermediate, final product or raw input.
//!
//! 3. **Graph**: node and edge records for a Graphviz rendering.

pub mod catalog;
pub mod data;
pub mod display;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod models;
pub mod resolver;
pub mod total;
pub mod wasm;
