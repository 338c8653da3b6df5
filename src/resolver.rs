//! Recursive production chain expansion.
//!
//! [`Resolver::resolve`] walks the catalog from a root item down to raw
//! resources, scaling each recipe to the demand placed on it and recording
//! the effect in a fresh [`Ledger`]. The walk also yields a [`ChainNode`]
//! tree describing each recipe invocation, which the display layer renders
//! as an indented listing.
//!
//! Only default recipes (alternate 0) are followed to satisfy demand.
//! Alternates can be shown alongside, each costed in its own ledger.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::ResolveError;
use crate::ledger::Ledger;
use crate::models::{rates_equal, Building, Recipe};

/// Switches for the tree expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Round each building count up to a whole number.
    #[serde(default)]
    pub overproduce: bool,
    /// Charge demand against surplus left by earlier branches.
    /// Only consulted together with `overproduce`.
    #[serde(default)]
    pub reuse_surplus: bool,
    /// Expand and cost every non-default alternate of each input.
    #[serde(default)]
    pub alternates: bool,
}

impl ResolveOptions {
    /// Overproduction with surplus reuse, the way `-o` runs it.
    pub fn overproducing() -> Self {
        Self {
            overproduce: true,
            reuse_surplus: true,
            alternates: false,
        }
    }

    pub fn reuses_surplus(&self) -> bool {
        self.overproduce && self.reuse_surplus
    }
}

/// Building count rounded up after overproduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overproduction {
    pub ratio: f64,
    pub rate: f64,
}

/// One recipe invocation in the expansion tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainNode {
    pub item: String,
    pub building: Building,
    pub depth: usize,
    /// Rate asked of this invocation.
    pub requested_rate: f64,
    /// `requested_rate / output rate`, before rounding.
    pub ratio: f64,
    pub overproduced: Option<Overproduction>,
    pub inputs: Vec<InputFlow>,
}

impl ChainNode {
    /// The ratio the recipe actually ran at.
    pub fn applied_ratio(&self) -> f64 {
        self.overproduced.map_or(self.ratio, |o| o.ratio)
    }

    /// The rate actually produced.
    pub fn produced_rate(&self) -> f64 {
        self.overproduced.map_or(self.requested_rate, |o| o.rate)
    }
}

/// How one input of a recipe invocation was satisfied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputFlow {
    /// No recipe produces the item; the rate is an external requirement.
    Raw { item: String, rate: f64 },
    /// Surplus from earlier branches covered the whole demand.
    Surplus { item: String, rate: f64 },
    /// Expanded through the default recipe, minus any `reused` surplus.
    Produced {
        item: String,
        rate: f64,
        reused: f64,
        node: Box<ChainNode>,
        alternates: Vec<AlternateChain>,
    },
}

/// A non-default recipe expanded for display, with what it would cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternateChain {
    pub node: ChainNode,
    pub ledger: Ledger,
}

/// The outcome of a tree expansion. The ledger is not netted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub tree: ChainNode,
    pub ledger: Ledger,
}

/// Item names on the recursion path, used to reject recipe cycles.
#[derive(Debug, Default)]
pub(crate) struct ActivePath(Vec<String>);

impl ActivePath {
    /// Fails with `CycleDetected` if `item` is already being expanded.
    pub(crate) fn check(&self, item: &str) -> Result<(), ResolveError> {
        if self.0.iter().any(|name| name == item) {
            let mut path = self.0.clone();
            path.push(item.to_string());
            return Err(ResolveError::CycleDetected {
                item: item.to_string(),
                path,
            });
        }
        Ok(())
    }

    pub(crate) fn enter(&mut self, item: &str) -> Result<(), ResolveError> {
        self.check(item)?;
        self.0.push(item.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.0.pop();
    }
}

pub(crate) fn check_rate(rate: f64) -> Result<(), ResolveError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ResolveError::InvalidRate { rate })
    }
}

/// Rounds a ratio up to a whole building count, ignoring float noise around
/// integers.
pub fn round_up_ratio(ratio: f64) -> f64 {
    let nearest = ratio.round();
    if rates_equal(ratio, nearest) {
        nearest
    } else {
        ratio.ceil()
    }
}

/// Scales recipes in the catalog to meet a requested output rate.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog, options: ResolveOptions) -> Self {
        Self { catalog, options }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Expands the default recipe for `item` at `rate` per minute.
    ///
    /// # Example
    ///
    /// ```
    /// use prodchain::catalog::Catalog;
    /// use prodchain::models::Building;
    /// use prodchain::resolver::{ResolveOptions, Resolver};
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// let resolver = Resolver::new(&catalog, ResolveOptions::default());
    /// let mut resolution = resolver.resolve("iron plate", 20.0).unwrap();
    /// resolution.ledger.net();
    ///
    /// assert_eq!(resolution.ledger.consumed("iron ore"), 30.0);
    /// assert_eq!(resolution.ledger.building_count(Building::Constructor), 1.0);
    /// ```
    pub fn resolve(&self, item: &str, rate: f64) -> Result<Resolution, ResolveError> {
        let recipe = self.catalog.default_recipe(item)?;
        self.resolve_recipe(recipe, rate)
    }

    /// Expands a specific recipe, e.g. a root alternate, at `rate` per minute.
    pub fn resolve_recipe(&self, recipe: &Recipe, rate: f64) -> Result<Resolution, ResolveError> {
        check_rate(rate)?;
        let mut ledger = Ledger::new();
        let mut path = ActivePath::default();
        let tree = self.expand(&mut ledger, recipe, rate, 0, &mut path, self.options.alternates)?;
        info!(
            item = %recipe.output.name,
            rate,
            power = ledger.total_power(),
            "resolved production chain"
        );
        Ok(Resolution { tree, ledger })
    }

    fn expand(
        &self,
        ledger: &mut Ledger,
        recipe: &Recipe,
        requested: f64,
        depth: usize,
        path: &mut ActivePath,
        show_alternates: bool,
    ) -> Result<ChainNode, ResolveError> {
        path.enter(&recipe.output.name)?;

        let ratio = requested / recipe.output.rate;
        let mut applied = ratio;
        let mut overproduced = None;
        if self.options.overproduce {
            let rounded = round_up_ratio(ratio);
            if !rates_equal(rounded, ratio) {
                overproduced = Some(Overproduction {
                    ratio: rounded,
                    rate: rounded * recipe.output.rate,
                });
                applied = rounded;
            }
        }
        debug!(item = %recipe.output.name, requested, ratio, applied, depth, "expanding recipe");
        ledger.apply(recipe, applied);

        let mut inputs = Vec::with_capacity(recipe.inputs.len());
        for input in &recipe.inputs {
            let demand = input.rate * applied;
            let count = self.catalog.count_producing(&input.name);
            if count == 0 {
                inputs.push(InputFlow::Raw {
                    item: input.name.clone(),
                    rate: demand,
                });
                continue;
            }
            // An ancestor's own output must not pass for surplus.
            path.check(&input.name)?;

            let mut remaining = demand;
            let mut reused = 0.0;
            if self.options.reuses_surplus() {
                // `apply` already charged this demand, so add it back to see
                // what earlier branches left over.
                let available = ledger.surplus(&input.name) + demand;
                if available >= demand || rates_equal(available, demand) {
                    debug!(item = %input.name, demand, available, "demand covered by surplus");
                    inputs.push(InputFlow::Surplus {
                        item: input.name.clone(),
                        rate: demand,
                    });
                    continue;
                }
                if available > 0.0 && !rates_equal(available, 0.0) {
                    debug!(item = %input.name, demand, available, "using surplus");
                    reused = available;
                    remaining = demand - available;
                }
            }

            let default = self.catalog.alternate(&input.name, 0)?;
            let node = self.expand(ledger, default, remaining, depth + 1, path, show_alternates)?;

            let mut alternates = Vec::new();
            if show_alternates && count > 1 {
                for index in 1..count {
                    let recipe = self.catalog.alternate(&input.name, index)?;
                    // Costed as a chain of its own, so it gets its own path too.
                    // It sits under the `alternates:` heading, one level below the input.
                    let mut scratch = Ledger::new();
                    let mut scratch_path = ActivePath::default();
                    let node =
                        self.expand(&mut scratch, recipe, demand, depth + 2, &mut scratch_path, false)?;
                    scratch.net();
                    alternates.push(AlternateChain {
                        node,
                        ledger: scratch,
                    });
                }
            }

            inputs.push(InputFlow::Produced {
                item: input.name.clone(),
                rate: demand,
                reused,
                node: Box::new(node),
                alternates,
            });
        }

        path.leave();
        Ok(ChainNode {
            item: recipe.output.name.clone(),
            building: recipe.building,
            depth,
            requested_rate: requested,
            ratio,
            overproduced,
            inputs,
        })
    }
}
