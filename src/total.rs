//! Aggregate production totals.
//!
//! Unlike the tree expansion, this walk ignores rounding and surplus reuse.
//! It only sums, per item, how much is produced and consumed anywhere in the
//! chain, then classifies each item as an intermediate, a final product or an
//! external raw input.

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::ResolveError;
use crate::ledger::Ledger;
use crate::models::{rates_equal, Recipe};
use crate::resolver::{check_rate, ActivePath, Resolver};

/// One line of the aggregate report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TotalLine {
    /// Produced and consumed inside the chain; `extra` is what is left over.
    Intermediate {
        item: String,
        rate: f64,
        ratio: Option<f64>,
        extra: Option<f64>,
    },
    /// Produced with no consumer inside the chain.
    FinalProduct {
        item: String,
        rate: f64,
        ratio: Option<f64>,
    },
    /// Consumed beyond what the chain produces.
    RawInput { item: String, rate: f64 },
}

/// Aggregate ledger plus its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalProduction {
    pub ledger: Ledger,
    pub lines: Vec<TotalLine>,
}

impl TotalProduction {
    fn classify(catalog: &Catalog, ledger: Ledger) -> Self {
        let ratio_for = |name: &str, rate: f64| {
            catalog
                .recipe_for(name, 0)
                .map(|recipe| rate / recipe.output.rate)
        };

        let mut lines = Vec::new();
        for (item, produced) in ledger.produced_items() {
            let ratio = ratio_for(item, produced);
            if ledger.is_consumed(item) {
                let consumed = ledger.consumed(item);
                let extra = (produced > consumed && !rates_equal(produced, consumed))
                    .then(|| produced - consumed);
                lines.push(TotalLine::Intermediate {
                    item: item.to_string(),
                    rate: produced,
                    ratio,
                    extra,
                });
            } else {
                lines.push(TotalLine::FinalProduct {
                    item: item.to_string(),
                    rate: produced,
                    ratio,
                });
            }
        }

        for (item, consumed) in ledger.consumed_items() {
            let produced = ledger.produced(item);
            if !ledger.is_produced(item) {
                lines.push(TotalLine::RawInput {
                    item: item.to_string(),
                    rate: consumed,
                });
            } else if consumed > produced && !rates_equal(consumed, produced) {
                lines.push(TotalLine::RawInput {
                    item: item.to_string(),
                    rate: consumed - produced,
                });
            }
        }

        Self { ledger, lines }
    }

    pub fn intermediates(&self) -> impl Iterator<Item = &TotalLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line, TotalLine::Intermediate { .. }))
    }

    pub fn final_products(&self) -> impl Iterator<Item = &TotalLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line, TotalLine::FinalProduct { .. }))
    }

    pub fn raw_inputs(&self) -> impl Iterator<Item = &TotalLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line, TotalLine::RawInput { .. }))
    }
}

impl<'a> Resolver<'a> {
    /// Sums item demand across the whole chain for the default recipe of `item`.
    ///
    /// ```
    /// use prodchain::catalog::Catalog;
    /// use prodchain::resolver::{ResolveOptions, Resolver};
    /// use prodchain::total::TotalLine;
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// let resolver = Resolver::new(&catalog, ResolveOptions::default());
    /// let totals = resolver.total("iron plate", 20.0).unwrap();
    ///
    /// assert!(totals.lines.contains(&TotalLine::RawInput {
    ///     item: "iron ore".to_string(),
    ///     rate: 30.0,
    /// }));
    /// ```
    pub fn total(&self, item: &str, rate: f64) -> Result<TotalProduction, ResolveError> {
        let recipe = self.catalog().default_recipe(item)?;
        self.total_recipe(recipe, rate)
    }

    /// Sums item demand across the whole chain rooted at `recipe`.
    pub fn total_recipe(&self, recipe: &Recipe, rate: f64) -> Result<TotalProduction, ResolveError> {
        check_rate(rate)?;
        let mut ledger = Ledger::new();
        let mut path = ActivePath::default();
        self.accumulate(&mut ledger, recipe, rate, &mut path)?;
        info!(item = %recipe.output.name, rate, "computed aggregate totals");
        Ok(TotalProduction::classify(self.catalog(), ledger))
    }

    fn accumulate(
        &self,
        ledger: &mut Ledger,
        recipe: &Recipe,
        rate: f64,
        path: &mut ActivePath,
    ) -> Result<(), ResolveError> {
        path.enter(&recipe.output.name)?;
        let ratio = rate / recipe.output.rate;
        debug!(item = %recipe.output.name, rate, ratio, "accumulating recipe");
        ledger.apply(recipe, ratio);

        for input in &recipe.inputs {
            if self.catalog().count_producing(&input.name) > 0 {
                let default = self.catalog().alternate(&input.name, 0)?;
                self.accumulate(ledger, default, ratio * input.rate, path)?;
            }
        }

        path.leave();
        Ok(())
    }
}
