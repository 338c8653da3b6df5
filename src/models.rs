//! Data models for recipes and the items flowing through them.
//!
//! A [`Recipe`] turns one to four weighted input [`Item`]s into a primary
//! output and an optional secondary output, running in one [`Building`] kind.
//! Rates are items per minute at one building instance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relative tolerance used whenever two rates are compared for equality.
pub const RATE_EPSILON: f64 = 1e-9;

/// Returns `true` when two rates are equal within [`RATE_EPSILON`].
///
/// # Example
///
/// ```
/// use prodchain::models::rates_equal;
///
/// assert!(rates_equal(20.0 / 30.0 * 30.0, 20.0));
/// assert!(!rates_equal(19.9, 20.0));
/// ```
pub fn rates_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= RATE_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// The kind of production station a recipe runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Building {
    Miner,
    OilExtractor,
    Smelter,
    Foundry,
    Constructor,
    Assembler,
    Manufacturer,
    Refinery,
    Packager,
    Blender,
}

impl Building {
    /// Every building kind, in display order.
    pub const ALL: [Building; 10] = [
        Building::Miner,
        Building::OilExtractor,
        Building::Smelter,
        Building::Foundry,
        Building::Constructor,
        Building::Assembler,
        Building::Manufacturer,
        Building::Refinery,
        Building::Packager,
        Building::Blender,
    ];

    /// Power draw of a single instance, in MW.
    pub fn power_mw(self) -> f64 {
        match self {
            Building::Miner => 12.0,
            Building::OilExtractor => 40.0,
            Building::Smelter => 4.0,
            Building::Foundry => 16.0,
            Building::Constructor => 4.0,
            Building::Assembler => 15.0,
            Building::Manufacturer => 55.0,
            Building::Refinery => 30.0,
            Building::Packager => 10.0,
            Building::Blender => 75.0,
        }
    }

    /// Display name, singular or plural.
    ///
    /// ```
    /// use prodchain::models::Building;
    ///
    /// assert_eq!(Building::Foundry.name(true), "foundry");
    /// assert_eq!(Building::Foundry.name(false), "foundries");
    /// ```
    pub fn name(self, single: bool) -> &'static str {
        match (self, single) {
            (Building::Miner, true) => "miner",
            (Building::Miner, false) => "miners",
            (Building::OilExtractor, true) => "oil extractor",
            (Building::OilExtractor, false) => "oil extractors",
            (Building::Smelter, true) => "smelter",
            (Building::Smelter, false) => "smelters",
            (Building::Foundry, true) => "foundry",
            (Building::Foundry, false) => "foundries",
            (Building::Constructor, true) => "constructor",
            (Building::Constructor, false) => "constructors",
            (Building::Assembler, true) => "assembler",
            (Building::Assembler, false) => "assemblers",
            (Building::Manufacturer, true) => "manufacturer",
            (Building::Manufacturer, false) => "manufacturers",
            (Building::Refinery, true) => "refinery",
            (Building::Refinery, false) => "refineries",
            (Building::Packager, true) => "packager",
            (Building::Packager, false) => "packagers",
            (Building::Blender, true) => "blender",
            (Building::Blender, false) => "blenders",
        }
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(true))
    }
}

/// A named resource with a flow rate in items per minute.
///
/// The name is the identity: two items with the same name are the same item
/// regardless of rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub rate: f64,
}

impl Item {
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// A transformation from inputs to a primary and optional secondary output.
///
/// Input rates are the quantities consumed while one building produces
/// `output.rate` per minute.
///
/// # Example
///
/// ```
/// use prodchain::models::{Building, Recipe};
///
/// let plastic = Recipe::new(Building::Refinery, "plastic", 20.0)
///     .with_input("crude oil", 30.0)
///     .with_extra_output("heavy oil residue", 10.0);
///
/// assert_eq!(plastic.inputs.len(), 1);
/// assert_eq!(plastic.outputs().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub building: Building,
    pub inputs: Vec<Item>,
    pub output: Item,
    pub extra_output: Option<Item>,
}

impl Recipe {
    /// Maximum number of inputs a recipe may take.
    pub const MAX_INPUTS: usize = 4;

    pub fn new(building: Building, output: impl Into<String>, rate: f64) -> Self {
        Self {
            building,
            inputs: Vec::new(),
            output: Item::new(output, rate),
            extra_output: None,
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, rate: f64) -> Self {
        self.inputs.push(Item::new(name, rate));
        self
    }

    pub fn with_extra_output(mut self, name: impl Into<String>, rate: f64) -> Self {
        self.extra_output = Some(Item::new(name, rate));
        self
    }

    /// Primary output followed by the secondary output, if any.
    pub fn outputs(&self) -> impl Iterator<Item = &Item> {
        std::iter::once(&self.output).chain(self.extra_output.as_ref())
    }

    /// Checks the structural invariants, returning the reason on failure.
    pub fn check(&self) -> Result<(), String> {
        if self.output.name.trim().is_empty() {
            return Err("output name is empty".to_string());
        }
        if !(self.output.rate.is_finite() && self.output.rate > 0.0) {
            return Err(format!("output rate {} is not positive", self.output.rate));
        }
        if self.inputs.is_empty() || self.inputs.len() > Self::MAX_INPUTS {
            return Err(format!(
                "expected 1 to {} inputs, found {}",
                Self::MAX_INPUTS,
                self.inputs.len()
            ));
        }
        for item in self.inputs.iter().chain(self.extra_output.as_ref()) {
            if item.name.trim().is_empty() {
                return Err("item name is empty".to_string());
            }
            if !(item.rate.is_finite() && item.rate > 0.0) {
                return Err(format!("rate {} for '{}' is not positive", item.rate, item.name));
            }
        }
        Ok(())
    }
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for a recipe table.
///
/// Multiple inputs are `;`-separated in both `inputs` and `input_rates`.
#[derive(Debug, Deserialize)]
pub struct RecipeRow {
    /// Building kind, snake_case (e.g. `oil_extractor`)
    pub building: Building,
    /// Primary output item name
    pub output: String,
    /// Primary output per minute
    pub output_rate: f64,
    /// Input item names
    pub inputs: String,
    /// Input rates per minute, aligned with `inputs`
    pub input_rates: String,
    /// Secondary output item name (optional)
    pub extra_output: Option<String>,
    /// Secondary output per minute (optional)
    pub extra_rate: Option<f64>,
}
