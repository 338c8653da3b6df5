//! The consumption / production ledger of one resolution.
//!
//! A ledger accumulates three name-keyed records while a chain is expanded:
//! consumed item rates, produced item rates and building instance counts.
//! Keys are unique; repeated entries add up.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{rates_equal, Building, Recipe};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    consumed: BTreeMap<String, f64>,
    produced: BTreeMap<String, f64>,
    buildings: BTreeMap<Building, f64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consume(&mut self, name: &str, rate: f64) {
        *self.consumed.entry(name.to_string()).or_default() += rate;
    }

    pub fn produce(&mut self, name: &str, rate: f64) {
        *self.produced.entry(name.to_string()).or_default() += rate;
    }

    pub fn add_buildings(&mut self, building: Building, count: f64) {
        *self.buildings.entry(building).or_default() += count;
    }

    /// Records one recipe running at `ratio` times its nominal rates.
    ///
    /// # Example
    ///
    /// ```
    /// use prodchain::ledger::Ledger;
    /// use prodchain::models::{Building, Recipe};
    ///
    /// let ingot = Recipe::new(Building::Smelter, "iron ingot", 30.0).with_input("iron ore", 30.0);
    /// let mut ledger = Ledger::new();
    /// ledger.apply(&ingot, 2.0);
    ///
    /// assert_eq!(ledger.produced("iron ingot"), 60.0);
    /// assert_eq!(ledger.consumed("iron ore"), 60.0);
    /// assert_eq!(ledger.building_count(Building::Smelter), 2.0);
    /// ```
    pub fn apply(&mut self, recipe: &Recipe, ratio: f64) {
        for output in recipe.outputs() {
            self.produce(&output.name, ratio * output.rate);
        }
        self.add_buildings(recipe.building, ratio);
        for input in &recipe.inputs {
            self.consume(&input.name, ratio * input.rate);
        }
    }

    /// Consumed rate for `name`, 0 when absent.
    pub fn consumed(&self, name: &str) -> f64 {
        self.consumed.get(name).copied().unwrap_or(0.0)
    }

    /// Produced rate for `name`, 0 when absent.
    pub fn produced(&self, name: &str) -> f64 {
        self.produced.get(name).copied().unwrap_or(0.0)
    }

    /// Produced minus consumed; negative when demand outruns production.
    pub fn surplus(&self, name: &str) -> f64 {
        self.produced(name) - self.consumed(name)
    }

    pub fn is_consumed(&self, name: &str) -> bool {
        self.consumed.contains_key(name)
    }

    pub fn is_produced(&self, name: &str) -> bool {
        self.produced.contains_key(name)
    }

    pub fn consumed_items(&self) -> impl Iterator<Item = (&str, f64)> {
        self.consumed.iter().map(|(name, rate)| (name.as_str(), *rate))
    }

    pub fn produced_items(&self) -> impl Iterator<Item = (&str, f64)> {
        self.produced.iter().map(|(name, rate)| (name.as_str(), *rate))
    }

    /// Building kinds with a non-zero instance count.
    pub fn building_usage(&self) -> impl Iterator<Item = (Building, f64)> + '_ {
        self.buildings
            .iter()
            .filter(|(_, count)| **count != 0.0)
            .map(|(building, count)| (*building, *count))
    }

    pub fn building_count(&self, building: Building) -> f64 {
        self.buildings.get(&building).copied().unwrap_or(0.0)
    }

    /// Total power draw of all buildings, in MW.
    pub fn total_power(&self) -> f64 {
        self.building_usage()
            .map(|(building, count)| count * building.power_mw())
            .sum()
    }

    /// Cancels consumption that is met by production of the same item.
    ///
    /// For every name present on both sides the smaller rate is subtracted
    /// from the larger and the exhausted side is removed; equal rates remove
    /// both. Afterwards no name is both consumed and produced, so the
    /// remaining entries are net external inputs and net outputs. Running it
    /// again changes nothing.
    ///
    /// ```
    /// use prodchain::ledger::Ledger;
    ///
    /// let mut ledger = Ledger::new();
    /// ledger.consume("screw", 60.0);
    /// ledger.produce("screw", 80.0);
    /// ledger.consume("iron rod", 15.0);
    /// ledger.net();
    ///
    /// assert!(!ledger.is_consumed("screw"));
    /// assert_eq!(ledger.produced("screw"), 20.0);
    /// assert_eq!(ledger.consumed("iron rod"), 15.0);
    /// ```
    pub fn net(&mut self) {
        let names: Vec<String> = self
            .consumed
            .keys()
            .filter(|name| self.produced.contains_key(*name))
            .cloned()
            .collect();

        for name in names {
            let consumed = self.consumed(&name);
            let produced = self.produced(&name);
            if rates_equal(consumed, produced) {
                self.consumed.remove(&name);
                self.produced.remove(&name);
            } else if produced > consumed {
                self.consumed.remove(&name);
                self.produced.insert(name, produced - consumed);
            } else {
                self.produced.remove(&name);
                self.consumed.insert(name, consumed - produced);
            }
        }
    }

    /// Returns a netted copy, leaving this ledger untouched.
    pub fn netted(&self) -> Self {
        let mut ledger = self.clone();
        ledger.net();
        ledger
    }
}
