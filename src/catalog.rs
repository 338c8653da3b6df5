//! The immutable recipe catalog and its lookup contract.
//!
//! Several recipes may share a primary output; these are alternates for that
//! item, in insertion order. Index 0 is the default recipe, the only one the
//! resolver follows when computing demand.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::data::{builtin_recipes, load_recipes};
use crate::error::{CatalogError, ResolveError};
use crate::models::Recipe;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    /// Builds a catalog, rejecting recipes that break the structural invariants.
    pub fn new(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        for recipe in &recipes {
            recipe
                .check()
                .map_err(|reason| CatalogError::InvalidRecipe {
                    output: recipe.output.name.clone(),
                    reason,
                })?;
        }
        Ok(Self { recipes })
    }

    /// The catalog compiled into the crate.
    ///
    /// ```
    /// use prodchain::catalog::Catalog;
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// assert_eq!(catalog.count_producing("iron ingot"), 1);
    /// assert!(catalog.count_producing("screw") > 1);
    /// ```
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::new(builtin_recipes()?)?;
        info!(count = catalog.len(), "using built-in recipe table");
        Ok(catalog)
    }

    /// Loads a catalog from a CSV recipe table.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        Self::new(load_recipes(path)?)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Number of recipes whose primary output is `name`.
    pub fn count_producing(&self, name: &str) -> u32 {
        self.alternates(name).count() as u32
    }

    /// The `skip`-th recipe (0-indexed) whose primary output is `name`.
    pub fn recipe_for(&self, name: &str, skip: u32) -> Option<&Recipe> {
        self.recipes
            .iter()
            .filter(|r| r.output.name == name)
            .nth(skip as usize)
    }

    /// Like [`Catalog::recipe_for`], but an out-of-range index is an error.
    pub fn alternate(&self, name: &str, index: u32) -> Result<&Recipe, ResolveError> {
        self.recipe_for(name, index)
            .ok_or_else(|| ResolveError::AlternateIndexOutOfRange {
                item: name.to_string(),
                index,
                count: self.count_producing(name),
            })
    }

    /// The default recipe for `name`, or `NotFound` carrying the query.
    pub fn default_recipe(&self, name: &str) -> Result<&Recipe, ResolveError> {
        self.recipe_for(name, 0).ok_or_else(|| ResolveError::NotFound {
            query: name.to_string(),
        })
    }

    /// All recipes producing `name`, default first.
    pub fn alternates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.recipes.iter().filter(move |r| r.output.name == name)
    }

    /// Every item that is the primary output of some recipe.
    pub fn item_names(&self) -> BTreeSet<&str> {
        self.recipes.iter().map(|r| r.output.name.as_str()).collect()
    }

    /// Suggests the known item name closest to a mistyped query.
    ///
    /// Characters of the query are matched in order, case-insensitively,
    /// against each output name. A run of consecutive matches doubles the
    /// weight of every further match; a mismatch resets it.
    ///
    /// ```
    /// use prodchain::catalog::Catalog;
    ///
    /// let catalog = Catalog::builtin().unwrap();
    /// assert_eq!(catalog.suggest("iron plat"), Some("iron plate"));
    /// ```
    pub fn suggest(&self, query: &str) -> Option<&str> {
        let query: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
        let mut best: Option<(u64, &str)> = None;

        for recipe in &self.recipes {
            let name = recipe.output.name.as_str();
            let mut weight: u64 = 1;
            let mut score: u64 = 0;
            let mut matched = 0;
            for c in name.chars().flat_map(char::to_lowercase) {
                if matched >= query.len() {
                    break;
                }
                if c == query[matched] {
                    score = score.saturating_add(weight);
                    weight = weight.saturating_mul(2);
                    matched += 1;
                } else {
                    weight = 1;
                }
            }
            if score > best.map_or(0, |(s, _)| s) {
                best = Some((score, name));
            }
        }

        best.map(|(_, name)| name)
    }
}
