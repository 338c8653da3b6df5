//! Recipe table loading.
//!
//! Recipe tables are CSV files with one recipe per row. The default table
//! ships inside the binary; a replacement can be loaded from disk.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::models::{Item, Recipe, RecipeRow};

/// The built-in recipe table.
const BUILTIN_RECIPES: &str = include_str!("../data/recipes.csv");

/// Splits a `;`-separated list of item names, dropping empty parts.
fn parse_names(s: &str) -> Vec<String> {
    s.split(';')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Splits a `;`-separated list of rates.
fn parse_rates(s: &str, output: &str) -> Result<Vec<f64>, CatalogError> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>().map_err(|_| CatalogError::InvalidRecipe {
                output: output.to_string(),
                reason: format!("'{}' is not a rate", part),
            })
        })
        .collect()
}

/// Converts one CSV row into a [`Recipe`].
fn recipe_from_row(row: RecipeRow) -> Result<Recipe, CatalogError> {
    let names = parse_names(&row.inputs);
    let rates = parse_rates(&row.input_rates, &row.output)?;
    if names.len() != rates.len() {
        warn!(
            output = %row.output,
            inputs = names.len(),
            rates = rates.len(),
            "input and rate lists differ in length"
        );
        return Err(CatalogError::InvalidRecipe {
            output: row.output,
            reason: format!("{} inputs but {} input rates", names.len(), rates.len()),
        });
    }

    let extra_output = match (row.extra_output, row.extra_rate) {
        (Some(name), Some(rate)) => Some(Item::new(name, rate)),
        (None, None) => None,
        _ => {
            return Err(CatalogError::InvalidRecipe {
                output: row.output,
                reason: "secondary output needs both a name and a rate".to_string(),
            })
        }
    };

    Ok(Recipe {
        building: row.building,
        inputs: names
            .into_iter()
            .zip(rates)
            .map(|(name, rate)| Item::new(name, rate))
            .collect(),
        output: Item::new(row.output, row.output_rate),
        extra_output,
    })
}

/// Parses a recipe table from any reader.
///
/// # CSV Format
///
/// Expected columns: `building, output, output_rate, inputs, input_rates, extra_output, extra_rate`
///
/// # Example
///
/// ```
/// use prodchain::data::parse_recipes;
///
/// let table = "building,output,output_rate,inputs,input_rates,extra_output,extra_rate\n\
///              smelter,iron ingot,30,iron ore,30,,\n";
/// let recipes = parse_recipes(table.as_bytes()).unwrap();
/// assert_eq!(recipes[0].output.name, "iron ingot");
/// ```
pub fn parse_recipes<R: Read>(reader: R) -> Result<Vec<Recipe>, CatalogError> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut recipes = Vec::new();
    for result in rdr.deserialize() {
        let row: RecipeRow = result?;
        recipes.push(recipe_from_row(row)?);
    }
    Ok(recipes)
}

/// Loads a recipe table from a CSV file.
pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, CatalogError> {
    let file = File::open(path)?;
    let recipes = parse_recipes(file)?;
    info!(path = %path.display(), count = recipes.len(), "loaded recipe table");
    Ok(recipes)
}

/// Parses the recipe table compiled into the crate.
pub fn builtin_recipes() -> Result<Vec<Recipe>, CatalogError> {
    parse_recipes(BUILTIN_RECIPES.as_bytes())
}
