use thiserror::Error;

/// Errors raised while resolving a production chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Recipe '{query}' not found")]
    NotFound { query: String },

    #[error("Alternate {index} requested for '{item}', but only {count} recipes produce it")]
    AlternateIndexOutOfRange { item: String, index: u32, count: u32 },

    #[error("Recipe cycle detected at '{item}' (path: {})", path.join(" -> "))]
    CycleDetected { item: String, path: Vec<String> },

    #[error("Target rate {rate} must be a positive number")]
    InvalidRate { rate: f64 },
}

/// Errors raised while building a recipe catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read recipe table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse recipe table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid recipe for '{output}': {reason}")]
    InvalidRecipe { output: String, reason: String },
}
