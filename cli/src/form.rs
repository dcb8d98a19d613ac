//! The create-recipe form: flags in, a validated request body out.

use crate::client::ClientError;
use crate::models::{Ingredient, NewRecipe};

/// Raw `create` arguments, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    /// `NAME=QTY` pairs
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub images: Vec<String>,
}

/// Splits `NAME=QTY` on the first `=`. A missing `=` leaves the quantity empty.
pub fn parse_ingredient(raw: &str) -> Ingredient {
    let (name, quantity) = raw.split_once('=').unwrap_or((raw, ""));
    Ingredient {
        name: name.trim().to_string(),
        quantity: quantity.trim().to_string(),
    }
}

const MAX_TITLE_CHARS: usize = 255;

fn invalid(message: &str) -> ClientError {
    ClientError::Invalid(message.to_string())
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl RecipeForm {
    /// Checks the form the way the server will, so obvious mistakes never leave the machine.
    pub fn validate(&self) -> Result<NewRecipe, ClientError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(invalid("Recipe title is required"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(invalid("Recipe title must be at most 255 characters"));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(invalid("Recipe description is required"));
        }

        if self.ingredients.is_empty() {
            return Err(invalid("At least one ingredient is required"));
        }
        let ingredients: Vec<Ingredient> =
            self.ingredients.iter().map(|i| parse_ingredient(i)).collect();
        for ingredient in &ingredients {
            if ingredient.name.is_empty() {
                return Err(invalid("Ingredient name is required"));
            }
            if ingredient.quantity.is_empty() {
                return Err(invalid("Quantity is required"));
            }
        }

        let instructions = non_blank(&self.steps);
        if instructions.is_empty() {
            return Err(invalid("Instructions are required"));
        }

        Ok(NewRecipe {
            title: title.to_string(),
            description: description.to_string(),
            ingredients,
            instructions,
            image_urls: non_blank(&self.images),
        })
    }
}
