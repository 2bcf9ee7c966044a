use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Ingredient
///
/// A single entry of a drink recipe. `parts` is the relative quantity used when
/// mixing; it is hidden from the public short form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: i64,
}

/// Drink
///
/// A row of the `drink` table. The recipe is persisted as serialized JSON text
/// and decoded on every read, so a stored row always carries a valid recipe.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    #[sqlx(json)]
    pub recipe: Vec<Ingredient>,
}

/// NewDrink
///
/// A drink that has not been stored yet; the id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

// --- Response Projections ---

/// IngredientSummary
///
/// Public view of an ingredient: enough to draw the drink, without quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientSummary {
    pub color: String,
    pub name: String,
}

/// DrinkShort
///
/// Short form used by the anonymous listing (`GET /drinks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

/// DrinkLong
///
/// Long form returned to authorized callers, including ingredient quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| IngredientSummary {
                    color: ingredient.color.clone(),
                    name: ingredient.name.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// RecipeInput
///
/// Clients send either a full ingredient list or a single ingredient object.
/// Both are normalized to a list before storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(ingredients) => ingredients,
            RecipeInput::One(ingredient) => vec![ingredient],
        }
    }
}

/// CreateDrinkRequest
///
/// Input payload for `POST /drinks`. Both fields are optional at the parsing
/// level so that a missing field is reported as 422 by the handler rather than
/// as an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

/// UpdateDrinkRequest
///
/// Input payload for `PATCH /drinks/{id}`. Only non-empty fields are applied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    /// Applies the supplied fields to `drink` in place. Empty strings and empty
    /// recipes are treated as absent.
    pub fn apply_to(self, drink: &mut Drink) {
        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            drink.title = title;
        }

        if let Some(recipe) = self.recipe.map(RecipeInput::into_ingredients) {
            if !recipe.is_empty() {
                drink.recipe = recipe;
            }
        }
    }
}

// --- Response Envelopes ---

/// DrinksResponse
///
/// Success envelope shared by every endpoint returning drinks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// DeletedResponse
///
/// Success envelope for `DELETE /drinks/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: i64,
}
