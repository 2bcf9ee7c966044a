use drinks_api::models::{
    CreateDrinkRequest, Drink, Ingredient, RecipeInput, UpdateDrinkRequest,
};
use serde_json::json;

fn mocha() -> Drink {
    Drink {
        id: 3,
        title: "Mocha".to_string(),
        recipe: vec![
            Ingredient {
                color: "brown".to_string(),
                name: "espresso".to_string(),
                parts: 1,
            },
            Ingredient {
                color: "chocolate".to_string(),
                name: "cocoa".to_string(),
                parts: 2,
            },
        ],
    }
}

#[test]
fn test_short_form_hides_parts() {
    let short = serde_json::to_value(mocha().short()).unwrap();

    assert_eq!(
        short,
        json!({
            "id": 3,
            "title": "Mocha",
            "recipe": [
                { "color": "brown", "name": "espresso" },
                { "color": "chocolate", "name": "cocoa" }
            ]
        })
    );
}

#[test]
fn test_long_form_keeps_everything() {
    let long = serde_json::to_value(mocha().long()).unwrap();

    assert_eq!(long["recipe"][1]["parts"], 2);
    assert_eq!(long["recipe"][1]["name"], "cocoa");
    assert_eq!(long["title"], "Mocha");
}

#[test]
fn test_create_request_allows_missing_fields_for_handler_validation() {
    let req: CreateDrinkRequest = serde_json::from_value(json!({ "title": "Tea" })).unwrap();
    assert_eq!(req.title.as_deref(), Some("Tea"));
    assert!(req.recipe.is_none());
}

#[test]
fn test_recipe_input_normalizes_single_ingredient() {
    let one: RecipeInput =
        serde_json::from_value(json!({ "color": "green", "name": "matcha", "parts": 1 })).unwrap();
    assert_eq!(one.into_ingredients().len(), 1);

    let many: RecipeInput = serde_json::from_value(json!([
        { "color": "green", "name": "matcha", "parts": 1 },
        { "color": "white", "name": "milk", "parts": 2 }
    ]))
    .unwrap();
    assert_eq!(many.into_ingredients().len(), 2);
}

#[test]
fn test_recipe_input_rejects_fractional_parts() {
    let result = serde_json::from_value::<RecipeInput>(
        json!([{ "color": "green", "name": "matcha", "parts": 1.5 }]),
    );
    assert!(result.is_err());
}

#[test]
fn test_update_ignores_empty_fields() {
    let mut drink = mocha();
    let req: UpdateDrinkRequest =
        serde_json::from_value(json!({ "title": "", "recipe": [] })).unwrap();

    req.apply_to(&mut drink);

    assert_eq!(drink, mocha());
}

#[test]
fn test_update_applies_to_the_given_instance_only() {
    let mut first = mocha();
    let second = mocha();
    let req: UpdateDrinkRequest = serde_json::from_value(json!({ "title": "Iced Mocha" })).unwrap();

    req.apply_to(&mut first);

    assert_eq!(first.title, "Iced Mocha");
    assert_eq!(first.recipe, second.recipe);
    assert_eq!(second.title, "Mocha");
}
