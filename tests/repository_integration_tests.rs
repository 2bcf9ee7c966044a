use drinks_api::{
    models::{Ingredient, NewDrink},
    repository::{Repository, RepositoryError, SqliteRepository},
};

// --- Setup ---

async fn fresh_repo() -> SqliteRepository {
    let repo = SqliteRepository::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory sqlite should open");
    repo.drop_and_create_all()
        .await
        .expect("schema should be created");
    repo
}

fn ingredient(color: &str, name: &str, parts: i64) -> Ingredient {
    Ingredient {
        color: color.to_string(),
        name: name.to_string(),
        parts,
    }
}

fn new_drink(title: &str) -> NewDrink {
    NewDrink {
        title: title.to_string(),
        recipe: vec![ingredient("blue", "water", 1)],
    }
}

// --- Tests ---

#[tokio::test]
async fn test_insert_assigns_ids_and_round_trips_recipe() {
    let repo = fresh_repo().await;

    let recipe = vec![ingredient("brown", "espresso", 1), ingredient("white", "milk", 3)];
    let latte = repo
        .insert(NewDrink {
            title: "Latte".to_string(),
            recipe: recipe.clone(),
        })
        .await
        .unwrap();
    let water = repo.insert(new_drink("Water")).await.unwrap();

    assert!(water.id > latte.id);
    assert_eq!(latte.recipe, recipe);

    let fetched = repo.get(latte.id).await.unwrap().expect("latte should exist");
    assert_eq!(fetched, latte);
}

#[tokio::test]
async fn test_list_all_orders_by_id() {
    let repo = fresh_repo().await;
    assert!(repo.list_all().await.unwrap().is_empty());

    repo.insert(new_drink("Water")).await.unwrap();
    repo.insert(new_drink("Tea")).await.unwrap();

    let titles: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.title)
        .collect();
    assert_eq!(titles, vec!["Water", "Tea"]);
}

#[tokio::test]
async fn test_duplicate_title_is_classified() {
    let repo = fresh_repo().await;
    repo.insert(new_drink("Water")).await.unwrap();

    let err = repo.insert(new_drink("Water")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateTitle(title) if title == "Water"));
}

#[tokio::test]
async fn test_update_replaces_title_and_recipe() {
    let repo = fresh_repo().await;
    let mut drink = repo.insert(new_drink("Water")).await.unwrap();

    drink.title = "Lemonade".to_string();
    drink.recipe = vec![ingredient("yellow", "lemon", 1), ingredient("blue", "water", 4)];

    let updated = repo.update(&drink).await.unwrap().expect("row should exist");
    assert_eq!(updated, drink);
    assert_eq!(repo.get(drink.id).await.unwrap(), Some(drink));
}

#[tokio::test]
async fn test_update_into_existing_title_fails() {
    let repo = fresh_repo().await;
    repo.insert(new_drink("Water")).await.unwrap();
    let mut tea = repo.insert(new_drink("Tea")).await.unwrap();

    tea.title = "Water".to_string();
    let err = repo.update(&tea).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateTitle(_)));
}

#[tokio::test]
async fn test_update_missing_row_is_none() {
    let repo = fresh_repo().await;
    let mut ghost = repo.insert(new_drink("Ghost")).await.unwrap();
    assert!(repo.delete(ghost.id).await.unwrap());

    ghost.title = "Still a ghost".to_string();
    assert_eq!(repo.update(&ghost).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_reports_whether_a_row_was_removed() {
    let repo = fresh_repo().await;
    let water = repo.insert(new_drink("Water")).await.unwrap();

    assert!(repo.delete(water.id).await.unwrap());
    assert!(!repo.delete(water.id).await.unwrap());
    assert_eq!(repo.get(water.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_drop_and_create_all_discards_rows() {
    let repo = fresh_repo().await;
    repo.insert(new_drink("Water")).await.unwrap();

    repo.drop_and_create_all().await.unwrap();

    assert!(repo.list_all().await.unwrap().is_empty());
    // The title is free again once the table is recreated.
    repo.insert(new_drink("Water")).await.unwrap();
}
