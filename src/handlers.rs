use crate::{
    AppState,
    auth::Claims,
    error::{ApiError, ErrorBody},
    models::{
        CreateDrinkRequest, DeletedResponse, DrinkLong, DrinkShort, DrinksResponse, NewDrink,
        UpdateDrinkRequest,
    },
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

// --- Public Handlers ---

/// get_drinks
///
/// [Public Route] Lists every drink in short form.
///
/// An empty table answers 404 rather than an empty list; existing clients rely
/// on that.
#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "Short-form drinks", body = DrinksResponse<DrinkShort>),
        (status = 404, description = "No drinks stored", body = ErrorBody)
    )
)]
pub async fn get_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, ApiError> {
    let drinks = state.repo.list_all().await.map_err(|e| {
        tracing::error!("list_all failed: {e}");
        ApiError::NotFound
    })?;

    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(|d| d.short()).collect(),
    )))
}

/// Catch-all for unmatched paths so they still answer with the JSON envelope.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

// --- Protected Handlers ---
// Every handler below is mounted behind `auth::require_permission`, which puts
// the verified `Claims` into the request extensions before the body runs.

/// get_drinks_detail
///
/// [Protected: `get:drinks-detail`] Lists every drink in long form.
#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "Long-form drinks", body = DrinksResponse<DrinkLong>),
        (status = 401, description = "Bad or missing token", body = ErrorBody),
        (status = 403, description = "Permission missing", body = ErrorBody)
    )
)]
pub async fn get_drinks_detail(
    Extension(_claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ApiError> {
    let drinks = state.repo.list_all().await.map_err(|e| {
        tracing::error!("list_all failed: {e}");
        ApiError::NotFound
    })?;

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(|d| d.long()).collect(),
    )))
}

/// create_drink
///
/// [Protected: `post:drinks`] Stores a new drink and returns it in long form.
/// A missing or unreadable field, or a title that already exists, is 422.
#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    responses(
        (status = 200, description = "Created", body = DrinksResponse<DrinkLong>),
        (status = 422, description = "Missing title or recipe", body = ErrorBody)
    )
)]
pub async fn create_drink(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("create_drink body rejected: {e}");
        ApiError::Unprocessable
    })?;

    let (Some(title), Some(recipe)) = (payload.title, payload.recipe) else {
        return Err(ApiError::Unprocessable);
    };

    let drink = state
        .repo
        .insert(NewDrink {
            title,
            recipe: recipe.into_ingredients(),
        })
        .await
        .map_err(|e| {
            tracing::error!("insert failed: {e}");
            ApiError::Unprocessable
        })?;

    tracing::info!(id = drink.id, sub = ?claims.sub, "drink created");
    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// update_drink
///
/// [Protected: `patch:drinks`] Partially updates a drink: a non-empty `title`
/// and/or `recipe` replace the stored values. Unknown ids are 404; an unreadable
/// body or a failed write is 400.
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink ID")),
    request_body = UpdateDrinkRequest,
    responses(
        (status = 200, description = "Updated", body = DrinksResponse<DrinkLong>),
        (status = 400, description = "Bad body or failed write", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_drink(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    let mut drink = state
        .repo
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!(id, "get failed: {e}");
            ApiError::BadRequest
        })?
        .ok_or(ApiError::NotFound)?;

    let Json(payload) = payload.map_err(|e| {
        tracing::debug!(id, "update_drink body rejected: {e}");
        ApiError::BadRequest
    })?;

    payload.apply_to(&mut drink);

    let updated = state
        .repo
        .update(&drink)
        .await
        .map_err(|e| {
            tracing::error!(id, "update failed: {e}");
            ApiError::BadRequest
        })?
        // Deleted between the lookup and the write.
        .ok_or(ApiError::NotFound)?;

    tracing::info!(id, sub = ?claims.sub, "drink updated");
    Ok(Json(DrinksResponse::new(vec![updated.long()])))
}

/// delete_drink
///
/// [Protected: `delete:drinks`] Removes a drink and echoes its id.
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink ID")),
    responses(
        (status = 200, description = "Deleted", body = DeletedResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_drink(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    let deleted = state.repo.delete(id).await.map_err(|e| {
        tracing::error!(id, "delete failed: {e}");
        ApiError::BadRequest
    })?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    tracing::info!(id, sub = ?claims.sub, "drink deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
    }))
}
