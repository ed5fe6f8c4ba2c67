use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;

use crate::error::{ApiResponse, AppError, Result};
use crate::models::{ClosetQuery, ClosetView, DeleteQuery, IndexedItem, ItemFilter, ItemTags, TagOptions};
use crate::services::ClosetService;
use crate::AppState;

/// Browse the closet
/// GET /api/v1/closet?colors=Blue,Red&categories=Shirts&seasons=Summer
pub async fn browse_closet(
    State(state): State<AppState>,
    Query(query): Query<ClosetQuery>,
) -> Result<Json<ApiResponse<ClosetView>>> {
    let filter = ItemFilter::from(&query);
    let view = ClosetService::browse(&state.metadata, &filter).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// Preset tag values for the upload form
/// GET /api/v1/options
pub async fn tag_options() -> Json<ApiResponse<TagOptions>> {
    Json(ApiResponse::success(TagOptions::default()))
}

/// Upload a new item
/// POST /api/v1/items (multipart: file, category, color, season)
pub async fn upload_item(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<IndexedItem>>> {
    let mut image: Option<(String, Bytes)> = None;
    let mut tags = ItemTags::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to process multipart: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read image: {}", e))
                })?;
                if !file_name.is_empty() {
                    image = Some((file_name, data));
                }
            }
            "category" => tags.category = field.text().await.unwrap_or_default(),
            "color" => tags.color = field.text().await.unwrap_or_default(),
            "season" => tags.season = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    let (file_name, data) =
        image.ok_or_else(|| AppError::BadRequest("Please upload an image first.".to_string()))?;

    let item = ClosetService::add_item(
        &state.metadata,
        state.assets.as_ref(),
        data,
        &file_name,
        tags,
    )
    .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete the item at a table position
/// DELETE /api/v1/items/:position?asset_id=xxx
pub async fn delete_item(
    State(state): State<AppState>,
    Path(position): Path<usize>,
    Query(query): Query<DeleteQuery>,
) -> Result<impl IntoResponse> {
    let removed = ClosetService::delete_item(
        &state.metadata,
        state.assets.as_ref(),
        position,
        query.asset_id.as_deref(),
    )
    .await?;

    let message = match removed {
        Some(_) => "Item deleted",
        None => "Nothing to delete at that position",
    };
    Ok(Json(ApiResponse::<()>::success_message(message)))
}
