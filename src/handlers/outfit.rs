use axum::{extract::State, Json};

use crate::ai::CompletionParams;
use crate::error::{ApiResponse, Result};
use crate::models::{SuggestRequest, SuggestionView};
use crate::services::StylistService;
use crate::AppState;

/// Suggest outfits for an occasion
/// POST /api/v1/outfits/suggest
pub async fn suggest_outfits(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<ApiResponse<SuggestionView>>> {
    let params = CompletionParams::from(&state.config.openrouter);
    let view = StylistService::suggest(
        &state.metadata,
        state.completion.as_ref(),
        &params,
        &req.occasion,
    )
    .await?;
    Ok(Json(ApiResponse::success(view)))
}
