use crate::ai::{build_messages, parse_outfits, CompletionClient, CompletionParams};
use crate::error::{AppError, Result};
use crate::metadata::MetadataStore;
use crate::models::{OutfitSuggestion, SuggestionView, WardrobeItem};

/// AI outfit suggestions
pub struct StylistService;

impl StylistService {
    /// Handle a suggestion request from the user
    pub async fn suggest(
        store: &MetadataStore,
        client: &dyn CompletionClient,
        params: &CompletionParams,
        occasion: &str,
    ) -> Result<SuggestionView> {
        let occasion = occasion.trim();
        if occasion.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter a prompt to get outfit suggestions.".to_string(),
            ));
        }

        let items = store.load().await?;
        if items.is_empty() {
            return Ok(SuggestionView::empty_closet());
        }

        let outfits = Self::suggest_outfits(&items, occasion, client, params).await?;
        Ok(SuggestionView::from_outfits(outfits))
    }

    /// Ask the model for outfits drawn from `items`.
    ///
    /// Returned URLs are not checked against the wardrobe.
    pub async fn suggest_outfits(
        items: &[WardrobeItem],
        occasion: &str,
        client: &dyn CompletionClient,
        params: &CompletionParams,
    ) -> Result<Vec<OutfitSuggestion>> {
        let messages = build_messages(items, occasion);
        tracing::info!(
            "Requesting outfits for {:?} from {} item(s)",
            occasion,
            items.len()
        );

        let raw = client.chat(&messages, params).await?;
        tracing::debug!("Stylist reply: {}", raw);

        let outfits = parse_outfits(&raw).map_err(|e| e.into_app_error(&raw))?;
        tracing::info!("Parsed {} outfit(s)", outfits.len());
        Ok(outfits)
    }
}
