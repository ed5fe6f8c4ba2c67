use serde::{Deserialize, Serialize};

/// One proposed grouping of image URLs, in the order the model returned them
pub type OutfitSuggestion = Vec<String>;

/// Suggest outfits request
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub occasion: String,
}

#[derive(Debug, Serialize)]
pub struct OutfitView {
    pub number: usize,
    pub label: String,
    pub pieces: OutfitSuggestion,
}

/// Suggest outfits response
#[derive(Debug, Serialize)]
pub struct SuggestionView {
    pub closet_empty: bool,
    pub count: usize,
    pub heading: String,
    pub outfits: Vec<OutfitView>,
}

impl SuggestionView {
    pub fn empty_closet() -> Self {
        Self {
            closet_empty: true,
            count: 0,
            heading: "Your closet is empty! Add some items first.".to_string(),
            outfits: Vec::new(),
        }
    }

    pub fn from_outfits(outfits: Vec<OutfitSuggestion>) -> Self {
        let count = outfits.len();
        let heading = format!("{} Outfit{} Suggested", count, if count == 1 { "" } else { "s" });
        let outfits = outfits
            .into_iter()
            .enumerate()
            .map(|(i, pieces)| OutfitView {
                number: i + 1,
                label: format!("Outfit {}", i + 1),
                pieces,
            })
            .collect();

        Self {
            closet_empty: false,
            count,
            heading,
            outfits,
        }
    }
}
