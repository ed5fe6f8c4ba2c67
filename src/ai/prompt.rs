use crate::ai::ChatMessage;
use crate::models::WardrobeItem;

pub const STYLIST_INSTRUCTIONS: &str = "You are an AI fashion stylist. The user has a wardrobe of clothes. \
Choose outfit sets based on their request. \
Return ONLY a JSON array of arrays, where each inner array contains the Image URLs of one outfit. \
Example: [[\"url1\", \"url2\"], [\"url3\", \"url4\"]]. \
Do NOT include any other text, markdown, or explanation. Reply with the raw JSON only.";

const WARDROBE_HEADER: &str = "Image URL, Category, Color, Season";

/// One `image_url,category,color,season` line per item, in table order.
/// Rows edited by hand may still carry commas or line breaks; they are
/// rewritten so every line keeps exactly four fields.
pub fn serialize_wardrobe(items: &[WardrobeItem]) -> String {
    items
        .iter()
        .map(|i| {
            format!(
                "{},{},{},{}",
                url_column(&i.image_url),
                tag_column(&i.category),
                tag_column(&i.color),
                tag_column(&i.season)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn url_column(url: &str) -> String {
    url.replace(',', "%2C").replace(['\r', '\n'], "")
}

fn tag_column(tag: &str) -> String {
    tag.replace(',', ";").replace(['\r', '\n'], " ")
}

/// Request block: header lines, the wardrobe, a blank line, then the occasion
pub fn user_message(items: &[WardrobeItem], occasion: &str) -> String {
    format!(
        "Here is my wardrobe:\n{}\n{}\n\nRequest: {}",
        WARDROBE_HEADER,
        serialize_wardrobe(items),
        occasion
    )
}

pub fn build_messages(items: &[WardrobeItem], occasion: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(STYLIST_INSTRUCTIONS),
        ChatMessage::user(user_message(items, occasion)),
    ]
}
