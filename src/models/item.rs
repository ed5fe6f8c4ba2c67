use serde::{Deserialize, Serialize};

/// Literal header row of the metadata file
pub const REQUIRED_COLUMNS: [&str; 5] = ["Image URL", "Public ID", "Category", "Color", "Season"];

pub const CATEGORY_PRESETS: [&str; 11] = [
    "Hats", "Shirts", "Pants", "Dresses", "Jackets", "Sweaters", "Shorts", "Skirts", "Shoes",
    "Accessories", "Other",
];

pub const COLOR_PRESETS: [&str; 11] = [
    "White", "Black", "Red", "Blue", "Green", "Yellow", "Orange", "Purple", "Pink", "Brown",
    "Other",
];

pub const SEASON_PRESETS: [&str; 6] = ["Spring", "Summer", "Fall", "Winter", "All", "Other"];

/// One cataloged clothing asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub image_url: String,
    pub asset_id: String,
    pub category: String,
    pub color: String,
    pub season: String,
}

/// Row layout of the metadata file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(rename = "Image URL", default)]
    pub image_url: String,
    #[serde(rename = "Public ID", default)]
    pub public_id: String,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Color", default)]
    pub color: String,
    #[serde(rename = "Season", default)]
    pub season: String,
}

impl From<MetadataRecord> for WardrobeItem {
    fn from(record: MetadataRecord) -> Self {
        Self {
            image_url: record.image_url,
            asset_id: record.public_id,
            category: record.category,
            color: record.color,
            season: record.season,
        }
    }
}

impl From<&WardrobeItem> for MetadataRecord {
    fn from(item: &WardrobeItem) -> Self {
        Self {
            image_url: item.image_url.clone(),
            public_id: item.asset_id.clone(),
            category: item.category.clone(),
            color: item.color.clone(),
            season: item.season.clone(),
        }
    }
}

/// Tags supplied with an upload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemTags {
    pub category: String,
    pub color: String,
    pub season: String,
}

impl ItemTags {
    /// Trim every tag. Tags are listed in comma separated rows, so commas
    /// and line breaks are refused.
    pub fn normalize(&mut self) -> std::result::Result<(), String> {
        for (name, value) in [
            ("category", &mut self.category),
            ("color", &mut self.color),
            ("season", &mut self.season),
        ] {
            *value = value.trim().to_string();
            if value.is_empty() {
                return Err(format!("Please choose a {}", name));
            }
            if value.contains([',', '\n', '\r']) {
                return Err(format!("The {} must not contain commas or line breaks", name));
            }
        }
        Ok(())
    }
}

/// An item together with its current row position
#[derive(Debug, Clone, Serialize)]
pub struct IndexedItem {
    pub position: usize,
    #[serde(flatten)]
    pub item: WardrobeItem,
}

/// Closet query parameters (comma separated lists)
/// GET /api/v1/closet?colors=Blue,Red&categories=Shirts
#[derive(Debug, Default, Deserialize)]
pub struct ClosetQuery {
    pub colors: Option<String>,
    pub categories: Option<String>,
    pub seasons: Option<String>,
}

/// Facet filter; an empty list places no constraint on that facet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub colors: Vec<String>,
    pub categories: Vec<String>,
    pub seasons: Vec<String>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

impl From<&ClosetQuery> for ItemFilter {
    fn from(query: &ClosetQuery) -> Self {
        Self {
            colors: split_list(query.colors.as_deref()),
            categories: split_list(query.categories.as_deref()),
            seasons: split_list(query.seasons.as_deref()),
        }
    }
}

impl ItemFilter {
    pub fn matches(&self, item: &WardrobeItem) -> bool {
        fn accepts(allowed: &[String], value: &str) -> bool {
            allowed.is_empty() || allowed.iter().any(|a| a == value)
        }

        accepts(&self.colors, &item.color)
            && accepts(&self.categories, &item.category)
            && accepts(&self.seasons, &item.season)
    }
}

/// Distinct tag values present in the closet, in order of first appearance
#[derive(Debug, Clone, Default, Serialize)]
pub struct Facets {
    pub colors: Vec<String>,
    pub categories: Vec<String>,
    pub seasons: Vec<String>,
}

impl Facets {
    pub fn collect(items: &[WardrobeItem]) -> Self {
        fn push_unique(values: &mut Vec<String>, value: &str) {
            if !value.is_empty() && !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }

        let mut facets = Facets::default();
        for item in items {
            push_unique(&mut facets.colors, &item.color);
            push_unique(&mut facets.categories, &item.category);
            push_unique(&mut facets.seasons, &item.season);
        }
        facets
    }
}

/// Closet browsing view
#[derive(Debug, Serialize)]
pub struct ClosetView {
    pub total: usize,
    pub shown: usize,
    pub label: String,
    pub items: Vec<IndexedItem>,
    pub facets: Facets,
}

/// Preset tag values offered by upload forms
#[derive(Debug, Serialize)]
pub struct TagOptions {
    pub categories: Vec<&'static str>,
    pub colors: Vec<&'static str>,
    pub seasons: Vec<&'static str>,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            categories: CATEGORY_PRESETS.to_vec(),
            colors: COLOR_PRESETS.to_vec(),
            seasons: SEASON_PRESETS.to_vec(),
        }
    }
}

/// Delete query parameters
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Asset id the caller expects at the position
    pub asset_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, color: &str, season: &str) -> WardrobeItem {
        WardrobeItem {
            image_url: format!("https://x/{}.png", category),
            asset_id: category.to_lowercase(),
            category: category.to_string(),
            color: color.to_string(),
            season: season.to_string(),
        }
    }

    #[test]
    fn test_filter_and_within_or_across() {
        let query = ClosetQuery {
            colors: Some("Blue, Red".to_string()),
            categories: None,
            seasons: Some("Summer".to_string()),
        };
        let filter = ItemFilter::from(&query);
        assert_eq!(filter.colors, vec!["Blue", "Red"]);
        assert!(filter.categories.is_empty());

        assert!(filter.matches(&item("Shirts", "Blue", "Summer")));
        assert!(filter.matches(&item("Pants", "Red", "Summer")));
        assert!(!filter.matches(&item("Shirts", "Blue", "Winter")));
        assert!(!filter.matches(&item("Shirts", "Black", "Summer")));
        assert!(ItemFilter::default().matches(&item("Hats", "Black", "Fall")));
    }

    #[test]
    fn test_facets_keep_first_appearance_order() {
        let items = vec![
            item("Shirts", "Blue", "Summer"),
            item("Pants", "Black", "Summer"),
            item("Hats", "Blue", ""),
        ];
        let facets = Facets::collect(&items);
        assert_eq!(facets.colors, vec!["Blue", "Black"]);
        assert_eq!(facets.categories, vec!["Shirts", "Pants", "Hats"]);
        assert_eq!(facets.seasons, vec!["Summer"]);
    }

    #[test]
    fn test_tags_normalize() {
        let mut tags = ItemTags {
            category: " Shirts ".to_string(),
            color: "Blue".to_string(),
            season: "  ".to_string(),
        };
        assert_eq!(tags.normalize(), Err("Please choose a season".to_string()));
        assert_eq!(tags.category, "Shirts");
    }

    #[test]
    fn test_tags_reject_commas() {
        let mut tags = ItemTags {
            category: "Shirts".to_string(),
            color: "Red, White".to_string(),
            season: "Summer".to_string(),
        };
        assert_eq!(
            tags.normalize(),
            Err("The color must not contain commas or line breaks".to_string())
        );

        tags.color = "Red".to_string();
        tags.season = "Summer\nWinter".to_string();
        assert!(tags.normalize().is_err());
    }
}
