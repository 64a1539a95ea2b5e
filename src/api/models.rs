use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::export::ExportStyle;
use crate::recipe::{DietaryTag, Language, RecipeRequest};
use crate::sections::RecipeSections;
use crate::share::{ShareLinks, ShareMode};

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub recipe: RecipeRequest,
    #[serde(default)]
    pub export_style: ExportStyle,
    #[serde(default)]
    pub share_mode: ShareMode,
}

/// The PDF exported from this completion, delivered with the response.
#[derive(Serialize)]
pub struct DocumentInfo {
    pub file_name: String,
    pub page_count: usize,
    /// Characters the PDF font could not encode and printed as `?`.
    pub replaced_chars: usize,
    pub content_base64: String,
}

#[derive(Serialize)]
pub struct RecipeResponse {
    #[serde(rename = "recipe_markdown")]
    pub recipe: String,
    pub recipe_html: String,
    pub sections: RecipeSections,
    pub document: DocumentInfo,
    pub share_links: ShareLinks,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ExportRequest {
    pub recipe: String,
    #[serde(default)]
    pub export_style: ExportStyle,
    #[serde(default)]
    pub language: Language,
}

#[derive(Serialize)]
pub struct SliderBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

/// Choices the page offers, so it is built from the same enumerations the
/// API accepts.
#[derive(Serialize)]
pub struct OptionsResponse {
    pub dietary_tags: Vec<DietaryTag>,
    pub languages: Vec<Language>,
    pub prep_time: SliderBounds,
    pub cook_time: SliderBounds,
}
