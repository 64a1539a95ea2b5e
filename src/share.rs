use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::markdown;

/// Which rendition of the recipe goes into the share links.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMode {
    /// The reply exactly as the model returned it.
    #[default]
    Full,
    /// The reply with Markdown decoration removed.
    PlainText,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub email: String,
    pub whatsapp: String,
    pub twitter: String,
}

pub const EMAIL_PREFIX: &str = "mailto:?subject=Recipe&body=";
pub const WHATSAPP_PREFIX: &str = "https://wa.me/?text=";
pub const TWITTER_PREFIX: &str = "https://twitter.com/intent/tweet?text=";

/// Links are not checked against the target services' URL length limits.
pub fn build(recipe: &str, mode: ShareMode) -> ShareLinks {
    let text = match mode {
        ShareMode::Full => recipe.to_string(),
        ShareMode::PlainText => markdown::strip(recipe),
    };
    let encoded = encode(&text);

    ShareLinks {
        email: format!("{}{}", EMAIL_PREFIX, encoded),
        whatsapp: format!("{}{}", WHATSAPP_PREFIX, encoded),
        twitter: format!("{}{}", TWITTER_PREFIX, encoded),
    }
}
