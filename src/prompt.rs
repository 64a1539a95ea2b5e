use crate::recipe::RecipeRequest;

/// Sent in place of the tag list when nothing was selected.
pub const NO_RESTRICTIONS: &str = "no restrictions";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

pub fn compose(req: &RecipeRequest) -> Prompts {
    Prompts {
        system: system_prompt(req),
        user: user_prompt(req),
    }
}

fn system_prompt(req: &RecipeRequest) -> String {
    format!(
        "You are a helpful and multilingual recipe assistant.\n\
         Based on user input, generate a delicious recipe in {}.\n\
         Consider any dietary restrictions and stay within the time constraints.\n\
         Include:\n\
         - Title\n\
         - Ingredients\n\
         - Step-by-step Instructions\n\
         - Suggested side dishes (2-3)",
        req.language.name()
    )
}

fn user_prompt(req: &RecipeRequest) -> String {
    let filters = dietary_filters(req);
    let mut result = String::with_capacity(req.craving.len() + filters.len() + 160);
    result.push_str(&format!("I feel like eating {}.\n", req.craving));
    result.push_str(&format!("Please make it {}.\n", filters));
    result.push_str(&format!("Maximum prep time: {} minutes.\n", req.prep_time));
    result.push_str(&format!("Maximum cook time: {} minutes.\n", req.cook_time));
    result.push_str(&format!("Respond in {}.", req.language.name()));
    result
}

fn dietary_filters(req: &RecipeRequest) -> String {
    if req.dietary.is_empty() {
        return NO_RESTRICTIONS.to_string();
    }
    req.dietary
        .iter()
        .map(|tag| tag.label())
        .collect::<Vec<_>>()
        .join(", ")
}
