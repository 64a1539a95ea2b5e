use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const PREP_TIME_RANGE: (u32, u32) = (5, 120);
pub const COOK_TIME_RANGE: (u32, u32) = (5, 180);
pub const DEFAULT_PREP_TIME: u32 = 30;
pub const DEFAULT_COOK_TIME: u32 = 45;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DietaryTag {
    Vegan,
    Vegetarian,
    #[serde(rename = "Gluten-Free")]
    GlutenFree,
    Keto,
    #[serde(rename = "Low-Carb")]
    LowCarb,
}

impl DietaryTag {
    pub const ALL: [DietaryTag; 5] = [
        DietaryTag::Vegan,
        DietaryTag::Vegetarian,
        DietaryTag::GlutenFree,
        DietaryTag::Keto,
        DietaryTag::LowCarb,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DietaryTag::Vegan => "Vegan",
            DietaryTag::Vegetarian => "Vegetarian",
            DietaryTag::GlutenFree => "Gluten-Free",
            DietaryTag::Keto => "Keto",
            DietaryTag::LowCarb => "Low-Carb",
        }
    }
}

/// Heading words a recipe written in one language uses for its sections.
#[derive(Debug)]
pub struct HeadingKeywords {
    pub ingredients: &'static [&'static str],
    pub instructions: &'static [&'static str],
    pub side_dishes: &'static [&'static str],
}

const ENGLISH_HEADINGS: HeadingKeywords = HeadingKeywords {
    ingredients: &["ingredients"],
    instructions: &["instructions", "directions"],
    side_dishes: &["side dish"],
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Italian,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
        }
    }

    /// Keywords are lowercase. English words are checked for every language
    /// in addition to these.
    pub fn headings(self) -> &'static HeadingKeywords {
        match self {
            Language::English => &ENGLISH_HEADINGS,
            Language::Spanish => &HeadingKeywords {
                ingredients: &["ingredientes"],
                instructions: &["instrucciones", "preparación", "preparacion", "elaboración", "elaboracion"],
                side_dishes: &["guarnición", "guarnicion", "acompañamiento", "acompañante"],
            },
            Language::French => &HeadingKeywords {
                ingredients: &["ingrédients"],
                instructions: &["préparation", "preparation", "étapes"],
                side_dishes: &["accompagnement", "garniture"],
            },
            Language::German => &HeadingKeywords {
                ingredients: &["zutaten"],
                instructions: &["zubereitung", "anleitung", "anweisungen"],
                side_dishes: &["beilage"],
            },
            Language::Italian => &HeadingKeywords {
                ingredients: &["ingredienti"],
                instructions: &["istruzioni", "preparazione", "procedimento"],
                side_dishes: &["contorn"],
            },
        }
    }

    pub fn english_headings() -> &'static HeadingKeywords {
        &ENGLISH_HEADINGS
    }

    /// Printed section titles: ingredients, instructions, side dishes.
    pub fn section_labels(self) -> [&'static str; 3] {
        match self {
            Language::English => ["Ingredients", "Instructions", "Side Dishes"],
            Language::Spanish => ["Ingredientes", "Instrucciones", "Guarniciones"],
            Language::French => ["Ingrédients", "Préparation", "Accompagnements"],
            Language::German => ["Zutaten", "Zubereitung", "Beilagen"],
            Language::Italian => ["Ingredienti", "Istruzioni", "Contorni"],
        }
    }
}

fn default_prep_time() -> u32 {
    DEFAULT_PREP_TIME
}

fn default_cook_time() -> u32 {
    DEFAULT_COOK_TIME
}

/// One click of "Get Recipe".
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecipeRequest {
    pub craving: String,
    #[serde(default)]
    pub dietary: Vec<DietaryTag>,
    #[serde(default = "default_prep_time")]
    pub prep_time: u32,
    #[serde(default = "default_cook_time")]
    pub cook_time: u32,
    #[serde(default)]
    pub language: Language,
}

impl RecipeRequest {
    pub fn new(craving: impl Into<String>) -> Self {
        RecipeRequest {
            craving: craving.into(),
            dietary: Vec::new(),
            prep_time: DEFAULT_PREP_TIME,
            cook_time: DEFAULT_COOK_TIME,
            language: Language::default(),
        }
    }

    /// Runs before any completion call is made.
    pub fn validate(&self) -> Result<()> {
        if self.craving.trim().is_empty() {
            return Err(AppError::EmptyCraving);
        }
        check_range("prep_time", self.prep_time, PREP_TIME_RANGE)?;
        check_range("cook_time", self.cook_time, COOK_TIME_RANGE)?;
        Ok(())
    }
}

fn check_range(field: &str, value: u32, (min, max): (u32, u32)) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::Validation(format!(
            "{} must be between {} and {} minutes, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}
