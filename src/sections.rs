use serde::Serialize;

use crate::recipe::{HeadingKeywords, Language};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Title,
    Ingredients,
    Instructions,
    SideDishes,
}

/// A recipe reply split into the buckets the sectioned PDF prints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecipeSections {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub side_dishes: String,
}

impl RecipeSections {
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Title => &self.title,
            Section::Ingredients => &self.ingredients,
            Section::Instructions => &self.instructions,
            Section::SideDishes => &self.side_dishes,
        }
    }

    fn push(&mut self, section: Section, line: &str) {
        let bucket = match section {
            Section::Title => &mut self.title,
            Section::Ingredients => &mut self.ingredients,
            Section::Instructions => &mut self.instructions,
            Section::SideDishes => &mut self.side_dishes,
        };
        if !bucket.is_empty() {
            bucket.push('\n');
        }
        bucket.push_str(line);
    }
}

/// Best-effort split of a reply into sections by its heading lines.
///
/// Lines before the first recognised heading land in the title bucket.
/// Headings are matched case-insensitively against the English words and
/// the words of `language`.
pub fn classify(text: &str, language: Language) -> RecipeSections {
    let mut sections = RecipeSections::default();
    let mut current = Section::Title;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match heading_of(line, language) {
            Some(section) => {
                current = section;
                if let Some(rest) = inline_content(line) {
                    sections.push(current, rest);
                }
            }
            None => sections.push(current, line),
        }
    }

    sections
}

fn heading_of(line: &str, language: Language) -> Option<Section> {
    let normalized = line
        .trim_start_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace())
        .to_lowercase();

    let tables: [&HeadingKeywords; 2] = [Language::english_headings(), language.headings()];
    let starts = |words: &[&str]| words.iter().any(|k| normalized.starts_with(*k));
    let contains = |words: &[&str]| words.iter().any(|k| normalized.contains(*k));

    if tables.iter().any(|t| starts(t.ingredients)) {
        Some(Section::Ingredients)
    } else if tables.iter().any(|t| starts(t.instructions)) {
        Some(Section::Instructions)
    } else if tables.iter().any(|t| contains(t.side_dishes)) {
        Some(Section::SideDishes)
    } else {
        None
    }
}

/// Text following the first ':' of a heading line, if any.
fn inline_content(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(':')?;
    let rest = rest.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
    (!rest.is_empty()).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_headings_into_buckets() {
        let text = "Title\nIngredients\n- salt\nInstructions\n1. cook\nSide dishes: rice";
        let sections = classify(text, Language::English);

        assert_eq!(sections.title, "Title");
        assert_eq!(sections.ingredients, "- salt");
        assert_eq!(sections.instructions, "1. cook");
        assert_eq!(sections.side_dishes, "rice");
    }

    #[test]
    fn markdown_headings_and_directions_are_recognised() {
        let text = "# Lemon Pasta\n\n## Ingredients:\n- pasta\n- lemon\n\n**Directions**\n1. Boil.\n2. Toss.\n\n### Suggested Side Dishes\n- salad";
        let sections = classify(text, Language::English);

        assert_eq!(sections.title, "# Lemon Pasta");
        assert_eq!(sections.ingredients, "- pasta\n- lemon");
        assert_eq!(sections.instructions, "1. Boil.\n2. Toss.");
        assert_eq!(sections.side_dishes, "- salad");
    }

    #[test]
    fn localized_headings_follow_the_language() {
        let text = "Tortilla española\nIngredientes:\n- huevos\nPreparación:\n1. batir\nAcompañamiento:\n- pan";
        let sections = classify(text, Language::Spanish);

        assert_eq!(sections.title, "Tortilla española");
        assert_eq!(sections.ingredients, "- huevos");
        assert_eq!(sections.instructions, "1. batir");
        assert_eq!(sections.side_dishes, "- pan");
    }

    #[test]
    fn foreign_headings_without_language_fall_through() {
        let text = "Kartoffelsalat\nZutaten\n- Kartoffeln";
        let sections = classify(text, Language::English);

        assert_eq!(sections.title, "Kartoffelsalat\nZutaten\n- Kartoffeln");
        assert!(sections.ingredients.is_empty());
    }

    #[test]
    fn empty_input_produces_empty_sections() {
        assert_eq!(classify("", Language::German), RecipeSections::default());
    }
}
