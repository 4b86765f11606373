//! Compiled-in course content: alphabets and practice exercises
//!
//! Everything here is constant data. Nothing is loaded or mutated at runtime.

mod characters;
mod exercises;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlashCard {
    pub prompt: &'static str,
    pub answer: &'static str,
    pub media: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslateItem {
    pub source_text: &'static str,
    pub target_text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseItem {
    FlashCard(FlashCard),
    Translate(TranslateItem),
}

impl ExerciseItem {
    /// What the learner is shown
    pub fn prompt(&self) -> &'static str {
        match self {
            ExerciseItem::FlashCard(card) => card.prompt,
            ExerciseItem::Translate(item) => item.source_text,
        }
    }

    /// What the learner should produce
    pub fn answer(&self) -> &'static str {
        match self {
            ExerciseItem::FlashCard(card) => card.answer,
            ExerciseItem::Translate(item) => item.target_text,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExerciseItem::FlashCard(_) => "Flashcard",
            ExerciseItem::Translate(_) => "Translate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExerciseSet {
    pub id: u32,
    pub xp: u32,
    pub difficulty: Difficulty,
    pub items: &'static [ExerciseItem],
}

/// A labelled run of glyphs ("Consonants", "Vowels", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterGroup {
    pub role: &'static str,
    pub dialogue_items: &'static [&'static str],
}

/// Character groups for a language code (`"kn"`, `"hi"`, ...).
pub fn characters(code: &str) -> Option<&'static [CharacterGroup]> {
    characters::TABLE
        .iter()
        .find(|(lang, _)| *lang == code)
        .map(|(_, groups)| *groups)
}

/// Language codes with a character table, in display order.
pub fn character_languages() -> Vec<&'static str> {
    characters::TABLE.iter().map(|(lang, _)| *lang).collect()
}

pub fn exercise_sets() -> &'static [ExerciseSet] {
    exercises::SETS
}

pub fn exercise_set(id: u32) -> Option<&'static ExerciseSet> {
    exercises::SETS.iter().find(|set| set.id == id)
}

pub fn total_xp() -> u32 {
    exercises::SETS.iter().map(|set| set.xp).sum()
}
