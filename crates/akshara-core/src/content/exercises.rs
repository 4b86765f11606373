use super::{Difficulty, ExerciseItem, ExerciseSet, FlashCard, TranslateItem};

const APPLE: ExerciseItem = ExerciseItem::FlashCard(FlashCard {
    prompt: "apple",
    answer: "ಸೇಬು",
    media: Some("apple.png"),
});

const WATER: ExerciseItem = ExerciseItem::FlashCard(FlashCard {
    prompt: "water",
    answer: "ನೀರು",
    media: Some("water.png"),
});

const WHERE_IS_BATHROOM: ExerciseItem = ExerciseItem::Translate(TranslateItem {
    source_text: "Where is the bathroom?",
    target_text: "ಶೌಚಾಲಯ ಎಲ್ಲಿದೆ?",
});

const HELP_PLEASE: ExerciseItem = ExerciseItem::Translate(TranslateItem {
    source_text: "I need help, please",
    target_text: "ದಯವಿಟ್ಟು ನನಗೆ ಸಹಾಯ ಬೇಕು",
});

/// Practice sets for the first chapter.
pub(super) const SETS: &[ExerciseSet] = &[
    ExerciseSet {
        id: 1,
        xp: 10,
        difficulty: Difficulty::Easy,
        items: &[HELP_PLEASE, APPLE],
    },
    ExerciseSet {
        id: 2,
        xp: 10,
        difficulty: Difficulty::Easy,
        items: &[WHERE_IS_BATHROOM, WATER],
    },
];
