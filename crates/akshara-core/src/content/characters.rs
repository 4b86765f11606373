use super::CharacterGroup;

const EN: &[CharacterGroup] = &[CharacterGroup {
    role: "Alphabet",
    dialogue_items: &[
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
        "T", "U", "V", "W", "X", "Y", "Z",
    ],
}];

const KN: &[CharacterGroup] = &[
    CharacterGroup {
        role: "Consonants",
        dialogue_items: &[
            "ಕ", "ಖ", "ಗ", "ಘ", "ಙ", "ಚ", "ಛ", "ಜ", "ಝ", "ಞ", "ಟ", "ಠ", "ಡ", "ಢ", "ಣ", "ತ", "ಥ", "ದ",
            "ಧ", "ನ", "ಪ", "ಫ", "ಬ", "ಭ", "ಮ", "ಯ", "ರ", "ಲ", "ವ", "ಶ", "ಷ", "ಸ", "ಹ", "ಳ",
        ],
    },
    CharacterGroup {
        role: "Vowels",
        dialogue_items: &[
            "ಅ", "ಆ", "ಇ", "ಈ", "ಉ", "ಊ", "ಋ", "ೠ", "ಎ", "ಏ", "ಐ", "ಒ", "ಓ", "ಔ",
        ],
    },
];

const TE: &[CharacterGroup] = &[
    CharacterGroup {
        role: "Consonants",
        dialogue_items: &[
            "క", "ఖ", "గ", "ఘ", "ఙ", "చ", "ఛ", "జ", "ఝ", "ఞ", "ట", "ఠ", "డ", "ఢ", "ణ", "త", "థ", "ద",
            "ధ", "న", "ప", "ఫ", "బ", "భ", "మ", "య", "ర", "ల", "వ", "శ", "ష", "స", "హ", "ళ",
        ],
    },
    CharacterGroup {
        role: "Vowels",
        dialogue_items: &[
            "అ", "ఆ", "ఇ", "ఈ", "ఉ", "ఊ", "ఋ", "ౠ", "ఎ", "ఏ", "ఐ", "ఒ", "ఓ", "ఔ",
        ],
    },
];

const TA: &[CharacterGroup] = &[
    CharacterGroup {
        role: "Consonants",
        dialogue_items: &[
            "க", "ங", "ச", "ஞ", "ட", "ண", "த", "ந", "ப", "ம", "ய", "ர", "ல", "வ", "ழ", "ள", "ஷ", "ஸ",
            "ஹ", "க்ஷ",
        ],
    },
    CharacterGroup {
        role: "Vowels",
        dialogue_items: &["அ", "ஆ", "இ", "ஈ", "உ", "ஊ", "எ", "ஏ", "ஐ", "ஒ", "ஓ", "ஔ"],
    },
];

const HI: &[CharacterGroup] = &[
    CharacterGroup {
        role: "Consonants",
        dialogue_items: &[
            "क", "ख", "ग", "घ", "ङ", "च", "छ", "ज", "झ", "ञ", "ट", "ठ", "ड", "ढ", "ण", "त", "थ", "द",
            "ध", "न", "प", "फ", "ब", "भ", "म", "य", "र", "ल", "व", "श", "ष", "स", "ह", "क्ष", "त्र",
            "ज्ञ",
        ],
    },
    CharacterGroup {
        role: "Vowels",
        dialogue_items: &["अ", "आ", "इ", "ई", "उ", "ऊ", "ऋ", "ॠ", "ए", "ऐ", "ओ", "औ"],
    },
    CharacterGroup {
        role: "Numerals",
        dialogue_items: &["०", "१", "२", "३", "४", "५", "६", "७", "८", "९"],
    },
];

/// Character groups keyed by language code
pub(super) const TABLE: &[(&str, &[CharacterGroup])] = &[
    ("en", EN),
    ("kn", KN),
    ("te", TE),
    ("ta", TA),
    ("hi", HI),
];
