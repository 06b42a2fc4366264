//! Fixed word and phrase lists behind the lexical heuristics.
//!
//! Single-word cues are matched against whole tokens; multi-word cues are
//! matched against the space-joined token stream, so punctuation between
//! words does not break a match. Theme keywords are matched as substrings of
//! the lowercased text.

/// Function words dropped during keyword extraction.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "this", "that", "with", "they", "from", "what", "when",
    "where", "which", "who", "will", "would", "there", "their", "about", "been", "just", "like",
    "some", "them", "than", "then", "were", "your", "also", "into", "more", "very", "really",
    "much", "how", "its", "his", "she", "him", "did", "does", "got", "get", "let", "too", "here",
    "only", "could", "should", "i'm", "i've", "i'll", "i'd", "it's", "don't", "can't", "didn't",
    "that's", "you're", "we're", "they're",
];

/// Maximum number of keywords kept per message.
pub const MAX_KEYWORDS: usize = 20;

/// Tokens shorter than this are dropped.
pub const MIN_KEYWORD_LEN: usize = 3;

/// Theme labels and the substrings that signal them.
pub const THEMES: &[(&str, &[&str])] = &[
    (
        "work",
        &[
            "work", "job", "boss", "office", "meeting", "deadline", "project", "career",
            "colleague", "coworker", "promotion", "salary",
        ],
    ),
    (
        "relationships",
        &[
            "friend", "partner", "girlfriend", "boyfriend", "wife", "husband", "relationship",
            "dating", "marriage",
        ],
    ),
    (
        "family",
        &[
            "family", "my mom", "mum", "dad", "mother", "father", "sister", "brother", "parents",
            "grandma", "grandpa", "kids", "daughter", "son's", "my son", "cousin",
        ],
    ),
    (
        "health",
        &[
            "health", "sick", "doctor", "hospital", "painful", "exercise", "workout", "sleep",
            "tired", "diet", "medicine", "therapy",
        ],
    ),
    (
        "hobbies",
        &[
            "hobby", "game", "gaming", "music", "guitar", "painting", "drawing", "reading",
            "novel", "movie", "hiking", "garden", "photography",
        ],
    ),
    (
        "achievements",
        &[
            "achieve", "accomplish", "winning", "success", "proud", "milestone", "goal",
            "promoted", "graduated", "award",
        ],
    ),
    (
        "challenges",
        &[
            "problem", "struggle", "difficult", "hard time", "challenge", "issue", "trouble",
            "stuck", "obstacle", "fail",
        ],
    ),
    (
        "learning",
        &[
            "learn", "study", "course", "class", "school", "university", "lesson", "tutorial",
            "practice", "skill",
        ],
    ),
    (
        "technology",
        &[
            "computer", "software", "code", "coding", "programming", "apps", "tech",
            "artificial intelligence", "phone", "internet", "website", "robot",
        ],
    ),
    (
        "finance",
        &[
            "money", "budget", "bank", "invest", "savings", "debt", "loan", "landlord", "bills",
            "expense", "price", "payment",
        ],
    ),
    (
        "home",
        &[
            "home", "house", "apartment", "kitchen", "cleaning", "furniture", "moving",
            "neighbor",
        ],
    ),
    (
        "food",
        &[
            "food", "eating", "cook", "recipe", "dinner", "lunch", "breakfast", "restaurant",
            "meal", "whiskey", "wine", "coffee", "drink", "beer",
        ],
    ),
    (
        "emotions",
        &[
            "feel", "happy", "sad", "angry", "anxious", "stress", "worried", "excited", "lonely",
            "upset", "overwhelmed",
        ],
    ),
];

/// Themes that raise a thread's relationship importance.
pub const HIGH_IMPORTANCE_THEMES: &[&str] = &["relationships", "health", "work", "family"];

/// Explicit discourse markers announcing a topic change.
pub const EXPLICIT_CUES: &[&str] = &[
    "anyway",
    "anyways",
    "by the way",
    "btw",
    "speaking of",
    "on another note",
    "on a different note",
    "changing the subject",
    "change of subject",
    "switching gears",
    "moving on",
    "unrelated",
    "oh and",
];

/// Question-style pivots toward another topic.
pub const QUESTION_CUES: &[&str] = &[
    "what about",
    "how about",
    "have you heard",
    "did you hear",
    "what do you think about",
    "can we talk about",
    "let's talk about",
    "tell me about",
];

/// Temporal markers.
pub const TIME_CUES: &[&str] = &[
    "meanwhile",
    "earlier",
    "later",
    "yesterday",
    "tomorrow",
    "tonight",
    "recently",
    "last week",
    "next week",
    "this morning",
    "the other day",
];

/// Patterns that mark a message as prompted by a reminder.
pub const REMINDER_CUES: &[&str] = &[
    "remind",
    "reminds",
    "reminded",
    "remember",
    "don't forget",
    "before i forget",
];

/// First words that open a contrastive or discourse turn.
pub const CONTRASTIVE_OPENERS: &[&str] = &[
    "anyway",
    "anyways",
    "but",
    "however",
    "also",
    "actually",
    "oh",
    "so",
    "btw",
    "meanwhile",
    "speaking",
    "separately",
    "incidentally",
    "alternatively",
];

/// Substrings of stress or overwhelm.
pub const STRESS_WORDS: &[&str] = &[
    "stress",
    "overwhelm",
    "anxious",
    "anxiety",
    "panic",
    "can't cope",
    "breaking down",
    "desperate",
    "freaking out",
    "burnout",
    "burned out",
    "exhausted",
    "help me",
];

/// Phrases marking time pressure.
pub const TIME_PRESSURE_CUES: &[&str] = &[
    "deadline",
    "urgent",
    "asap",
    "due",
    "today",
    "tonight",
    "tomorrow",
    "right now",
    "immediately",
    "running out of time",
];

/// Phrases marking a commitment the owner made.
pub const COMMITMENT_CUES: &[&str] = &[
    "need to",
    "have to",
    "going to",
    "plan to",
    "remind me to",
    "gotta",
    "i'll",
    "i will",
    "i should",
    "i must",
];

/// Phrases marking that a topic has been wrapped up.
pub const RESOLUTION_CUES: &[&str] = &[
    "solved",
    "resolved",
    "figured it out",
    "all done",
    "it's done",
    "finished",
    "sorted it out",
    "fixed it",
    "works now",
    "that helps",
];
