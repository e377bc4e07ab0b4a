//! Keyword intent detection.
//!
//! Two passes over the lowercased, tokenised transcript:
//!
//! 1. **Q&A overlap**: a fixed question matches when at least two of its
//!    content words (longer than 3 characters, not stop words) appear in the
//!    transcript, or one matching word is longer than 5 characters.
//! 2. **Topic keywords**: the first topic whose keyword set intersects the
//!    transcript wins. Keywords match whole words (plurals included) so
//!    `"hi"` does not fire on `"which"`.

use crate::resume::QaPair;

// ---------------------------------------------------------------------------
// Topic / Intent
// ---------------------------------------------------------------------------

/// Resume topics that have a templated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Greeting,
    Name,
    Summary,
    Experience,
    Skills,
    Education,
    Contact,
    Certifications,
    Contributions,
    CommunityEngagement,
    Location,
    Unknown,
}

/// Outcome of keyword resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// A Q&A pair matched; speak its answer verbatim.
    Direct { answer: String },
    /// Render the template for this topic from resume fields.
    Template(Topic),
}

// ---------------------------------------------------------------------------
// Static keyword tables
// ---------------------------------------------------------------------------

struct TopicKeywords {
    topic: Topic,
    keywords: &'static [&'static str],
}

/// Checked in order; the first hit wins.
static TOPICS: &[TopicKeywords] = &[
    TopicKeywords {
        topic: Topic::Greeting,
        keywords: &["hi", "hello", "hey", "greetings"],
    },
    TopicKeywords {
        topic: Topic::Name,
        keywords: &["name", "called", "who are you"],
    },
    TopicKeywords {
        topic: Topic::Summary,
        keywords: &[
            "summary",
            "about you",
            "about yourself",
            "tell me about you",
            "background",
        ],
    },
    TopicKeywords {
        topic: Topic::Experience,
        keywords: &[
            "experience",
            "work history",
            "worked",
            "company",
            "companies",
            "job",
            "employment",
        ],
    },
    TopicKeywords {
        topic: Topic::Skills,
        keywords: &[
            "skill",
            "abilities",
            "capable",
            "know how",
            "proficient",
            "good at",
            "technologies",
        ],
    },
    TopicKeywords {
        topic: Topic::Education,
        keywords: &[
            "education",
            "school",
            "college",
            "university",
            "degree",
            "study",
            "studied",
            "graduated",
        ],
    },
    TopicKeywords {
        topic: Topic::Contact,
        keywords: &["contact", "email", "phone", "reach", "linkedin", "connect", "github"],
    },
    TopicKeywords {
        topic: Topic::Certifications,
        keywords: &["certification", "certified", "license", "credential"],
    },
    TopicKeywords {
        topic: Topic::Contributions,
        keywords: &["drupal", "cms", "contribution", "open source", "community"],
    },
    TopicKeywords {
        topic: Topic::CommunityEngagement,
        keywords: &["community", "engagement", "involvement", "participate"],
    },
    TopicKeywords {
        topic: Topic::Location,
        keywords: &["where", "live", "located", "location", "city", "state"],
    },
];

/// Function words ignored when comparing a transcript with Q&A questions.
static STOP_WORDS: &[&str] = &[
    "what", "your", "have", "with", "about", "tell", "where", "when", "which", "that", "this",
    "were", "does", "from", "been", "there", "their", "they", "would", "could", "some", "into",
    "more", "most", "also", "like", "please",
];

// ---------------------------------------------------------------------------
// Tokenising helpers
// ---------------------------------------------------------------------------

/// Lowercased words with surrounding punctuation removed.
fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// `token` is `keyword` or its plural.
fn word_matches(token: &str, keyword: &str) -> bool {
    token == keyword
        || token
            .strip_suffix('s')
            .is_some_and(|stem| stem == keyword || stem.strip_suffix('e') == Some(keyword))
}

/// Whole-word (or whole-phrase) membership test.
fn contains_keyword(tokens: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    if parts.len() == 1 {
        return tokens.iter().any(|t| word_matches(t, keyword));
    }
    tokens.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .enumerate()
            .all(|(i, (token, part))| {
                if i + 1 == parts.len() {
                    word_matches(token, part)
                } else {
                    token == part
                }
            })
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// First Q&A pair whose question overlaps the transcript enough to count.
pub fn match_qa_pair<'a>(text: &str, pairs: &'a [QaPair]) -> Option<&'a QaPair> {
    let transcript = tokens(text);
    if transcript.is_empty() {
        return None;
    }

    pairs.iter().find(|pair| {
        let matched: Vec<String> = tokens(&pair.question)
            .into_iter()
            .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(&w.as_str()))
            .filter(|w| transcript.iter().any(|t| t == w))
            .collect();
        matched.len() >= 2 || (matched.len() == 1 && matched[0].chars().count() > 5)
    })
}

/// Topic for `text` by keyword-set membership, or [`Topic::Unknown`].
pub fn classify_topic(text: &str) -> Topic {
    let transcript = tokens(text);
    TOPICS
        .iter()
        .find(|entry| {
            entry
                .keywords
                .iter()
                .any(|kw| contains_keyword(&transcript, kw))
        })
        .map(|entry| entry.topic)
        .unwrap_or(Topic::Unknown)
}

/// Q&A pairs first, then topic keywords.
pub fn identify_intent(text: &str, pairs: &[QaPair]) -> Intent {
    match match_qa_pair(text, pairs) {
        Some(pair) => Intent::Direct {
            answer: pair.answer.clone(),
        },
        None => Intent::Template(classify_topic(text)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
