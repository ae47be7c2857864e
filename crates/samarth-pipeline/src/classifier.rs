//! Cheap, LLM-free routing of a message before any parsing

use serde::Serialize;

const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "namaste",
    "greetings",
];

const HELP_PHRASES: &[&str] = &[
    "what can you do",
    "what do you do",
    "help me",
    "how does this work",
    "what is this",
    "tell me about yourself",
];

const AGRICULTURE_KEYWORDS: &[&str] = &[
    "crop",
    "rain",
    "rainfall",
    "production",
    "agriculture",
    "wheat",
    "rice",
    "irrigation",
    "harvest",
    "farming",
    "cultivation",
    "paddy",
    "maize",
    "cotton",
    "sugarcane",
    "district",
    "state",
    "yield",
    "water",
    "climate",
    "monsoon",
    "punjab",
    "haryana",
    "maharashtra",
    "karnataka",
    "tamil nadu",
];

pub const GREETING_REPLY: &str = "Hello! I'm SAMARTH, your agriculture and climate data assistant.\n\n\
I can help you analyze:\n\
- Rainfall patterns across states\n\
- Crop production trends\n\
- District-level comparisons\n\
- Water efficiency recommendations\n\n\
Ask about a state, a crop or a year range to get started.";

pub const HELP_REPLY: &str = "I can help you with questions about Indian agriculture and climate data!\n\n\
**Available:**\n\
- 33 states\n\
- 100+ crops\n\
- Rainfall: 1901-2017\n\
- Crops: 1997-2014\n\
- Water efficiency: 8 crops\n\n\
Example: \"Compare rainfall in Punjab and Haryana for 2010-2014\"";

/// Route of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Greeting,
    Help,
    Agriculture,
    General,
}

/// Classify a raw message.
///
/// A greeting must be the whole message, or appear as a whole word in a
/// message of at most three words, so "highest" never counts as "hi".
/// Help phrases only apply when the message asks nothing about agriculture.
pub fn classify_chat(question: &str) -> ChatKind {
    let lower = question.trim().to_lowercase();
    let words = words(&lower);

    let bare = words.join(" ");
    if GREETINGS.contains(&bare.as_str()) {
        return ChatKind::Greeting;
    }

    if words.len() <= 3 && GREETINGS.iter().any(|g| contains_phrase(&words, g)) {
        return ChatKind::Greeting;
    }

    if is_agriculture_question(&lower) {
        return ChatKind::Agriculture;
    }

    if HELP_PHRASES.iter().any(|p| lower.contains(p)) {
        ChatKind::Help
    } else {
        ChatKind::General
    }
}

/// Substring match against the agriculture keyword list
pub fn is_agriculture_question(question: &str) -> bool {
    let lower = question.to_lowercase();
    AGRICULTURE_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split(' ').collect();
    words.windows(parts.len()).any(|window| window == parts.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings() {
        assert_eq!(classify_chat("hi"), ChatKind::Greeting);
        assert_eq!(classify_chat("Hello!"), ChatKind::Greeting);
        assert_eq!(classify_chat("hi there"), ChatKind::Greeting);
        assert_eq!(classify_chat("Good morning, SAMARTH"), ChatKind::Greeting);
    }

    #[test]
    fn test_greeting_needs_whole_word() {
        assert_eq!(
            classify_chat("Which district has the highest wheat production?"),
            ChatKind::Agriculture
        );
        assert_eq!(classify_chat("hit"), ChatKind::General);
    }

    #[test]
    fn test_long_message_with_greeting_is_not_a_greeting() {
        assert_eq!(
            classify_chat("hi, compare rainfall in Punjab and Haryana"),
            ChatKind::Agriculture
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(classify_chat("What can you do?"), ChatKind::Help);
        assert_eq!(classify_chat("please help me with this"), ChatKind::Help);
    }

    #[test]
    fn test_data_question_with_help_phrase_is_agriculture() {
        assert_eq!(
            classify_chat("Can you help me compare rainfall in Punjab and Haryana for 2010?"),
            ChatKind::Agriculture
        );
        assert_eq!(
            classify_chat("What is this year's wheat production in Punjab?"),
            ChatKind::Agriculture
        );
    }

    #[test]
    fn test_general() {
        assert_eq!(classify_chat("Who won the cricket match?"), ChatKind::General);
        assert!(is_agriculture_question("Rice yield in Tamil Nadu"));
        assert!(!is_agriculture_question("Tell me a joke"));
    }
}
