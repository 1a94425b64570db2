//! # Prompt Construction
//!
//! Typed role-tagged turns for the classification request: a fixed set of
//! worked examples followed by the target review. The serialized turn list
//! also feeds the token estimator, so the metric reflects what is actually
//! sent.

use serde::{Deserialize, Serialize};

/// One role-tagged message turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTurn {
    pub role: String,
    pub parts: Vec<PromptPart>,
}

/// One content part within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPart {
    pub text: String,
}

impl PromptTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![PromptPart { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![PromptPart { text: text.into() }],
        }
    }
}

/// Worked examples illustrating the expected single-word labels.
fn worked_examples() -> Vec<PromptTurn> {
    vec![
        PromptTurn::user("Review: الفندق ممتاز والخدمة رائعة والموقع قريب من كل شيء"),
        PromptTurn::model("positive"),
        PromptTurn::user("Review: الغرفة سيئة والتكييف لا يعمل ولن أعود مرة أخرى"),
        PromptTurn::model("negative"),
        PromptTurn::user("Review: The room was fine, nothing special but nothing wrong either"),
        PromptTurn::model("neutral"),
    ]
}

/// Build the full turn list for one review: worked examples plus the
/// target item, with the dialect tag woven in when present.
pub fn build_contents(review: &str, dialect: Option<&str>) -> Vec<PromptTurn> {
    let mut turns = worked_examples();
    let target = match dialect {
        Some(tag) => format!("Dialect: {tag}\nReview: {review}"),
        None => format!("Review: {review}"),
    };
    turns.push(PromptTurn::user(target));
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_last_user_turn() {
        let turns = build_contents("good breakfast", None);
        let last = turns.last().unwrap();
        assert_eq!(last.role, "user");
        assert_eq!(last.parts[0].text, "Review: good breakfast");
    }

    #[test]
    fn test_dialect_tag_included() {
        let turns = build_contents("الخدمة بطيئة", Some("gulf"));
        let last = turns.last().unwrap();
        assert!(last.parts[0].text.starts_with("Dialect: gulf\n"));
        assert!(last.parts[0].text.contains("الخدمة بطيئة"));
    }

    #[test]
    fn test_examples_precede_target() {
        let turns = build_contents("anything", None);
        // Worked examples alternate user/model and come first.
        assert!(turns.len() >= 3);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[1].role, "model");
    }
}
