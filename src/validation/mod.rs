//! Answer evaluation for lesson questions.
//!
//! Comparison depends on the question kind:
//! - `complex_input` - both sides parsed as complex literals, compared per component
//!   within [`config::COMPLEX_TOLERANCE`]
//! - everything else - case-insensitive, trimmed, NFC-normalized string equality
//!
//! Set-valued reference answers accept the input if any member matches.
//! Malformed input is never an error, only an incorrect verdict.

pub mod complex;

pub use complex::{ComplexLiteral, ParseComplexError};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config;
use crate::domain::{Question, QuestionKind};

// ============================================================================
// Result types
// ============================================================================

/// Outcome of evaluating one submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerVerdict {
  pub correct: bool,
  /// The acceptable answer that matched, if any
  pub matched: Option<String>,
}

impl AnswerVerdict {
  pub fn correct(matched: &str) -> Self {
    Self {
      correct: true,
      matched: Some(matched.to_string()),
    }
  }

  pub fn incorrect() -> Self {
    Self {
      correct: false,
      matched: None,
    }
  }

  pub fn is_correct(&self) -> bool {
    self.correct
  }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate a learner's answer against a question's reference answer(s)
pub fn evaluate(user_input: &str, question: &Question) -> AnswerVerdict {
  let input = user_input.trim();
  if input.is_empty() {
    return AnswerVerdict::incorrect();
  }

  if question.kind.is_complex() {
    return evaluate_complex(input, question);
  }

  let normalized_input = normalize_text(input);
  question
    .correct_answer
    .candidates()
    .find(|candidate| normalize_text(candidate) == normalized_input)
    .map(AnswerVerdict::correct)
    .unwrap_or_else(AnswerVerdict::incorrect)
}

fn evaluate_complex(input: &str, question: &Question) -> AnswerVerdict {
  let Some(user_value) = ComplexLiteral::parse(input) else {
    tracing::debug!("Unparseable complex answer: {:?}", input);
    return AnswerVerdict::incorrect();
  };

  for candidate in question.correct_answer.candidates() {
    match ComplexLiteral::parse(candidate) {
      Some(reference) if user_value.approx_eq(&reference, config::COMPLEX_TOLERANCE) => {
        return AnswerVerdict::correct(candidate);
      }
      Some(_) => {}
      None => tracing::warn!("Reference answer is not a complex literal: {:?}", candidate),
    }
  }

  AnswerVerdict::incorrect()
}

/// Compare a single input/reference pair using the rule for `kind`
pub fn compare_answers(user_input: &str, correct_answer: &str, kind: &QuestionKind) -> bool {
  if kind.is_complex() {
    return match (
      ComplexLiteral::parse(user_input),
      ComplexLiteral::parse(correct_answer),
    ) {
      (Some(user), Some(reference)) => user.approx_eq(&reference, config::COMPLEX_TOLERANCE),
      _ => false,
    };
  }
  normalize_text(user_input) == normalize_text(correct_answer)
}

// ============================================================================
// Normalization
// ============================================================================

/// Trim, compose (NFC) and lowercase for text comparison
fn normalize_text(input: &str) -> String {
  input.trim().nfc().collect::<String>().to_lowercase()
}
