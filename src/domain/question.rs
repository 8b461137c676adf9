use serde::{Deserialize, Serialize};

/// Kind of question, tagged by the `type` field of the lesson JSON.
/// Each kind carries only what its evaluation or rendering needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
  /// Select one of a closed set of options
  MultipleChoice {
    #[serde(default)]
    options: Vec<String>,
  },
  /// Free text answer
  TextInput,
  /// Numeric result typed by the learner (compared as text)
  Calculation,
  /// "true" / "false" radio pair
  TrueFalse,
  /// Matching exercise, answer encoded as a single string
  Matching,
  /// Complex number in `a+bi` notation, compared numerically
  ComplexInput,
}

impl QuestionKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MultipleChoice { .. } => "multiple_choice",
      Self::TextInput => "text_input",
      Self::Calculation => "calculation",
      Self::TrueFalse => "true_false",
      Self::Matching => "matching",
      Self::ComplexInput => "complex_input",
    }
  }

  /// Whether answers are compared numerically as complex literals
  pub fn is_complex(&self) -> bool {
    matches!(self, Self::ComplexInput)
  }
}

/// Raw JSON shape of a single acceptable answer.
/// Lesson files sometimes store `true` or `42` instead of a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
  Text(String),
  Flag(bool),
  Number(serde_json::Number),
}

impl From<RawScalar> for String {
  fn from(raw: RawScalar) -> Self {
    match raw {
      RawScalar::Text(s) => s,
      RawScalar::Flag(b) => b.to_string(),
      RawScalar::Number(n) => n.to_string(),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswer {
  Many(Vec<RawScalar>),
  One(RawScalar),
}

/// Reference answer of a question: one value or a set of acceptable values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawAnswer")]
pub enum CorrectAnswer {
  One(String),
  AnyOf(Vec<String>),
}

impl From<RawAnswer> for CorrectAnswer {
  fn from(raw: RawAnswer) -> Self {
    match raw {
      RawAnswer::One(s) => Self::One(s.into()),
      RawAnswer::Many(items) => Self::AnyOf(items.into_iter().map(String::from).collect()),
    }
  }
}

impl CorrectAnswer {
  /// All acceptable answers, in declaration order
  pub fn candidates(&self) -> impl Iterator<Item = &str> {
    let items: &[String] = match self {
      Self::One(s) => std::slice::from_ref(s),
      Self::AnyOf(v) => v,
    };
    items.iter().map(String::as_str)
  }
}

impl From<&str> for CorrectAnswer {
  fn from(s: &str) -> Self {
    Self::One(s.to_string())
  }
}

/// A single question of a lesson (from lesson JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
  /// Prompt shown to the learner
  #[serde(default)]
  pub question: String,
  #[serde(flatten)]
  pub kind: QuestionKind,
  pub correct_answer: CorrectAnswer,
  /// Progressive hints, cheapest first
  #[serde(default)]
  pub hints: Vec<String>,
  #[serde(default)]
  pub feedback_correct: Option<String>,
  #[serde(default)]
  pub feedback_incorrect: Option<String>,
  #[serde(default)]
  pub explanation: Option<String>,
}

impl Question {
  pub fn new(kind: QuestionKind, correct_answer: impl Into<CorrectAnswer>) -> Self {
    Self {
      question: String::new(),
      kind,
      correct_answer: correct_answer.into(),
      hints: Vec::new(),
      feedback_correct: None,
      feedback_incorrect: None,
      explanation: None,
    }
  }

  pub fn hint(&self, level: usize) -> Option<&str> {
    self.hints.get(level).map(String::as_str)
  }
}
