//! Lesson loading and lookups.
//!
//! Lessons are stored as one JSON object keyed by lesson id:
//!
//! ```json
//! { "1": { "title": "Die imaginäre Einheit", "questions": [ ... ] } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::{CorrectAnswer, Question, QuestionKind};
use crate::validation::{self, AnswerVerdict};

/// A lesson: an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub questions: Vec<Question>,
}

impl Lesson {
  pub fn question(&self, index: usize) -> Option<&Question> {
    self.questions.get(index)
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }
}

/// All lessons, keyed by lesson id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonCatalog {
  lessons: BTreeMap<u32, Lesson>,
}

/// Error loading lessons.
#[derive(Debug)]
pub enum ContentError {
  IoError(String),
  ParseError(String),
  InvalidLesson(String),
}

impl std::fmt::Display for ContentError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ContentError::IoError(e) => write!(f, "IO error: {}", e),
      ContentError::ParseError(e) => write!(f, "Parse error: {}", e),
      ContentError::InvalidLesson(e) => write!(f, "Invalid lesson: {}", e),
    }
  }
}

impl std::error::Error for ContentError {}

impl LessonCatalog {
  /// Parse and validate a catalog from JSON text.
  pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
    let catalog: LessonCatalog =
      serde_json::from_str(json).map_err(|e| ContentError::ParseError(e.to_string()))?;

    for (id, lesson) in &catalog.lessons {
      validate_lesson(*id, lesson)?;
    }

    Ok(catalog)
  }

  pub fn lesson(&self, lesson_id: u32) -> Option<&Lesson> {
    self.lessons.get(&lesson_id)
  }

  pub fn lesson_ids(&self) -> impl Iterator<Item = u32> + '_ {
    self.lessons.keys().copied()
  }

  pub fn lesson_count(&self) -> usize {
    self.lessons.len()
  }

  /// Hint `level` (0-based) for a question, if the lesson defines one
  pub fn hint(&self, lesson_id: u32, question_index: usize, level: usize) -> Option<&str> {
    self.lesson(lesson_id)?.question(question_index)?.hint(level)
  }

  /// Check an answer by position; unknown lessons or questions are incorrect
  pub fn check_answer(
    &self,
    lesson_id: u32,
    question_index: usize,
    user_input: &str,
  ) -> AnswerVerdict {
    match self
      .lesson(lesson_id)
      .and_then(|lesson| lesson.question(question_index))
    {
      Some(question) => validation::evaluate(user_input, question),
      None => {
        tracing::debug!(
          "No question {} in lesson {}",
          question_index,
          lesson_id
        );
        AnswerVerdict::incorrect()
      }
    }
  }
}

/// Load the lesson catalog from a JSON file.
///
/// A missing file yields an empty catalog.
pub fn load_catalog(path: &Path) -> Result<LessonCatalog, ContentError> {
  if !path.exists() {
    tracing::warn!("Lesson file not found: {}", path.display());
    return Ok(LessonCatalog::default());
  }

  let content = fs::read_to_string(path)
    .map_err(|e| ContentError::IoError(format!("{}: {}", path.display(), e)))?;

  LessonCatalog::from_json_str(&content).map_err(|e| match e {
    ContentError::ParseError(msg) => {
      ContentError::ParseError(format!("{}: {}", path.display(), msg))
    }
    other => other,
  })
}

/// Validate a lesson definition.
fn validate_lesson(id: u32, lesson: &Lesson) -> Result<(), ContentError> {
  if lesson.questions.is_empty() {
    return Err(ContentError::InvalidLesson(format!(
      "Lesson {} has no questions",
      id
    )));
  }

  for (index, question) in lesson.questions.iter().enumerate() {
    if let CorrectAnswer::AnyOf(answers) = &question.correct_answer {
      if answers.is_empty() {
        return Err(ContentError::InvalidLesson(format!(
          "Lesson {} question {} has an empty answer set",
          id, index
        )));
      }
    }

    if let QuestionKind::MultipleChoice { options } = &question.kind {
      let listed = question.correct_answer.candidates().any(|answer| {
        options
          .iter()
          .any(|option| validation::compare_answers(answer, option, &question.kind))
      });
      if !options.is_empty() && !listed {
        tracing::warn!(
          "Lesson {} question {}: correct answer is not among the options",
          id,
          index
        );
      }
    }
  }

  Ok(())
}
