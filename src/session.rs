//! In-memory state of one lesson being played.
//!
//! A [`LessonRun`] walks the questions of a lesson in order, records one
//! verdict per question and hands out at most
//! [`config::MAX_HINTS_PER_QUESTION`] hints per question. When the last
//! question is behind it the run produces a [`LessonSummary`] for the XP award.

use serde::Serialize;

use crate::config;
use crate::content::Lesson;
use crate::domain::Question;
use crate::progression::LessonSummary;
use crate::validation::{self, AnswerVerdict};

/// Record of one question after the learner moved past it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnsweredQuestion {
  pub question_index: usize,
  /// `None` when the question was skipped
  pub input: Option<String>,
  pub verdict: AnswerVerdict,
  pub hints_used: usize,
}

#[derive(Debug)]
pub struct LessonRun<'a> {
  lesson: &'a Lesson,
  index: usize,
  hints_used: usize,
  pending: Option<AnsweredQuestion>,
  answers: Vec<AnsweredQuestion>,
}

impl<'a> LessonRun<'a> {
  pub fn new(lesson: &'a Lesson) -> Self {
    Self {
      lesson,
      index: 0,
      hints_used: 0,
      pending: None,
      answers: Vec::with_capacity(lesson.len()),
    }
  }

  pub fn lesson(&self) -> &'a Lesson {
    self.lesson
  }

  /// Current question, `None` once the run is finished
  pub fn current(&self) -> Option<&'a Question> {
    self.lesson.question(self.index)
  }

  pub fn position(&self) -> usize {
    self.index
  }

  pub fn is_finished(&self) -> bool {
    self.index >= self.lesson.len()
  }

  /// Evaluate an answer for the current question.
  ///
  /// Only the first submission per question counts; later calls return
  /// `None`, as does submitting after the run is finished.
  pub fn submit(&mut self, user_input: &str) -> Option<AnswerVerdict> {
    if self.pending.is_some() {
      return None;
    }
    let question = self.current()?;
    let verdict = validation::evaluate(user_input, question);

    tracing::debug!(
      "Question {} ({}): correct={}",
      self.index,
      question.kind.as_str(),
      verdict.correct
    );

    self.pending = Some(AnsweredQuestion {
      question_index: self.index,
      input: Some(user_input.to_string()),
      verdict: verdict.clone(),
      hints_used: self.hints_used,
    });
    Some(verdict)
  }

  /// Next hint for the current question, if one is defined and the
  /// per-question limit is not used up
  pub fn take_hint(&mut self) -> Option<&'a str> {
    if self.pending.is_some() || self.hints_used >= config::MAX_HINTS_PER_QUESTION {
      return None;
    }
    let hint = self.current()?.hint(self.hints_used)?;
    self.hints_used += 1;
    Some(hint)
  }

  pub fn hints_used(&self) -> usize {
    self.hints_used
  }

  /// Move to the next question. Returns false if the current question has
  /// not been answered yet.
  pub fn advance(&mut self) -> bool {
    match self.pending.take() {
      Some(answered) => {
        self.answers.push(answered);
        self.next_question();
        true
      }
      None => false,
    }
  }

  /// Give up on the current question; it counts as incorrect
  pub fn skip(&mut self) {
    if self.is_finished() {
      return;
    }
    let answered = self.pending.take().unwrap_or(AnsweredQuestion {
      question_index: self.index,
      input: None,
      verdict: AnswerVerdict::incorrect(),
      hints_used: self.hints_used,
    });
    self.answers.push(answered);
    self.next_question();
  }

  fn next_question(&mut self) {
    self.index += 1;
    self.hints_used = 0;
  }

  pub fn answers(&self) -> &[AnsweredQuestion] {
    &self.answers
  }

  pub fn correct_count(&self) -> u32 {
    self.answers.iter().filter(|a| a.verdict.correct).count() as u32
  }

  pub fn summary(&self, elapsed_seconds: f64) -> LessonSummary {
    LessonSummary::new(
      self.correct_count(),
      self.lesson.len() as u32,
      elapsed_seconds,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuestionKind;

  fn lesson() -> Lesson {
    let mut first = Question::new(QuestionKind::ComplexInput, "3+4i");
    first.hints = vec![
      "Addiere die Realteile".to_string(),
      "Addiere die Imaginärteile".to_string(),
      "1+2 = 3".to_string(),
      "2+2 = 4".to_string(),
    ];
    Lesson {
      title: "Addition".to_string(),
      description: None,
      questions: vec![
        first,
        Question::new(QuestionKind::TrueFalse, "true"),
        Question::new(QuestionKind::TextInput, "Realteil"),
      ],
    }
  }

  #[test]
  fn test_full_run() {
    let lesson = lesson();
    let mut run = LessonRun::new(&lesson);

    assert!(run.submit("3 + 4i").unwrap().correct);
    assert!(run.advance());
    assert!(!run.submit("false").unwrap().correct);
    assert!(run.advance());
    assert!(run.submit("realteil").unwrap().correct);
    assert!(run.advance());

    assert!(run.is_finished());
    assert!(run.current().is_none());
    assert_eq!(run.correct_count(), 2);
    assert_eq!(run.summary(42.0), LessonSummary::new(2, 3, 42.0));
  }

  #[test]
  fn test_first_submission_counts() {
    let lesson = lesson();
    let mut run = LessonRun::new(&lesson);

    assert!(!run.submit("4+3i").unwrap().correct);
    assert_eq!(run.submit("3+4i"), None);
    assert!(run.advance());
    assert_eq!(run.answers()[0].input.as_deref(), Some("4+3i"));
    assert_eq!(run.correct_count(), 0);
  }

  #[test]
  fn test_advance_requires_answer() {
    let lesson = lesson();
    let mut run = LessonRun::new(&lesson);
    assert!(!run.advance());
    assert_eq!(run.position(), 0);
  }

  #[test]
  fn test_hints_are_capped() {
    let lesson = lesson();
    let mut run = LessonRun::new(&lesson);

    assert_eq!(run.take_hint(), Some("Addiere die Realteile"));
    assert_eq!(run.take_hint(), Some("Addiere die Imaginärteile"));
    assert_eq!(run.take_hint(), Some("1+2 = 3"));
    assert_eq!(run.take_hint(), None);
    assert_eq!(run.hints_used(), 3);

    run.submit("3+4i");
    run.advance();
    // Next question has no hints and the counter starts over
    assert_eq!(run.hints_used(), 0);
    assert_eq!(run.take_hint(), None);
    assert_eq!(run.hints_used(), 0);
  }

  #[test]
  fn test_hints_recorded_with_answer() {
    let lesson = lesson();
    let mut run = LessonRun::new(&lesson);
    run.take_hint();
    run.submit("3+4i");
    assert_eq!(run.take_hint(), None);
    run.advance();
    assert_eq!(run.answers()[0].hints_used, 1);
  }

  #[test]
  fn test_skip_counts_as_incorrect() {
    let lesson = lesson();
    let mut run = LessonRun::new(&lesson);

    run.skip();
    assert_eq!(run.position(), 1);
    assert_eq!(run.answers()[0].input, None);
    assert!(!run.answers()[0].verdict.correct);

    run.submit("true");
    run.skip();
    assert!(run.answers()[1].verdict.correct);

    run.skip();
    run.skip();
    assert!(run.is_finished());
    assert_eq!(run.answers().len(), 3);
    assert_eq!(run.submit("x"), None);
  }
}
