pub mod progress;
pub mod question;

pub use progress::{AchievementId, ProgressionState};
pub use question::{CorrectAnswer, Question, QuestionKind};
