use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use andromeda::config;
use andromeda::content::{self, LessonCatalog};
use andromeda::domain::{ProgressionState, QuestionKind};
use andromeda::progression::{Gamification, ProgressEvent};
use andromeda::session::LessonRun;

const USAGE: &str = "usage: andromeda <lessons.json> [lesson-id]";

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "andromeda=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let mut args = std::env::args().skip(1);
  let Some(lessons_path) = args.next().map(PathBuf::from) else {
    eprintln!("{}", USAGE);
    return ExitCode::from(2);
  };
  let lesson_id = match args.next().map(|s| s.parse::<u32>()) {
    None => 1,
    Some(Ok(id)) => id,
    Some(Err(_)) => {
      eprintln!("{}", USAGE);
      return ExitCode::from(2);
    }
  };

  let policy = config::load_policy();
  let catalog = match content::load_catalog(&lessons_path) {
    Ok(catalog) => catalog,
    Err(e) => {
      tracing::error!("Failed to load lessons: {}", e);
      return ExitCode::FAILURE;
    }
  };
  tracing::info!("Loaded {} lessons", catalog.lesson_count());

  match run_lesson(&catalog, lesson_id, Gamification::new(policy)) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{}", e);
      ExitCode::FAILURE
    }
  }
}

fn run_lesson(
  catalog: &LessonCatalog,
  lesson_id: u32,
  gamification: Gamification,
) -> Result<(), Box<dyn std::error::Error>> {
  let lesson = catalog
    .lesson(lesson_id)
    .ok_or_else(|| format!("No lesson with id {}", lesson_id))?;

  let mut state = ProgressionState::new();
  let today = chrono::Local::now().date_naive();
  gamification.roll_daily(&mut state, today);

  println!("== Lektion {}: {} ==", lesson_id, lesson.title);
  if let Some(description) = &lesson.description {
    println!("{}", description);
  }
  println!("('?' für einen Hinweis, 'skip' zum Überspringen)\n");

  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();
  let mut run = LessonRun::new(lesson);
  let started = Instant::now();

  while let Some(question) = run.current() {
    println!("[{}/{}] {}", run.position() + 1, lesson.len(), question.question);
    if let QuestionKind::MultipleChoice { options } = &question.kind {
      for option in options {
        println!("  - {}", option);
      }
    }
    print!("> ");
    io::stdout().flush()?;

    let Some(line) = lines.next() else {
      // stdin closed: the remaining questions count as skipped
      while !run.is_finished() {
        run.skip();
      }
      break;
    };
    let input = line?;

    match input.trim() {
      "?" => {
        match run.take_hint() {
          Some(hint) => println!("Hinweis: {}", hint),
          None => println!("Keine weiteren Hinweise."),
        }
        continue;
      }
      "skip" => {
        print_outcome(false, question.feedback_incorrect.as_deref());
        print_events(&gamification.record_answer(&mut state, false));
        run.skip();
      }
      answer => {
        if let Some(verdict) = run.submit(answer) {
          let feedback = if verdict.correct {
            question.feedback_correct.as_deref()
          } else {
            question.feedback_incorrect.as_deref()
          };
          print_outcome(verdict.correct, feedback);
          print_events(&gamification.record_answer(&mut state, verdict.correct));
        }
        run.advance();
      }
    }

    if let Some(explanation) = &question.explanation {
      println!("{}", explanation);
    }
    println!();
  }

  let summary = run.summary(started.elapsed().as_secs_f64());
  println!(
    "Ergebnis: {}/{} richtig in {:.0}s",
    summary.correct, summary.total, summary.elapsed_seconds
  );

  let events = gamification.complete_lesson(&mut state, lesson_id, &summary, today)?;
  print_events(&events);

  let curve = &gamification.policy().level_curve;
  println!(
    "Level {} ({:.0}%) | {} XP | noch {} XP bis Level {}",
    state.level,
    curve.level_progress(state.xp) * 100.0,
    state.xp,
    curve.xp_to_next_level(state.xp),
    state.level + 1
  );
  tracing::debug!("Final state: {:?}", state);
  Ok(())
}

fn print_outcome(correct: bool, feedback: Option<&str>) {
  let default = if correct { "Richtig!" } else { "Leider falsch." };
  println!("{}", feedback.unwrap_or(default));
}

fn print_events(events: &[ProgressEvent]) {
  for event in events {
    match event {
      ProgressEvent::XpAwarded { amount, .. } => println!("  +{} XP", amount),
      ProgressEvent::LevelUp { level } => println!("  Level up! Jetzt Level {}", level),
      ProgressEvent::LifeLost { remaining } => println!("  Leben verloren ({} übrig)", remaining),
      ProgressEvent::LifeRestored { lives } => println!("  Leben aufgefüllt ({})", lives),
      ProgressEvent::OutOfLives => println!("  Keine Leben mehr!"),
      ProgressEvent::AchievementUnlocked { id, xp } => {
        println!("  Erfolg freigeschaltet: {} (+{} XP)", id, xp)
      }
      ProgressEvent::StreakUpdated { streak } => println!("  Serie: {} Tage", streak),
      ProgressEvent::LessonUnlocked { lesson_id } => {
        println!("  Lektion {} freigeschaltet", lesson_id)
      }
      ProgressEvent::DailyReset => {}
    }
  }
}
