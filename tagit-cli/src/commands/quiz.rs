//! `tagit quiz`: take the multiple-choice quiz.
//!
//! Three ways to answer:
//! - interactively, one prompt per question
//! - `--answers 1,0,1` with option indices
//! - `--scan h1,br,ol`, scanning cards on a simulated Level 2 session

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use tagit::config::ConfigFile;
use tagit::level::{level_two, ContentKey};
use tagit::quiz::{builtin_questions, QuizAttempt, ScanAnswer, ScanAnswerer};
use tagit::session::{ControllerParts, ScanController, ScanState};
use tagit::sim::{BindMode, RecordingPresenter, SimAssetProbe, SimCamera, SimEngine};
use tokio_util::sync::CancellationToken;

use super::common::{build_runtime, parse_list};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct QuizArgs {
    /// Comma-separated option indices, one per question (skips prompts)
    #[arg(long, conflicts_with = "scan")]
    pub answers: Option<String>,

    /// Comma-separated tags to scan as answers, e.g. h1,br,ol
    #[arg(long)]
    pub scan: Option<String>,
}

pub fn run(args: QuizArgs, config: &ConfigFile) -> Result<(), CliError> {
    let attempt = QuizAttempt::new(builtin_questions());

    let attempt = match (args.answers, args.scan) {
        (Some(answers), _) => answer_from_list(attempt, &parse_list::<usize>(&answers)?)?,
        (None, Some(tags)) => answer_by_scanning(attempt, &parse_list::<String>(&tags)?, config)?,
        (None, None) => answer_interactively(attempt)?,
    };

    println!();
    println!("{}", style(attempt.score()).bold());
    Ok(())
}

/// Apply option indices in question order.
pub fn answer_from_list(mut attempt: QuizAttempt, answers: &[usize]) -> Result<QuizAttempt, CliError> {
    for (question, &option) in answers.iter().enumerate() {
        attempt.answer(question, option)?;
    }
    Ok(attempt)
}

fn answer_interactively(mut attempt: QuizAttempt) -> Result<QuizAttempt, CliError> {
    let theme = ColorfulTheme::default();
    let questions = attempt.questions().to_vec();
    for (index, question) in questions.iter().enumerate() {
        let choice = Select::with_theme(&theme)
            .with_prompt(&question.prompt)
            .items(&question.options)
            .default(0)
            .interact()?;
        let correct = attempt.answer(index, choice)?;
        if correct {
            println!("  {}", style("correct").green());
        } else {
            println!(
                "  {} ({})",
                style("wrong").red(),
                question.options[question.correct]
            );
        }
    }
    Ok(attempt)
}

fn answer_by_scanning(
    attempt: QuizAttempt,
    tags: &[String],
    config: &ConfigFile,
) -> Result<QuizAttempt, CliError> {
    let level = Arc::new(level_two());
    let slots = tags
        .iter()
        .map(|tag| {
            let key = ContentKey::new(tag.trim_matches(|c| c == '<' || c == '>'));
            level
                .slots()
                .iter()
                .find(|slot| slot.content_key == key)
                .map(|slot| slot.index)
                .ok_or_else(|| CliError::UnknownContent {
                    level: level.id().to_string(),
                    key: key.to_string(),
                })
        })
        .collect::<Result<Vec<u32>, CliError>>()?;

    let lock = config.quiz.lock();
    let timings = config.scan.timings();
    let runtime = build_runtime()?;

    runtime.block_on(async move {
        let (engine, parts) = SimEngine::new(BindMode::Always);
        let handle = ScanController::spawn(ControllerParts {
            level,
            engine: parts,
            camera: Arc::new(SimCamera::available()),
            assets: Arc::new(SimAssetProbe::ok()),
            asset_url: String::new(),
            presenter: Arc::new(RecordingPresenter::new()),
            timings,
        });

        engine.loaded();
        let mut snapshots = handle.watch_snapshot();
        snapshots
            .wait_for(|s| s.state != ScanState::Idle && s.state != ScanState::Loading)
            .await
            .map_err(|_| tagit::ScanError::ControllerClosed)?;
        handle.start().await?;

        let answerer = ScanAnswerer::new(attempt, lock);
        let shutdown = CancellationToken::new();
        let quiz = tokio::spawn(answerer.run(handle.subscribe(), shutdown.clone(), print_answer));

        for slot in slots {
            engine.found(slot);
            tokio::time::sleep(lock + Duration::from_millis(100)).await;
        }

        shutdown.cancel();
        let attempt = quiz
            .await
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        handle.shutdown().await;
        Ok::<_, CliError>(attempt)
    })
}

fn print_answer(answer: &ScanAnswer) {
    match answer {
        ScanAnswer::Accepted {
            question, correct, ..
        } => {
            let verdict = if *correct {
                style("correct").green()
            } else {
                style("wrong").red()
            };
            println!("  question {}: {}", question + 1, verdict);
        }
        ScanAnswer::Locked => println!("  {}", style("locked, scan again in a moment").dim()),
        ScanAnswer::NoMatch { label } => println!("  {} is not an option", label),
        ScanAnswer::Finished => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_from_list() {
        let attempt = answer_from_list(QuizAttempt::new(builtin_questions()), &[1, 0, 0]).unwrap();
        assert_eq!(attempt.score().correct, 2);
    }

    #[test]
    fn test_answer_from_list_rejects_bad_option() {
        let err = answer_from_list(QuizAttempt::new(builtin_questions()), &[9]).unwrap_err();
        assert!(matches!(err, CliError::Quiz(_)));
    }
}
