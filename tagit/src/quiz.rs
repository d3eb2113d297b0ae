//! Multiple-choice quiz.
//!
//! Questions are answered either by choosing an option directly
//! ([`QuizAttempt::answer`]) or by scanning the card whose tag is the
//! answer ([`ScanAnswerer`]). Scan answers are a consumer of the scan
//! controller's [`ScanEvent`] stream; the controller itself knows nothing
//! about the quiz.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::level::ContentKey;
use crate::session::ScanEvent;

/// How long scan answers are ignored after one is accepted.
pub const DEFAULT_QUIZ_LOCK: Duration = Duration::from_millis(1000);

/// Errors from answering a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("question {index} does not exist (quiz has {count})")]
    NoSuchQuestion { index: usize, count: usize },

    #[error("option {option} does not exist for question {question}")]
    NoSuchOption { question: usize, option: usize },
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct: usize,
}

impl QuizQuestion {
    pub fn new<I, S>(prompt: impl Into<String>, options: I, correct: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct,
        }
    }

    /// Index of the option equal to `label`, if any.
    pub fn option_index(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|o| o == label)
    }
}

/// The built-in questions.
pub fn builtin_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "Which tag creates a main heading?",
            ["<p>", "<h1>", "<br>", "<hr>"],
            1,
        ),
        QuizQuestion::new(
            "Which tag inserts a line break?",
            ["<br>", "<ul>", "<em>", "<sub>"],
            0,
        ),
        QuizQuestion::new(
            "Which tag creates a numbered list?",
            ["<ul>", "<ol>", "<li>", "<strong>"],
            1,
        ),
    ]
}

/// Correct answers out of the question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {}/{}", self.correct, self.total)
    }
}

/// A user's answers to a set of questions.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<usize>>,
}

impl QuizAttempt {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        Self { questions, answers }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Record (or replace) the answer to `question`.
    ///
    /// Returns whether the answer is correct.
    pub fn answer(&mut self, question: usize, option: usize) -> Result<bool, QuizError> {
        let count = self.questions.len();
        let q = self
            .questions
            .get(question)
            .ok_or(QuizError::NoSuchQuestion {
                index: question,
                count,
            })?;
        if option >= q.options.len() {
            return Err(QuizError::NoSuchOption { question, option });
        }
        let correct = option == q.correct;
        self.answers[question] = Some(option);
        Ok(correct)
    }

    /// The chosen option for `question`.
    pub fn answer_for(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    /// Index of the first unanswered question.
    pub fn next_unanswered(&self) -> Option<usize> {
        self.answers.iter().position(Option::is_none)
    }

    /// Unanswered questions count as wrong.
    pub fn score(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| **a == Some(q.correct))
            .count();
        Score {
            correct,
            total: self.questions.len(),
        }
    }
}

/// Result of feeding one scan to a [`ScanAnswerer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAnswer {
    /// The scanned tag answered `question`.
    Accepted {
        question: usize,
        option: usize,
        correct: bool,
    },
    /// A recent answer still holds the lock.
    Locked,
    /// The scanned tag is not an option of the current question.
    NoMatch { label: String },
    /// Every question is answered.
    Finished,
}

/// Answers quiz questions in order from scanned cards.
#[derive(Debug)]
pub struct ScanAnswerer {
    attempt: QuizAttempt,
    lock: Duration,
    locked_until: Option<Instant>,
}

impl ScanAnswerer {
    pub fn new(attempt: QuizAttempt, lock: Duration) -> Self {
        Self {
            attempt,
            lock,
            locked_until: None,
        }
    }

    pub fn attempt(&self) -> &QuizAttempt {
        &self.attempt
    }

    /// The question the next accepted scan will answer.
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.attempt
            .next_unanswered()
            .and_then(|i| self.attempt.questions.get(i))
    }

    /// Treat `key` as a scanned answer at `now`.
    pub fn on_scan(&mut self, key: &ContentKey, now: Instant) -> ScanAnswer {
        let Some(question) = self.attempt.next_unanswered() else {
            return ScanAnswer::Finished;
        };
        if self.locked_until.is_some_and(|until| now < until) {
            return ScanAnswer::Locked;
        }

        let label = key.tag_label();
        let Some(option) = self.attempt.questions[question].option_index(&label) else {
            return ScanAnswer::NoMatch { label };
        };

        let correct = option == self.attempt.questions[question].correct;
        self.attempt.answers[question] = Some(option);
        self.locked_until = Some(now + self.lock);

        ScanAnswer::Accepted {
            question,
            option,
            correct,
        }
    }

    /// Handle a controller event. Only dispatches are answers.
    pub fn on_event(&mut self, event: &ScanEvent, now: Instant) -> Option<ScanAnswer> {
        match event {
            ScanEvent::Dispatched { slot } => Some(self.on_scan(&slot.content_key, now)),
            _ => None,
        }
    }

    /// Answer from `events` until every question is answered, the channel
    /// closes or `shutdown` fires. Each answer is passed to `on_answer`.
    pub async fn run<F>(
        mut self,
        mut events: broadcast::Receiver<ScanEvent>,
        shutdown: CancellationToken,
        mut on_answer: F,
    ) -> QuizAttempt
    where
        F: FnMut(&ScanAnswer),
    {
        loop {
            if self.attempt.next_unanswered().is_none() {
                info!(score = %self.attempt.score(), "Quiz finished");
                break;
            }

            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = events.recv() => event,
            };

            match event {
                Ok(event) => {
                    if let Some(answer) = self.on_event(&event, Instant::now()) {
                        debug!(?answer, "Scan answer");
                        on_answer(&answer);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Quiz fell behind scan events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::MarkerSlot;

    #[test]
    fn test_builtin_questions_are_consistent() {
        for q in builtin_questions() {
            assert!(q.correct < q.options.len(), "{}", q.prompt);
        }
    }

    #[test]
    fn test_scoring() {
        let mut attempt = QuizAttempt::new(builtin_questions());
        assert!(attempt.answer(0, 1).unwrap());
        assert!(!attempt.answer(1, 3).unwrap());
        assert_eq!(attempt.score().to_string(), "Score: 1/3");

        // Changing an answer replaces it.
        assert!(attempt.answer(1, 0).unwrap());
        assert_eq!(attempt.score(), Score { correct: 2, total: 3 });
    }

    #[test]
    fn test_answer_out_of_range() {
        let mut attempt = QuizAttempt::new(builtin_questions());
        assert_eq!(
            attempt.answer(5, 0),
            Err(QuizError::NoSuchQuestion { index: 5, count: 3 })
        );
        assert_eq!(
            attempt.answer(0, 4),
            Err(QuizError::NoSuchOption {
                question: 0,
                option: 4
            })
        );
        assert_eq!(attempt.answer_for(0), None);
    }

    #[test]
    fn test_scan_lock() {
        let now = Instant::now();
        let mut answerer = ScanAnswerer::new(QuizAttempt::new(builtin_questions()), DEFAULT_QUIZ_LOCK);

        assert_eq!(
            answerer.on_scan(&ContentKey::new("h1"), now),
            ScanAnswer::Accepted {
                question: 0,
                option: 1,
                correct: true
            }
        );
        assert_eq!(
            answerer.on_scan(&ContentKey::new("br"), now + Duration::from_millis(999)),
            ScanAnswer::Locked
        );
        assert_eq!(
            answerer.on_scan(&ContentKey::new("br"), now + DEFAULT_QUIZ_LOCK),
            ScanAnswer::Accepted {
                question: 1,
                option: 0,
                correct: true
            }
        );
    }

    #[test]
    fn test_scan_no_match_does_not_lock() {
        let now = Instant::now();
        let mut answerer = ScanAnswerer::new(QuizAttempt::new(builtin_questions()), DEFAULT_QUIZ_LOCK);

        assert_eq!(
            answerer.on_scan(&ContentKey::new("kbd"), now),
            ScanAnswer::NoMatch {
                label: "<kbd>".to_string()
            }
        );
        assert!(matches!(
            answerer.on_scan(&ContentKey::new("p"), now),
            ScanAnswer::Accepted { correct: false, .. }
        ));
    }

    #[test]
    fn test_only_dispatch_events_answer() {
        let now = Instant::now();
        let mut answerer = ScanAnswerer::new(QuizAttempt::new(builtin_questions()), DEFAULT_QUIZ_LOCK);
        assert_eq!(answerer.on_event(&ScanEvent::Reset, now), None);

        let event = ScanEvent::Dispatched {
            slot: MarkerSlot::new(0, "h1"),
        };
        assert!(matches!(
            answerer.on_event(&event, now),
            Some(ScanAnswer::Accepted { question: 0, .. })
        ));
        assert_eq!(
            answerer.current_question().map(|q| q.correct),
            Some(0)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_finished() {
        let (tx, rx) = broadcast::channel(16);
        let answerer = ScanAnswerer::new(QuizAttempt::new(builtin_questions()), DEFAULT_QUIZ_LOCK);
        let task = tokio::spawn(answerer.run(rx, CancellationToken::new(), |_| {}));

        for key in ["h1", "br", "ol"] {
            tx.send(ScanEvent::Dispatched {
                slot: MarkerSlot::new(0, key),
            })
            .unwrap();
            tokio::time::sleep(Duration::from_millis(1100)).await;
        }

        let attempt = task.await.unwrap();
        assert_eq!(attempt.score(), Score { correct: 3, total: 3 });
    }
}
