use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use coach_core::level_test::{
    Advance, AnswerOutcome, LevelTestController, LevelTestError, QuestionBank, TestPhase,
    TestSession,
};
use coach_core::model::{CefrLevel, LevelResult, Question};
use coach_core::time::Clock;
use storage::repository::{KeyValueStore, KeyValueStoreExt};

use crate::error::LevelTestServiceError;
use crate::keys;

/// Delay between scoring an answer and moving on, so feedback can be shown.
pub const DEFAULT_PACING: Duration = Duration::from_millis(1000);

/// One learner's run through the placement test.
///
/// Wraps a [`LevelTestController`] with the feedback delay and saves the
/// placement once the test finishes.
pub struct LevelTestService {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    pacing: Duration,
    controller: LevelTestController,
}

impl LevelTestService {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            clock,
            kv,
            pacing: DEFAULT_PACING,
            controller: LevelTestController::new(bank),
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn phase(&self) -> TestPhase {
        self.controller.phase()
    }

    #[must_use]
    pub fn session(&self) -> &TestSession {
        self.controller.session()
    }

    #[must_use]
    pub fn current_level(&self) -> CefrLevel {
        self.controller.current_level()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.controller.current_question()
    }

    #[must_use]
    pub fn questions_in_level(&self) -> usize {
        self.controller.questions_in_level()
    }

    /// Begin (or restart) the test at A1.
    ///
    /// # Errors
    ///
    /// Returns `LevelTestServiceError::LevelTest` if the bank has no A1 questions.
    pub fn start(&mut self) -> Result<(), LevelTestServiceError> {
        self.controller.start()?;
        info!("level test started");
        Ok(())
    }

    /// Score `option` for the current question.
    ///
    /// # Errors
    ///
    /// Returns `LevelTestServiceError::LevelTest` when not testing or for an
    /// option the question does not have.
    pub fn answer(&mut self, option: usize) -> Result<AnswerOutcome, LevelTestServiceError> {
        let outcome = self.controller.answer(option)?;
        debug!(option, ?outcome, "answer recorded");
        Ok(outcome)
    }

    /// Wait out the pacing delay, then resolve the pending answer.
    ///
    /// A finished test saves its `LevelResult` under the user-level key.
    ///
    /// # Errors
    ///
    /// Returns `LevelTestServiceError::LevelTest` without waiting if there is
    /// no pending answer, and `Storage` if the result cannot be saved.
    pub async fn advance(&mut self) -> Result<Advance, LevelTestServiceError> {
        if self.controller.phase() != TestPhase::Testing {
            return Err(LevelTestError::NotTesting.into());
        }
        if self.controller.pending_answer().is_none() {
            return Err(LevelTestError::NoPendingAnswer.into());
        }
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        let step = self.controller.advance()?;
        match step {
            Advance::NextQuestion { index } => debug!(index, "next question"),
            Advance::NextLevel(level) => {
                info!(%level, score = self.session().score(), "level passed");
            }
            Advance::Finished(placement) => {
                let result = LevelResult {
                    placement,
                    date: self.clock.today(),
                    score: self.session().score(),
                };
                self.kv.set_json(keys::USER_LEVEL, &result).await?;
                info!(%placement, score = result.score, "level test finished");
            }
        }
        Ok(step)
    }

    /// The placement saved by the most recent finished test.
    ///
    /// # Errors
    ///
    /// Returns `LevelTestServiceError::Storage` if the result cannot be read.
    pub async fn last_result(&self) -> Result<Option<LevelResult>, LevelTestServiceError> {
        Ok(self.kv.get_json(keys::USER_LEVEL).await?)
    }
}
