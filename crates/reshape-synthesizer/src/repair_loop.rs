//! Bounded check-and-repair driver shared by every synthesis stage

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// A candidate that passed its check
#[derive(Debug, Clone, PartialEq)]
pub struct Verified<T> {
    /// Whatever the check produced
    pub value: T,
    /// The candidate text that passed
    pub text: String,
    /// Repair invocations it took
    pub repairs: u32,
}

/// The retry budget ran out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted {
    /// Last candidate text checked (empty if no candidate was ever produced)
    pub last_text: String,
    /// Error from the last check
    pub last_error: String,
    /// Repair invocations made (always equal to the budget)
    pub repairs: u32,
}

impl Exhausted {
    /// Candidates checked, initial one included
    pub fn attempts(&self) -> u32 {
        self.repairs + 1
    }
}

/// Retry driver: check a candidate, and on failure ask for a repaired one
///
/// `max_retries` bounds repair invocations, so at most `max_retries + 1`
/// candidates are checked. A candidate may itself be an error (the backend
/// failed to produce one); that error is handled exactly like a failed check.
#[derive(Debug, Clone, Copy)]
pub struct RepairLoop {
    max_retries: u32,
    delay: Duration,
}

impl RepairLoop {
    /// Create a driver with a fresh budget
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    /// Pause before each repair
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The repair budget
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Drive `initial` through `check`, repairing until it passes or the budget runs out
    pub async fn run<T, C, R, Fut>(
        &self,
        stage: &str,
        initial: Result<String, String>,
        mut check: C,
        mut repair: R,
    ) -> Result<Verified<T>, Exhausted>
    where
        C: FnMut(&str) -> Result<T, String>,
        R: FnMut(String, String) -> Fut,
        Fut: Future<Output = Result<String, String>>,
    {
        let mut repairs = 0;
        let mut text = String::new();
        let mut candidate = initial;

        loop {
            let outcome = match candidate {
                Ok(produced) => {
                    text = produced;
                    check(&text)
                }
                Err(e) => Err(e),
            };

            let error = match outcome {
                Ok(value) => {
                    debug!(stage, repairs, "candidate verified");
                    return Ok(Verified {
                        value,
                        text,
                        repairs,
                    });
                }
                Err(e) => e,
            };

            if repairs >= self.max_retries {
                warn!(stage, repairs, error = %error, "retry budget exhausted");
                return Err(Exhausted {
                    last_text: text,
                    last_error: error,
                    repairs,
                });
            }

            repairs += 1;
            warn!(
                stage,
                attempt = repairs,
                max_retries = self.max_retries,
                error = %error,
                "check failed, requesting repair"
            );
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            candidate = repair(text.clone(), error).await;
        }
    }
}
