//! Running many conversion jobs at once.

use std::path::PathBuf;

use anyhow::bail;
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    engine::FontEngine,
    error::Result,
    host::{DestinationPrompt, JobReporter, Modifiers},
    job::{JobOutcome, Payload, Preparation, prepare, process},
};

/// Outcome of one job in a batch.
#[derive(Debug)]
pub struct JobReport {
    pub input: PathBuf,
    pub result: Result<JobOutcome>,
}

/// Tally of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
    pub aborted: usize,
}

impl BatchResult {
    pub fn from_reports(reports: &[JobReport]) -> Self {
        let mut result = Self::default();
        for report in reports {
            result.record(&report.result);
        }
        result
    }

    pub fn record(&mut self, result: &Result<JobOutcome>) {
        match result {
            Ok(JobOutcome::Completed(_)) => self.succeeded += 1,
            Ok(JobOutcome::Aborted) => self.aborted += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.aborted
    }

    /// Aborted jobs do not count as failures.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn ok_or_bail(&self, operation: &str) -> anyhow::Result<()> {
        if self.failed > 0 {
            bail!(
                "{operation} failed: {} succeeded, {} failed, {} aborted",
                self.succeeded,
                self.failed,
                self.aborted
            );
        }
        Ok(())
    }
}

/// Run every payload as an independent job.
///
/// Destinations are resolved one payload at a time, since prompting is
/// interactive. The prepared jobs then run in parallel, each with its own
/// reporter from `reporter_for`. Reports come back in input order.
pub fn run_batch<P, E, R, F>(
    payloads: impl IntoIterator<Item = Payload>,
    modifiers: Modifiers,
    prompt: &P,
    engine: &E,
    reporter_for: F,
) -> Vec<JobReport>
where
    P: DestinationPrompt + ?Sized,
    E: FontEngine + Sync + ?Sized,
    R: JobReporter,
    F: Fn(&Payload) -> R + Sync,
{
    let prepared: Vec<(PathBuf, Result<Preparation>)> = payloads
        .into_iter()
        .map(|payload| (payload.input.clone(), prepare(payload, modifiers, prompt)))
        .collect();
    info!("Running {} jobs", prepared.len());

    prepared
        .into_par_iter()
        .map(|(input, preparation)| {
            let result = preparation.and_then(|preparation| match preparation {
                Preparation::Ready(payload) => {
                    let reporter = reporter_for(&payload);
                    process(&payload, engine, &reporter).map(JobOutcome::Completed)
                }
                Preparation::Aborted => Ok(JobOutcome::Aborted),
            });
            if let Err(e) = &result {
                warn!("{}: {e}", input.display());
            }
            JobReport { input, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::error::Error;

    #[test]
    fn test_tally() {
        let reports = vec![
            JobReport { input: "a.ttf".into(), result: Ok(JobOutcome::Completed(Vec::new())) },
            JobReport { input: "b.ttf".into(), result: Ok(JobOutcome::Aborted) },
            JobReport { input: "c.xyz".into(), result: Err(Error::UnsupportedInputType("xyz".into())) },
            JobReport {
                input: "d.ttf".into(),
                result: Err(Error::Read { path: "d.ttf".into(), source: io::ErrorKind::NotFound.into() }),
            },
        ];
        let result = BatchResult::from_reports(&reports);
        assert_eq!(result, BatchResult { succeeded: 1, failed: 2, aborted: 1 });
        assert_eq!(result.total(), 4);
        assert!(!result.all_succeeded());

        let err = result.ok_or_bail("Convert").unwrap_err();
        assert_eq!(err.to_string(), "Convert failed: 1 succeeded, 2 failed, 1 aborted");
    }

    #[test]
    fn test_aborted_is_not_failure() {
        let result = BatchResult { succeeded: 0, failed: 0, aborted: 3 };
        assert!(result.all_succeeded());
        assert!(result.ok_or_bail("Convert").is_ok());
    }
}
