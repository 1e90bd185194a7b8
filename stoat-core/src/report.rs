//! Rendering of search results and the assert-style entry points.

use crate::data::Config;
use crate::gen::Gen;
use crate::property::{search, Property, SearchResult, TestDetails};
use std::fmt;
use thiserror::Error;

/// Error raised by [`check`] when a search does not end in a pass.
///
/// Carries the fully rendered report so assertion failures are readable
/// without consulting the structured result.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("property falsified:\n{report}")]
    Falsified { report: String },

    #[error("insufficient coverage:\n{report}")]
    InsufficientCoverage { report: String },

    #[error("exception while generating:\n{report}")]
    Generation { report: String },

    #[error("exception while evaluating:\n{report}")]
    Evaluation { report: String },

    #[error("unexpected success:\n{report}")]
    UnexpectedSuccess { report: String },
}

impl<A: fmt::Debug> SearchResult<A> {
    /// Render the result as human-readable lines of text.
    pub fn report(&self) -> String {
        self.report_lines().join("\n")
    }

    fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            SearchResult::Ok {
                expected_failure: Some(inner),
                ..
            } => {
                lines.push("failing as expected".to_string());
                lines.extend(inner.report_lines());
                lines.push("(expected failure)".to_string());
            }
            SearchResult::Ok { details, .. } => {
                lines.push(format!("passed {} tests", details.tests));
                stamp_lines(details, &mut lines);
            }
            SearchResult::Counterexample {
                counterexample,
                shrinks,
                details,
            } => {
                lines.push(format!(
                    "counterexample found after {} tests and {} shrinks",
                    details.tests, shrinks
                ));
                lines.push(format!("{counterexample:?}"));
                cover_lines(details, &mut lines);
                log_lines(details, &mut lines);
            }
            SearchResult::GenerationError { message, details } => {
                lines.push(format!(
                    "exception when generating after {} tests:",
                    details.tests
                ));
                lines.push(message.clone());
                cover_lines(details, &mut lines);
                log_lines(details, &mut lines);
            }
            SearchResult::EvaluationError {
                message,
                counterexample,
                shrinks,
                details,
            } => {
                lines.push(format!(
                    "exception when evaluating after {} tests:",
                    details.tests
                ));
                lines.push(message.clone());
                lines.push(format!(
                    "exception occurred with this input after {shrinks} shrinks:"
                ));
                lines.push(format!("{counterexample:?}"));
                cover_lines(details, &mut lines);
                log_lines(details, &mut lines);
            }
            SearchResult::InsufficientCoverage { label, details } => {
                lines.push(format!("insufficient coverage for label {label}"));
                cover_lines(details, &mut lines);
                log_lines(details, &mut lines);
            }
            SearchResult::UnexpectedSuccess { details } => {
                lines.push("unexpected success in presence of expect_failure".to_string());
                cover_lines(details, &mut lines);
                log_lines(details, &mut lines);
            }
        }
        lines
    }
}

impl<A: fmt::Debug> fmt::Display for SearchResult<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

fn pct(value: f64) -> String {
    format!("{:>3}%", value.round() as i64)
}

fn cover_lines(details: &TestDetails, lines: &mut Vec<String>) {
    for (label, data) in &details.covers {
        lines.push(format!(
            "{} / {}  {label}",
            pct(data.percentage()),
            pct(data.req)
        ));
    }
}

fn stamp_lines(details: &TestDetails, lines: &mut Vec<String>) {
    for (label, count) in &details.stamps {
        let share = *count as f64 * 100.0 / details.tests.max(1) as f64;
        lines.push(format!("{} {label}", pct(share)));
    }
}

fn log_lines(details: &TestDetails, lines: &mut Vec<String>) {
    lines.extend(details.log.iter().cloned());
}

/// Structured assert-style entry point: run a search and convert any
/// non-pass outcome into a [`CheckError`].
pub fn check<A, F>(gen: &Gen<A>, predicate: F, config: &Config) -> Result<(), CheckError>
where
    A: Clone + fmt::Debug + 'static,
    F: Fn(&A, &Property) -> bool + 'static,
{
    let result = search(gen, predicate, config);
    match &result {
        SearchResult::Ok { .. } => Ok(()),
        SearchResult::Counterexample { .. } => Err(CheckError::Falsified {
            report: result.report(),
        }),
        SearchResult::InsufficientCoverage { .. } => Err(CheckError::InsufficientCoverage {
            report: result.report(),
        }),
        SearchResult::GenerationError { .. } => Err(CheckError::Generation {
            report: result.report(),
        }),
        SearchResult::EvaluationError { .. } => Err(CheckError::Evaluation {
            report: result.report(),
        }),
        SearchResult::UnexpectedSuccess { .. } => Err(CheckError::UnexpectedSuccess {
            report: result.report(),
        }),
    }
}

/// Assert that the property holds, panicking with a descriptive report
/// on failure. Uses the default configuration.
pub fn forall<A, F>(gen: &Gen<A>, predicate: F)
where
    A: Clone + fmt::Debug + 'static,
    F: Fn(&A, &Property) -> bool + 'static,
{
    forall_with(gen, predicate, &Config::default());
}

/// Assert that the property holds under the given configuration,
/// panicking with a descriptive report on failure.
pub fn forall_with<A, F>(gen: &Gen<A>, predicate: F, config: &Config)
where
    A: Clone + fmt::Debug + 'static,
    F: Fn(&A, &Property) -> bool + 'static,
{
    if let Err(error) = check(gen, predicate, config) {
        panic!("{error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::CoverData;

    fn sample_details() -> TestDetails {
        TestDetails {
            covers: vec![(
                "small".to_string(),
                CoverData {
                    req: 75.0,
                    hit: 50,
                    miss: 50,
                },
            )],
            stamps: Vec::new(),
            log: vec!["inspected: 7".to_string()],
            tests: 42,
        }
    }

    #[test]
    fn test_counterexample_report() {
        let result = SearchResult::Counterexample {
            counterexample: 7,
            shrinks: 3,
            details: sample_details(),
        };
        let report = result.report();
        assert!(report.contains("counterexample found after 42 tests and 3 shrinks"));
        assert!(report.contains('7'));
        assert!(report.contains(" 50% /  75%  small"));
        assert!(report.contains("inspected: 7"));
    }

    #[test]
    fn test_expected_failure_report_nests() {
        let inner = SearchResult::Counterexample {
            counterexample: 7,
            shrinks: 0,
            details: sample_details(),
        };
        let result = SearchResult::Ok {
            expected_failure: Some(Box::new(inner)),
            details: sample_details(),
        };
        let report = result.report();
        assert!(report.starts_with("failing as expected"));
        assert!(report.ends_with("(expected failure)"));
    }

    #[test]
    fn test_check_converts_failures() {
        let config = Config::default().with_seed(6);
        let error = check(&Gen::natural(), |&x, _| x < 10_000, &config)
            .expect_err("the bound must be exceeded");
        match error {
            CheckError::Falsified { report } => {
                assert!(report.contains("counterexample found"));
            }
            other => panic!("expected falsified, got: {other}"),
        }
    }

    #[test]
    #[should_panic(expected = "property falsified")]
    fn test_forall_panics_with_report() {
        forall_with(
            &Gen::natural(),
            |&x, _| x < 10_000,
            &Config::default().with_seed(6),
        );
    }

    #[test]
    fn test_forall_accepts_tautologies() {
        forall(&Gen::nat(), |&x, _| x >= 0);
    }
}
