//! Counterexample search over generated shrink trees.
//!
//! One search runs a budgeted number of trials. Each trial generates a
//! shrink tree, evaluates the predicate at its root and, on failure,
//! walks the tree with a fuel-bounded leftmost depth-first search to a
//! locally minimal failing value. Coverage and label statistics are
//! aggregated across trials and checked once the trial budget is spent.

use crate::data::{Config, Seed, Size};
use crate::gen::Gen;
use crate::tree::Tree;
use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Per-label coverage counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverData {
    /// Required hit percentage.
    pub req: f64,
    /// Trials in which the covered condition held.
    pub hit: usize,
    /// Trials in which it did not.
    pub miss: usize,
}

impl CoverData {
    /// Observed hit percentage.
    pub fn percentage(&self) -> f64 {
        let total = self.hit + self.miss;
        if total == 0 {
            0.0
        } else {
            self.hit as f64 * 100.0 / total as f64
        }
    }
}

/// Statistics aggregated over one search call.
///
/// `covers` and `stamps` keep registration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestDetails {
    pub covers: Vec<(String, CoverData)>,
    pub stamps: Vec<(String, usize)>,
    pub log: Vec<String>,
    pub tests: usize,
}

/// Outcome of a counterexample search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult<A> {
    /// The property held for every trial. When `expect_failure` was set
    /// and the property failed as expected, the original failure is
    /// nested for diagnostic display.
    Ok {
        expected_failure: Option<Box<SearchResult<A>>>,
        details: TestDetails,
    },

    /// A minimized failing value was found.
    Counterexample {
        counterexample: A,
        shrinks: usize,
        details: TestDetails,
    },

    /// A coverage label fell short of its required percentage after all
    /// trials passed.
    InsufficientCoverage { label: String, details: TestDetails },

    /// The generator itself panicked; the search aborts immediately.
    GenerationError { message: String, details: TestDetails },

    /// The predicate panicked; shrunk like an ordinary failure, keeping
    /// the last triggering value.
    EvaluationError {
        message: String,
        counterexample: A,
        shrinks: usize,
        details: TestDetails,
    },

    /// The property held although `expect_failure` was set.
    UnexpectedSuccess { details: TestDetails },
}

impl<A> SearchResult<A> {
    pub fn is_ok(&self) -> bool {
        matches!(self, SearchResult::Ok { .. })
    }

    pub fn details(&self) -> &TestDetails {
        match self {
            SearchResult::Ok { details, .. }
            | SearchResult::Counterexample { details, .. }
            | SearchResult::InsufficientCoverage { details, .. }
            | SearchResult::GenerationError { details, .. }
            | SearchResult::EvaluationError { details, .. }
            | SearchResult::UnexpectedSuccess { details } => details,
        }
    }
}

/// Payload of a `Property::fail` call; caught by the search loop and
/// reported as an evaluation failure.
struct FailMessage(String);

/// Payload of a misused property API; never treated as a counterexample.
struct UsageError(String);

#[derive(Default)]
struct RoundState {
    log: Vec<String>,
    // label, required percentage, condition held
    covers: Vec<(String, f64, bool)>,
    stamps: Vec<String>,
}

#[derive(Default)]
struct RunState {
    round: RoundState,
    covers: Vec<(String, CoverData)>,
    stamps: Vec<(String, usize)>,
    // Required percentages seen anywhere in the run, recorded even for
    // rounds that later fail, so inconsistent requirements are caught.
    reqs: Vec<(String, f64)>,
    failure_log: Vec<String>,
    trace: Vec<String>,
}

impl RunState {
    fn begin_round(&mut self) {
        self.round = RoundState::default();
    }

    /// Merge the round's registrations into the run-wide tallies. Only
    /// called for rounds whose predicate returned true.
    fn commit_round(&mut self) {
        let round = std::mem::take(&mut self.round);
        for (label, req, hit) in round.covers {
            if !self.covers.iter().any(|(l, _)| *l == label) {
                self.covers
                    .push((label.clone(), CoverData { req, hit: 0, miss: 0 }));
            }
            if let Some((_, data)) = self.covers.iter_mut().find(|(l, _)| *l == label) {
                if hit {
                    data.hit += 1;
                } else {
                    data.miss += 1;
                }
            }
        }
        for stamp in round.stamps {
            if let Some((_, count)) = self.stamps.iter_mut().find(|(l, _)| *l == stamp) {
                *count += 1;
            } else {
                self.stamps.push((stamp, 1));
            }
        }
    }

    /// Discard the round's cover and stamp registrations but keep its
    /// log for the final report.
    fn abort_round(&mut self) {
        self.failure_log = std::mem::take(&mut self.round).log;
    }

    fn details(&self, tests: usize) -> TestDetails {
        TestDetails {
            covers: self.covers.clone(),
            stamps: self.stamps.clone(),
            log: self.trace.clone(),
            tests,
        }
    }

    fn details_with_failure(&self, tests: usize) -> TestDetails {
        let mut details = self.details(tests);
        details.log.extend(self.failure_log.iter().cloned());
        details
    }
}

/// Side-effect API handed to the predicate for the duration of one
/// evaluation round.
pub struct Property {
    state: Rc<RefCell<RunState>>,
}

impl Property {
    /// Append a free-form line to the round log.
    pub fn log(&self, message: impl std::fmt::Display) {
        self.state.borrow_mut().round.log.push(message.to_string());
    }

    /// Log an intermediate value and pass it through.
    pub fn tap<T: Debug>(&self, value: T, message: &str) -> T {
        if message.is_empty() {
            self.log(format!("{value:?}"));
        } else {
            self.log(format!("{message}: {value:?}"));
        }
        value
    }

    /// Register a label for the run statistics.
    pub fn label(&self, label: &str) {
        self.state.borrow_mut().round.stamps.push(label.to_string());
    }

    /// Register a coverage observation: `condition` should hold in at
    /// least `required_percentage` percent of all trials.
    ///
    /// Registering the same label twice within one round, or with a
    /// requirement that differs from an earlier registration in the same
    /// run, is a usage error that aborts the whole search.
    pub fn cover(&self, condition: bool, required_percentage: f64, label: &str) {
        let mut state = self.state.borrow_mut();
        if state.round.covers.iter().any(|(l, _, _)| l == label) {
            drop(state);
            std::panic::panic_any(UsageError(format!(
                "cover: label already registered in this round: {label}"
            )));
        }
        let known = state
            .reqs
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, req)| *req);
        match known {
            Some(req) if req != required_percentage => {
                drop(state);
                std::panic::panic_any(UsageError(format!(
                    "cover: conflicting requirements for {label}: {req} and {required_percentage}"
                )));
            }
            Some(_) => {}
            None => state
                .reqs
                .push((label.to_string(), required_percentage)),
        }
        state
            .round
            .covers
            .push((label.to_string(), required_percentage, condition));
    }

    /// Fail the current round with a message, like an assertion failing
    /// deep inside the property. Participates in shrinking.
    pub fn fail(&self, message: impl std::fmt::Display) -> ! {
        std::panic::panic_any(FailMessage(message.to_string()))
    }

    /// Structural equality assertion; logs a diff of both sides when
    /// they differ.
    pub fn equals<T: Debug + PartialEq>(&self, lhs: &T, rhs: &T) -> bool {
        let equal = lhs == rhs;
        if !equal {
            let a = format!("{lhs:?}");
            let b = format!("{rhs:?}");
            self.log("not structurally equal:");
            if a.contains('\n') || b.contains('\n') {
                self.log(format!("{a}\n!=\n{b}"));
            } else {
                self.log(format!("{a} != {b}"));
            }
        }
        equal
    }
}

#[derive(Debug, Clone)]
struct Failure<A> {
    value: A,
    error: Option<String>,
}

/// Search for a counterexample to `predicate` over values drawn from
/// `gen`, returning as much information as possible.
pub fn search<A, F>(gen: &Gen<A>, predicate: F, config: &Config) -> SearchResult<A>
where
    A: Clone + Debug + 'static,
    F: Fn(&A, &Property) -> bool + 'static,
{
    let state = Rc::new(RefCell::new(RunState::default()));
    let predicate = Rc::new(predicate);

    for trial in 1..=config.tests {
        let size = test_size(trial - 1, config.tests);
        let seed = match config.seed {
            Some(base) => Seed::from_u64(base.wrapping_add(trial as u64)),
            None => Seed::random(),
        };

        let tree = match catch_unwind(AssertUnwindSafe(|| gen.generate(size, seed))) {
            Ok(tree) => tree,
            Err(payload) => {
                let details = state.borrow().details(trial);
                return finish(
                    config,
                    SearchResult::GenerationError {
                        message: panic_message(payload),
                        details,
                    },
                );
            }
        };
        if config.verbose {
            state
                .borrow_mut()
                .trace
                .push(format!("trial {trial}: {:?}", tree.value));
        }

        let evaluated = evaluate_tree(tree, Rc::clone(&state), Rc::clone(&predicate));
        let Some(found) = evaluated.left_first_search(|node| node.is_some(), config.max_shrinks)
        else {
            continue;
        };
        let shrinks = shrinks_consumed(config.max_shrinks, found.fuel);
        let Some(failure) = found.tree.value else {
            continue;
        };
        let details = state.borrow().details_with_failure(trial);
        let result = match failure.error {
            Some(message) => SearchResult::EvaluationError {
                message,
                counterexample: failure.value,
                shrinks,
                details,
            },
            None => SearchResult::Counterexample {
                counterexample: failure.value,
                shrinks,
                details,
            },
        };
        return finish(config, result);
    }

    let details = state.borrow().details(config.tests);
    for (label, data) in &details.covers {
        if data.percentage() < data.req {
            return finish(
                config,
                SearchResult::InsufficientCoverage {
                    label: label.clone(),
                    details: details.clone(),
                },
            );
        }
    }
    finish(
        config,
        SearchResult::Ok {
            expected_failure: None,
            details,
        },
    )
}

/// Evaluate the predicate over the whole tree, lazily: each node is
/// tested in its own round exactly when the search first forces it.
fn evaluate_tree<A, F>(
    tree: Tree<A>,
    state: Rc<RefCell<RunState>>,
    predicate: Rc<F>,
) -> Tree<Option<Failure<A>>>
where
    A: Clone + Debug + 'static,
    F: Fn(&A, &Property) -> bool + 'static,
{
    Tree::map_rc(
        tree,
        Rc::new(move |value: A| {
            state.borrow_mut().begin_round();
            let property = Property {
                state: Rc::clone(&state),
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| predicate(&value, &property)));
            match outcome {
                Ok(true) => {
                    state.borrow_mut().commit_round();
                    None
                }
                Ok(false) => {
                    state.borrow_mut().abort_round();
                    Some(Failure { value, error: None })
                }
                Err(payload) => {
                    if let Some(usage) = payload.downcast_ref::<UsageError>() {
                        panic!("{}", usage.0);
                    }
                    state.borrow_mut().abort_round();
                    Some(Failure {
                        value,
                        error: Some(panic_message(payload)),
                    })
                }
            }
        }),
    )
}

/// Size schedule: ramps 1..=100 across the first 100 trials (scaled when
/// fewer are configured), restarting every 100 trials.
fn test_size(trial: usize, num_tests: usize) -> Size {
    let subtract = 100 * (trial / 100);
    let trial = trial - subtract;
    let num_tests = num_tests.saturating_sub(subtract).max(1);
    let factor = 100.0 / num_tests.min(100) as f64;
    Size::new((1.0 + trial as f64 * factor) as usize)
}

fn shrinks_consumed(max_shrinks: i64, fuel_left: i64) -> usize {
    if max_shrinks < 0 {
        // Unlimited fuel counts down from -1.
        (-1 - fuel_left) as usize
    } else {
        (max_shrinks - fuel_left) as usize
    }
}

fn finish<A>(config: &Config, result: SearchResult<A>) -> SearchResult<A> {
    if !config.expect_failure {
        return result;
    }
    let details = result.details().clone();
    if result.is_ok() {
        SearchResult::UnexpectedSuccess { details }
    } else {
        SearchResult::Ok {
            expected_failure: Some(Box::new(result)),
            details,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(FailMessage(message)) = payload.downcast_ref::<FailMessage>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
