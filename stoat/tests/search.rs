//! End-to-end behavior of the counterexample search.

use std::cell::Cell;
use std::rc::Rc;
use stoat::*;

#[test]
fn finds_and_minimizes_product_counterexample() {
    let gen = record(vec![
        ("a", Gen::range(100_000)),
        ("b", Gen::range(100_000)),
    ]);
    let config = Config::default().with_seed(43).with_shrinks(-1);
    let result = search(
        &gen,
        |m, _| m["a"] * m["b"] < 1814 || m["a"] < m["b"],
        &config,
    );
    match result {
        SearchResult::Counterexample {
            counterexample,
            shrinks,
            ..
        } => {
            let (a, b) = (counterexample["a"], counterexample["b"]);
            assert!(a * b >= 1814, "not a failing pair: {a} * {b}");
            assert!(a >= b, "not a failing pair: {a} < {b}");
            assert!(shrinks > 0);
        }
        other => panic!("expected counterexample, got:\n{}", other.report()),
    }
}

#[test]
fn shrinks_natural_to_exact_boundary() {
    let config = Config::default().with_seed(1).with_shrinks(-1);
    let result = search(&Gen::natural(), |&x, _| x < 10_000, &config);
    match result {
        SearchResult::Counterexample { counterexample, .. } => {
            assert_eq!(counterexample, 10_000);
        }
        other => panic!("expected counterexample, got:\n{}", other.report()),
    }
}

#[test]
fn shrinks_array_to_exact_length_of_zeroes() {
    let config = Config::default().with_seed(7).with_shrinks(-1);
    let result = search(&Gen::bin().array().big(), |xs, _| xs.len() < 3, &config);
    match result {
        SearchResult::Counterexample { counterexample, .. } => {
            assert_eq!(counterexample, vec![0, 0, 0]);
        }
        other => panic!("expected counterexample, got:\n{}", other.report()),
    }
}

#[test]
fn shrinking_finds_counterexample_in_few_steps() {
    let found = Rc::new(Cell::new(false));
    let failures_after_first = Rc::new(Cell::new(0u32));
    let (found_inner, failures_inner) = (Rc::clone(&found), Rc::clone(&failures_after_first));
    let config = Config::default().with_seed(5).with_shrinks(-1);
    let result = search(
        &Gen::natural(),
        move |&x, _| {
            let holds = x < 10_000;
            if !holds {
                if found_inner.get() {
                    failures_inner.set(failures_inner.get() + 1);
                } else {
                    found_inner.set(true);
                }
            }
            holds
        },
        &config,
    );
    match result {
        SearchResult::Counterexample { counterexample, .. } => {
            assert_eq!(counterexample, 10_000);
        }
        other => panic!("expected counterexample, got:\n{}", other.report()),
    }
    // The boundary sits 10_000 below a value of up to 2^31; a linear
    // descent would take thousands of failing evaluations, a halving
    // descent a few dozen.
    assert!(
        failures_after_first.get() < 100,
        "too many failing evaluations: {}",
        failures_after_first.get()
    );
}

#[test]
fn search_is_deterministic_under_a_seed() {
    let config = Config::default().with_seed(99);
    let first = search(&Gen::natural(), |&x, _| x < 10_000, &config);
    let second = search(&Gen::natural(), |&x, _| x < 10_000, &config);
    assert_eq!(first, second);
}

#[test]
fn skewed_distribution_reports_insufficient_coverage() {
    let config = Config::default().with_seed(13);
    let result = search(
        &Gen::nat(),
        |&x, p| {
            p.cover(x > 10, 75.0, "over ten");
            true
        },
        &config,
    );
    match result {
        SearchResult::InsufficientCoverage { label, .. } => assert_eq!(label, "over ten"),
        other => panic!("expected insufficient coverage, got:\n{}", other.report()),
    }
}

#[test]
fn expect_failure_inverts_a_failing_search() {
    let config = Config::default().with_seed(3).with_expect_failure(true);
    let result = search(&Gen::nat(), |&x, _| x > 0, &config);
    match result {
        SearchResult::Ok {
            expected_failure: Some(_),
            ..
        } => {}
        other => panic!("expected ok-with-failure, got:\n{}", other.report()),
    }
}

#[test]
fn expect_failure_flags_a_passing_search() {
    let config = Config::default().with_seed(3).with_expect_failure(true);
    let result = search(&Gen::nat(), |&x, _| x >= 0, &config);
    assert!(matches!(result, SearchResult::UnexpectedSuccess { .. }));
}

#[test]
fn smallest_failing_log_is_returned_after_shrinking() {
    let config = Config::default().with_seed(17).with_shrinks(-1);
    let result = search(
        &Gen::natural(),
        |&x, p| {
            p.log(x);
            x < 84_000
        },
        &config,
    );
    match result {
        SearchResult::Counterexample {
            counterexample,
            details,
            ..
        } => {
            assert_eq!(counterexample, 84_000);
            assert_eq!(details.log, vec!["84000".to_string()]);
        }
        other => panic!("expected counterexample, got:\n{}", other.report()),
    }
}

#[test]
fn coverage_labels_keep_registration_order() {
    let config = Config::default().with_seed(19);
    let result = search(
        &Gen::nat(),
        |&x, p| {
            p.cover(x >= 0, 1.0, "first");
            p.cover(x > 1_000_000, 99.0, "second");
            p.cover(true, 1.0, "third");
            true
        },
        &config,
    );
    // The second label is the one that falls short, and the covers table
    // still lists all three in the order they were registered.
    match result {
        SearchResult::InsufficientCoverage { label, details } => {
            assert_eq!(label, "second");
            let labels: Vec<&str> = details.covers.iter().map(|(l, _)| l.as_str()).collect();
            assert_eq!(labels, vec!["first", "second", "third"]);
        }
        other => panic!("expected insufficient coverage, got:\n{}", other.report()),
    }
}
