//! Quick tour: search for a counterexample and print the report.

use stoat::*;

fn main() {
    // A property that is almost true: it fails once both factors are
    // large enough and ordered, and the engine shrinks the failing pair
    // one component at a time.
    let gen = record(vec![
        ("a", Gen::range(100_000)),
        ("b", Gen::range(100_000)),
    ]);
    let result = search(
        &gen,
        |m, _| m["a"] * m["b"] < 1814 || m["a"] < m["b"],
        &Config::default().with_seed(43).with_shrinks(-1),
    );
    println!("{result}");

    // The assert-style wrapper panics with the same report instead.
    forall(&Gen::nat(), |&x, _| x >= 0);
    println!("nat is never negative");
}
