//! Shrink trees for numeric values.
//!
//! Candidates for a value `x` are derived from the halving sequence
//! `x, x/2, x/4, ...` as `x - h`, which puts the most aggressive
//! simplification (the target itself) first and narrows geometrically
//! from there. A bounded run of linear decrements fills the gaps the
//! geometric jumps skip near `x`. Descent paths through the resulting
//! tree are O(log x) nodes.

use crate::lazy::LazyList;
use crate::tree::Tree;

/// Resolution below which halving stops contributing candidates.
const RESOLUTION: f64 = 0.01;

/// Maximum number of linear-decrement fallback candidates per node.
const LINEAR_FALLBACK: i64 = 10;

/// Build a shrink tree for an integer, biased toward `towards`.
pub fn shrink_i64(n: i64, towards: i64) -> Tree<i64> {
    if towards != 0 {
        return shrink_i64(towards - n, 0).map(move |i| towards - i);
    }
    if n < 0 {
        return shrink_i64(-n, 0).map(|i| -i);
    }
    go_i64(n)
}

fn go_i64(x: i64) -> Tree<i64> {
    let mut candidates = Vec::new();
    if x > 0 {
        let mut h = x;
        while h != 0 {
            candidates.push(x - h);
            h /= 2;
        }
        let ceil_half = x - x / 2;
        let mut i = x - 1;
        let mut taken = 0;
        while i > ceil_half && taken < LINEAR_FALLBACK {
            candidates.push(i);
            i -= 1;
            taken += 1;
        }
    }
    Tree::with_children(x, LazyList::from_vec(candidates).map(go_i64))
}

/// Build a shrink tree for a float, biased toward `towards`.
///
/// Mirrors [`shrink_i64`], with a second non-floor halving pass for
/// non-integral values so fractional parts shrink without premature
/// rounding.
pub fn shrink_f64(n: f64, towards: f64) -> Tree<f64> {
    if towards != 0.0 {
        return shrink_f64(towards - n, 0.0).map(move |i| towards - i);
    }
    if n < 0.0 {
        return shrink_f64(-n, 0.0).map(|i| -i);
    }
    go_f64(n)
}

fn go_f64(x: f64) -> Tree<f64> {
    let mut candidates = Vec::new();
    if x > 0.0 {
        let mut h = x;
        loop {
            candidates.push(x - h);
            h = (h / 2.0).floor();
            if h.abs() <= RESOLUTION {
                break;
            }
        }
        if x.round() != x {
            let mut h = x / 2.0;
            while h.abs() > RESOLUTION {
                candidates.push(x - h);
                h /= 2.0;
            }
        }
        let ceil_half = (x / 2.0).ceil();
        let mut i = x.ceil() - 1.0;
        let mut taken = 0;
        while i > ceil_half && taken < LINEAR_FALLBACK {
            candidates.push(i);
            i -= 1.0;
            taken += 1;
        }
    }
    Tree::with_children(x, LazyList::from_vec(candidates).map(go_f64))
}
