//! Generator combinators for property-based testing.
//!
//! Generators are explicit, first-class values that can be composed
//! using combinator functions. A generator is a function from a size
//! parameter and a seed to a shrink tree; the same size and seed always
//! produce the same tree.

use crate::data::{Seed, Size};
use crate::lazy::LazyList;
use crate::shrink::{shrink_f64, shrink_i64};
use crate::tree::Tree;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A generator for test data of type `A`.
pub struct Gen<A> {
    run: Rc<dyn Fn(Size, Seed) -> Tree<A>>,
}

impl<A> Clone for Gen<A> {
    fn clone(&self) -> Self {
        Gen {
            run: Rc::clone(&self.run),
        }
    }
}

impl<A: Clone + 'static> Gen<A> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Size, Seed) -> Tree<A> + 'static,
    {
        Gen { run: Rc::new(f) }
    }

    /// Generate a shrink tree using the given size and seed.
    pub fn generate(&self, size: Size, seed: Seed) -> Tree<A> {
        (self.run)(size, seed)
    }

    /// Create a generator that always produces the same value.
    pub fn constant(value: A) -> Self {
        Gen::new(move |_size, _seed| Tree::singleton(value.clone()))
    }

    /// Defer construction of a generator until it is sampled. Used to tie
    /// the knot in recursive generator definitions.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Gen<A> + 'static,
    {
        Gen::new(move |size, seed| f().generate(size, seed))
    }

    /// Map a function over the generated values.
    pub fn map<B, F>(self, f: F) -> Gen<B>
    where
        B: Clone + 'static,
        F: Fn(A) -> B + 'static,
    {
        let f: Rc<dyn Fn(A) -> B> = Rc::new(f);
        Gen::new(move |size, seed| Tree::map_rc(self.generate(size, seed), Rc::clone(&f)))
    }

    /// Monadic composition for dependent generation.
    ///
    /// The seed is split between the two arms; the trees compose via
    /// [`Tree::bind`], which keeps this generator's shrinks ahead of the
    /// continuation's.
    pub fn bind<B, F>(self, f: F) -> Gen<B>
    where
        B: Clone + 'static,
        F: Fn(A) -> Gen<B> + 'static,
    {
        let f: Rc<dyn Fn(A) -> Gen<B>> = Rc::new(f);
        Gen::new(move |size, seed| {
            let (seed1, seed2) = seed.split();
            let tree = self.generate(size, seed1);
            let f = Rc::clone(&f);
            Tree::bind_rc(tree, Rc::new(move |value| f(value).generate(size, seed2)))
        })
    }

    /// Generate one value, discarding the shrinks.
    pub fn sample(&self, size: usize, seed: Option<u64>) -> A {
        self.sample_tree(size, seed).value
    }

    /// Generate one value together with its shrink tree.
    pub fn sample_tree(&self, size: usize, seed: Option<u64>) -> Tree<A> {
        let seed = match seed {
            Some(value) => Seed::from_u64(value),
            None => Seed::random(),
        };
        self.generate(Size::new(size), seed)
    }

    /// Pair this generator with another, shrinking fairly.
    pub fn pair_with<B: Clone + 'static>(self, other: Gen<B>) -> Gen<(A, B)> {
        pair(self, other)
    }

    /// Generate a vector of exactly `n` values.
    pub fn replicate(self, n: usize) -> Gen<Vec<A>> {
        replicate(n, self)
    }

    /// Generate a vector whose length is drawn from `nat`.
    pub fn array(self) -> Gen<Vec<A>> {
        array(self)
    }

    /// Generate a nonempty vector whose length is drawn from `pos`.
    pub fn nearray(self) -> Gen<Vec<A>> {
        nearray(self)
    }

    /// Run this generator at a square-root size.
    pub fn small(self) -> Gen<A> {
        small(self)
    }

    /// Run this generator at size^1.5.
    pub fn big(self) -> Gen<A> {
        big(self)
    }

    /// Run this generator at a squared size.
    pub fn huge(self) -> Gen<A> {
        huge(self)
    }

    /// Run this generator at size^exponent.
    pub fn pow(self, exponent: f64) -> Gen<A> {
        pow(exponent, self)
    }
}

impl Gen<i64> {
    /// The current size parameter, shrinking toward zero.
    pub fn sized() -> Gen<i64> {
        Gen::new(|size, _seed| shrink_i64(size.get() as i64, 0))
    }

    /// Generate an integer in `[lo, hi]`, shrinking toward `lo`.
    ///
    /// Reversed bounds are normalized by reflecting the result, so the
    /// bias lands on the closer bound. A zero-width range is a usage
    /// error and panics.
    pub fn between(lo: i64, hi: i64) -> Gen<i64> {
        between_exclusive(lo, hi + 1)
    }

    /// Generate an integer in `[0, max)`, shrinking toward zero.
    pub fn range(max: i64) -> Gen<i64> {
        Gen::between(0, max - 1)
    }

    /// Generate a small natural number, bounded by the current size.
    pub fn nat() -> Gen<i64> {
        Gen::sized().bind(|size| Gen::range(size + 1))
    }

    /// Generate a small integer.
    pub fn int() -> Gen<i64> {
        oneof(vec![Gen::nat(), Gen::nat().map(|x| -x)])
    }

    /// Generate a small positive number.
    pub fn pos() -> Gen<i64> {
        Gen::nat().map(|x| x + 1)
    }

    /// Generate a small negative number.
    pub fn neg() -> Gen<i64> {
        Gen::nat().map(|x| -x - 1)
    }

    /// Generate a nonnegative i32-range value.
    pub fn natural() -> Gen<i64> {
        Gen::between(0, i32::MAX as i64)
    }

    /// Generate any i32-range value.
    pub fn integer() -> Gen<i64> {
        Gen::between(i32::MIN as i64, i32::MAX as i64)
    }

    /// Generate a positive i32-range value.
    pub fn positive() -> Gen<i64> {
        Gen::between(1, i32::MAX as i64)
    }

    /// Generate a negative i32-range value.
    pub fn negative() -> Gen<i64> {
        Gen::between(i32::MIN as i64, -1)
    }

    /// Generate a binary digit (0 or 1).
    pub fn bin() -> Gen<i64> {
        choose(vec![0, 1])
    }
}

fn between_exclusive(lo: i64, hi: i64) -> Gen<i64> {
    let width = hi - lo;
    if width < 0 {
        return between_exclusive(hi, lo).map(move |x| hi - x + lo);
    }
    if width == 0 {
        panic!("between: range of zero width at {lo}");
    }
    Gen::new(move |_size, seed| {
        let (offset, _) = seed.next_bounded(width as u64);
        shrink_i64(lo + offset as i64, lo)
    })
}

impl Gen<f64> {
    /// Generate a float in `[lo, hi)`, shrinking toward `lo`.
    pub fn between_float(lo: f64, hi: f64) -> Gen<f64> {
        let width = hi - lo;
        if width < 0.0 {
            return Gen::between_float(hi, lo).map(move |x| hi - x + lo);
        }
        if width == 0.0 {
            panic!("between_float: range of zero width at {lo}");
        }
        Gen::new(move |_size, seed| {
            let (unit, _) = seed.next_f64();
            shrink_f64(lo + unit * width, lo)
        })
    }

    /// Generate a float in `[0, max)`.
    pub fn range_float(max: f64) -> Gen<f64> {
        Gen::between_float(0.0, max)
    }
}

impl Gen<bool> {
    /// Generate a random boolean, shrinking toward `false`.
    pub fn bool() -> Gen<bool> {
        choose(vec![false, true])
    }
}

impl Gen<char> {
    /// Generate a character in the inclusive range `[lo, hi]`.
    pub fn char_range(lo: char, hi: char) -> Gen<char> {
        Gen::between(lo as i64, hi as i64)
            .map(|code| char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Generate one of the characters of the given string.
    pub fn char_in(chars: &str) -> Gen<char> {
        let chars: Vec<char> = chars.chars().collect();
        if chars.is_empty() {
            panic!("char_in: empty choice of characters");
        }
        choose(chars)
    }

    pub fn digit() -> Gen<char> {
        Gen::char_range('0', '9')
    }

    pub fn lower() -> Gen<char> {
        Gen::char_range('a', 'z')
    }

    pub fn upper() -> Gen<char> {
        Gen::char_range('A', 'Z')
    }

    pub fn alpha() -> Gen<char> {
        oneof(vec![Gen::lower(), Gen::upper()])
    }

    pub fn alphanum() -> Gen<char> {
        oneof(vec![Gen::alpha(), Gen::digit()])
    }

    pub fn ascii() -> Gen<char> {
        Gen::char_range('!', '~')
    }

    pub fn whitespace() -> Gen<char> {
        Gen::char_in(" \n\t")
    }
}

impl Gen<String> {
    /// Generate a string of characters drawn from `chars`.
    pub fn string_of(chars: Gen<char>) -> Gen<String> {
        array(chars).map(|cs| cs.into_iter().collect())
    }

    /// Generate a nonempty string of characters drawn from `chars`.
    pub fn nestring_of(chars: Gen<char>) -> Gen<String> {
        nearray(chars).map(|cs| cs.into_iter().collect())
    }

    /// Generate each part and join them with the separator.
    pub fn concat_str(parts: Vec<Gen<String>>, sep: &str) -> Gen<String> {
        let sep = sep.to_string();
        sequence(parts).map(move |parts| parts.join(&sep))
    }
}

/// Generate one of the given values, uniformly. Panics on an empty set.
pub fn choose<A: Clone + 'static>(alternatives: Vec<A>) -> Gen<A> {
    if alternatives.is_empty() {
        panic!("choose: empty set of alternatives");
    }
    Gen::range(alternatives.len() as i64).map(move |i| alternatives[i as usize].clone())
}

/// Run one of the given generators, chosen uniformly.
pub fn oneof<A: Clone + 'static>(gens: Vec<Gen<A>>) -> Gen<A> {
    choose(gens).bind(|g| g)
}

/// Run one of the given generators, chosen by weight.
pub fn frequency<A: Clone + 'static>(table: Vec<(i64, Gen<A>)>) -> Gen<A> {
    frequency_lazy(
        table
            .into_iter()
            .map(|(weight, g)| {
                (
                    weight,
                    Box::new(move || g.clone()) as Box<dyn Fn() -> Gen<A>>,
                )
            })
            .collect(),
    )
}

/// Weighted choice over lazily constructed generators; only the chosen
/// branch is ever built. Nonpositive weights are skipped; a nonpositive
/// weight total is a usage error and panics.
pub fn frequency_lazy<A: Clone + 'static>(table: Vec<(i64, Box<dyn Fn() -> Gen<A>>)>) -> Gen<A> {
    let total: i64 = table.iter().map(|(weight, _)| (*weight).max(0)).sum();
    if total <= 0 {
        panic!("frequency: nonpositive weight total");
    }
    let table = Rc::new(table);
    Gen::range(total).bind(move |drawn| {
        let mut remaining = drawn;
        for (weight, branch) in table.iter() {
            if *weight > 0 {
                remaining -= weight;
            }
            if remaining < 0 {
                return branch();
            }
        }
        unreachable!("frequency: weight table exhausted")
    })
}

/// Generate a pair, shrinking each component fairly.
pub fn pair<A, B>(ga: Gen<A>, gb: Gen<B>) -> Gen<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    Gen::new(move |size, seed| {
        let (s1, s2) = seed.split();
        let ta = ga.generate(size, s1);
        let tb = gb.generate(size, s2);
        Tree::dist_pair(&ta, &tb)
    })
}

/// Run every generator and collect the results, shrinking one position
/// at a time.
pub fn sequence<A: Clone + 'static>(gens: Vec<Gen<A>>) -> Gen<Vec<A>> {
    Gen::new(move |size, seed| {
        let mut seed = seed;
        let mut trees = Vec::with_capacity(gens.len());
        for g in &gens {
            let (s1, s2) = seed.split();
            trees.push(g.generate(size, s1));
            seed = s2;
        }
        Tree::dist_vec(trees)
    })
}

/// Generate a vector of exactly `n` values.
pub fn replicate<A: Clone + 'static>(n: usize, g: Gen<A>) -> Gen<Vec<A>> {
    sequence(vec![g; n])
}

/// Generate a vector whose length is drawn from `nat`; shrinking reduces
/// the length before the elements.
pub fn array<A: Clone + 'static>(g: Gen<A>) -> Gen<Vec<A>> {
    Gen::nat().bind(move |n| replicate(n as usize, g.clone()))
}

/// Generate a nonempty vector whose length is drawn from `pos`.
pub fn nearray<A: Clone + 'static>(g: Gen<A>) -> Gen<Vec<A>> {
    Gen::pos().bind(move |n| replicate(n as usize, g.clone()))
}

/// Generate a record of named fields; every field keeps an independent
/// shrink path, varied one at a time.
pub fn record<A: Clone + 'static>(fields: Vec<(&str, Gen<A>)>) -> Gen<BTreeMap<String, A>> {
    let fields: Vec<(String, Gen<A>)> = fields
        .into_iter()
        .map(|(key, g)| (key.to_string(), g))
        .collect();
    Gen::new(move |size, seed| {
        let mut seed = seed;
        let mut entries = Vec::with_capacity(fields.len());
        for (key, g) in &fields {
            let (s1, s2) = seed.split();
            entries.push((key.clone(), g.generate(size, s1)));
            seed = s2;
        }
        Tree::dist_keyed(entries).map(|pairs| pairs.into_iter().collect::<BTreeMap<String, A>>())
    })
}

/// Generate a mapping from small lowercase keys to generated values.
/// Duplicate keys collapse, last write wins.
pub fn pojo<A: Clone + 'static>(values: Gen<A>) -> Gen<BTreeMap<String, A>> {
    pojo_with(Gen::nestring_of(Gen::lower()).small(), values)
}

/// Generate a mapping with an explicit key generator. Duplicate keys
/// collapse, last write wins.
pub fn pojo_with<A: Clone + 'static>(keys: Gen<String>, values: Gen<A>) -> Gen<BTreeMap<String, A>> {
    array(pair(keys, values)).map(|entries| entries.into_iter().collect())
}

/// Rewrite the size parameter seen by a generator, floored at 1.
pub fn resize<A, F>(op: F, g: Gen<A>) -> Gen<A>
where
    A: Clone + 'static,
    F: Fn(f64) -> f64 + 'static,
{
    Gen::new(move |size, seed| {
        let scaled = op(size.get() as f64).round().max(1.0) as usize;
        g.generate(Size::new(scaled), seed)
    })
}

/// Run a generator at a square-root size.
pub fn small<A: Clone + 'static>(g: Gen<A>) -> Gen<A> {
    pow(0.5, g)
}

/// Run a generator at size^1.5.
pub fn big<A: Clone + 'static>(g: Gen<A>) -> Gen<A> {
    pow(1.5, g)
}

/// Run a generator at a squared size.
pub fn huge<A: Clone + 'static>(g: Gen<A>) -> Gen<A> {
    pow(2.0, g)
}

/// Run a generator at size^exponent.
pub fn pow<A: Clone + 'static>(exponent: f64, g: Gen<A>) -> Gen<A> {
    resize(move |size| size.powf(exponent), g)
}

/// Permute the given items with a Fisher-Yates shuffle expressed as a
/// sequence of swap indices, so the shuffle shrinks toward the original
/// order as the indices shrink.
pub fn permute<A: Clone + 'static>(items: Vec<A>) -> Gen<Vec<A>> {
    let len = items.len();
    let mut swaps = Vec::new();
    for i in 0..len.saturating_sub(1) {
        swaps.push(Gen::between(i as i64, len as i64 - 1).map(move |j| (i, j as usize)));
    }
    let items = Rc::new(items);
    sequence(swaps).map(move |chosen| {
        let mut out = (*items).clone();
        for (i, j) in chosen {
            out.swap(i, j);
        }
        out
    })
}

/// Build a recursive generator. The callback receives a thunked
/// self-reference and the remaining size; the self-reference re-enters
/// the callback at half the remaining size, so construction always
/// bottoms out before any value is sampled.
pub fn rec<A, F>(f: F) -> Gen<A>
where
    A: Clone + 'static,
    F: Fn(&dyn Fn() -> Gen<A>, usize) -> Gen<A> + 'static,
{
    let f: Rc<dyn Fn(&dyn Fn() -> Gen<A>, usize) -> Gen<A>> = Rc::new(f);
    Gen::new(move |size, seed| tie_knot(Rc::clone(&f), size.get()).generate(size, seed))
}

fn tie_knot<A: Clone + 'static>(
    f: Rc<dyn Fn(&dyn Fn() -> Gen<A>, usize) -> Gen<A>>,
    remaining: usize,
) -> Gen<A> {
    let tie = {
        let f = Rc::clone(&f);
        move || {
            let f = Rc::clone(&f);
            Gen::lazy(move || tie_knot(Rc::clone(&f), remaining / 2))
        }
    };
    f(&tie, remaining)
}
