//! Core data types for Stoat property-based testing.

use std::fmt;

/// Size parameter for controlling test data generation.
///
/// Size typically ranges from 1 to 100, where larger values
/// generate more complex test data. The search engine ramps the
/// size across trials so early trials probe small cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic test generation.
///
/// Seeds can be split to create independent random streams,
/// ensuring deterministic and reproducible test runs. Generators
/// receive seeds by value, so determinism is a pure function of the
/// configured seed and trial index rather than of call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Generate the next random value and advance the seed.
    /// Uses SplitMix64 algorithm for high-quality randomness.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a bounded random value [0, bound).
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, new_seed) = self.next_u64();
        ((value as u128 * bound as u128 >> 64) as u64, new_seed)
    }

    /// Generate a random float in [0, 1).
    pub fn next_f64(self) -> (f64, Self) {
        let (value, new_seed) = self.next_u64();
        (((value >> 11) as f64) * (1.0 / (1u64 << 53) as f64), new_seed)
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen(), rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// Configuration for a counterexample search.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of trials to run.
    pub tests: usize,

    /// Maximum number of shrink candidate evaluations; -1 means unlimited.
    pub max_shrinks: i64,

    /// Base seed for trial generation. `None` draws a fresh random seed
    /// per trial, making the run nondeterministic.
    pub seed: Option<u64>,

    /// Invert the interpretation of the outcome: a failure becomes ok,
    /// a pass becomes an unexpected success.
    pub expect_failure: bool,

    /// Record every generated root value in the run log.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tests: 100,
            max_shrinks: 1000,
            seed: None,
            expect_failure: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Create a new config with the given number of trials.
    pub fn with_tests(mut self, tests: usize) -> Self {
        self.tests = tests;
        self
    }

    /// Create a new config with the given shrink budget (-1 = unlimited).
    pub fn with_shrinks(mut self, shrinks: i64) -> Self {
        self.max_shrinks = shrinks;
        self
    }

    /// Create a new config with the given base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a new config that expects the property to fail.
    pub fn with_expect_failure(mut self, expect_failure: bool) -> Self {
        self.expect_failure = expect_failure;
        self
    }

    /// Create a new config that logs every generated root value.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}
