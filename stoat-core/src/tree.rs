//! Rose tree implementation for shrinking test values.
//!
//! A tree pairs a generated value with a lazily-forced sequence of
//! "smaller" alternatives, each itself a tree. Children are ordered from
//! the most aggressive simplification to the least, so the leftmost
//! depth-first search below finds a locally minimal failing value in
//! bounded work.

use crate::lazy::LazyList;
use std::rc::Rc;

pub mod render;

/// A rose tree containing a value and its shrink possibilities.
///
/// The value is materialized immediately; the children are realized only
/// as demanded, so a tree may be conceptually very wide or deep without
/// that ever being paid for.
#[derive(Clone)]
pub struct Tree<A> {
    pub value: A,
    pub children: LazyList<Tree<A>>,
}

impl<A> std::fmt::Debug for Tree<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Children stay unforced; only the value is shown.
        f.debug_struct("Tree").field("value", &self.value).finish_non_exhaustive()
    }
}

/// An eagerly forced tree, used to compare tree structures in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictTree<A> {
    pub value: A,
    pub children: Vec<StrictTree<A>>,
}

/// Result of a leftmost depth-first search: the minimal node found and
/// the fuel left over.
pub struct Shrunk<A> {
    pub tree: Tree<A>,
    pub fuel: i64,
}

impl<A: Clone + 'static> Tree<A> {
    /// Create a new tree with the given value and no children.
    pub fn singleton(value: A) -> Self {
        Tree {
            value,
            children: LazyList::nil(),
        }
    }

    /// Create a new tree with the given value and children.
    pub fn with_children(value: A, children: LazyList<Tree<A>>) -> Self {
        Tree { value, children }
    }

    /// Create a new tree from an eager vector of children.
    pub fn with_child_vec(value: A, children: Vec<Tree<A>>) -> Self {
        Tree {
            value,
            children: LazyList::from_vec(children),
        }
    }

    /// Map a function over the tree values, lazily below the root.
    pub fn map<B, F>(&self, f: F) -> Tree<B>
    where
        B: Clone + 'static,
        F: Fn(A) -> B + 'static,
    {
        Tree::map_rc(self.clone(), Rc::new(f))
    }

    pub(crate) fn map_rc<B>(tree: Tree<A>, f: Rc<dyn Fn(A) -> B>) -> Tree<B>
    where
        B: Clone + 'static,
    {
        let Tree { value, children } = tree;
        let value = f(value);
        let children = children.map(move |child| Tree::map_rc(child, Rc::clone(&f)));
        Tree { value, children }
    }

    /// Monadic chaining. The continuation's tree is realized for the root
    /// value immediately; the children put this tree's own shrinks (each
    /// recursively chained) ahead of the shrinks introduced by the
    /// continuation, so shrinking the original structure is tried first.
    pub fn bind<B, F>(&self, f: F) -> Tree<B>
    where
        B: Clone + 'static,
        F: Fn(A) -> Tree<B> + 'static,
    {
        Tree::bind_rc(self.clone(), Rc::new(f))
    }

    pub(crate) fn bind_rc<B>(tree: Tree<A>, f: Rc<dyn Fn(A) -> Tree<B>>) -> Tree<B>
    where
        B: Clone + 'static,
    {
        let Tree { value, children } = tree;
        let produced = f(value);
        let chained = {
            let f = Rc::clone(&f);
            children.map(move |child| Tree::bind_rc(child, Rc::clone(&f)))
        };
        Tree {
            value: produced.value,
            children: chained.concat(&produced.children),
        }
    }

    /// Combine two trees into a tree of pairs whose shrinking alternates
    /// fairly between the components.
    pub fn fair_pair<B>(&self, other: &Tree<B>) -> Tree<(A, B)>
    where
        B: Clone + 'static,
    {
        Tree::dist_pair(self, other)
    }

    /// Distribute a pair fairly: children shrink exactly one component a
    /// single step, holding the other fixed, left component first.
    pub fn dist_pair<B>(ta: &Tree<A>, tb: &Tree<B>) -> Tree<(A, B)>
    where
        B: Clone + 'static,
    {
        let value = (ta.value.clone(), tb.value.clone());
        let left = {
            let tb = tb.clone();
            ta.children.map(move |ca| Tree::dist_pair(&ca, &tb))
        };
        let right = {
            let ta = ta.clone();
            tb.children.map(move |cb| Tree::dist_pair(&ta, &cb))
        };
        Tree {
            value,
            children: left.concat(&right),
        }
    }

    /// Distribute a fixed-length vector of trees fairly: every child
    /// shrinks exactly one position a single step, iterating over the
    /// positions in order.
    pub fn dist_vec(trees: Vec<Tree<A>>) -> Tree<Vec<A>> {
        let value: Vec<A> = trees.iter().map(|t| t.value.clone()).collect();
        let trees = Rc::new(trees);
        let indices: Vec<usize> = (0..trees.len()).collect();
        let children = LazyList::flatten(LazyList::from_vec(indices).map(move |i| {
            let trees = Rc::clone(&trees);
            let forest = trees[i].children.clone();
            forest.map(move |child| {
                let mut next = (*trees).clone();
                next[i] = child;
                Tree::dist_vec(next)
            })
        }));
        Tree { value, children }
    }

    /// Keyed form of [`Tree::dist_vec`]: distribute a set of named trees,
    /// shrinking one named component at a time.
    pub fn dist_keyed<K>(entries: Vec<(K, Tree<A>)>) -> Tree<Vec<(K, A)>>
    where
        K: Clone + 'static,
    {
        let (keys, trees): (Vec<K>, Vec<Tree<A>>) = entries.into_iter().unzip();
        let keys = Rc::new(keys);
        Tree::dist_vec(trees).map(move |values| keys.iter().cloned().zip(values).collect())
    }

    /// Greedy leftmost depth-first search for a locally minimal node.
    ///
    /// Assumes nothing about the root: if the predicate does not hold
    /// there, returns `None`. Otherwise repeatedly descends into the
    /// first child satisfying the predicate, never revisiting siblings
    /// once a descent begins. Every child test consumes one unit of fuel
    /// whether or not it succeeds; -1 means unlimited fuel.
    pub fn left_first_search<P>(&self, predicate: P, fuel: i64) -> Option<Shrunk<A>>
    where
        P: Fn(&A) -> bool,
    {
        if !predicate(&self.value) {
            return None;
        }
        let mut fuel = fuel;
        let mut current = self.clone();
        loop {
            let mut rest = current.children.clone();
            let mut descended = false;
            loop {
                if fuel == 0 {
                    return Some(Shrunk { tree: current, fuel });
                }
                match rest.force() {
                    None => break,
                    Some((child, tail)) => {
                        fuel -= 1;
                        if predicate(&child.value) {
                            current = child;
                            descended = true;
                            break;
                        }
                        rest = tail;
                    }
                }
            }
            if !descended {
                return Some(Shrunk { tree: current, fuel });
            }
        }
    }

    /// Force the tree down to the given depth (-1 = fully) into an eager
    /// [`StrictTree`].
    pub fn force(&self, depth: i64) -> StrictTree<A> {
        let children = if depth == 0 {
            Vec::new()
        } else {
            self.children
                .iter()
                .map(|child| child.force(depth - 1))
                .collect()
        };
        StrictTree {
            value: self.value.clone(),
            children,
        }
    }
}
