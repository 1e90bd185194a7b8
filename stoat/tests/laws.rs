//! Structural laws of the tree and generator algebra, checked with the
//! library's own search engine.

use stoat::*;

/// Generator of small shrink trees, recursing with geometrically
/// decreasing weight so the structure stays bounded.
fn tree_gen(g: Gen<i64>) -> Gen<Tree<i64>> {
    Gen::nat().small().bind(move |budget| grow(budget, g.clone()))
}

fn grow(budget: i64, g: Gen<i64>) -> Gen<Tree<i64>> {
    let leaf = {
        let g = g.clone();
        Box::new(move || g.clone().map(Tree::singleton)) as Box<dyn Fn() -> Gen<Tree<i64>>>
    };
    let branch = Box::new(move || {
        let g = g.clone();
        g.clone().bind(move |top| {
            let g = g.clone();
            Gen::between(2, 5).bind(move |arity| {
                grow(budget / arity, g.clone())
                    .replicate(arity as usize)
                    .map(move |forest| Tree::with_child_vec(top, forest))
            })
        })
    }) as Box<dyn Fn() -> Gen<Tree<i64>>>;
    frequency_lazy(vec![(1, leaf), (budget, branch)])
}

/// Generator of lazy lists, tied through `rec` so construction stays
/// bounded by the remaining size.
fn list_gen() -> Gen<LazyList<i64>> {
    rec(|tie, remaining| {
        let nested = tie();
        frequency_lazy(vec![
            (
                1,
                Box::new(|| Gen::constant(LazyList::nil())) as Box<dyn Fn() -> Gen<LazyList<i64>>>,
            ),
            (
                remaining as i64,
                Box::new(move || {
                    let nested = nested.clone();
                    Gen::bin().bind(move |x| {
                        nested.clone().map(move |xs| LazyList::cons(x, xs))
                    })
                }) as Box<dyn Fn() -> Gen<LazyList<i64>>>,
            ),
        ])
    })
}

#[test]
fn tree_bind_left_identity() {
    let config = Config::default().with_seed(101).with_tests(50);
    forall_with(
        &tree_gen(Gen::nat().small()),
        |t, p| {
            let joined = Tree::singleton(t.clone()).bind(|inner| inner);
            p.equals(&joined.force(-1), &t.force(-1))
        },
        &config,
    );
}

#[test]
fn tree_bind_right_identity() {
    let config = Config::default().with_seed(102).with_tests(50);
    forall_with(
        &tree_gen(Gen::bin()),
        |t, p| {
            let rejoined = t.bind(Tree::singleton);
            p.equals(&rejoined.force(-1), &t.force(-1))
        },
        &config,
    );
}

#[test]
fn gen_bind_left_identity() {
    let value = 5i64;
    let joined = Gen::constant(Gen::constant(value)).bind(|g| g);
    let plain = Gen::constant(value);
    for seed in [0u64, 1, 42] {
        assert_eq!(
            joined.sample_tree(10, Some(seed)).force(-1),
            plain.sample_tree(10, Some(seed)).force(-1)
        );
    }
}

#[test]
fn gen_bind_right_identity() {
    let value = 5i64;
    let rejoined = Gen::constant(value).bind(Gen::constant);
    let plain = Gen::constant(value);
    for seed in [0u64, 1, 42] {
        assert_eq!(
            rejoined.sample_tree(10, Some(seed)).force(-1),
            plain.sample_tree(10, Some(seed)).force(-1)
        );
    }
}

#[test]
fn lazy_concat_is_associative() {
    let triples = sequence(vec![list_gen(), list_gen(), list_gen()]);
    let config = Config::default().with_seed(7).with_tests(50);
    forall_with(
        &triples,
        |lists, p| {
            let (a, b, c) = (&lists[0], &lists[1], &lists[2]);
            p.equals(
                &a.concat(&b.concat(c)).to_vec(),
                &a.concat(b).concat(c).to_vec(),
            )
        },
        &config,
    );
}

#[test]
fn lazy_concat_left_identity() {
    let config = Config::default().with_seed(8).with_tests(50);
    forall_with(
        &list_gen(),
        |list, p| p.equals(&LazyList::nil().concat(list).to_vec(), &list.to_vec()),
        &config,
    );
}

#[test]
fn lazy_concat_right_identity() {
    let config = Config::default().with_seed(9).with_tests(50);
    forall_with(
        &list_gen(),
        |list, p| p.equals(&list.concat(&LazyList::nil()).to_vec(), &list.to_vec()),
        &config,
    );
}

#[test]
fn generated_trees_shrink_like_their_parts() {
    // A paired generator shrinks one component at a time: every child of
    // the root differs from the root in exactly one position.
    let g = pair(Gen::between(0, 100), Gen::between(0, 100));
    for seed in 0..20 {
        let tree = g.sample_tree(10, Some(seed));
        let (a, b) = tree.value;
        for child in tree.children.iter().take(8) {
            let (ca, cb) = child.value;
            let changed = usize::from(ca != a) + usize::from(cb != b);
            assert_eq!(changed, 1, "child ({ca}, {cb}) of root ({a}, {b})");
        }
    }
}
