//! Inspect the shrink trees generators produce.

use stoat::*;

fn main() {
    let tree = Gen::between(0, 100).sample_tree(10, Some(42));
    println!("an integer and its first two levels of shrinks:");
    println!("{}", tree.render(2));

    let paired = pair(Gen::range(10), Gen::range(10)).sample_tree(10, Some(42));
    let (a, b) = paired.value;
    println!("pair ({a}, {b}) shrinks one component at a time:");
    for child in paired.children.iter().take(6) {
        let (ca, cb) = child.value;
        println!("  ({ca}, {cb})");
    }
}
