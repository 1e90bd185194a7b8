//! Tree rendering functionality for debugging and visualization.

use super::{StrictTree, Tree};
use std::fmt;

impl<A> Tree<A>
where
    A: fmt::Display + Clone + 'static,
{
    /// Render the tree structure as a string for debugging.
    ///
    /// Forcing a lazy forest can be expensive or nonterminating, so
    /// rendering is bounded by `depth` (-1 renders everything).
    pub fn render(&self, depth: i64) -> String {
        self.force(depth).render()
    }

    /// Render the tree structure compactly, showing only values.
    pub fn render_compact(&self, depth: i64) -> String {
        self.force(depth).render_compact()
    }
}

impl<A: fmt::Display> StrictTree<A> {
    /// Render the tree structure as a string for debugging.
    pub fn render(&self) -> String {
        let mut result = String::new();
        self.render_recursive(&mut result, "", true);
        result
    }

    fn render_recursive(&self, result: &mut String, prefix: &str, is_last: bool) {
        result.push_str(prefix);
        if is_last {
            result.push_str("└── ");
        } else {
            result.push_str("├── ");
        }
        result.push_str(&format!("{}\n", self.value));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        for (i, child) in self.children.iter().enumerate() {
            let child_is_last = i == self.children.len() - 1;
            child.render_recursive(result, &child_prefix, child_is_last);
        }
    }

    /// Render the tree structure compactly, showing only values.
    pub fn render_compact(&self) -> String {
        if self.children.is_empty() {
            format!("{}", self.value)
        } else {
            let children_str: Vec<String> = self
                .children
                .iter()
                .map(|child| child.render_compact())
                .collect();
            format!("{}[{}]", self.value, children_str.join(", "))
        }
    }
}
