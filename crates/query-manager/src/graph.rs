use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::document::ParsedDefinition;

#[derive(Debug)]
pub(crate) struct Definition {
    pub text: String,
    pub spreads: BTreeSet<String>,
}

/// Every operation and fragment seen so far, and the fragments they spread directly.
///
/// Transitive relationships are always derived from the direct spreads on demand, so a
/// redefinition changing which fragments a fragment spreads is picked up on the next walk.
#[derive(Debug, Default)]
pub(crate) struct DefinitionGraph {
    operations: BTreeMap<String, Definition>,
    fragments: BTreeMap<String, Definition>,
}

impl DefinitionGraph {
    pub fn insert_operation(&mut self, operation: ParsedDefinition) {
        self.operations.insert(
            operation.name,
            Definition {
                text: operation.text,
                spreads: operation.spreads,
            },
        );
    }

    pub fn insert_fragment(&mut self, fragment: ParsedDefinition) {
        self.fragments.insert(
            fragment.name,
            Definition {
                text: fragment.text,
                spreads: fragment.spreads,
            },
        );
    }

    pub fn operation(&self, name: &str) -> Option<&Definition> {
        self.operations.get(name)
    }

    pub fn fragment(&self, name: &str) -> Option<&Definition> {
        self.fragments.get(name)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn fragment_names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    /// All fragments reachable from the given spreads, known or not, ordered by name.
    pub fn closure<'a>(&'a self, spreads: &'a BTreeSet<String>) -> BTreeSet<&'a str> {
        FragmentClosure {
            graph: self,
            seen: HashSet::new(),
            stack: spreads.iter().map(String::as_str).collect(),
        }
        .collect()
    }

    /// Whether every fragment the operation needs is known. Unknown operations are not resolvable.
    pub fn is_resolvable(&self, operation: &str) -> bool {
        self.operation(operation).is_some_and(|operation| {
            self.closure(&operation.spreads)
                .into_iter()
                .all(|fragment| self.fragments.contains_key(fragment))
        })
    }

    /// Operations that need the given fragment, either directly or through other fragments.
    pub fn operations_depending_on(&self, fragment: &str) -> Vec<&str> {
        let related = self.fragment_with_ancestors(fragment);

        self.operations
            .iter()
            .filter(|(_, operation)| operation.spreads.iter().any(|spread| related.contains(spread.as_str())))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The fragment itself plus every known fragment spreading it at any depth.
    fn fragment_with_ancestors<'a>(&'a self, fragment: &'a str) -> HashSet<&'a str> {
        // Invert the direct spreads so we have a map from child -> parents
        let mut direct_parents: HashMap<&str, Vec<&str>> = HashMap::new();
        for (parent, definition) in &self.fragments {
            for child in &definition.spreads {
                direct_parents.entry(child.as_str()).or_default().push(parent.as_str());
            }
        }

        let mut related = HashSet::new();
        let mut stack = vec![fragment];

        while let Some(fragment) = stack.pop() {
            if !related.insert(fragment) {
                // Fragment cycles aren't valid GraphQL, but a redefinition can create one
                // before anything validates it.
                continue;
            }

            if let Some(parents) = direct_parents.get(fragment) {
                stack.extend(parents.iter().copied());
            }
        }

        related
    }
}

/// Depth-first walk over the fragments reachable from a set of spreads, yielding each
/// fragment name once.
struct FragmentClosure<'a> {
    graph: &'a DefinitionGraph,
    seen: HashSet<&'a str>,
    stack: Vec<&'a str>,
}

impl<'a> Iterator for FragmentClosure<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let fragment = self.stack.pop()?;

            if !self.seen.insert(fragment) {
                continue;
            }

            if let Some(definition) = self.graph.fragments.get(fragment) {
                self.stack.extend(definition.spreads.iter().map(String::as_str));
            }

            return Some(fragment);
        }
    }
}
