use std::collections::BTreeSet;

use graphql_parser::query::{Definition, Document, OperationDefinition, Selection, SelectionSet};

use crate::{Error, Result};

/// The kind of an operation definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OperationKind {
    /// A query, including the `{ ... }` shorthand.
    Query,
    /// A mutation.
    Mutation,
    /// A subscription.
    Subscription,
}

/// The definitions found in one document, printed and ready to be stored.
#[derive(Debug, Default)]
pub(crate) struct ParsedDocument {
    pub operations: Vec<ParsedDefinition>,
    pub fragments: Vec<ParsedDefinition>,
}

#[derive(Debug)]
pub(crate) struct ParsedDefinition {
    pub name: String,
    /// The canonical printed form of the definition.
    pub text: String,
    /// Fragments spread directly by this definition.
    pub spreads: BTreeSet<String>,
}

/// Parses a document, failing before anything is returned if any operation in it
/// is anonymous.
pub(crate) fn parse(source: &str) -> Result<ParsedDocument> {
    let document = graphql_parser::parse_query::<&str>(source).map_err(|err| Error::Syntax(err.to_string()))?;
    let mut parsed = ParsedDocument::default();

    for definition in &document.definitions {
        match definition {
            Definition::Operation(operation) => {
                let (kind, name, selection_set) = match operation {
                    OperationDefinition::Query(query) => (OperationKind::Query, query.name, &query.selection_set),
                    OperationDefinition::Mutation(mutation) => {
                        (OperationKind::Mutation, mutation.name, &mutation.selection_set)
                    }
                    OperationDefinition::Subscription(subscription) => {
                        (OperationKind::Subscription, subscription.name, &subscription.selection_set)
                    }
                    OperationDefinition::SelectionSet(selection_set) => (OperationKind::Query, None, selection_set),
                };

                let Some(name) = name else {
                    return Err(Error::MissingName {
                        kind,
                        operation: print(definition),
                    });
                };

                parsed.operations.push(ParsedDefinition {
                    name: name.to_owned(),
                    text: print(definition),
                    spreads: fragment_spreads(selection_set),
                });
            }
            Definition::Fragment(fragment) => {
                parsed.fragments.push(ParsedDefinition {
                    name: fragment.name.to_owned(),
                    text: print(definition),
                    spreads: fragment_spreads(&fragment.selection_set),
                });
            }
        }
    }

    Ok(parsed)
}

/// Pretty prints a single definition, without the trailing newline.
fn print<'a>(definition: &Definition<'a, &'a str>) -> String {
    let document = Document {
        definitions: vec![definition.clone()],
    };

    let mut rendered = document.to_string();
    rendered.truncate(rendered.trim_end().len());
    rendered
}

/// Names of every fragment spread anywhere in the selection set, including under
/// fields and inline fragments. Spreads inside the spread fragments are not followed.
fn fragment_spreads<'a>(selection_set: &SelectionSet<'a, &'a str>) -> BTreeSet<String> {
    let mut spreads = BTreeSet::new();
    let mut stack = vec![selection_set];

    while let Some(selection_set) = stack.pop() {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => stack.push(&field.selection_set),
                Selection::InlineFragment(fragment) => stack.push(&fragment.selection_set),
                Selection::FragmentSpread(spread) => {
                    spreads.insert(spread.fragment_name.to_owned());
                }
            }
        }
    }

    spreads
}
