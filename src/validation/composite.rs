//! Composition of prioritized validators.

use std::cmp::Reverse;

use crate::graph::Node;
use crate::intent::Intent;

use super::{Validation, ValidationCx, Validator};

/// Runs its children in ascending priority order and combines their
/// verdicts.
///
/// Combination rules, applied while scanning:
/// - `Invalid` and `Ignore` short-circuit and are returned as-is;
/// - `Valid` is absorbed;
/// - `Redirect`s are merged: the union of prefix intents (de-duplicated by
///   structural identity, insertion order preserved) with the most recent
///   original. A completed scan with an accumulated redirect returns the
///   merge, its chain re-sorted by descending priority; otherwise `Valid`.
pub struct CompositeValidator {
    children: Vec<Box<dyn Validator>>,
}

impl CompositeValidator {
    pub fn new(mut children: Vec<Box<dyn Validator>>) -> Self {
        // Stable sort: registration order breaks priority ties.
        children.sort_by_key(|validator| validator.priority());
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Evaluate the chain for one intent against one node.
    ///
    /// A child returning an error is treated as `Invalid("validator
    /// error")`, which short-circuits like any other rejection.
    pub async fn evaluate(&self, intent: &Intent, node: &Node, cx: &ValidationCx) -> Validation {
        let mut merged: Option<(Box<Intent>, Vec<Intent>)> = None;

        for validator in &self.children {
            let verdict = match validator.validate(intent, node, cx).await {
                Ok(verdict) => verdict,
                Err(err) => {
                    tracing::warn!(
                        validator = validator.name(),
                        intent = intent.label(),
                        error = %err,
                        "validator failed; treating as invalid"
                    );
                    Validation::Invalid("validator error".to_string())
                }
            };

            match verdict {
                Validation::Invalid(message) => return Validation::Invalid(message),
                Validation::Ignore => return Validation::Ignore,
                Validation::Valid => {}
                Validation::Redirect { original, chain } => {
                    let (merged_original, merged_chain) =
                        merged.get_or_insert_with(|| (original.clone(), Vec::new()));
                    *merged_original = original;
                    for prefix in chain {
                        if !merged_chain.contains(&prefix) {
                            merged_chain.push(prefix);
                        }
                    }
                }
            }
        }

        match merged {
            Some((original, mut chain)) => {
                chain.sort_by_key(|prefix| Reverse(prefix.priority()));
                Validation::Redirect { original, chain }
            }
            None => Validation::Valid,
        }
    }
}
