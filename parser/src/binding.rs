//! Per-parse binding snapshot.
//!
//! Bound values are kept here, keyed by the ids of the definitions they
//! belong to, so the command tree itself is never written during a parse.

use std::collections::BTreeMap;

use argtree_core::{ArgumentId, OptionId};
use serde::Serialize;

/// Everything bound to one option during a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionBinding {
    /// Number of times the option was matched, with or without a value.
    pub occurrences: usize,
    /// Values in command-line order.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Bindings {
    options: BTreeMap<OptionId, OptionBinding>,
    arguments: BTreeMap<ArgumentId, Vec<String>>,
}

impl Bindings {
    pub(crate) fn record_option(&mut self, id: OptionId, value: Option<String>) {
        let binding = self.options.entry(id).or_default();
        binding.occurrences += 1;
        binding.values.extend(value);
    }

    pub(crate) fn push_argument(&mut self, id: ArgumentId, value: String) {
        self.arguments.entry(id).or_default().push(value);
    }

    pub(crate) fn option(&self, id: OptionId) -> Option<&OptionBinding> {
        self.options.get(&id)
    }

    pub(crate) fn argument(&self, id: ArgumentId) -> Option<&[String]> {
        self.arguments.get(&id).map(Vec::as_slice)
    }

    pub(crate) fn options(&self) -> impl Iterator<Item = (OptionId, &OptionBinding)> {
        self.options.iter().map(|(id, b)| (*id, b))
    }

    pub(crate) fn arguments(&self) -> impl Iterator<Item = (ArgumentId, &[String])> {
        self.arguments.iter().map(|(id, v)| (*id, v.as_slice()))
    }
}
