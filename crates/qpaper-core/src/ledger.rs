//! Section-exclusive assignment of questions to paper parts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::QuestionId;

/// One of the two paper divisions a question can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    PartA,
    PartB,
}

impl Section {
    pub fn other(self) -> Section {
        match self {
            Section::PartA => Section::PartB,
            Section::PartB => Section::PartA,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::PartA => write!(f, "Part A"),
            Section::PartB => write!(f, "Part B"),
        }
    }
}

/// Maps each selected question to exactly one [`Section`].
///
/// Because every ID maps to a single tag, a question can never sit in both
/// parts. The ledger does not check IDs against the question pool, so
/// selections made under one filter survive a later filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionLedger {
    entries: BTreeMap<QuestionId, Section>,
}

impl SelectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `id` in `section`.
    ///
    /// Deselects it if it is already there, otherwise assigns it to
    /// `section`, moving it out of the other part if needed. Returns where
    /// the question ends up.
    pub fn toggle(&mut self, id: QuestionId, section: Section) -> Option<Section> {
        match self.entries.get(&id) {
            Some(current) if *current == section => {
                self.entries.remove(&id);
                debug!(%id, %section, "deselected question");
                None
            }
            Some(current) => {
                debug!(%id, from = %current, to = %section, "moved question");
                self.entries.insert(id, section);
                Some(section)
            }
            None => {
                debug!(%id, %section, "selected question");
                self.entries.insert(id, section);
                Some(section)
            }
        }
    }

    pub fn is_selected(&self, id: QuestionId, section: Section) -> bool {
        self.entries.get(&id) == Some(&section)
    }

    pub fn section_of(&self, id: QuestionId) -> Option<Section> {
        self.entries.get(&id).copied()
    }

    /// IDs assigned to `section`, in ascending order.
    pub fn ids_in(&self, section: Section) -> impl Iterator<Item = QuestionId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, s)| **s == section)
            .map(|(id, _)| *id)
    }

    pub fn count_in(&self, section: Section) -> usize {
        self.ids_in(section).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, Section)> + '_ {
        self.entries.iter().map(|(id, s)| (*id, *s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
