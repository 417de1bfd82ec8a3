//! County selection state
//!
//! Each map has its own county multiselect. Rather than mutating flags on a
//! session, the current selection and the triggering action go in and the next
//! selection comes out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::pipeline::Metric;

/// A set of selected county display names, kept sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<String>);

/// User action on a county multiselect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionAction {
    /// Select every available county
    SelectAll,
    /// Clear the selection
    UnselectAll,
    /// Replace the selection with the given counties
    Replace { counties: Vec<String> },
    /// Add a county if absent, remove it if present
    Toggle { county: String },
}

impl Selection {
    /// Nothing selected
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every option selected
    pub fn all(options: &[String]) -> Self {
        options.iter().cloned().collect()
    }

    pub fn contains(&self, county: &str) -> bool {
        self.0.contains(county)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Compute the selection that follows `action`.
    ///
    /// Names that are not among `options` are discarded.
    pub fn apply(&self, action: &SelectionAction, options: &[String]) -> Selection {
        let next: Selection = match action {
            SelectionAction::SelectAll => return Selection::all(options),
            SelectionAction::UnselectAll => return Selection::empty(),
            SelectionAction::Replace { counties } => counties.iter().cloned().collect(),
            SelectionAction::Toggle { county } => {
                let mut set = self.0.clone();
                if !set.remove(county) {
                    set.insert(county.clone());
                }
                Selection(set)
            }
        };
        next.restrict_to(options)
    }

    /// Drop names that are not among `options`
    pub fn restrict_to(self, options: &[String]) -> Selection {
        self.0
            .into_iter()
            .filter(|name| options.contains(name))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Selection(iter.into_iter().map(Into::into).collect())
    }
}

/// Independent selections for the income and unemployment maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSelection {
    pub income: Selection,
    pub unemployment: Selection,
}

impl DashboardSelection {
    /// Initial state: every county selected on both maps
    pub fn initial(options: &[String]) -> Self {
        Self {
            income: Selection::all(options),
            unemployment: Selection::all(options),
        }
    }

    /// Selection for one map
    pub fn for_metric(&self, metric: Metric) -> &Selection {
        match metric {
            Metric::MedianIncome => &self.income,
            Metric::UnemploymentRate => &self.unemployment,
        }
    }

    /// Apply an action to one map, leaving the other untouched
    pub fn apply(&self, metric: Metric, action: &SelectionAction, options: &[String]) -> Self {
        let mut next = self.clone();
        match metric {
            Metric::MedianIncome => next.income = self.income.apply(action, options),
            Metric::UnemploymentRate => next.unemployment = self.unemployment.apply(action, options),
        }
        next
    }
}
