//! Named finite-domain state lists
//!
//! Two flavors: *exclusive* lists hold exactly one active label from a fixed
//! domain (or none yet), *flags* lists hold an independent set of active
//! labels. Entering a label outside the domain is reported as an error, not
//! silently dropped.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// List error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ListError {
    #[error("list `{0}` is already defined")]
    DuplicateList(String),
    #[error("unknown list `{0}`")]
    UnknownList(String),
    #[error("label `{label}` is outside the domain of list `{list}`")]
    LabelOutsideDomain { list: String, label: String },
    #[error("list `{list}` is not a {expected} list")]
    KindMismatch {
        list: String,
        expected: &'static str,
    },
}

/// Exclusive or flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Exclusive,
    Flags,
}

/// A named finite-domain state machine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedList {
    pub name: String,
    pub kind: ListKind,
    /// Fixed label domain, in declaration order
    pub domain: Vec<String>,
    /// Active label (exclusive lists)
    pub current: Option<String>,
    /// Active labels (flags lists), in activation order
    pub active: IndexSet<String>,
}

impl NamedList {
    fn in_domain(&self, label: &str) -> bool {
        self.domain.iter().any(|l| l == label)
    }
}

/// Owns every named list of a container
#[derive(Debug, Default)]
pub struct ListManager {
    lists: IndexMap<String, NamedList>,
}

impl ListManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Define an exclusive list; `initial`, when given, must be in the domain
    pub fn define_exclusive(
        &mut self,
        name: impl Into<String>,
        domain: Vec<String>,
        initial: Option<&str>,
    ) -> Result<(), ListError> {
        let name = name.into();
        if self.lists.contains_key(&name) {
            return Err(ListError::DuplicateList(name));
        }
        if let Some(initial) = initial {
            if !domain.iter().any(|l| l == initial) {
                return Err(ListError::LabelOutsideDomain {
                    list: name,
                    label: initial.to_string(),
                });
            }
        }
        debug!("defined exclusive list `{}` ({} labels)", name, domain.len());
        self.lists.insert(
            name.clone(),
            NamedList {
                name,
                kind: ListKind::Exclusive,
                domain,
                current: initial.map(str::to_string),
                active: IndexSet::new(),
            },
        );
        Ok(())
    }

    /// Define a flags list; every initially-active label must be in the domain
    pub fn define_flags(
        &mut self,
        name: impl Into<String>,
        domain: Vec<String>,
        initial_active: &[&str],
    ) -> Result<(), ListError> {
        let name = name.into();
        if self.lists.contains_key(&name) {
            return Err(ListError::DuplicateList(name));
        }
        for label in initial_active {
            if !domain.iter().any(|l| l == label) {
                return Err(ListError::LabelOutsideDomain {
                    list: name,
                    label: label.to_string(),
                });
            }
        }
        debug!("defined flags list `{}` ({} labels)", name, domain.len());
        self.lists.insert(
            name.clone(),
            NamedList {
                name,
                kind: ListKind::Flags,
                domain,
                current: None,
                active: initial_active.iter().map(|l| l.to_string()).collect(),
            },
        );
        Ok(())
    }

    /// Atomically replace the active label of an exclusive list
    pub fn enter(&mut self, list: &str, label: &str) -> Result<(), ListError> {
        let entry = self
            .lists
            .get_mut(list)
            .ok_or_else(|| ListError::UnknownList(list.to_string()))?;
        if entry.kind != ListKind::Exclusive {
            return Err(ListError::KindMismatch {
                list: list.to_string(),
                expected: "exclusive",
            });
        }
        if !entry.in_domain(label) {
            return Err(ListError::LabelOutsideDomain {
                list: list.to_string(),
                label: label.to_string(),
            });
        }
        debug!("list `{}` enters `{}`", list, label);
        entry.current = Some(label.to_string());
        Ok(())
    }

    /// Activate a label of a flags list
    pub fn add(&mut self, list: &str, label: &str) -> Result<(), ListError> {
        let entry = self.flags_entry(list)?;
        if !entry.in_domain(label) {
            return Err(ListError::LabelOutsideDomain {
                list: list.to_string(),
                label: label.to_string(),
            });
        }
        entry.active.insert(label.to_string());
        Ok(())
    }

    /// Deactivate a label of a flags list
    pub fn remove(&mut self, list: &str, label: &str) -> Result<(), ListError> {
        let entry = self.flags_entry(list)?;
        if !entry.in_domain(label) {
            return Err(ListError::LabelOutsideDomain {
                list: list.to_string(),
                label: label.to_string(),
            });
        }
        entry.active.shift_remove(label);
        Ok(())
    }

    fn flags_entry(&mut self, list: &str) -> Result<&mut NamedList, ListError> {
        let entry = self
            .lists
            .get_mut(list)
            .ok_or_else(|| ListError::UnknownList(list.to_string()))?;
        if entry.kind != ListKind::Flags {
            return Err(ListError::KindMismatch {
                list: list.to_string(),
                expected: "flags",
            });
        }
        Ok(entry)
    }

    /// Whether `label` is active: the current label (exclusive) or a member
    /// of the active set (flags). O(1) for flags lists.
    pub fn contains(&self, list: &str, label: &str) -> bool {
        match self.lists.get(list) {
            Some(entry) => match entry.kind {
                ListKind::Exclusive => entry.current.as_deref() == Some(label),
                ListKind::Flags => entry.active.contains(label),
            },
            None => false,
        }
    }

    /// Current label of an exclusive list
    pub fn value(&self, list: &str) -> Option<&str> {
        self.lists.get(list)?.current.as_deref()
    }

    /// Active labels of a flags list, in activation order
    pub fn active(&self, list: &str) -> Vec<&str> {
        match self.lists.get(list) {
            Some(entry) => entry.active.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Get a list by name
    pub fn list(&self, name: &str) -> Option<&NamedList> {
        self.lists.get(name)
    }

    /// All lists, in definition order
    pub fn all_lists(&self) -> Vec<&NamedList> {
        self.lists.values().collect()
    }

    /// Remove every list
    pub fn clear(&mut self) {
        self.lists.clear();
    }

    pub(crate) fn export(&self) -> Vec<NamedList> {
        self.lists.values().cloned().collect()
    }

    pub(crate) fn import(lists: Vec<NamedList>) -> Self {
        Self {
            lists: lists.into_iter().map(|l| (l.name.clone(), l)).collect(),
        }
    }
}
