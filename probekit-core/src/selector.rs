// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Runtime selector.
//!
//! Turns a list of names or ids, typically read from configuration or the
//! environment, into a live subset of a statically typed bundle. Entries that
//! cannot be honored are dropped and returned alongside the bundle; selection
//! itself never fails. The selector touches no shared state, so independent
//! threads may select concurrently.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bundle::{Activation, Bundle};
use crate::config::ProbeConfig;
use crate::error::{Rejection, SelectionError};
use crate::registry::ComponentId;
use crate::type_list::ComponentList;

/// One requested component, by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionEntry {
    Id(usize),
    Name(String),
}

impl SelectionEntry {
    /// Integer tokens are ids, anything else is a name.
    ///
    /// A digit-only token too large for `usize` stays a `Name`; `resolve`
    /// reports it as an id out of range.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.parse::<usize>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(token.to_string()),
        }
    }

    /// Resolve against the registry, without regard to any bundle.
    pub fn resolve(&self) -> Result<ComponentId, SelectionError> {
        let id = match self {
            Self::Id(index) => {
                ComponentId::from_index(*index).ok_or(SelectionError::UnknownId { id: *index })?
            }
            Self::Name(name) => match ComponentId::from_name(name) {
                Some(id) => id,
                None if is_digits(name) => {
                    return Err(SelectionError::IdOutOfRange {
                        token: name.clone(),
                    });
                }
                None => {
                    return Err(SelectionError::UnknownName { name: name.clone() });
                }
            },
        };

        if id.is_internal() {
            return Err(SelectionError::Internal { name: id.name() });
        }
        if !id.available() {
            return Err(SelectionError::Unavailable { name: id.name() });
        }
        Ok(id)
    }
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

impl std::fmt::Display for SelectionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for SelectionEntry {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

impl From<ComponentId> for SelectionEntry {
    fn from(id: ComponentId) -> Self {
        Self::Id(id.index())
    }
}

/// An ordered list of requested components. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionRequest {
    entries: Vec<SelectionEntry>,
}

impl SelectionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a selection string such as `"wall_clock, peak_rss;3"`.
    ///
    /// Tokens are separated by commas, semicolons, colons or whitespace.
    pub fn parse(input: &str) -> Self {
        input
            .split(|c: char| c == ',' || c == ';' || c == ':' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(SelectionEntry::parse)
            .collect()
    }

    /// Read and parse an environment variable. Unset means `None`.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().map(|value| Self::parse(&value))
    }

    pub fn push(&mut self, entry: impl Into<SelectionEntry>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for SelectionRequest {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<E: Into<SelectionEntry>> FromIterator<E> for SelectionRequest {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for SelectionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.entries.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// A populated bundle plus the entries that were dropped.
pub struct Selection<L: ComponentList> {
    pub bundle: Bundle<L>,
    pub rejected: Vec<Rejection>,
}

impl<L: ComponentList> std::fmt::Debug for Selection<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("bundle", &self.bundle)
            .field("rejected", &self.rejected)
            .finish()
    }
}

impl<L: ComponentList> Selection<L> {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Builds bundles from runtime selections.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    config: &'a ProbeConfig,
}

impl<'a> Selector<'a> {
    pub fn new(config: &'a ProbeConfig) -> Self {
        Self { config }
    }

    /// Selector over the process-wide configuration.
    pub fn global() -> Selector<'static> {
        Selector::new(ProbeConfig::global())
    }

    /// Activate the requested members of a fresh `Bundle<L>`.
    ///
    /// The returned bundle is constructed: requested members hold an
    /// instance, all others are absent.
    pub fn select<L: ComponentList>(
        &self,
        label: impl Into<String>,
        request: &SelectionRequest,
    ) -> Selection<L> {
        let mut bundle = Bundle::<L>::empty(label);
        let mut rejected = Vec::new();
        // ids already tried, successfully or not
        let mut attempted: u128 = 0;

        for entry in request.entries() {
            match self.activate(&mut bundle, entry, &mut attempted) {
                Ok(Some(Activation::Activated)) => {
                    tracing::debug!(label = bundle.label(), entry = %entry, "Component activated");
                }
                Ok(Some(Activation::AlreadyActive)) | Ok(None) => {
                    tracing::debug!(
                        label = bundle.label(),
                        entry = %entry,
                        "Duplicate selection ignored"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        label = bundle.label(),
                        entry = %entry,
                        error = %error,
                        "Selection entry rejected"
                    );
                    rejected.push(Rejection {
                        entry: entry.clone(),
                        error,
                    });
                }
            }
        }

        bundle.set_constructed();
        Selection { bundle, rejected }
    }

    /// `Ok(None)` when `id` was already attempted in this selection.
    fn activate<L: ComponentList>(
        &self,
        bundle: &mut Bundle<L>,
        entry: &SelectionEntry,
        attempted: &mut u128,
    ) -> Result<Option<Activation>, SelectionError> {
        let id = entry.resolve()?;
        if !L::contains(id) {
            return Err(SelectionError::NotInBundle { name: id.name() });
        }
        let bit = 1u128 << id.index();
        if *attempted & bit != 0 {
            return Ok(None);
        }
        *attempted |= bit;
        bundle.activate(id, self.config).map(Some)
    }
}
