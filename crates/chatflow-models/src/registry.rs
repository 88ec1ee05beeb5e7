//! Named collection of process model views
//!
//! Entries keep insertion order. A registry holds at most one placeholder,
//! a named slot without a view that stands for a model still being set up;
//! storing a view under the placeholder's name fills the slot in place.

use std::sync::Arc;

use chatflow_core::{Error, RegistryError, Result};
use tracing::{debug, warn};

use crate::artifact::{Diagram, ModelArtifact};
use crate::config::{MissingPolicy, OnError, RenderOptions};
use crate::view::ProcessModelView;

/// Conventional name of the "create a new model" placeholder
pub const PLACEHOLDER_NAME: &str = "+ New model";

/// Value stored under a registry name
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    Placeholder,
    View(ProcessModelView),
}

impl RegistryEntry {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    pub fn as_view(&self) -> Option<&ProcessModelView> {
        match self {
            Self::View(view) => Some(view),
            Self::Placeholder => None,
        }
    }

    pub fn as_view_mut(&mut self) -> Option<&mut ProcessModelView> {
        match self {
            Self::View(view) => Some(view),
            Self::Placeholder => None,
        }
    }

    pub fn into_view(self) -> Option<ProcessModelView> {
        match self {
            Self::View(view) => Some(view),
            Self::Placeholder => None,
        }
    }
}

impl From<ProcessModelView> for RegistryEntry {
    fn from(view: ProcessModelView) -> Self {
        Self::View(view)
    }
}

/// Where an accepted insertion lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Append,
    /// Fill the placeholder at this position
    Fill(usize),
}

fn validate_name(name: &str) -> std::result::Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::invalid_name(name, "name must not be empty"));
    }
    Ok(())
}

/// Check an insertion against `layout`, a `(name, is_placeholder)` list
fn plan_insert(
    layout: &[(String, bool)],
    name: &str,
    placeholder: bool,
) -> std::result::Result<Slot, RegistryError> {
    validate_name(name)?;
    if let Some(position) = layout.iter().position(|(existing, _)| existing == name) {
        return if layout[position].1 && !placeholder {
            Ok(Slot::Fill(position))
        } else {
            Err(RegistryError::invalid_name(name, "name already registered"))
        };
    }
    if placeholder && layout.iter().any(|(_, is_placeholder)| *is_placeholder) {
        return Err(RegistryError::invalid_name(
            name,
            "registry already holds a placeholder",
        ));
    }
    Ok(Slot::Append)
}

/// Ordered `name -> view | placeholder` mapping
#[derive(Debug, Clone, Default)]
pub struct ProcessModelRegistry {
    entries: Vec<(String, RegistryEntry)>,
}

impl ProcessModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the [`PLACEHOLDER_NAME`] placeholder
    pub fn with_placeholder() -> Self {
        Self {
            entries: vec![(PLACEHOLDER_NAME.to_string(), RegistryEntry::Placeholder)],
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == name)
    }

    fn position_or_unknown(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()).into())
    }

    fn layout(&self) -> Vec<(String, bool)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.is_placeholder()))
            .collect()
    }

    fn insert_at(&mut self, slot: Slot, name: String, entry: RegistryEntry) {
        match slot {
            Slot::Append => self.entries.push((name, entry)),
            Slot::Fill(position) => self.entries[position].1 = entry,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Result<&RegistryEntry> {
        let position = self.position_or_unknown(name)?;
        Ok(&self.entries[position].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut RegistryEntry> {
        let position = self.position_or_unknown(name)?;
        Ok(&mut self.entries[position].1)
    }

    /// Mutable access to the view under `name`; a placeholder is an error
    pub fn view_mut(&mut self, name: &str) -> Result<&mut ProcessModelView> {
        self.get_mut(name)?
            .as_view_mut()
            .ok_or_else(|| RegistryError::Placeholder(name.to_string()).into())
    }

    /// Store a view under a new name, or fill the placeholder of that name.
    ///
    /// An existing view under `name` is an [`RegistryError::InvalidName`].
    pub fn set(&mut self, name: impl Into<String>, view: ProcessModelView) -> Result<()> {
        let name = name.into();
        let slot = plan_insert(&self.layout(), &name, false)?;
        debug!(name = %name, ?slot, "registry set");
        self.insert_at(slot, name, RegistryEntry::View(view));
        Ok(())
    }

    /// Store a view under `name`, overwriting any entry; returns the old one
    pub fn replace(
        &mut self,
        name: impl Into<String>,
        view: ProcessModelView,
    ) -> Result<Option<RegistryEntry>> {
        let name = name.into();
        validate_name(&name)?;
        match self.position(&name) {
            Some(position) => Ok(Some(std::mem::replace(
                &mut self.entries[position].1,
                RegistryEntry::View(view),
            ))),
            None => {
                self.entries.push((name, RegistryEntry::View(view)));
                Ok(None)
            }
        }
    }

    /// Add a placeholder; fails if one already exists or `name` is taken
    pub fn add_placeholder(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let slot = plan_insert(&self.layout(), &name, true)?;
        self.insert_at(slot, name, RegistryEntry::Placeholder);
        Ok(())
    }

    /// Insert several entries, all or nothing.
    ///
    /// Every entry is checked against the registry plus the entries before
    /// it in the batch; the first violation is returned and nothing changes.
    pub fn add_many<I, S>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, RegistryEntry)>,
        S: Into<String>,
    {
        let mut layout = self.layout();
        let mut planned = Vec::new();
        for (name, entry) in entries {
            let name = name.into();
            let placeholder = entry.is_placeholder();
            let slot = plan_insert(&layout, &name, placeholder)?;
            match slot {
                Slot::Append => layout.push((name.clone(), placeholder)),
                Slot::Fill(position) => layout[position].1 = false,
            }
            planned.push((slot, name, entry));
        }

        debug!(count = planned.len(), "registry add_many");
        for (slot, name, entry) in planned {
            self.insert_at(slot, name, entry);
        }
        Ok(())
    }

    /// Remove and return the entry under `name`
    pub fn delete(&mut self, name: &str) -> Result<RegistryEntry> {
        let position = self.position_or_unknown(name)?;
        Ok(self.entries.remove(position).1)
    }

    /// Rename an entry in place, keeping its position.
    ///
    /// With `overwrite`, an entry already named `new` is dropped first.
    pub fn rename(&mut self, old: &str, new: &str, overwrite: bool) -> Result<()> {
        self.position_or_unknown(old)?;
        if old == new {
            return Ok(());
        }
        validate_name(new)?;
        if let Some(taken) = self.position(new) {
            if !overwrite {
                return Err(RegistryError::invalid_name(new, "name already registered").into());
            }
            self.entries.remove(taken);
        }
        let position = self.position_or_unknown(old)?;
        self.entries[position].0 = new.to_string();
        Ok(())
    }

    /// Look up several names; absent names are handled by `missing`
    pub fn get_many(
        &self,
        names: &[&str],
        missing: MissingPolicy,
    ) -> Result<Vec<Option<&RegistryEntry>>> {
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            match (self.position(name), missing) {
                (Some(position), _) => found.push(Some(&self.entries[position].1)),
                (None, MissingPolicy::Error) => {
                    return Err(RegistryError::UnknownName(name.to_string()).into())
                }
                (None, MissingPolicy::Skip) => {}
                (None, MissingPolicy::Null) => found.push(None),
            }
        }
        Ok(found)
    }

    /// Resolve `names` (all entries when `None`) to positions
    fn selection(&self, names: Option<&[&str]>) -> Result<Vec<usize>> {
        match names {
            None => Ok((0..self.entries.len()).collect()),
            Some(names) => names
                .iter()
                .map(|name| self.position_or_unknown(name))
                .collect(),
        }
    }

    fn run_batch<T, F>(
        &mut self,
        names: Option<&[&str]>,
        on_error: OnError,
        mut op: F,
    ) -> Result<Vec<(String, Option<Arc<T>>)>>
    where
        F: FnMut(&mut ProcessModelView) -> Result<Arc<T>>,
    {
        let positions = self.selection(names)?;
        let mut results = Vec::with_capacity(positions.len());
        for position in positions {
            let (name, entry) = &mut self.entries[position];
            let outcome = match entry {
                RegistryEntry::Placeholder => Err(RegistryError::Placeholder(name.clone())),
                RegistryEntry::View(view) => op(view).map_err(|source| RegistryError::Entry {
                    name: name.clone(),
                    source: Box::new(source),
                }),
            };
            match (outcome, on_error) {
                (Ok(value), _) => results.push((name.clone(), Some(value))),
                (Err(err), OnError::Raise) => return Err(Error::Registry(err)),
                (Err(err), OnError::Skip) => {
                    warn!(name = %name, error = %err, "entry skipped");
                }
                (Err(err), OnError::Null) => {
                    warn!(name = %name, error = %err, "entry has no value");
                    results.push((name.clone(), None));
                }
            }
        }
        Ok(results)
    }

    /// Compute the artifact of every selected entry, in selection order
    pub fn compute_map(
        &mut self,
        names: Option<&[&str]>,
        on_error: OnError,
    ) -> Result<Vec<(String, Option<Arc<ModelArtifact>>)>> {
        self.run_batch(names, on_error, ProcessModelView::compute)
    }

    /// Render every selected entry with the same options
    pub fn to_graphviz_map(
        &mut self,
        names: Option<&[&str]>,
        options: &RenderOptions,
        on_error: OnError,
    ) -> Result<Vec<(String, Option<Arc<Diagram>>)>> {
        self.run_batch(names, on_error, |view| view.to_graphviz(options))
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> + '_ {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_placeholder(&self) -> bool {
        self.entries.iter().any(|(_, entry)| entry.is_placeholder())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
