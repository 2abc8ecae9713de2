//! Named selections of categories, used to filter the document list.

use crate::category::CategoryId;
use crate::reconcile::{CategoryTable, FinalCategory};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the built-in preset selecting everything.
pub const ALL: &str = "(alle)";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    /// Selected categories. Empty selects all of them.
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl Preset {
    pub fn new(name: impl Into<String>, categories: Vec<CategoryId>) -> Self {
        Preset {
            name: name.into(),
            categories,
        }
    }

    pub fn all() -> Self {
        Preset::new(ALL, vec![])
    }

    pub fn selects_all(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.selects_all() || self.categories.contains(&id)
    }

    /// Rows of the table selected by this preset, in table order. IDs of
    /// categories that no longer exist are ignored.
    pub fn filter<'t>(&self, table: &'t CategoryTable) -> Vec<&'t FinalCategory> {
        table
            .rows()
            .iter()
            .filter(|category| self.contains(category.id))
            .collect()
    }
}

/// The preset list, [ALL] first and the rest sorted by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presets {
    presets: Vec<Preset>,
}

impl Presets {
    /// Builds the list from saved presets, which may come in any order.
    pub fn new(saved: Vec<Preset>) -> Self {
        let mut user: Vec<Preset> = saved.into_iter().filter(|p| p.name != ALL).collect();
        user.sort_by(|a, b| a.name.cmp(&b.name));
        let mut presets = Vec::with_capacity(user.len() + 1);
        presets.push(Preset::all());
        presets.append(&mut user);
        Presets { presets }
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Never true, [ALL] is always there.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    /// Inserts at the position that keeps user presets in name order and
    /// returns that position.
    pub fn insert(&mut self, preset: Preset) -> usize {
        let pos = 1 + self.presets[1..].partition_point(|p| p.name < preset.name);
        debug!(name = %preset.name, pos, "inserting preset");
        self.presets.insert(pos, preset);
        pos
    }

    pub fn set_categories(&mut self, index: usize, categories: Vec<CategoryId>) -> bool {
        match self.presets.get_mut(index) {
            Some(preset) if index > 0 => {
                preset.categories = categories;
                true
            }
            _ => false,
        }
    }

    /// Renames in place, the order is restored on the next load.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.presets.get_mut(index) {
            Some(preset) if index > 0 => {
                preset.name = name.into();
                true
            }
            _ => false,
        }
    }

    /// Removes a user preset. [ALL] cannot be removed.
    pub fn remove(&mut self, index: usize) -> Option<Preset> {
        if index == 0 || index >= self.presets.len() {
            return None;
        }
        Some(self.presets.remove(index))
    }

    /// The presets to persist: [ALL] and presets without a name are left out.
    pub fn to_saved(&self) -> Vec<Preset> {
        self.presets[1..]
            .iter()
            .filter(|preset| !preset.name.is_empty())
            .cloned()
            .collect()
    }
}

impl Default for Presets {
    fn default() -> Self {
        Presets::new(vec![])
    }
}
