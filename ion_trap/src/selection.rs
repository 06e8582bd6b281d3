//! Selection of up to two ions awaiting a pulse or entanglement

use crate::ion::IonId;

/// Most ions that can be selected at once
pub const MAX_SELECTED: usize = 2;

/// Outcome of toggling an ion's membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Set already full; nothing changed
    Rejected,
}

/// Set of selected ion ids, kept sorted, never larger than [`MAX_SELECTED`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<IonId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: IonId) -> Toggle {
        match self.ids.binary_search(&id) {
            Ok(index) => {
                self.ids.remove(index);
                Toggle::Removed
            }
            Err(_) if self.ids.len() >= MAX_SELECTED => Toggle::Rejected,
            Err(index) => {
                self.ids.insert(index, id);
                Toggle::Added
            }
        }
    }

    /// Remove a member, returns whether it was present
    pub fn remove(&mut self, id: IonId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(index) => {
                self.ids.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: IonId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Members in ascending order
    pub fn ids(&self) -> &[IonId] {
        &self.ids
    }

    /// The two members when the set is full
    pub fn pair(&self) -> Option<(IonId, IonId)> {
        match self.ids.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    /// "0, 3" style listing, or "None"
    pub fn label(&self) -> String {
        if self.ids.is_empty() {
            return "None".to_string();
        }
        self.ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
