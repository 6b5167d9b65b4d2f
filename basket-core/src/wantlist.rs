use serde::{Deserialize, Serialize};

use crate::error::WantListError;
use crate::types::{ItemName, Quantity, normalize_item_name};

/// One line of demand: an item and how many units are needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantEntry {
    pub name: ItemName,
    pub quantity: Quantity,
}

/// Requested items in order of first appearance. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantList {
    entries: Vec<WantEntry>,
}

impl WantList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `"<count> <name>"` lines; the count is optional and defaults to 1.
    pub fn parse(text: &str) -> Result<Self, WantListError> {
        let mut list = Self::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
            if line.is_empty() {
                continue;
            }

            let (quantity, name) = match line.split_once(' ') {
                Some((count, rest)) if count.chars().all(|c| c.is_ascii_digit()) => {
                    // Absurdly long counts saturate rather than fail.
                    let quantity = count.parse::<Quantity>().unwrap_or(Quantity::MAX);
                    (quantity, rest)
                }
                _ => (1, line.as_str()),
            };

            if quantity == 0 {
                return Err(WantListError::ZeroQuantity {
                    line: line_no + 1,
                    text: line.clone(),
                });
            }
            list.add(name, quantity);
        }
        Ok(list)
    }

    /// Add demand for an item, merging with an existing entry of the same name.
    pub fn add(&mut self, name: &str, quantity: Quantity) {
        if quantity == 0 {
            return;
        }
        let name = normalize_item_name(name);
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(WantEntry { name, quantity }),
        }
    }

    pub fn with(mut self, name: &str, quantity: Quantity) -> Self {
        self.add(name, quantity);
        self
    }

    pub fn entries(&self) -> &[WantEntry] {
        &self.entries
    }

    pub fn quantity(&self, name: &str) -> Option<Quantity> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.quantity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }
}

impl FromIterator<(ItemName, Quantity)> for WantList {
    fn from_iter<I: IntoIterator<Item = (ItemName, Quantity)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (name, quantity) in iter {
            list.add(&name, quantity);
        }
        list
    }
}
