//! Table card
//!
//! Per-table UI unit. A card never writes to the store itself: it keeps the
//! not-yet-saved selection while its dialog is open and hands save/clear
//! requests back as [`CardIntent`]s for the event loop to dispatch.

use shared::TableNumber;

/// Dialog state; the selection exists only while the dialog is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogState {
    #[default]
    Closed,
    Open {
        selection: Vec<String>,
        /// Positions each deselected item held, for putting it back in place
        removed: Vec<(String, Vec<usize>)>,
    },
}

/// Store operation requested by a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardIntent {
    Save { index: usize, items: Vec<String> },
    Clear { index: usize },
}

#[derive(Debug, Clone)]
pub struct TableCard {
    index: usize,
    dialog: DialogState,
}

impl TableCard {
    /// Card for the table at 0-based `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            dialog: DialogState::Closed,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn table_number(&self) -> TableNumber {
        TableNumber::from_index(self.index)
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn is_open(&self) -> bool {
        matches!(self.dialog, DialogState::Open { .. })
    }

    /// Transient selection, if the dialog is open
    pub fn selection(&self) -> Option<&[String]> {
        match &self.dialog {
            DialogState::Open { selection, .. } => Some(selection),
            DialogState::Closed => None,
        }
    }

    pub fn is_selected(&self, item: &str) -> bool {
        self.selection()
            .is_some_and(|s| s.iter().any(|i| i == item))
    }

    /// "Add Order": open the dialog seeded with the committed order
    pub fn open(&mut self, committed: &[String]) {
        self.dialog = DialogState::Open {
            selection: committed.to_vec(),
            removed: Vec::new(),
        };
    }

    /// Add `item` if absent, otherwise remove every copy of it.
    ///
    /// An item deselected earlier in the same dialog session goes back to
    /// the positions it held, so toggling twice leaves the selection as it
    /// was. Other items are appended. No-op while the dialog is closed.
    pub fn toggle(&mut self, item: &str) {
        let DialogState::Open { selection, removed } = &mut self.dialog else {
            return;
        };

        let positions: Vec<usize> = selection
            .iter()
            .enumerate()
            .filter(|(_, i)| *i == item)
            .map(|(pos, _)| pos)
            .collect();

        if !positions.is_empty() {
            selection.retain(|i| i != item);
            removed.retain(|(name, _)| name != item);
            removed.push((item.to_string(), positions));
            return;
        }

        match removed.iter().position(|(name, _)| name == item) {
            Some(slot) => {
                let (name, positions) = removed.swap_remove(slot);
                // ascending, so each position is already valid when reached
                for pos in positions {
                    selection.insert(pos.min(selection.len()), name.clone());
                }
            }
            None => selection.push(item.to_string()),
        }
    }

    /// "Save": close the dialog and request saving the selection
    pub fn confirm(&mut self) -> Option<CardIntent> {
        match std::mem::take(&mut self.dialog) {
            DialogState::Open { selection, .. } => Some(CardIntent::Save {
                index: self.index,
                items: selection,
            }),
            DialogState::Closed => None,
        }
    }

    /// "Cancel": drop the selection, committed state untouched
    pub fn cancel(&mut self) {
        self.dialog = DialogState::Closed;
    }

    /// "Clear": request clearing the table and drop any transient selection
    pub fn clear(&mut self) -> CardIntent {
        self.dialog = DialogState::Closed;
        CardIntent::Clear { index: self.index }
    }

    pub fn title(&self) -> String {
        format!("Table {}", self.table_number())
    }

    /// One-line description of a committed order
    pub fn summary(orders: &[String]) -> String {
        if orders.is_empty() {
            "No orders yet".to_string()
        } else {
            format!("Order: {}", orders.join(", "))
        }
    }
}
