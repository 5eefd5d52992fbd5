//! Pre-game menu: an ordered list of labeled actions with a cursor.

use serde::{Deserialize, Serialize};

/// What happens when the cursor is moved past either end of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Stay on the first/last item.
    Clamp,
    /// Jump to the other end.
    #[default]
    Wrap,
}

#[derive(Clone, Debug)]
pub struct MenuItem<A> {
    pub label: String,
    pub action: A,
}

/// Selectable list of `(label, action)` pairs.
///
/// Actions are plain values handed back by [`Menu::activate_selected`]; the
/// owner decides what they do. All operations on an empty menu are no-ops.
#[derive(Clone, Debug)]
pub struct Menu<A> {
    items: Vec<MenuItem<A>>,
    selected_index: usize,
    mode: SelectionMode,
}

impl<A> Menu<A> {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            items: Vec::new(),
            selected_index: 0,
            mode,
        }
    }

    pub fn add_item(&mut self, label: impl Into<String>, action: A) {
        self.items.push(MenuItem {
            label: label.into(),
            action,
        });
    }

    /// Builder-style [`Menu::add_item`].
    #[must_use]
    pub fn with_item(mut self, label: impl Into<String>, action: A) -> Self {
        self.add_item(label, action);
        self
    }

    pub fn select_previous(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.selected_index = match (self.selected_index, self.mode) {
            (0, SelectionMode::Clamp) => 0,
            (0, SelectionMode::Wrap) => len - 1,
            (i, _) => i - 1,
        };
    }

    pub fn select_next(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let last = len - 1;
        self.selected_index = match self.mode {
            SelectionMode::Clamp => (self.selected_index + 1).min(last),
            SelectionMode::Wrap if self.selected_index >= last => 0,
            SelectionMode::Wrap => self.selected_index + 1,
        };
    }

    /// The action bound to the current item, or `None` for an empty menu.
    pub fn activate_selected(&self) -> Option<&A> {
        self.items.get(self.selected_index).map(|item| &item.action)
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.items
            .get(self.selected_index)
            .map(|item| item.label.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.label.as_str())
    }

    pub fn items(&self) -> &[MenuItem<A>] {
        &self.items
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<A> Default for Menu<A> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(mode: SelectionMode) -> Menu<u8> {
        Menu::new(mode)
            .with_item("Start Game", 1)
            .with_item("Options", 2)
            .with_item("Exit", 3)
    }

    #[test]
    fn clamp_stops_at_the_ends() {
        let mut m = menu(SelectionMode::Clamp);
        m.select_previous();
        assert_eq!(m.selected_index(), 0);
        m.select_next();
        m.select_next();
        m.select_next();
        assert_eq!(m.selected_index(), 2);
        assert_eq!(m.selected_label(), Some("Exit"));
    }

    #[test]
    fn wrap_cycles_around() {
        let mut m = menu(SelectionMode::Wrap);
        m.select_previous();
        assert_eq!(m.selected_index(), 2);
        m.select_next();
        assert_eq!(m.selected_index(), 0);
    }

    #[test]
    fn next_then_previous_round_trips() {
        for mode in [SelectionMode::Clamp, SelectionMode::Wrap] {
            let mut m = menu(mode);
            for start in 0..m.len() {
                while m.selected_index() != start {
                    m.select_next();
                }
                m.select_next();
                m.select_previous();
                // Clamp at the last item cannot move forward, so it steps back once.
                let expected = match mode {
                    SelectionMode::Clamp if start == m.len() - 1 => start - 1,
                    _ => start,
                };
                assert_eq!(m.selected_index(), expected, "mode {mode:?} start {start}");
            }
        }
    }

    #[test]
    fn single_item_round_trips_in_wrap_mode() {
        let mut m = Menu::new(SelectionMode::Wrap).with_item("Only", ());
        m.select_next();
        m.select_previous();
        assert_eq!(m.selected_index(), 0);
    }

    #[test]
    fn activate_returns_bound_action() {
        let mut m = menu(SelectionMode::Clamp);
        m.select_next();
        assert_eq!(m.activate_selected(), Some(&2));
    }

    #[test]
    fn empty_menu_is_a_safe_no_op() {
        let mut m: Menu<u8> = Menu::default();
        m.select_next();
        m.select_previous();
        assert_eq!(m.selected_index(), 0);
        assert_eq!(m.activate_selected(), None);
        assert!(m.is_empty());
    }
}
