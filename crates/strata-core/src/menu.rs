//! Menu items and the console collaborator.
//!
//! Layers never talk to a terminal directly. They describe what to show with
//! a [`Menu`] of [`MenuItem`]s and hand it to a [`Console`], which blocks until
//! the operator answers.

/// A labelled entry in a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    label: String,
    selected: bool,
    hint: String,
}

impl MenuItem {
    /// Create an unselected item without hint
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selected: false,
            hint: String::new(),
        }
    }

    /// Create an unselected item with a hint
    pub fn with_hint(label: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            selected: false,
            hint: hint.into(),
        }
    }

    /// Get the label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check if the item is marked selected
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Mark or unmark the item
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Get the hint shown next to the label
    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Replace the hint
    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = hint.into();
    }
}

/// A titled, ordered view over items owned elsewhere.
///
/// A menu is assembled right before a prompt and borrows its items, so item
/// ownership stays with the layer that created them.
#[derive(Debug)]
pub struct Menu<'a> {
    title: &'a str,
    items: Vec<&'a MenuItem>,
}

impl<'a> Menu<'a> {
    /// Create an empty menu
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            items: Vec::new(),
        }
    }

    /// Append an item, returning its position.
    pub fn add_item(&mut self, item: &'a MenuItem) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Get the title
    #[must_use]
    pub fn title(&self) -> &str {
        self.title
    }

    /// Items in display order
    #[must_use]
    pub fn items(&self) -> &[&'a MenuItem] {
        &self.items
    }

    /// Item at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a MenuItem> {
        self.items.get(index).copied()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the menu has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the first item marked selected.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.items.iter().position(|item| item.is_selected())
    }
}

/// Set every item's selected flag.
pub fn select_all<'a>(items: impl IntoIterator<Item = &'a mut MenuItem>, selected: bool) {
    for item in items {
        item.set_selected(selected);
    }
}

/// Blocking operator interaction.
///
/// Implementations return `None` from [`Console::prompt`] and
/// [`Console::read_value`] when the operator aborts; callers treat that as a
/// no-op.
pub trait Console {
    /// Present `menu` and return the position of the chosen item.
    fn prompt(&mut self, menu: &Menu<'_>, default: Option<usize>) -> Option<usize>;

    /// Ask for a new value of a field currently set to `current`.
    fn read_value(&mut self, label: &str, current: &str) -> Option<String>;

    /// Show an informational message.
    fn notify(&mut self, message: &str);

    /// Whether input is exhausted and no further answer can arrive.
    fn is_closed(&self) -> bool {
        false
    }
}
