//! The layer selector state machine.
//!
//! A [`LayerSelector`] sits wherever a layer may be followed by another one.
//! It offers the kinds the grammar allows for its [`ParentContext`], keeps the
//! chosen child, and stands in for that child everywhere a [`LayerNode`] is
//! expected.
//!
//! Construction is two-phase. [`LayerSelector::new`] only records the title,
//! context and eligible kinds; the child layers (which own selectors of their
//! own) are built on the first [`step`](LayerNode::step). Building eagerly
//! would construct the full grammar tree at once, so only selectors the
//! operator actually opens ever get children.
//!
//! ```text
//!                 step (first)
//! Uninitialized ───────────────▶ Idle ◀──────────┐
//!                                 │   choose None │
//!                    choose child │               │
//!                                 ▼               │
//!                            ChildActive ─────────┘
//! ```

use crate::encoder::Encoder;
use crate::grammar::{LayerKind, LayerSet, ParentContext, grammar};
use crate::layer::{Flow, LayerNode, SessionRef};
use crate::menu::{self, Console, Menu, MenuItem};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Label of the synthetic "no layer" item
pub const NONE_LABEL: &str = "None";
/// Label of the synthetic back-navigation item
pub const BACK_LABEL: &str = "Back";
/// Hint shown next to the selected child
pub const SELECTED_HINT: &str = "...";

/// Observable selector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Children not built yet
    Uninitialized,
    /// No child selected
    Idle,
    /// A child is selected
    ChildActive,
}

/// One offered child and its menu item.
struct Entry {
    kind: LayerKind,
    item: MenuItem,
    node: Box<dyn LayerNode>,
}

/// A layer node that offers a grammar-restricted choice of child layers.
pub struct LayerSelector {
    title: String,
    context: ParentContext,
    eligible: LayerSet,
    session: SessionRef,
    entries: Vec<Entry>,
    none_item: MenuItem,
    back_item: MenuItem,
    selected: Option<usize>,
    /// Control currently rests with the selected child
    delegated: bool,
    initialized: bool,
}

impl LayerSelector {
    /// Create an empty selector shell for `context`.
    ///
    /// No child layer is constructed until the first step.
    pub fn new(title: impl Into<String>, context: ParentContext, session: SessionRef) -> Self {
        Self {
            title: title.into(),
            context,
            eligible: grammar(context),
            session,
            entries: Vec::new(),
            none_item: MenuItem::new(NONE_LABEL),
            back_item: MenuItem::new(BACK_LABEL),
            selected: None,
            delegated: false,
            initialized: false,
        }
    }

    /// Get the menu title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the grammar context
    #[must_use]
    pub fn context(&self) -> ParentContext {
        self.context
    }

    /// Kinds this selector offers
    #[must_use]
    pub fn eligible(&self) -> LayerSet {
        self.eligible
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SelectorState {
        if !self.initialized {
            SelectorState::Uninitialized
        } else if self.selected.is_some() {
            SelectorState::ChildActive
        } else {
            SelectorState::Idle
        }
    }

    /// Kind of the selected child
    #[must_use]
    pub fn selected_kind(&self) -> Option<LayerKind> {
        self.selected.map(|index| self.entries[index].kind)
    }

    /// Number of constructed children
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.entries.len()
    }

    /// Constructed child of `kind`, whether selected or not.
    #[must_use]
    pub fn child(&self, kind: LayerKind) -> Option<&dyn LayerNode> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.node.as_ref())
    }

    /// Items in menu order: None, children, Back.
    ///
    /// Empty until the selector has been stepped once.
    #[must_use]
    pub fn items(&self) -> Vec<&MenuItem> {
        if !self.initialized {
            return Vec::new();
        }

        let mut items = Vec::with_capacity(self.entries.len() + 2);
        items.push(&self.none_item);
        items.extend(self.entries.iter().map(|entry| &entry.item));
        items.push(&self.back_item);
        items
    }

    /// Whether control currently rests with the selected child.
    #[must_use]
    pub fn is_delegated(&self) -> bool {
        self.delegated
    }

    fn initialize(&mut self) {
        let session = Rc::clone(&self.session);
        self.entries = self
            .eligible
            .iter()
            .map(|kind| {
                let node = session.create(kind);
                let item = MenuItem::new(node.name());
                Entry { kind, item, node }
            })
            .collect();
        self.initialized = true;

        debug!(
            title = %self.title,
            context = %self.context,
            children = self.entries.len(),
            "layer selector initialized"
        );
    }

    /// Bring item flags and hints in line with the current selection.
    fn sync_items(&mut self) {
        self.none_item.set_selected(false);
        for entry in &mut self.entries {
            entry.item.set_selected(false);
            entry.item.set_hint("");
        }

        match self.selected {
            Some(index) => {
                let item = &mut self.entries[index].item;
                item.set_selected(true);
                item.set_hint(SELECTED_HINT);
            }
            None => {
                self.select_all(false);
                self.none_item.set_selected(true);
            }
        }
    }

    fn select_all(&mut self, selected: bool) {
        let items = std::iter::once(&mut self.none_item)
            .chain(self.entries.iter_mut().map(|entry| &mut entry.item))
            .chain(std::iter::once(&mut self.back_item));
        menu::select_all(items, selected);
    }

    fn back_index(&self) -> usize {
        self.entries.len() + 1
    }

    fn prompt(&self, console: &mut dyn Console) -> Option<usize> {
        let mut menu = Menu::new(&self.title);
        menu.add_item(&self.none_item);
        for entry in &self.entries {
            menu.add_item(&entry.item);
        }
        menu.add_item(&self.back_item);

        let default = self.selected.map(|index| index + 1);
        console.prompt(&menu, default)
    }

    fn choose(&mut self, index: usize) {
        let kind = self.entries[index].kind;

        if self.selected == Some(index) {
            debug!(title = %self.title, layer = %kind, "resuming selected layer");
            self.entries[index].node.on_resume();
        } else {
            debug!(title = %self.title, layer = %kind, "selecting layer");
            self.selected = Some(index);
            self.entries[index].node.on_select();
        }

        self.delegated = true;
    }

    fn step_child(&mut self, console: &mut dyn Console) -> Flow {
        let Some(index) = self.selected else {
            self.delegated = false;
            return Flow::Continue;
        };

        match self.entries[index].node.step(console) {
            Flow::Back => {
                // Leaving the child leaves this selector as well.
                self.delegated = false;
                Flow::Back
            }
            flow => flow,
        }
    }
}

impl LayerNode for LayerSelector {
    fn name(&self) -> String {
        match self.selected {
            Some(index) => self.entries[index].node.name(),
            None => NONE_LABEL.to_string(),
        }
    }

    fn encoder(&self) -> Option<&Encoder> {
        self.selected
            .and_then(|index| self.entries[index].node.encoder())
    }

    fn refresh_encoder(&mut self) {
        if let Some(index) = self.selected {
            self.entries[index].node.refresh_encoder();
        }
    }

    fn step(&mut self, console: &mut dyn Console) -> Flow {
        if self.delegated {
            return self.step_child(console);
        }

        if !self.initialized {
            self.initialize();
        }

        self.sync_items();

        let Some(choice) = self.prompt(console) else {
            trace!(title = %self.title, "prompt aborted");
            return Flow::Continue;
        };

        if choice == 0 {
            if let Some(kind) = self.selected_kind() {
                debug!(title = %self.title, layer = %kind, "clearing selection");
            }
            self.selected = None;
        } else if choice == self.back_index() {
            return Flow::Back;
        } else if choice <= self.entries.len() {
            self.choose(choice - 1);
        } else {
            warn!(title = %self.title, choice, "console returned an item outside the menu");
        }

        Flow::Continue
    }

    fn on_select(&mut self) {}

    fn on_resume(&mut self) {}
}

impl Drop for LayerSelector {
    fn drop(&mut self) {
        trace!(
            title = %self.title,
            children = self.entries.len(),
            "dropping layer selector"
        );
    }
}
