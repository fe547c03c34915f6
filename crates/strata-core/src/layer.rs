//! The configurable-layer contract and the session context shared by all
//! layers of one packet definition.

use crate::defaults::Defaults;
use crate::encoder::Encoder;
use crate::grammar::LayerKind;
use crate::layers::StandardLayers;
use crate::menu::Console;
use std::rc::Rc;

/// Outcome of one interactive step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep control at this node
    Continue,
    /// Hand control back to the owning parent
    Back,
    /// End the whole session
    Exit,
}

impl Flow {
    /// Whether the session should keep running.
    #[must_use]
    pub fn is_continue(self) -> bool {
        !matches!(self, Self::Exit)
    }
}

/// A configurable layer: either a leaf that encodes bytes or a selector of
/// further layers.
pub trait LayerNode {
    /// Human-readable identity; `"None"` when no concrete layer is selected.
    fn name(&self) -> String;

    /// The configured encoder, absent when nothing is selected at or below
    /// this node.
    fn encoder(&self) -> Option<&Encoder>;

    /// Rebuild the encoder from current parameters. No-op when there is
    /// nothing to encode.
    fn refresh_encoder(&mut self);

    /// Perform one unit of interactive work.
    fn step(&mut self, console: &mut dyn Console) -> Flow;

    /// Called once when the parent selector switches to this node.
    fn on_select(&mut self);

    /// Called when the parent selector is asked for this node while it is
    /// already selected.
    fn on_resume(&mut self);
}

/// Builds concrete layers for a selector.
pub trait LayerFactory {
    /// Create a layer of `kind` belonging to `session`.
    fn create(&self, kind: LayerKind, session: &SessionRef) -> Box<dyn LayerNode>;
}

/// Read-only context shared by every layer of one packet definition.
pub struct Session {
    defaults: Defaults,
    factory: Box<dyn LayerFactory>,
}

/// Shared handle to a [`Session`].
pub type SessionRef = Rc<Session>;

impl Session {
    /// Session building the standard protocol layers.
    #[must_use]
    pub fn new(defaults: Defaults) -> SessionRef {
        Self::with_factory(defaults, StandardLayers)
    }

    /// Session building layers through a custom factory.
    pub fn with_factory(defaults: Defaults, factory: impl LayerFactory + 'static) -> SessionRef {
        Rc::new(Self {
            defaults,
            factory: Box::new(factory),
        })
    }

    /// Field defaults for new layers
    #[must_use]
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Construct a layer of `kind`.
    #[must_use]
    pub fn create(self: &Rc<Self>, kind: LayerKind) -> Box<dyn LayerNode> {
        self.factory.create(kind, self)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
