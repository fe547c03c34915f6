//! # Strata Core
//!
//! Composition engine for the Strata interactive packet composer.
//!
//! A packet is built as a chain of protocol layers. At every level a
//! [`LayerSelector`] offers the layers the grammar allows beneath its parent,
//! the operator picks one, configures it, and descends into its payload.
//!
//! This crate provides:
//! - The layering grammar and menu model
//! - The layer selector state machine
//! - Protocol layers and their wire encoders
//! - Hex dump and pcap export of the composed packet
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      LayerSelector (Root)                        │
//! │   (None | Ethernet-Frame | Text-Buffer | Back)                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                      LeafLayer<EthernetParams>                   │
//! │   (fields, then Payload -> LayerSelector (Ethernet))            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                      LeafLayer<Ipv4Params> ...                   │
//! │   (each leaf owns the selector for its own payload)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The selected chain yields a nested [`Encoder`], which serializes the whole
//! packet with derived lengths, type fields and checksums.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod defaults;
pub mod encoder;
pub mod error;
pub mod export;
pub mod grammar;
pub mod layer;
pub mod layers;
pub mod menu;
pub mod selector;

#[cfg(test)]
mod testing;

pub use address::MacAddress;
pub use defaults::Defaults;
pub use encoder::{Encoder, Envelope};
pub use error::{Error, FieldError, Result};
pub use export::{LinkType, PcapWriter, format_hexdump, save_packet};
pub use grammar::{LayerKind, LayerSet, ParentContext, grammar};
pub use layer::{Flow, LayerFactory, LayerNode, Session, SessionRef};
pub use layers::{LeafLayer, Protocol, StandardLayers};
pub use menu::{Console, Menu, MenuItem};
pub use selector::{LayerSelector, SelectorState};
