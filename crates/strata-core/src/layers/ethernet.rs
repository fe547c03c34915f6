//! Ethernet II frame parameters.

use super::{Field, Protocol, boxed, parse_int, parse_value};
use crate::address::MacAddress;
use crate::defaults::Defaults;
use crate::encoder::{Encoder, EthernetFrame};
use crate::error::FieldError;
use crate::grammar::LayerKind;

/// Editable Ethernet header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetParams {
    /// Destination address
    pub dst: MacAddress,
    /// Source address
    pub src: MacAddress,
    /// Fallback EtherType
    pub ether_type: u16,
}

impl Protocol for EthernetParams {
    const KIND: LayerKind = LayerKind::EthernetFrame;

    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            dst: defaults.dst_mac,
            src: defaults.src_mac,
            ether_type: defaults.ether_type,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Destination", self.dst),
            Field::new("Source", self.src),
            Field::new("EtherType", format!("{:#06x}", self.ether_type)),
        ]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 => self.dst = parse_value("Destination", input)?,
            1 => self.src = parse_value("Source", input)?,
            2 => self.ether_type = parse_int("EtherType", input)?,
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Ethernet(EthernetFrame {
            dst: self.dst,
            src: self.src,
            ether_type: self.ether_type,
            payload: boxed(payload),
        })
    }

    fn derived(&self, payload: &Encoder) -> Vec<(usize, String)> {
        payload
            .ether_type()
            .map(|ether_type| vec![(2, format!("{ether_type:#06x}"))])
            .unwrap_or_default()
    }
}
