//! IPv4 and IPv6 header parameters.

use super::{Field, Protocol, boxed, format_bool, parse_bool, parse_int, parse_number, parse_value};
use crate::defaults::Defaults;
use crate::encoder::{Encoder, Ipv4Packet, Ipv6Packet, MAX_FLOW_LABEL};
use crate::error::FieldError;
use crate::grammar::LayerKind;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Editable IPv4 header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Params {
    /// Source address
    pub src: Ipv4Addr,
    /// Destination address
    pub dst: Ipv4Addr,
    /// Type of service byte
    pub tos: u8,
    /// Identification
    pub identification: u16,
    /// Don't fragment flag
    pub dont_fragment: bool,
    /// Time to live
    pub ttl: u8,
    /// Fallback protocol number
    pub protocol: u8,
}

impl Protocol for Ipv4Params {
    const KIND: LayerKind = LayerKind::Ipv4Frame;

    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            src: defaults.src_ipv4,
            dst: defaults.dst_ipv4,
            tos: 0,
            identification: 0,
            dont_fragment: true,
            ttl: defaults.ttl,
            protocol: defaults.ip_protocol,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Source", self.src),
            Field::new("Destination", self.dst),
            Field::new("TOS", format!("{:#04x}", self.tos)),
            Field::new("Identification", self.identification),
            Field::new("Don't fragment", format_bool(self.dont_fragment)),
            Field::new("TTL", self.ttl),
            Field::new("Protocol", self.protocol),
        ]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 => self.src = parse_value("Source", input)?,
            1 => self.dst = parse_value("Destination", input)?,
            2 => self.tos = parse_int("TOS", input)?,
            3 => self.identification = parse_int("Identification", input)?,
            4 => self.dont_fragment = parse_bool("Don't fragment", input)?,
            5 => self.ttl = parse_int("TTL", input)?,
            6 => self.protocol = parse_int("Protocol", input)?,
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Ipv4(Ipv4Packet {
            src: self.src,
            dst: self.dst,
            tos: self.tos,
            identification: self.identification,
            dont_fragment: self.dont_fragment,
            ttl: self.ttl,
            protocol: self.protocol,
            payload: boxed(payload),
        })
    }

    fn derived(&self, payload: &Encoder) -> Vec<(usize, String)> {
        payload
            .ip_protocol()
            .map(|protocol| vec![(6, protocol.to_string())])
            .unwrap_or_default()
    }
}

/// Editable IPv6 header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Params {
    /// Source address
    pub src: Ipv6Addr,
    /// Destination address
    pub dst: Ipv6Addr,
    /// Traffic class
    pub traffic_class: u8,
    /// 20-bit flow label
    pub flow_label: u32,
    /// Hop limit
    pub hop_limit: u8,
    /// Fallback next header
    pub next_header: u8,
}

impl Protocol for Ipv6Params {
    const KIND: LayerKind = LayerKind::Ipv6Frame;

    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            src: defaults.src_ipv6,
            dst: defaults.dst_ipv6,
            traffic_class: 0,
            flow_label: 0,
            hop_limit: defaults.hop_limit,
            next_header: defaults.next_header,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Source", self.src),
            Field::new("Destination", self.dst),
            Field::new("Traffic class", format!("{:#04x}", self.traffic_class)),
            Field::new("Flow label", format!("{:#07x}", self.flow_label)),
            Field::new("Hop limit", self.hop_limit),
            Field::new("Next header", self.next_header),
        ]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 => self.src = parse_value("Source", input)?,
            1 => self.dst = parse_value("Destination", input)?,
            2 => self.traffic_class = parse_int("Traffic class", input)?,
            3 => {
                let label = parse_number("Flow label", input, u64::from(MAX_FLOW_LABEL))?;
                // parse_number already enforced the 20-bit bound
                self.flow_label = u32::try_from(label).unwrap_or(MAX_FLOW_LABEL);
            }
            4 => self.hop_limit = parse_int("Hop limit", input)?,
            5 => self.next_header = parse_int("Next header", input)?,
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Ipv6(Ipv6Packet {
            src: self.src,
            dst: self.dst,
            traffic_class: self.traffic_class,
            flow_label: self.flow_label,
            hop_limit: self.hop_limit,
            next_header: self.next_header,
            payload: boxed(payload),
        })
    }

    fn derived(&self, payload: &Encoder) -> Vec<(usize, String)> {
        payload
            .ip_protocol()
            .map(|protocol| vec![(5, protocol.to_string())])
            .unwrap_or_default()
    }
}
