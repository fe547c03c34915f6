//! TCP and UDP header parameters.

use super::{Field, Protocol, boxed, parse_int, parse_value};
use crate::defaults::Defaults;
use crate::encoder::{Encoder, TcpFlags, TcpSegment, UdpDatagram};
use crate::error::FieldError;
use crate::grammar::LayerKind;

/// Editable TCP header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpParams {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Sequence number
    pub seq_number: u32,
    /// Acknowledgment number
    pub ack_number: u32,
    /// Control flags
    pub flags: TcpFlags,
    /// Receive window
    pub window: u16,
    /// Urgent pointer
    pub urgent: u16,
}

impl Protocol for TcpParams {
    const KIND: LayerKind = LayerKind::TcpFrame;

    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            src_port: defaults.src_port,
            dst_port: defaults.dst_port,
            seq_number: 0,
            ack_number: 0,
            flags: TcpFlags::default().with_syn(),
            window: defaults.tcp_window,
            urgent: 0,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Source port", self.src_port),
            Field::new("Destination port", self.dst_port),
            Field::new("Sequence", self.seq_number),
            Field::new("Acknowledgment", self.ack_number),
            Field::new("Flags", self.flags),
            Field::new("Window", self.window),
            Field::new("Urgent pointer", self.urgent),
        ]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 => self.src_port = parse_int("Source port", input)?,
            1 => self.dst_port = parse_int("Destination port", input)?,
            2 => self.seq_number = parse_int("Sequence", input)?,
            3 => self.ack_number = parse_int("Acknowledgment", input)?,
            4 => self.flags = parse_value("Flags", input)?,
            5 => self.window = parse_int("Window", input)?,
            6 => self.urgent = parse_int("Urgent pointer", input)?,
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Tcp(TcpSegment {
            src_port: self.src_port,
            dst_port: self.dst_port,
            seq_number: self.seq_number,
            ack_number: self.ack_number,
            flags: self.flags,
            window: self.window,
            urgent: self.urgent,
            payload: boxed(payload),
        })
    }
}

/// Editable UDP header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpParams {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
}

impl Protocol for UdpParams {
    const KIND: LayerKind = LayerKind::UdpFrame;

    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            src_port: defaults.src_port,
            dst_port: defaults.dst_port,
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Source port", self.src_port),
            Field::new("Destination port", self.dst_port),
        ]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 => self.src_port = parse_int("Source port", input)?,
            1 => self.dst_port = parse_int("Destination port", input)?,
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Udp(UdpDatagram {
            src_port: self.src_port,
            dst_port: self.dst_port,
            payload: boxed(payload),
        })
    }
}
