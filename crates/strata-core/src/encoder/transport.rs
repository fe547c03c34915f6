//! TCP and UDP headers.

use super::field::Field;
use super::{Encoder, Envelope, checksum, emit_payload, ip_protocol, len_u16};
use byteorder::{ByteOrder, NetworkEndian};
use std::fmt;
use std::str::FromStr;

mod tcp {
    use super::Field;

    pub(super) const SRC_PORT: Field = 0..2;
    pub(super) const DST_PORT: Field = 2..4;
    pub(super) const SEQ_NUM: Field = 4..8;
    pub(super) const ACK_NUM: Field = 8..12;
    pub(super) const DATA_OFF: usize = 12;
    pub(super) const FLAGS: usize = 13;
    pub(super) const WIN_SIZE: Field = 14..16;
    pub(super) const CHECKSUM: Field = 16..18;
    pub(super) const URGENT: Field = 18..20;
}

mod udp {
    use super::Field;

    pub(super) const SRC_PORT: Field = 0..2;
    pub(super) const DST_PORT: Field = 2..4;
    pub(super) const LENGTH: Field = 4..6;
    pub(super) const CHECKSUM: Field = 6..8;
}

/// TCP header length without options
pub const TCP_HEADER_LEN: usize = tcp::URGENT.end;
/// UDP header length
pub const UDP_HEADER_LEN: usize = udp::CHECKSUM.end;

/// TCP control flags bitmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags(u8);

impl TcpFlags {
    /// No more data from sender
    pub const FIN: u8 = 0b0000_0001;
    /// Synchronize sequence numbers
    pub const SYN: u8 = 0b0000_0010;
    /// Reset the connection
    pub const RST: u8 = 0b0000_0100;
    /// Push function
    pub const PSH: u8 = 0b0000_1000;
    /// Acknowledgment field significant
    pub const ACK: u8 = 0b0001_0000;
    /// Urgent pointer field significant
    pub const URG: u8 = 0b0010_0000;
    /// ECN echo
    pub const ECE: u8 = 0b0100_0000;
    /// Congestion window reduced
    pub const CWR: u8 = 0b1000_0000;

    // Letter per bit, least significant first.
    const LETTERS: [(char, u8); 8] = [
        ('F', Self::FIN),
        ('S', Self::SYN),
        ('R', Self::RST),
        ('P', Self::PSH),
        ('A', Self::ACK),
        ('U', Self::URG),
        ('E', Self::ECE),
        ('C', Self::CWR),
    ];

    /// Create flags from a raw byte
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Add SYN flag
    #[must_use]
    pub fn with_syn(mut self) -> Self {
        self.0 |= Self::SYN;
        self
    }

    /// Add ACK flag
    #[must_use]
    pub fn with_ack(mut self) -> Self {
        self.0 |= Self::ACK;
        self
    }

    /// Check if SYN is set
    #[must_use]
    pub fn is_syn(&self) -> bool {
        self.0 & Self::SYN != 0
    }

    /// Check if ACK is set
    #[must_use]
    pub fn is_ack(&self) -> bool {
        self.0 & Self::ACK != 0
    }

    /// Get raw byte value
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("-");
        }
        for (letter, bit) in Self::LETTERS {
            if self.0 & bit != 0 {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Error parsing TCP flag letters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFlagsError(pub char);

impl fmt::Display for ParseFlagsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown flag '{}', expected letters from FSRPAUEC", self.0)
    }
}

impl std::error::Error for ParseFlagsError {}

impl FromStr for TcpFlags {
    type Err = ParseFlagsError;

    /// Parse letters such as `"SA"`; `"-"` or an empty string clears all flags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = 0;
        for c in s.trim().chars().filter(|c| *c != '-') {
            let upper = c.to_ascii_uppercase();
            let (_, bit) = Self::LETTERS
                .iter()
                .find(|(letter, _)| *letter == upper)
                .ok_or(ParseFlagsError(c))?;
            bits |= bit;
        }
        Ok(Self(bits))
    }
}

/// TCP segment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TcpSegment {
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
    /// Attached payload
    pub payload: Option<Box<Encoder>>,
}

impl TcpSegment {
    pub(crate) fn emit(&self, envelope: &Envelope) -> Vec<u8> {
        let payload = emit_payload(self.payload.as_deref(), &Envelope::Bare);

        let mut buf = vec![0u8; TCP_HEADER_LEN];
        NetworkEndian::write_u16(&mut buf[tcp::SRC_PORT], self.src_port);
        NetworkEndian::write_u16(&mut buf[tcp::DST_PORT], self.dst_port);
        NetworkEndian::write_u32(&mut buf[tcp::SEQ_NUM], self.seq_number);
        NetworkEndian::write_u32(&mut buf[tcp::ACK_NUM], self.ack_number);
        buf[tcp::DATA_OFF] = ((TCP_HEADER_LEN / 4) as u8) << 4;
        buf[tcp::FLAGS] = self.flags.as_u8();
        NetworkEndian::write_u16(&mut buf[tcp::WIN_SIZE], self.window);
        NetworkEndian::write_u16(&mut buf[tcp::URGENT], self.urgent);
        buf.extend_from_slice(&payload);

        let length = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let sum = !checksum::combine(&[
            checksum::pseudo_header(envelope, ip_protocol::TCP, length),
            checksum::data(&buf),
        ]);
        NetworkEndian::write_u16(&mut buf[tcp::CHECKSUM], sum);
        buf
    }
}

/// UDP datagram parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UdpDatagram {
    /// Source port
    pub src_port: u16,
    /// Destination port
    pub dst_port: u16,
    /// Attached payload
    pub payload: Option<Box<Encoder>>,
}

impl UdpDatagram {
    pub(crate) fn emit(&self, envelope: &Envelope) -> Vec<u8> {
        let payload = emit_payload(self.payload.as_deref(), &Envelope::Bare);

        let mut buf = vec![0u8; UDP_HEADER_LEN];
        NetworkEndian::write_u16(&mut buf[udp::SRC_PORT], self.src_port);
        NetworkEndian::write_u16(&mut buf[udp::DST_PORT], self.dst_port);
        NetworkEndian::write_u16(&mut buf[udp::LENGTH], len_u16(UDP_HEADER_LEN + payload.len()));
        buf.extend_from_slice(&payload);

        // Without an IP envelope the checksum is left unused (zero).
        if *envelope != Envelope::Bare {
            let length = u32::try_from(buf.len()).unwrap_or(u32::MAX);
            let sum = match !checksum::combine(&[
                checksum::pseudo_header(envelope, ip_protocol::UDP, length),
                checksum::data(&buf),
            ]) {
                // A computed zero is transmitted as all ones.
                0 => 0xffff,
                sum => sum,
            };
            NetworkEndian::write_u16(&mut buf[udp::CHECKSUM], sum);
        }
        buf
    }
}
