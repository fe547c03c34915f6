//! ICMP message and echo body parameters for both IP versions.

use super::{Field, Protocol, boxed, parse_int};
use crate::defaults::Defaults;
use crate::encoder::{EchoPayload, Encoder, IcmpMessage, icmp_echo};
use crate::error::FieldError;
use crate::grammar::LayerKind;

fn message_fields(icmp_type: u8, code: u8) -> Vec<Field> {
    vec![Field::new("Type", icmp_type), Field::new("Code", code)]
}

fn derived_message_fields(payload: &Encoder) -> Vec<(usize, String)> {
    payload
        .icmp_type()
        .map(|(icmp_type, code)| vec![(0, icmp_type.to_string()), (1, code.to_string())])
        .unwrap_or_default()
}

fn set_message_field(
    icmp_type: &mut u8,
    code: &mut u8,
    index: usize,
    input: &str,
) -> Result<(), FieldError> {
    match index {
        0 => *icmp_type = parse_int("Type", input)?,
        1 => *code = parse_int("Code", input)?,
        _ => return Err(FieldError::UnknownField(index)),
    }
    Ok(())
}

/// ICMPv4 header fields; an echo payload overrides type and code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icmpv4Params {
    /// Message type
    pub icmp_type: u8,
    /// Message code
    pub code: u8,
}

impl Protocol for Icmpv4Params {
    const KIND: LayerKind = LayerKind::Icmpv4Frame;

    fn from_defaults(_defaults: &Defaults) -> Self {
        let (icmp_type, code) = icmp_echo::V4;
        Self { icmp_type, code }
    }

    fn fields(&self) -> Vec<Field> {
        message_fields(self.icmp_type, self.code)
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        set_message_field(&mut self.icmp_type, &mut self.code, index, input)
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Icmpv4(IcmpMessage {
            icmp_type: self.icmp_type,
            code: self.code,
            payload: boxed(payload),
        })
    }

    fn derived(&self, payload: &Encoder) -> Vec<(usize, String)> {
        derived_message_fields(payload)
    }
}

/// ICMPv6 header fields; an echo payload overrides type and code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icmpv6Params {
    /// Message type
    pub icmp_type: u8,
    /// Message code
    pub code: u8,
}

impl Protocol for Icmpv6Params {
    const KIND: LayerKind = LayerKind::Icmpv6Frame;

    fn from_defaults(_defaults: &Defaults) -> Self {
        let (icmp_type, code) = icmp_echo::V6;
        Self { icmp_type, code }
    }

    fn fields(&self) -> Vec<Field> {
        message_fields(self.icmp_type, self.code)
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        set_message_field(&mut self.icmp_type, &mut self.code, index, input)
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Icmpv6(IcmpMessage {
            icmp_type: self.icmp_type,
            code: self.code,
            payload: boxed(payload),
        })
    }

    fn derived(&self, payload: &Encoder) -> Vec<(usize, String)> {
        derived_message_fields(payload)
    }
}

/// Echo identifier and sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoParams {
    /// Identifier
    pub identifier: u16,
    /// Sequence number
    pub sequence: u16,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            identifier: 1,
            sequence: 1,
        }
    }
}

impl EchoParams {
    fn fields(self) -> Vec<Field> {
        vec![
            Field::new("Identifier", format!("{:#06x}", self.identifier)),
            Field::new("Sequence", self.sequence),
        ]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 => self.identifier = parse_int("Identifier", input)?,
            1 => self.sequence = parse_int("Sequence", input)?,
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn payload(self, data: Option<Encoder>) -> EchoPayload {
        EchoPayload {
            identifier: self.identifier,
            sequence: self.sequence,
            payload: boxed(data),
        }
    }
}

/// Echo body carried by an ICMPv4 message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Icmpv4EchoParams(pub EchoParams);

impl Protocol for Icmpv4EchoParams {
    const KIND: LayerKind = LayerKind::Icmpv4EchoPayload;

    fn from_defaults(_defaults: &Defaults) -> Self {
        Self::default()
    }

    fn fields(&self) -> Vec<Field> {
        self.0.fields()
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        self.0.set_field(index, input)
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Icmpv4Echo(self.0.payload(payload))
    }
}

/// Echo body carried by an ICMPv6 message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Icmpv6EchoParams(pub EchoParams);

impl Protocol for Icmpv6EchoParams {
    const KIND: LayerKind = LayerKind::Icmpv6EchoPayload;

    fn from_defaults(_defaults: &Defaults) -> Self {
        Self::default()
    }

    fn fields(&self) -> Vec<Field> {
        self.0.fields()
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        self.0.set_field(index, input)
    }

    fn build(&self, payload: Option<Encoder>) -> Encoder {
        Encoder::Icmpv6Echo(self.0.payload(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_defaults_are_echo_requests() {
        let defaults = Defaults::default();
        assert_eq!(Icmpv4Params::from_defaults(&defaults).icmp_type, 8);
        assert_eq!(Icmpv6Params::from_defaults(&defaults).icmp_type, 128);
    }

    #[test]
    fn test_message_set_fields() {
        let mut params = Icmpv4Params::from_defaults(&Defaults::default());
        params.set_field(0, "3").unwrap();
        params.set_field(1, "13").unwrap();
        assert_eq!((params.icmp_type, params.code), (3, 13));
        assert!(params.set_field(1, "-1").is_err());
        assert_eq!(params.set_field(2, "0"), Err(FieldError::UnknownField(2)));
    }

    #[test]
    fn test_echo_overrides_type() {
        let mut message = Icmpv4Params::from_defaults(&Defaults::default());
        message.set_field(0, "0").unwrap();

        let echo = Icmpv4EchoParams(EchoParams {
            identifier: 0xbeef,
            sequence: 2,
        });
        let bytes = message.build(Some(echo.build(None))).encode();
        assert_eq!(bytes[0], 8);
        assert_eq!(&bytes[4..8], &[0xbe, 0xef, 0x00, 0x02]);

        let bare = message.build(None).encode();
        assert_eq!(bare[0], 0);

        let derived = message.derived(&echo.build(None));
        assert_eq!(derived, [(0, "8".to_string()), (1, "0".to_string())]);
    }

    #[test]
    fn test_echo_fields() {
        let mut echo = Icmpv6EchoParams::from_defaults(&Defaults::default());
        echo.set_field(0, "0x0a0b").unwrap();
        echo.set_field(1, "65535").unwrap();
        let fields = echo.fields();
        assert_eq!(fields[0].value, "0x0a0b");
        assert_eq!(fields[1].value, "65535");
        assert!(echo.set_field(1, "65536").is_err());
    }
}
