//! Raw text payload.

use super::{Field, Protocol};
use crate::defaults::Defaults;
use crate::encoder::{Encoder, TextBuffer};
use crate::error::FieldError;
use crate::grammar::LayerKind;

/// Longest text, in bytes, that still fits a 16-bit IPv4 total length under
/// the deepest header chain (IPv4 and TCP, 20 bytes each).
pub const MAX_TEXT_LEN: usize = u16::MAX as usize - 20 - 20;

/// Text emitted verbatim as UTF-8
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextParams {
    /// Payload text
    pub text: String,
}

impl Protocol for TextParams {
    const KIND: LayerKind = LayerKind::TextBuffer;

    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            text: defaults.text.clone(),
        }
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("Text", &self.text)]
    }

    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        match index {
            0 if input.len() > MAX_TEXT_LEN => {
                return Err(FieldError::OutOfRange {
                    field: "Text",
                    value: input.len() as u64,
                    max: MAX_TEXT_LEN as u64,
                });
            }
            0 => self.text = input.to_string(),
            _ => return Err(FieldError::UnknownField(index)),
        }
        Ok(())
    }

    fn build(&self, _payload: Option<Encoder>) -> Encoder {
        Encoder::Text(TextBuffer {
            text: self.text.clone(),
        })
    }
}
