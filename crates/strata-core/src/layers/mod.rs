//! Concrete protocol layers.
//!
//! Every concrete layer is a [`LeafLayer`] over a set of protocol parameters
//! implementing [`Protocol`]. The leaf presents one menu item per field, a
//! "Payload" item opening its own [`LayerSelector`] when the grammar gives the
//! layer a payload context, and "Back".

mod ethernet;
mod icmp;
mod ip;
mod text;
mod transport;

pub use ethernet::EthernetParams;
pub use icmp::{EchoParams, Icmpv4Params, Icmpv6Params, Icmpv4EchoParams, Icmpv6EchoParams};
pub use ip::{Ipv4Params, Ipv6Params};
pub use text::{MAX_TEXT_LEN, TextParams};
pub use transport::{TcpParams, UdpParams};

use crate::defaults::Defaults;
use crate::encoder::Encoder;
use crate::error::FieldError;
use crate::grammar::{LayerKind, ParentContext};
use crate::layer::{Flow, LayerFactory, LayerNode, SessionRef};
use crate::menu::{Console, Menu, MenuItem};
use crate::selector::{BACK_LABEL, LayerSelector};
use std::rc::Rc;
use std::str::FromStr;
use tracing::debug;

/// Label of the item that opens a layer's payload selector
pub const PAYLOAD_LABEL: &str = "Payload";

/// A displayed field: label and formatted current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field label
    pub label: &'static str,
    /// Current value as shown to the operator
    pub value: String,
}

impl Field {
    /// Create a field from anything displayable
    pub fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

/// Parameters and encoding of one protocol layer.
pub trait Protocol: 'static {
    /// Layer kind these parameters describe
    const KIND: LayerKind;

    /// Initial parameters
    fn from_defaults(defaults: &Defaults) -> Self;

    /// Editable fields in display order.
    fn fields(&self) -> Vec<Field>;

    /// Parse `input` into the field at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not parse for that field; the
    /// parameters are left unchanged.
    fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError>;

    /// Build the encoder with the payload's encoder attached.
    fn build(&self, payload: Option<Encoder>) -> Encoder;

    /// Values `payload` writes in place of edited fields, by field index.
    fn derived(&self, _payload: &Encoder) -> Vec<(usize, String)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Fields,
    Payload,
}

/// A layer that encodes bytes, generic over its protocol parameters.
pub struct LeafLayer<P: Protocol> {
    params: P,
    payload: Option<LayerSelector>,
    encoder: Option<Encoder>,
    focus: Focus,
}

impl<P: Protocol> LeafLayer<P> {
    /// Create the layer with default parameters.
    ///
    /// The payload selector is only a shell; its children are built when the
    /// operator first opens it.
    #[must_use]
    pub fn new(session: &SessionRef) -> Self {
        let payload = ParentContext::of(P::KIND).map(|context| {
            LayerSelector::new(
                format!("{} {PAYLOAD_LABEL}", P::KIND),
                context,
                Rc::clone(session),
            )
        });
        let params = P::from_defaults(session.defaults());
        let encoder = Some(params.build(None));

        Self {
            params,
            payload,
            encoder,
            focus: Focus::Fields,
        }
    }

    /// Current parameters
    #[must_use]
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Payload selector, if this layer carries one
    #[must_use]
    pub fn payload(&self) -> Option<&LayerSelector> {
        self.payload.as_ref()
    }

    /// Edit one field and refresh the encoder.
    ///
    /// # Errors
    ///
    /// Returns the parse error; the field keeps its old value.
    pub fn set_field(&mut self, index: usize, input: &str) -> Result<(), FieldError> {
        self.params.set_field(index, input)?;
        self.refresh_encoder();
        Ok(())
    }

    fn edit(&mut self, index: usize, field: &Field, console: &mut dyn Console) {
        let Some(input) = console.read_value(field.label, &field.value) else {
            return;
        };
        let input = input.trim();
        if input.is_empty() {
            return;
        }

        match self.set_field(index, input) {
            Ok(()) => debug!(layer = %P::KIND, field = field.label, value = input, "field updated"),
            Err(e) => console.notify(&e.to_string()),
        }
    }

    /// One item per field; a value overridden by the payload shows the value
    /// on the wire with the edited one as fallback.
    fn field_items(&self, fields: &[Field]) -> Vec<MenuItem> {
        let derived = self
            .payload
            .as_ref()
            .and_then(LayerNode::encoder)
            .map(|payload| self.params.derived(payload))
            .unwrap_or_default();

        fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                match derived.iter().find(|(i, value)| *i == index && *value != field.value) {
                    Some((_, value)) => MenuItem::with_hint(
                        field.label,
                        format!("{value} (fallback {})", field.value),
                    ),
                    None => MenuItem::with_hint(field.label, field.value.as_str()),
                }
            })
            .collect()
    }

    fn step_payload(&mut self, console: &mut dyn Console) -> Flow {
        let Some(selector) = self.payload.as_mut() else {
            self.focus = Focus::Fields;
            return Flow::Continue;
        };

        match selector.step(console) {
            Flow::Back => {
                self.focus = Focus::Fields;
                self.refresh_encoder();
                Flow::Continue
            }
            flow => flow,
        }
    }
}

impl<P: Protocol> LayerNode for LeafLayer<P> {
    fn name(&self) -> String {
        P::KIND.name().to_string()
    }

    fn encoder(&self) -> Option<&Encoder> {
        self.encoder.as_ref()
    }

    fn refresh_encoder(&mut self) {
        let inner = self.payload.as_mut().and_then(|selector| {
            selector.refresh_encoder();
            selector.encoder().cloned()
        });
        self.encoder = Some(self.params.build(inner));
    }

    fn step(&mut self, console: &mut dyn Console) -> Flow {
        if self.focus == Focus::Payload {
            return self.step_payload(console);
        }

        let fields = self.params.fields();
        let mut items = self.field_items(&fields);
        let payload_index = self.payload.as_ref().map(|selector| {
            items.push(MenuItem::with_hint(PAYLOAD_LABEL, selector.name()));
            items.len() - 1
        });
        items.push(MenuItem::new(BACK_LABEL));
        let back_index = items.len() - 1;

        let choice = {
            let mut menu = Menu::new(P::KIND.name());
            for item in &items {
                menu.add_item(item);
            }
            console.prompt(&menu, None)
        };

        match choice {
            None => Flow::Continue,
            Some(index) if index == back_index => Flow::Back,
            Some(index) if Some(index) == payload_index => {
                self.focus = Focus::Payload;
                Flow::Continue
            }
            Some(index) => {
                if let Some(field) = fields.get(index) {
                    self.edit(index, field, console);
                }
                Flow::Continue
            }
        }
    }

    fn on_select(&mut self) {
        self.focus = Focus::Fields;
        self.refresh_encoder();
        debug!(layer = %P::KIND, "layer activated");
    }

    fn on_resume(&mut self) {
        debug!(layer = %P::KIND, "layer resumed");
    }
}

/// Factory for the standard protocol layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLayers;

impl LayerFactory for StandardLayers {
    fn create(&self, kind: LayerKind, session: &SessionRef) -> Box<dyn LayerNode> {
        match kind {
            LayerKind::EthernetFrame => Box::new(LeafLayer::<EthernetParams>::new(session)),
            LayerKind::Ipv4Frame => Box::new(LeafLayer::<Ipv4Params>::new(session)),
            LayerKind::Ipv6Frame => Box::new(LeafLayer::<Ipv6Params>::new(session)),
            LayerKind::Icmpv4Frame => Box::new(LeafLayer::<Icmpv4Params>::new(session)),
            LayerKind::Icmpv6Frame => Box::new(LeafLayer::<Icmpv6Params>::new(session)),
            LayerKind::Icmpv4EchoPayload => Box::new(LeafLayer::<Icmpv4EchoParams>::new(session)),
            LayerKind::Icmpv6EchoPayload => Box::new(LeafLayer::<Icmpv6EchoParams>::new(session)),
            LayerKind::TcpFrame => Box::new(LeafLayer::<TcpParams>::new(session)),
            LayerKind::UdpFrame => Box::new(LeafLayer::<UdpParams>::new(session)),
            LayerKind::TextBuffer => Box::new(LeafLayer::<TextParams>::new(session)),
        }
    }
}

/// Parse a field value with its `FromStr` implementation.
pub(crate) fn parse_value<T>(field: &'static str, input: &str) -> Result<T, FieldError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    input.parse().map_err(|e: T::Err| FieldError::Invalid {
        field,
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer no larger than `max`.
pub(crate) fn parse_number(field: &'static str, input: &str, max: u64) -> Result<u64, FieldError> {
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };

    let value = parsed.map_err(|e| FieldError::Invalid {
        field,
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    if value > max {
        return Err(FieldError::OutOfRange { field, value, max });
    }
    Ok(value)
}

/// Parse an integer field of type `T`.
pub(crate) fn parse_int<T>(field: &'static str, input: &str) -> Result<T, FieldError>
where
    T: TryFrom<u64> + Into<u64> + Bounded,
{
    let value = parse_number(field, input, T::MAX.into())?;
    T::try_from(value).map_err(|_| FieldError::OutOfRange {
        field,
        value,
        max: T::MAX.into(),
    })
}

/// Integer types with a known maximum.
pub(crate) trait Bounded: Copy {
    const MAX: Self;
}

impl Bounded for u8 {
    const MAX: Self = u8::MAX;
}

impl Bounded for u16 {
    const MAX: Self = u16::MAX;
}

impl Bounded for u32 {
    const MAX: Self = u32::MAX;
}

/// Parse a yes/no flag.
pub(crate) fn parse_bool(field: &'static str, input: &str) -> Result<bool, FieldError> {
    match input.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" => Ok(true),
        "n" | "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(FieldError::Invalid {
            field,
            input: input.to_string(),
            reason: "expected yes or no".to_string(),
        }),
    }
}

/// Format a flag the way [`parse_bool`] reads it back.
pub(crate) fn format_bool(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Wrap an optional payload encoder for embedding in a header.
pub(crate) fn boxed(payload: Option<Encoder>) -> Option<Box<Encoder>> {
    payload.map(Box::new)
}
