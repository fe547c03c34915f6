//! The layering grammar.
//!
//! Every selector is created for a [`ParentContext`] and offers exactly the
//! layer kinds returned by [`grammar`] for that context. This table is the
//! only place that decides what may follow what, so an invalid stack such as
//! TCP directly under Ethernet can never be offered.

use std::fmt;

/// Concrete layer kinds, in menu (grammar enumeration) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LayerKind {
    /// Ethernet II frame
    EthernetFrame = 0,
    /// IPv4 packet
    Ipv4Frame = 1,
    /// IPv6 packet
    Ipv6Frame = 2,
    /// ICMPv4 message
    Icmpv4Frame = 3,
    /// ICMPv6 message
    Icmpv6Frame = 4,
    /// ICMPv4 echo request body
    Icmpv4EchoPayload = 5,
    /// ICMPv6 echo request body
    Icmpv6EchoPayload = 6,
    /// TCP segment
    TcpFrame = 7,
    /// UDP datagram
    UdpFrame = 8,
    /// Raw text payload
    TextBuffer = 9,
}

impl LayerKind {
    /// Every kind in grammar enumeration order.
    pub const ALL: [LayerKind; 10] = [
        Self::EthernetFrame,
        Self::Ipv4Frame,
        Self::Ipv6Frame,
        Self::Icmpv4Frame,
        Self::Icmpv6Frame,
        Self::Icmpv4EchoPayload,
        Self::Icmpv6EchoPayload,
        Self::TcpFrame,
        Self::UdpFrame,
        Self::TextBuffer,
    ];

    /// Display name, also used as the menu label.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EthernetFrame => "Ethernet-Frame",
            Self::Ipv4Frame => "IPv4-Frame",
            Self::Ipv6Frame => "IPv6-Frame",
            Self::Icmpv4Frame => "ICMPv4-Frame",
            Self::Icmpv6Frame => "ICMPv6-Frame",
            Self::Icmpv4EchoPayload => "ICMPv4-Echo-Payload",
            Self::Icmpv6EchoPayload => "ICMPv6-Echo-Payload",
            Self::TcpFrame => "TCP-Frame",
            Self::UdpFrame => "UDP-Frame",
            Self::TextBuffer => "Text-Buffer",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of the layer that owns a selector, used only as a grammar key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentContext {
    /// Top of a packet definition
    Root,
    /// Payload of an Ethernet frame
    Ethernet,
    /// Payload of an IPv4 packet
    Ipv4,
    /// Payload of an IPv6 packet
    Ipv6,
    /// Body of an ICMPv4 message
    Icmpv4,
    /// Body of an ICMPv6 message
    Icmpv6,
    /// Payload of a layer that does no further layering (TCP, UDP, echo)
    Generic,
}

impl ParentContext {
    /// Every context, in table order.
    pub const ALL: [ParentContext; 7] = [
        Self::Root,
        Self::Ethernet,
        Self::Ipv4,
        Self::Ipv6,
        Self::Icmpv4,
        Self::Icmpv6,
        Self::Generic,
    ];

    /// Context under which a layer of `kind` offers its own payload, if any.
    #[must_use]
    pub fn of(kind: LayerKind) -> Option<Self> {
        match kind {
            LayerKind::EthernetFrame => Some(Self::Ethernet),
            LayerKind::Ipv4Frame => Some(Self::Ipv4),
            LayerKind::Ipv6Frame => Some(Self::Ipv6),
            LayerKind::Icmpv4Frame => Some(Self::Icmpv4),
            LayerKind::Icmpv6Frame => Some(Self::Icmpv6),
            LayerKind::Icmpv4EchoPayload
            | LayerKind::Icmpv6EchoPayload
            | LayerKind::TcpFrame
            | LayerKind::UdpFrame => Some(Self::Generic),
            LayerKind::TextBuffer => None,
        }
    }
}

impl fmt::Display for ParentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("Root"),
            Self::Ethernet => f.write_str(LayerKind::EthernetFrame.name()),
            Self::Ipv4 => f.write_str(LayerKind::Ipv4Frame.name()),
            Self::Ipv6 => f.write_str(LayerKind::Ipv6Frame.name()),
            Self::Icmpv4 => f.write_str(LayerKind::Icmpv4Frame.name()),
            Self::Icmpv6 => f.write_str(LayerKind::Icmpv6Frame.name()),
            Self::Generic => f.write_str("Generic"),
        }
    }
}

/// Set of layer kinds, stored as a bitmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayerSet(u16);

impl LayerSet {
    /// The empty set
    pub const EMPTY: Self = Self(0);

    /// Build a set from a list of kinds.
    #[must_use]
    pub const fn of(kinds: &[LayerKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Add a kind
    #[must_use]
    pub const fn with(self, kind: LayerKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Check membership
    #[must_use]
    pub const fn contains(self, kind: LayerKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Number of kinds in the set
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if the set is empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get raw bitmap value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Iterate members in grammar enumeration order.
    pub fn iter(self) -> impl Iterator<Item = LayerKind> {
        LayerKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<LayerKind> for LayerSet {
    fn from_iter<I: IntoIterator<Item = LayerKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Eligible child kinds for a parent context.
///
/// The text buffer follows every context except the ICMP ones, whose body is
/// always a structured echo payload.
#[must_use]
pub fn grammar(context: ParentContext) -> LayerSet {
    use LayerKind::*;

    match context {
        ParentContext::Root => LayerSet::of(&[EthernetFrame, TextBuffer]),
        ParentContext::Ethernet => LayerSet::of(&[Ipv4Frame, Ipv6Frame, TextBuffer]),
        ParentContext::Ipv4 => LayerSet::of(&[Icmpv4Frame, TcpFrame, UdpFrame, TextBuffer]),
        ParentContext::Ipv6 => {
            LayerSet::of(&[Icmpv4Frame, Icmpv6Frame, TcpFrame, UdpFrame, TextBuffer])
        }
        ParentContext::Icmpv4 => LayerSet::of(&[Icmpv4EchoPayload]),
        ParentContext::Icmpv6 => LayerSet::of(&[Icmpv6EchoPayload]),
        ParentContext::Generic => LayerSet::of(&[TextBuffer]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LayerKind::*;

    fn kinds(context: ParentContext) -> Vec<LayerKind> {
        grammar(context).iter().collect()
    }

    #[test]
    fn test_root_offers_link_layer() {
        assert_eq!(kinds(ParentContext::Root), vec![EthernetFrame, TextBuffer]);
    }

    #[test]
    fn test_ip_contexts() {
        assert_eq!(
            kinds(ParentContext::Ipv4),
            vec![Icmpv4Frame, TcpFrame, UdpFrame, TextBuffer]
        );
        assert_eq!(
            kinds(ParentContext::Ipv6),
            vec![Icmpv4Frame, Icmpv6Frame, TcpFrame, UdpFrame, TextBuffer]
        );
    }

    #[test]
    fn test_transport_never_follows_ethernet() {
        let set = grammar(ParentContext::Ethernet);
        assert!(!set.contains(TcpFrame));
        assert!(!set.contains(UdpFrame));
        assert!(set.contains(Ipv4Frame));
    }

    #[test]
    fn test_icmp_contexts_exclude_text() {
        assert_eq!(kinds(ParentContext::Icmpv4), vec![Icmpv4EchoPayload]);
        assert_eq!(kinds(ParentContext::Icmpv6), vec![Icmpv6EchoPayload]);
    }

    #[test]
    fn test_text_buffer_in_other_contexts() {
        for context in ParentContext::ALL {
            let expected = !matches!(context, ParentContext::Icmpv4 | ParentContext::Icmpv6);
            assert_eq!(grammar(context).contains(TextBuffer), expected, "{context}");
        }
    }

    #[test]
    fn test_payload_context_of_kind() {
        assert_eq!(ParentContext::of(EthernetFrame), Some(ParentContext::Ethernet));
        assert_eq!(ParentContext::of(UdpFrame), Some(ParentContext::Generic));
        assert_eq!(ParentContext::of(TextBuffer), None);
    }

    #[test]
    fn test_layer_set_bits() {
        let set: LayerSet = [TcpFrame, EthernetFrame].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![EthernetFrame, TcpFrame]);
        assert!(LayerSet::EMPTY.is_empty());
        assert_eq!(LayerSet::EMPTY.with(EthernetFrame).as_u16(), 1);
    }
}
