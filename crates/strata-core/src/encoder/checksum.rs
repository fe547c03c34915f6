//! RFC 1071 Internet checksum.

use super::Envelope;
use byteorder::{ByteOrder, NetworkEndian};

/// Compute an RFC 1071 compliant checksum (without the final complement).
pub(crate) fn data(mut data: &[u8]) -> u16 {
    // Wide enough that any slice in memory sums without overflow.
    let mut accum: u64 = 0;

    // For each 32-byte chunk...
    const CHUNK_SIZE: usize = 32;
    while data.len() >= CHUNK_SIZE {
        let mut d = &data[..CHUNK_SIZE];
        // ... take by 2 bytes and sum them.
        while d.len() >= 2 {
            accum += u64::from(NetworkEndian::read_u16(d));
            d = &d[2..];
        }

        data = &data[CHUNK_SIZE..];
    }

    while data.len() >= 2 {
        accum += u64::from(NetworkEndian::read_u16(data));
        data = &data[2..];
    }

    // Add the last remaining odd byte, if any.
    if let Some(&value) = data.first() {
        accum += u64::from(value) << 8;
    }

    propagate_carries(accum)
}

/// Combine several RFC 1071 compliant checksums.
pub(crate) fn combine(checksums: &[u16]) -> u16 {
    let accum = checksums.iter().copied().map(u64::from).sum();
    propagate_carries(accum)
}

/// Checksum of the pseudo header an upper layer inherits from its IP envelope.
///
/// Returns zero for a bare envelope, which leaves the data checksum unchanged.
pub(crate) fn pseudo_header(envelope: &Envelope, protocol: u8, length: u32) -> u16 {
    match envelope {
        Envelope::Bare => 0,
        Envelope::V4 { src, dst } => {
            let mut proto_len = [0u8; 4];
            proto_len[1] = protocol;
            // Upper-layer length in an IPv4 pseudo header is 16 bits.
            NetworkEndian::write_u16(&mut proto_len[2..4], length as u16);

            combine(&[
                data(&src.octets()),
                data(&dst.octets()),
                data(&proto_len),
            ])
        }
        Envelope::V6 { src, dst } => {
            let mut len_next = [0u8; 8];
            NetworkEndian::write_u32(&mut len_next[0..4], length);
            len_next[7] = protocol;

            combine(&[
                data(&src.octets()),
                data(&dst.octets()),
                data(&len_next),
            ])
        }
    }
}

fn propagate_carries(mut word: u64) -> u16 {
    while word > 0xffff {
        word = (word >> 16) + (word & 0xffff);
    }
    word as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_rfc1071_example() {
        // Example from RFC 1071 section 3.
        let bytes = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(data(&bytes), 0xddf2);
    }

    #[test]
    fn test_odd_length_padded() {
        assert_eq!(data(&[0x12]), 0x1200);
        assert_eq!(data(&[0x12, 0x34, 0x56]), 0x1234 + 0x5600);
    }

    fn naive_sum(bytes: &[u8]) -> u64 {
        let mut naive: u64 = 0;
        for pair in bytes.chunks(2) {
            let hi = u64::from(pair[0]) << 8;
            let lo = pair.get(1).copied().map_or(0, u64::from);
            naive += hi | lo;
        }
        while naive > 0xffff {
            naive = (naive >> 16) + (naive & 0xffff);
        }
        naive
    }

    #[test]
    fn test_long_input_matches_naive_sum() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(1001).collect();
        assert_eq!(u64::from(data(&bytes)), naive_sum(&bytes));
    }

    #[test]
    fn test_input_beyond_64k() {
        // 150k words of 0xffff would overflow a 32-bit running sum
        assert_eq!(data(&[0xff; 300_000]), 0xffff);

        let text = "\u{ffff}".repeat(100_000);
        assert_eq!(u64::from(data(text.as_bytes())), naive_sum(text.as_bytes()));
    }

    #[test]
    fn test_bare_pseudo_header_is_zero() {
        assert_eq!(pseudo_header(&Envelope::Bare, 17, 100), 0);
        let v4 = Envelope::V4 {
            src: Ipv4Addr::new(10, 0, 0, 1),
            dst: Ipv4Addr::new(10, 0, 0, 2),
        };
        assert_ne!(pseudo_header(&v4, 17, 100), 0);
    }
}
