//! Rendering of encoded packets: hex dumps and pcap export.

use crate::encoder::Encoder;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Little-endian, microsecond-resolution pcap magic
pub const PCAP_MAGIC: u32 = 0xa1b2_c3d4;

/// Length of the pcap global header
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Length of a pcap record header
pub const RECORD_HEADER_LEN: usize = 16;

/// Default snapshot length
pub const DEFAULT_SNAP_LEN: u32 = 65535;

/// pcap link-layer header types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LinkType {
    /// IEEE 802.3 Ethernet
    Ethernet = 1,
    /// Reserved for private use; carries a bare text payload
    User0 = 147,
}

impl LinkType {
    /// Link type for a packet whose outermost layer is `root`.
    #[must_use]
    pub fn for_root(root: &Encoder) -> Self {
        match root {
            Encoder::Ethernet(_) => Self::Ethernet,
            _ => Self::User0,
        }
    }

    /// Get the numeric link type
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Render `data` as a hex dump: 16 bytes per line, offset, hex, ASCII.
#[must_use]
pub fn format_hexdump(data: &[u8]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} bytes:", data.len());

    for (chunk_idx, chunk) in data.chunks(16).enumerate() {
        let _ = write!(output, "{:08x}  ", chunk_idx * 16);

        for (i, byte) in chunk.iter().enumerate() {
            if i == 8 {
                output.push(' ');
            }
            let _ = write!(output, "{byte:02x} ");
        }

        // Pad the last line so the ASCII column lines up
        if chunk.len() < 16 {
            for _ in chunk.len()..16 {
                output.push_str("   ");
            }
            if chunk.len() <= 8 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        for &byte in chunk {
            output.push(if byte.is_ascii_graphic() || byte == b' ' {
                char::from(byte)
            } else {
                '.'
            });
        }
        for _ in chunk.len()..16 {
            output.push(' ');
        }
        output.push_str("|\n");
    }

    output
}

/// Writes packets in the classic pcap format.
pub struct PcapWriter<W: Write> {
    inner: W,
    snap_len: u32,
    packets: usize,
}

impl<W: Write> PcapWriter<W> {
    /// Write a global header to `inner` and return the writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(mut inner: W, link_type: LinkType, snap_len: u32) -> Result<Self> {
        write_global_header(&mut inner, link_type, snap_len)?;
        Ok(Self::without_header(inner, snap_len))
    }

    fn without_header(inner: W, snap_len: u32) -> Self {
        Self {
            inner,
            snap_len,
            packets: 0,
        }
    }

    /// Append one record stamped with `timestamp`.
    ///
    /// Data beyond the snapshot length is truncated; the record keeps the
    /// original length.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write_packet(&mut self, data: &[u8], timestamp: SystemTime) -> Result<()> {
        let since_epoch = timestamp.duration_since(UNIX_EPOCH).unwrap_or_default();
        let orig_len = u32::try_from(data.len()).unwrap_or(u32::MAX);
        let incl_len = orig_len.min(self.snap_len);

        let seconds = u32::try_from(since_epoch.as_secs()).unwrap_or(u32::MAX);
        self.inner.write_u32::<LittleEndian>(seconds)?;
        self.inner
            .write_u32::<LittleEndian>(since_epoch.subsec_micros())?;
        self.inner.write_u32::<LittleEndian>(incl_len)?;
        self.inner.write_u32::<LittleEndian>(orig_len)?;
        self.inner.write_all(&data[..incl_len as usize])?;

        self.packets += 1;
        Ok(())
    }

    /// Records written through this writer
    #[must_use]
    pub fn packets(&self) -> usize {
        self.packets
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl PcapWriter<BufWriter<File>> {
    /// Open `path` for appending, writing a global header if the file is new
    /// or empty.
    ///
    /// An existing file must carry the same link type and snapshot length.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the header written,
    /// or if an existing file is not pcap or its header does not match.
    pub fn append(path: &Path, link_type: LinkType, snap_len: u32) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(path)?;

        if file.metadata()?.len() == 0 {
            debug!(path = %path.display(), link_type = link_type.as_u32(), "creating pcap file");
            let mut inner = BufWriter::new(file);
            write_global_header(&mut inner, link_type, snap_len)?;
            return Ok(Self::without_header(inner, snap_len));
        }

        check_global_header(&mut file, link_type, snap_len)?;
        Ok(Self::without_header(BufWriter::new(file), snap_len))
    }
}

/// Verify that the header at the start of `input` accepts records of
/// `link_type` truncated to `snap_len`.
fn check_global_header<R: Read>(input: &mut R, link_type: LinkType, snap_len: u32) -> Result<()> {
    let mut header = [0u8; GLOBAL_HEADER_LEN];
    if let Err(e) = input.read_exact(&mut header) {
        return Err(match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::NotPcap,
            _ => e.into(),
        });
    }

    if LittleEndian::read_u32(&header[0..4]) != PCAP_MAGIC {
        return Err(Error::NotPcap);
    }

    let file_link = LittleEndian::read_u32(&header[20..24]);
    if file_link != link_type.as_u32() {
        return Err(Error::LinkTypeMismatch {
            file: file_link,
            packet: link_type.as_u32(),
        });
    }

    let file_snap = LittleEndian::read_u32(&header[16..20]);
    if file_snap != snap_len {
        return Err(Error::SnapLenMismatch {
            file: file_snap,
            requested: snap_len,
        });
    }
    Ok(())
}

fn write_global_header<W: Write>(out: &mut W, link_type: LinkType, snap_len: u32) -> io::Result<()> {
    out.write_u32::<LittleEndian>(PCAP_MAGIC)?;
    out.write_u16::<LittleEndian>(2)?;
    out.write_u16::<LittleEndian>(4)?;
    // thiszone, sigfigs
    out.write_i32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(snap_len)?;
    out.write_u32::<LittleEndian>(link_type.as_u32())
}

/// Append the packet encoded by `root` to the pcap file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_packet(path: &Path, root: &Encoder, snap_len: u32) -> Result<usize> {
    let bytes = root.encode();
    let mut writer = PcapWriter::append(path, LinkType::for_root(root), snap_len)?;
    writer.write_packet(&bytes, SystemTime::now())?;
    writer.into_inner()?;

    debug!(path = %path.display(), bytes = bytes.len(), "packet saved");
    Ok(bytes.len())
}
