use super::namd::DocumentError;
use super::traits::TextDocument;
use std::io::{BufRead, Write};

/// Number of leading lines every per-process result stream starts with.
pub const HEADER_LINES: usize = 2;

/// A per-process `.fepout` result stream.
///
/// Lines are kept as raw bytes including their terminators so that merged
/// output is byte-identical to the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultStream {
    lines: Vec<Vec<u8>>,
}

impl ResultStream {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let lines = bytes
            .split_inclusive(|&b| b == b'\n')
            .map(<[u8]>::to_vec)
            .collect();
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The leading header lines (fewer if the stream is shorter).
    pub fn header(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().take(HEADER_LINES).map(Vec::as_slice)
    }

    /// Every line after the header.
    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().skip(HEADER_LINES).map(Vec::as_slice)
    }

    /// Writes the full stream, header included.
    pub fn write_all(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for line in &self.lines {
            writer.write_all(line)?;
        }
        Ok(())
    }

    /// Writes only the records, dropping the header.
    pub fn write_records(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for line in self.records() {
            writer.write_all(line)?;
        }
        Ok(())
    }
}

impl TextDocument for ResultStream {
    type Error = DocumentError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut lines = Vec::new();
        loop {
            let mut line = Vec::new();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            lines.push(line);
        }
        Ok(Self { lines })
    }

    fn write_to(&self, writer: &mut impl Write) -> Result<(), Self::Error> {
        self.write_all(writer)?;
        Ok(())
    }
}
