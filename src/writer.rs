//! Buffered NAV output, with optional gzip compression
use std::io::{BufWriter, Error, Write};

#[cfg(feature = "flate2")]
use flate2::{write::GzEncoder, Compression};

/// [BufferedWriter] is the output side of a
/// [RecordStream](crate::stream::RecordStream).
#[derive(Debug)]
pub enum BufferedWriter<W: Write> {
    /// Plain text sink
    Plain(BufWriter<W>),
    /// gzip compressed sink
    #[cfg(feature = "flate2")]
    Gz(BufWriter<GzEncoder<W>>),
}

impl<W: Write> BufferedWriter<W> {
    /// Plain text output
    pub fn plain(w: W) -> Self {
        Self::Plain(BufWriter::new(w))
    }

    /// gzip compressed output, `compression_level` ranging 0 (fastest) to 9 (smallest).
    #[cfg(feature = "flate2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "flate2")))]
    pub fn gzip(w: W, compression_level: u32) -> Self {
        let encoder = GzEncoder::new(w, Compression::new(compression_level.min(9)));
        Self::Gz(BufWriter::new(encoder))
    }

    /// True if content is gzip compressed
    pub fn is_gzip(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    /// Flushes pending content, terminates the gzip member if any,
    /// and releases the inner [Write]r.
    pub fn finish(self) -> Result<W, Error> {
        match self {
            Self::Plain(writer) => writer.into_inner().map_err(|e| e.into_error()),
            #[cfg(feature = "flate2")]
            Self::Gz(writer) => writer.into_inner().map_err(|e| e.into_error())?.finish(),
        }
    }

    fn sink(&mut self) -> &mut dyn Write {
        match self {
            Self::Plain(writer) => writer,
            #[cfg(feature = "flate2")]
            Self::Gz(writer) => writer,
        }
    }
}

impl<W: Write> Write for BufferedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.sink().write(buf)
    }
    fn flush(&mut self) -> Result<(), Error> {
        self.sink().flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_output() {
        let mut writer = BufferedWriter::plain(Vec::new());
        assert!(!writer.is_gzip());
        writeln!(writer, "G01").unwrap();
        let content = writer.finish().unwrap();
        assert_eq!(content, b"G01\n");
    }

    #[test]
    #[cfg(feature = "flate2")]
    fn gzip_output() {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let mut writer = BufferedWriter::gzip(Vec::new(), 6);
        assert!(writer.is_gzip());
        writeln!(writer, "G01").unwrap();
        let compressed = writer.finish().unwrap();

        let mut content = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "G01\n");
    }
}
