//! Generic Buffered Reader, with seamless gzip decompression
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

/// [BufferedReader] is the input side of a
/// [RecordStream](crate::stream::RecordStream) opened on a local file.
#[derive(Debug)]
pub enum BufferedReader {
    /// Readable file
    Plain(BufReader<File>),
    /// gzip compressed file
    #[cfg(feature = "flate2")]
    Gz(BufReader<GzDecoder<File>>),
}

impl BufferedReader {
    /// Opens given file. Files terminated by `.gz` are decompressed
    /// on the fly, when the `flate2` feature is enabled.
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let fd = File::open(path)?;
        let gzip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);
        if gzip {
            #[cfg(feature = "flate2")]
            {
                Ok(Self::Gz(BufReader::new(GzDecoder::new(fd))))
            }
            #[cfg(not(feature = "flate2"))]
            {
                Err(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "gzip compressed data requires the flate2 feature",
                ))
            }
        } else {
            Ok(Self::Plain(BufReader::new(fd)))
        }
    }
}

impl Read for BufferedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(h) => h.read(buf),
            #[cfg(feature = "flate2")]
            Self::Gz(h) => h.read(buf),
        }
    }
}

impl BufRead for BufferedReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match self {
            Self::Plain(h) => h.fill_buf(),
            #[cfg(feature = "flate2")]
            Self::Gz(h) => h.fill_buf(),
        }
    }
    fn consume(&mut self, s: usize) {
        match self {
            Self::Plain(h) => h.consume(s),
            #[cfg(feature = "flate2")]
            Self::Gz(h) => h.consume(s),
        }
    }
}
