//! NAV file header
use std::io::{BufRead, Write};
use std::str::FromStr;

use log::debug;

use crate::{
    error::{Error, ParsingError},
    prelude::Constellation,
    stream::RecordStream,
    version::Version,
};

/// Header labels start at this column
const LABEL_COLUMN: usize = 60;

const VERSION_TYPE_LABEL: &str = "RINEX VERSION / TYPE";
const COMMENT_LABEL: &str = "COMMENT";
const END_OF_HEADER_LABEL: &str = "END OF HEADER";

/// Pads `content` to the label column, then appends the label
pub(crate) fn fmt_header_line(content: &str, label: &str) -> String {
    format!("{:<width$}{}", content, label, width = LABEL_COLUMN)
}

/// [NavHeader] describes a NAV file: revision and constellation,
/// which both drive record decoding, plus free comments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavHeader {
    /// File revision
    pub version: Version,
    /// [Constellation::Mixed] for multi constellation files
    pub constellation: Constellation,
    /// Comments, in order of appearance
    pub comments: Vec<String>,
}

impl Default for NavHeader {
    fn default() -> Self {
        Self {
            version: Version::default(),
            constellation: Constellation::Mixed,
            comments: Vec::new(),
        }
    }
}

impl NavHeader {
    /// Copies and sets [Version]
    pub fn with_version(&self, version: Version) -> Self {
        let mut s = self.clone();
        s.version = version;
        s
    }

    /// Copies and sets [Constellation]
    pub fn with_constellation(&self, constellation: Constellation) -> Self {
        let mut s = self.clone();
        s.constellation = constellation;
        s
    }

    /// Copies and appends one comment
    pub fn with_comment(&self, comment: &str) -> Self {
        let mut s = self.clone();
        s.comments.push(comment.to_string());
        s
    }

    /// Constellation hint for records that do not carry one (V2 files)
    pub(crate) fn record_constellation(&self) -> Option<Constellation> {
        if self.constellation == Constellation::Mixed {
            None
        } else {
            Some(self.constellation)
        }
    }

    /// Parses the "RINEX VERSION / TYPE" content
    fn parse_version_type(content: &str) -> Result<(Version, Constellation), ParsingError> {
        let version = content.get(..20).unwrap_or(content);
        let version = Version::from_str(version)?;

        let file_type = content.get(20..21).unwrap_or("");
        let system = content.get(40..41).unwrap_or("").trim();

        let constellation = match file_type {
            "G" => Constellation::Glonass,
            "N" => {
                if system.is_empty() {
                    // V2 GPS NAV DATA
                    Constellation::GPS
                } else {
                    Constellation::from_str(system)
                        .map_err(|_| ParsingError::SvField(system.to_string()))?
                }
            },
            _ => return Err(ParsingError::NotNavigation),
        };
        Ok((version, constellation))
    }

    /// Parses the header section, up to and including "END OF HEADER".
    pub fn parse<S: BufRead>(stream: &mut RecordStream<S>) -> Result<Self, Error> {
        let mut header = Self::default();
        let mut identified = false;
        loop {
            let line = match stream.read_record() {
                Ok(line) => line,
                Err(Error::EndOfInput) => {
                    let e = Error::format(ParsingError::MissingEndOfHeader, stream.line_number());
                    return Err(stream.fail(e));
                },
                Err(e) => return Err(e),
            };
            let (content, label) = match (line.get(..LABEL_COLUMN), line.get(LABEL_COLUMN..)) {
                (Some(content), Some(label)) => (content, label.trim()),
                _ => (line.as_str(), ""),
            };
            if label == END_OF_HEADER_LABEL {
                break;
            } else if label == VERSION_TYPE_LABEL {
                let (version, constellation) = Self::parse_version_type(content)
                    .map_err(|e| stream.fail(Error::format(e, stream.line_number())))?;
                header.version = version;
                header.constellation = constellation;
                identified = true;
            } else if label == COMMENT_LABEL {
                header.comments.push(content.trim_end().to_string());
            }
        }
        if !identified {
            let e = Error::format(ParsingError::NotNavigation, stream.line_number());
            return Err(stream.fail(e));
        }
        debug!(
            "{}: NAV V{} ({})",
            stream.name(),
            header.version,
            header.constellation
        );
        Ok(header)
    }

    /// "RINEX VERSION / TYPE" content, per revision
    fn format_version_type(&self) -> String {
        let version = format!("{:6}.{:02}", self.version.major, self.version.minor);
        if self.version.is_legacy() {
            match self.constellation {
                Constellation::Glonass => {
                    format!("{:<20}{:<40}", version, "G: GLONASS NAV DATA")
                },
                _ => format!("{:<20}{:<40}", version, "N: GPS NAV DATA"),
            }
        } else {
            format!(
                "{:<20}{:<20}{:<20}",
                version,
                "N: GNSS NAV DATA",
                format!("{:x}: {:X}", self.constellation, self.constellation)
            )
        }
    }

    /// Formats the header section, "END OF HEADER" included.
    pub fn format<W: Write>(&self, stream: &mut RecordStream<W>) -> Result<(), Error> {
        stream.write_record(&fmt_header_line(
            &self.format_version_type(),
            VERSION_TYPE_LABEL,
        ))?;
        for comment in &self.comments {
            // long comments span several lines
            let chars = comment.chars().collect::<Vec<_>>();
            for chunk in chars.chunks(LABEL_COLUMN) {
                let chunk = chunk.iter().collect::<String>();
                stream.write_record(&fmt_header_line(&chunk, COMMENT_LABEL))?;
            }
        }
        stream.write_record(&fmt_header_line("", END_OF_HEADER_LABEL))
    }
}
