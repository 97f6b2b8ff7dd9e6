//! NAV record decoding and encoding
use std::io::{BufRead, Write};
use std::str::FromStr;

use log::debug;

use crate::{
    error::{Error, ParsingError},
    header::NavHeader,
    navigation::{
        ephemeris::Ephemeris,
        fields::{format_field, parse_fields, strip_comment, COMMENT_MARKER, FIELDS_PER_LINE},
        record::{continuation_lines, is_supported, NavRecord},
        validity::ValidityPolicy,
    },
    prelude::{Constellation, SV},
    stream::RecordStream,
    time::{GnssTime, TimeSystem},
    version::Version,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// [NavCodec] configuration
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodecConfig {
    /// Traces every decoded / encoded record
    pub debug: bool,
    /// On failure, leave the stream at the beginning of the failing record.
    /// Otherwise, the failing record is skipped.
    pub rewind_on_error: bool,
    /// Validity window derivation of decoded models
    pub validity: ValidityPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            debug: false,
            rewind_on_error: true,
            validity: ValidityPolicy::default(),
        }
    }
}

impl CodecConfig {
    /// Copies and enables record tracing
    pub fn with_debug(&self) -> Self {
        let mut s = *self;
        s.debug = true;
        s
    }
    /// Copies and skips failing records instead of rewinding
    pub fn without_rewind(&self) -> Self {
        let mut s = *self;
        s.rewind_on_error = false;
        s
    }
    /// Copies and sets the [ValidityPolicy]
    pub fn with_validity_policy(&self, policy: ValidityPolicy) -> Self {
        let mut s = *self;
        s.validity = policy;
        s
    }
}

/// Line layout of one revision
struct Layout {
    /// Satellite field width
    sv_width: usize,
    /// Columns that must be blank in the header line
    separators: &'static [usize],
    /// Clock terms start here
    clock_offset: usize,
}

const V2_LAYOUT: Layout = Layout {
    sv_width: 2,
    separators: &[2, 5, 8, 11, 14, 17],
    clock_offset: 22,
};

const V3_LAYOUT: Layout = Layout {
    sv_width: 3,
    separators: &[3, 8, 11, 14, 17, 20],
    clock_offset: 23,
};

fn parse_epoch_field<T: FromStr>(content: &str, field: &'static str) -> Result<T, ParsingError> {
    content
        .trim()
        .parse::<T>()
        .map_err(|_| ParsingError::EpochField(field))
}

/// [NavCodec] turns multi line NAV records into [NavRecord]s, and back.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NavCodec {
    /// File revision, selects the line layout
    pub version: Version,
    /// File constellation, required by V2 records which only carry a PRN
    pub constellation: Option<Constellation>,
    pub config: CodecConfig,
}

impl Default for NavCodec {
    fn default() -> Self {
        Self::new(Version::default(), None)
    }
}

impl NavCodec {
    pub fn new(version: Version, constellation: Option<Constellation>) -> Self {
        Self {
            version,
            constellation,
            config: CodecConfig::default(),
        }
    }

    /// Codec matching a parsed file header
    pub fn from_header(header: &NavHeader) -> Self {
        Self::new(header.version, header.record_constellation())
    }

    /// Copies and applies a [CodecConfig]
    pub fn with_config(&self, config: CodecConfig) -> Self {
        let mut s = *self;
        s.config = config;
        s
    }

    fn layout(&self) -> &'static Layout {
        if self.version.is_legacy() {
            &V2_LAYOUT
        } else {
            &V3_LAYOUT
        }
    }

    /// True if this line may start a new record
    pub fn is_new_record(&self, line: &str) -> bool {
        let bytes = line.as_bytes();
        if self.version.is_legacy() {
            bytes.get(1).is_some_and(|b| b.is_ascii_digit())
        } else {
            bytes.first().is_some_and(|b| b.is_ascii_alphabetic())
        }
    }

    fn parse_sv(&self, content: &str) -> Result<SV, ParsingError> {
        if self.version.is_legacy() {
            let constellation = self.constellation.ok_or(ParsingError::NoConstellation)?;
            let prn = content
                .trim()
                .parse::<u8>()
                .map_err(|_| ParsingError::SvField(content.to_string()))?;
            Ok(SV::new(constellation, prn))
        } else {
            if content.trim().len() < 2 {
                return Err(ParsingError::SvField(content.to_string()));
            }
            SV::from_str(content).map_err(|_| ParsingError::SvField(content.to_string()))
        }
    }

    fn parse_toc(&self, system: TimeSystem, content: &str) -> Result<GnssTime, ParsingError> {
        let (year, month, day, hour, minute, seconds) = if self.version.is_legacy() {
            let year = parse_epoch_field::<i32>(&content[1..3], "year")?;
            let year = if year < 80 { year + 2000 } else { year + 1900 };
            (
                year,
                &content[4..6],
                &content[7..9],
                &content[10..12],
                &content[13..15],
                &content[15..20],
            )
        } else {
            (
                parse_epoch_field::<i32>(&content[1..5], "year")?,
                &content[6..8],
                &content[9..11],
                &content[12..14],
                &content[15..17],
                &content[18..20],
            )
        };
        GnssTime::from_gregorian(
            system,
            year,
            parse_epoch_field::<u8>(month, "month")?,
            parse_epoch_field::<u8>(day, "day")?,
            parse_epoch_field::<u8>(hour, "hours")?,
            parse_epoch_field::<u8>(minute, "minutes")?,
            parse_epoch_field::<f64>(seconds, "seconds")?,
        )
    }

    /// Parses the first line of a record: satellite, clock epoch, clock terms.
    pub fn parse_header_line(&self, line: &str) -> Result<(SV, GnssTime, [f64; 3]), ParsingError> {
        let layout = self.layout();
        let line = strip_comment(line);
        if !line.is_ascii() || line.len() < layout.clock_offset {
            return Err(ParsingError::BadEpochLine);
        }
        let bytes = line.as_bytes();
        if layout.separators.iter().any(|i| bytes[*i] != b' ') {
            return Err(ParsingError::BadEpochLine);
        }

        let sv = self.parse_sv(&line[..layout.sv_width])?;
        let system = TimeSystem::from_constellation(sv.constellation);
        let toc = self.parse_toc(system, &line[layout.sv_width..layout.clock_offset])?;

        let terms = parse_fields(&line[layout.clock_offset..], 0)?;
        if terms.len() > 3 {
            return Err(ParsingError::TooManyFields(line.to_string()));
        }
        let mut clock = [0.0_f64; 3];
        clock[..terms.len()].copy_from_slice(&terms);

        if self.version.is_legacy() && sv.constellation == Constellation::Glonass {
            // V2 frame time is a second of day
            clock[2] += (toc.seconds_of_week() / SECONDS_PER_DAY).floor() * SECONDS_PER_DAY;
        }
        Ok((sv, toc, clock))
    }

    /// Reads the header line of the next record.
    /// Blank lines are skipped, a line that starts as a comment is skipped once.
    fn read_header<S: BufRead>(
        &self,
        stream: &mut RecordStream<S>,
    ) -> Result<(SV, GnssTime, [f64; 3]), Error> {
        let mut retried = false;
        loop {
            let line = stream.read_record()?;
            let content = line.trim();
            if content.is_empty() {
                continue;
            }
            if content.starts_with(COMMENT_MARKER) {
                if retried {
                    let e = Error::format(ParsingError::CommentLine, stream.line_number());
                    return Err(stream.fail(e));
                }
                retried = true;
                continue;
            }
            return self
                .parse_header_line(&line)
                .map_err(|e| stream.fail(Error::format(e, stream.line_number())));
        }
    }

    /// Fills the field table. Blank or comment only lines do not count.
    fn read_continuations<S: BufRead>(
        &self,
        stream: &mut RecordStream<S>,
        record: &mut NavRecord,
    ) -> Result<(), Error> {
        let indent = self.version.indent();
        let mut count = 0;
        while count < record.lines() {
            let line = match stream.read_record() {
                Ok(line) => line,
                Err(Error::EndOfInput) => {
                    let e = Error::format(ParsingError::MissingLine, stream.line_number());
                    return Err(stream.fail(e));
                },
                Err(e) => return Err(e),
            };
            let fields = parse_fields(&line, indent)
                .map_err(|e| stream.fail(Error::format(e, stream.line_number())))?;
            if fields.is_empty() {
                continue;
            }
            let offset = count * FIELDS_PER_LINE;
            record.fields[offset..offset + fields.len()].copy_from_slice(&fields);
            count += 1;
        }
        Ok(())
    }

    /// Consumes up to `lines` continuation lines, stopping ahead of a new record.
    fn skip_continuations<S: BufRead>(
        &self,
        stream: &mut RecordStream<S>,
        lines: usize,
    ) -> Result<usize, Error> {
        let mut skipped = 0;
        while skipped < lines {
            stream.checkpoint();
            match stream.read_record() {
                Ok(line) if self.is_new_record(&line) => {
                    stream.restore()?;
                    break;
                },
                Ok(_) | Err(Error::Format { .. }) => {
                    stream.commit();
                    skipped += 1;
                },
                Err(Error::EndOfInput) => {
                    stream.commit();
                    break;
                },
                Err(e) => {
                    stream.commit();
                    return Err(e);
                },
            }
        }
        Ok(skipped)
    }

    /// Consumes the next record without decoding it, so decoding may
    /// resume after a failure. Returns the number of lines consumed.
    pub fn skip_record<S: BufRead>(&self, stream: &mut RecordStream<S>) -> Result<usize, Error> {
        let mut skipped = 0;
        let line = loop {
            match stream.read_record() {
                Ok(line) if line.trim().is_empty() => skipped += 1,
                Ok(line) => break line,
                Err(Error::EndOfInput) => return Ok(skipped),
                Err(Error::Format { .. }) => return Ok(skipped + 1),
                Err(e) => return Err(e),
            }
        };
        skipped += 1;
        // unidentified lines are skipped on their own
        let lines = match self.parse_header_line(&line) {
            Ok((sv, _, _)) => continuation_lines(sv.constellation).unwrap_or(0),
            Err(_) => 0,
        };
        Ok(skipped + self.skip_continuations(stream, lines)?)
    }

    /// Handles a decoding failure: rewinds to the record start,
    /// then skips the record unless configured to stay there.
    fn recover<S: BufRead>(&self, stream: &mut RecordStream<S>, e: Error) -> Error {
        if let Err(closed) = stream.restore() {
            return closed;
        }
        if !self.config.rewind_on_error {
            if let Err(e) = self.skip_record(stream) {
                return e;
            }
        }
        e
    }

    /// Decodes the next record.
    /// [Error::EndOfInput] once the stream is exhausted.
    /// On [Error::Format] no partial record is returned: the stream either
    /// points to the failing record or past it, see [CodecConfig].
    /// Records of constellations we cannot model are always consumed entirely.
    pub fn decode<S: BufRead>(&self, stream: &mut RecordStream<S>) -> Result<NavRecord, Error> {
        stream.checkpoint();
        let (sv, toc, clock) = match self.read_header(stream) {
            Ok(header) => header,
            Err(Error::EndOfInput) => {
                stream.commit();
                return Err(Error::EndOfInput);
            },
            Err(e) => return Err(self.recover(stream, e)),
        };
        let header_line = stream.line_number();

        if !is_supported(sv.constellation) {
            stream.commit();
            let lines = continuation_lines(sv.constellation).unwrap_or(0);
            self.skip_continuations(stream, lines)?;
            let e = Error::format(
                ParsingError::UnsupportedConstellation(sv.constellation),
                header_line,
            );
            return Err(stream.fail(e));
        }

        let mut record = NavRecord::new(sv, toc, clock);
        if let Err(e) = self.read_continuations(stream, &mut record) {
            return Err(self.recover(stream, e));
        }
        stream.commit();

        if self.config.debug {
            debug!("{}:{} decoded {}", stream.name(), header_line, record);
        }
        Ok(record)
    }

    /// Decodes the next record into an [Ephemeris]
    pub fn decode_ephemeris<S: BufRead>(
        &self,
        stream: &mut RecordStream<S>,
    ) -> Result<Ephemeris, Error> {
        let record = self.decode(stream)?;
        Ephemeris::from_record(&record, self.config.validity)
            .map_err(|e| stream.fail(Error::format(e, stream.line_number())))
    }

    fn format_header_line(&self, record: &NavRecord) -> String {
        let (y, m, d, hh, mm, ss, ns) = record.toc.gregorian();
        let mut clock = record.clock;
        let line = if self.version.is_legacy() {
            if record.sv.constellation == Constellation::Glonass {
                clock[2] -=
                    (record.toc.seconds_of_week() / SECONDS_PER_DAY).floor() * SECONDS_PER_DAY;
            }
            let seconds = ss as f64 + ns as f64 * 1.0E-9;
            format!(
                "{:2} {:02} {:2} {:2} {:2} {:2}{:5.1}",
                record.sv.prn,
                y.rem_euclid(100),
                m,
                d,
                hh,
                mm,
                seconds
            )
        } else {
            format!(
                "{} {:04} {:02} {:02} {:02} {:02} {:02}",
                record.sv, y, m, d, hh, mm, ss
            )
        };
        clock
            .iter()
            .fold(line, |line, term| line + &format_field(*term))
    }

    /// Formats a record into its physical lines.
    /// Omitted fields are rendered as zero.
    pub fn format_record(&self, record: &NavRecord) -> Result<Vec<String>, ParsingError> {
        let constellation = record.sv.constellation;
        if !is_supported(constellation) {
            return Err(ParsingError::UnsupportedConstellation(constellation));
        }
        if self.version.is_legacy() && self.constellation != Some(constellation) {
            return Err(ParsingError::NoConstellation);
        }
        let indent = " ".repeat(self.version.indent());
        let mut lines = Vec::with_capacity(record.lines() + 1);
        lines.push(self.format_header_line(record));
        for chunk in record.fields.chunks(FIELDS_PER_LINE) {
            let mut line = indent.clone();
            for index in 0..FIELDS_PER_LINE {
                line.push_str(&format_field(chunk.get(index).copied().unwrap_or(0.0)));
            }
            lines.push(line);
        }
        Ok(lines)
    }

    /// Encodes one record
    pub fn encode<W: Write>(
        &self,
        record: &NavRecord,
        stream: &mut RecordStream<W>,
    ) -> Result<(), Error> {
        let lines = self
            .format_record(record)
            .map_err(|e| stream.fail(Error::format(e, stream.line_number() + 1)))?;
        for line in lines {
            stream.write_record(&line)?;
        }
        if self.config.debug {
            debug!("{}: encoded {}", stream.name(), record);
        }
        Ok(())
    }

    /// Encodes one [Ephemeris]
    pub fn encode_ephemeris<W: Write>(
        &self,
        ephemeris: &Ephemeris,
        stream: &mut RecordStream<W>,
    ) -> Result<(), Error> {
        self.encode(&ephemeris.to_record(), stream)
    }
}
