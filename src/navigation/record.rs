//! Raw NAV record: header plus continuation fields
use crate::{
    navigation::fields::FIELDS_PER_LINE,
    prelude::{Constellation, SV},
    time::GnssTime,
};

/// Number of continuation lines following the header line of a record,
/// for all constellations we know the layout of (supported or not).
pub fn continuation_lines(constellation: Constellation) -> Option<usize> {
    match constellation {
        Constellation::GPS
        | Constellation::QZSS
        | Constellation::Galileo
        | Constellation::BeiDou
        | Constellation::IRNSS => Some(7),
        Constellation::Glonass => Some(3),
        c if c.is_sbas() => Some(3),
        _ => None,
    }
}

/// True if records of this constellation can be turned into an ephemeris
pub fn is_supported(constellation: Constellation) -> bool {
    matches!(
        constellation,
        Constellation::GPS
            | Constellation::QZSS
            | Constellation::Galileo
            | Constellation::BeiDou
            | Constellation::Glonass
    )
}

/// [NavRecord] is the raw content of one record:
/// header line (satellite, clock epoch, three clock terms)
/// then 4 fields per continuation line, in broadcast order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavRecord {
    pub sv: SV,
    /// Clock epoch (ToC)
    pub toc: GnssTime,
    /// Three clock terms of the header line
    pub clock: [f64; 3],
    /// Continuation fields, zero when omitted
    pub fields: Vec<f64>,
}

impl NavRecord {
    /// Builds a record with a zeroed field table, sized for this constellation
    pub fn new(sv: SV, toc: GnssTime, clock: [f64; 3]) -> Self {
        let lines = continuation_lines(sv.constellation).unwrap_or(0);
        Self {
            sv,
            toc,
            clock,
            fields: vec![0.0; lines * FIELDS_PER_LINE],
        }
    }

    /// Number of continuation lines
    pub fn lines(&self) -> usize {
        self.fields.len() / FIELDS_PER_LINE
    }
}

impl std::fmt::Display for NavRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} clock ({:E}, {:E}, {:E}) {} fields",
            self.sv,
            self.toc,
            self.clock[0],
            self.clock[1],
            self.clock[2],
            self.fields.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layouts() {
        assert_eq!(continuation_lines(Constellation::GPS), Some(7));
        assert_eq!(continuation_lines(Constellation::Glonass), Some(3));
        assert_eq!(continuation_lines(Constellation::IRNSS), Some(7));
        assert_eq!(continuation_lines(Constellation::SBAS), Some(3));
        assert_eq!(continuation_lines(Constellation::Mixed), None);
        assert!(is_supported(Constellation::QZSS));
        assert!(!is_supported(Constellation::IRNSS));

        let record = NavRecord::new(
            SV::new(Constellation::Glonass, 1),
            GnssTime::default(),
            [0.0; 3],
        );
        assert_eq!(record.fields.len(), 12);
        assert_eq!(record.lines(), 3);
    }
}
