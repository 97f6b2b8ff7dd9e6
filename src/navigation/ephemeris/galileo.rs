//! Galileo I/NAV and F/NAV ephemeris
use bitflags::bitflags;

use crate::{
    error::Error,
    navigation::{
        ephemeris::{transmission_time, transmission_time_field, KeplerOrbit, SvClock},
        fit::DEFAULT_FIT_INTERVAL_HOURS,
        record::NavRecord,
        validity::{Validity, ValidityPolicy},
    },
    prelude::SV,
    time::{GnssTime, TimeSystem},
};

bitflags! {
    /// Galileo data sources: which message and which
    /// frequency pair the clock terms refer to.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct DataSources: u16 {
        const INAV_E1B = 0x01;
        const FNAV_E5A = 0x02;
        const INAV_E5B = 0x04;
        const CLOCK_E5A_E1 = 0x100;
        const CLOCK_E5B_E1 = 0x200;
    }
}

/// [GalileoEphemeris]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GalileoEphemeris {
    pub sv: SV,
    pub toc: GnssTime,
    pub clock: SvClock,
    pub toe: GnssTime,
    pub orbit: KeplerOrbit,
    /// Issue of data (navigation)
    pub iodnav: u16,
    /// Message and clock sources
    pub sources: DataSources,
    /// Signal in space accuracy (m)
    pub sisa: f64,
    /// Signal health and data validity bits
    pub health: u16,
    /// Broadcast group delay E5a/E1 (s)
    pub bgd_e5a_e1: f64,
    /// Broadcast group delay E5b/E1 (s)
    pub bgd_e5b_e1: f64,
    pub transmission: GnssTime,
    pub(crate) validity: Option<Validity>,
}

impl GalileoEphemeris {
    /// Data shall not be used beyond this period
    pub const FIT_INTERVAL_HOURS: u16 = DEFAULT_FIT_INTERVAL_HOURS;

    pub(crate) fn from_record(record: &NavRecord, policy: ValidityPolicy) -> Self {
        let f = &record.fields;
        let toe = GnssTime::from_week_seconds(TimeSystem::GAL, f[18].max(0.0) as u32, f[8]);
        let mut eph = Self {
            sv: record.sv,
            toc: record.toc,
            clock: SvClock::from_fields(record.clock),
            toe,
            orbit: KeplerOrbit::from_fields(f),
            iodnav: f[0] as u16,
            sources: DataSources::from_bits_retain(f[17] as u16),
            sisa: f[20],
            health: f[21] as u16,
            bgd_e5a_e1: f[22],
            bgd_e5b_e1: f[23],
            transmission: transmission_time(toe, f[24]),
            validity: None,
        };
        eph.compute_validity(policy);
        eph
    }

    pub(crate) fn to_record(&self) -> NavRecord {
        let mut record = NavRecord::new(self.sv, self.toc, self.clock.fields());
        let f = &mut record.fields;
        self.orbit.fill_fields(f);
        let (week, toe) = self.toe.week_seconds();
        f[0] = self.iodnav as f64;
        f[8] = toe;
        f[17] = self.sources.bits() as f64;
        f[18] = week as f64;
        f[20] = self.sisa;
        f[21] = self.health as f64;
        f[22] = self.bgd_e5a_e1;
        f[23] = self.bgd_e5b_e1;
        f[24] = transmission_time_field(self.toe, self.transmission);
        record
    }

    pub fn compute_validity(&mut self, policy: ValidityPolicy) {
        self.validity = Some(Validity::keplerian(
            self.toc,
            self.toe,
            self.transmission,
            Self::FIT_INTERVAL_HOURS,
            policy,
        ));
    }

    pub fn validity(&self) -> Result<Validity, Error> {
        self.validity.ok_or(Error::DataNotLoaded("validity"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn data_sources() {
        let sources = DataSources::from_bits_retain(258);
        assert!(sources.contains(DataSources::FNAV_E5A));
        assert!(sources.contains(DataSources::CLOCK_E5A_E1));
        assert!(!sources.contains(DataSources::INAV_E1B));
        assert_eq!(sources.bits(), 258);

        let sources = DataSources::from_bits_retain(517);
        assert!(sources.contains(DataSources::INAV_E1B | DataSources::INAV_E5B));
        assert!(sources.contains(DataSources::CLOCK_E5B_E1));
    }
}
