//! BeiDou D1/D2 ephemeris
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

/// [BeiDouEphemeris]. Epochs are expressed in BDT.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeiDouEphemeris {
    pub sv: SV,
    pub toc: GnssTime,
    pub clock: SvClock,
    pub toe: GnssTime,
    pub orbit: KeplerOrbit,
    /// Age of data, ephemeris
    pub aode: u16,
    /// Age of data, clock
    pub aodc: u16,
    /// User range accuracy (m)
    pub accuracy: f64,
    /// Autonomous satellite health flag
    pub sat_h1: u16,
    /// B1/B3 group delay (s)
    pub tgd1: f64,
    /// B2/B3 group delay (s)
    pub tgd2: f64,
    pub transmission: GnssTime,
    pub(crate) validity: Option<Validity>,
}

impl BeiDouEphemeris {
    pub const FIT_INTERVAL_HOURS: u16 = DEFAULT_FIT_INTERVAL_HOURS;

    pub(crate) fn from_record(record: &NavRecord, policy: ValidityPolicy) -> Self {
        let f = &record.fields;
        let toe = GnssTime::from_week_seconds(TimeSystem::BDT, f[18].max(0.0) as u32, f[8]);
        let mut eph = Self {
            sv: record.sv,
            toc: record.toc,
            clock: SvClock::from_fields(record.clock),
            toe,
            orbit: KeplerOrbit::from_fields(f),
            aode: f[0] as u16,
            accuracy: f[20],
            sat_h1: f[21] as u16,
            tgd1: f[22],
            tgd2: f[23],
            transmission: transmission_time(toe, f[24]),
            aodc: f[25] as u16,
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
        f[0] = self.aode as f64;
        f[8] = toe;
        f[18] = week as f64;
        f[20] = self.accuracy;
        f[21] = self.sat_h1 as f64;
        f[22] = self.tgd1;
        f[23] = self.tgd2;
        f[24] = transmission_time_field(self.toe, self.transmission);
        f[25] = self.aodc as f64;
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
