//! GPS and QZSS legacy navigation (LNAV) ephemeris
use crate::{
    error::Error,
    navigation::{
        ephemeris::{transmission_time, transmission_time_field, KeplerOrbit, SvClock},
        fit::{fit_interval_flag, fit_interval_hours},
        record::NavRecord,
        validity::{Validity, ValidityPolicy},
    },
    prelude::SV,
    time::{GnssTime, TimeSystem},
};

/// [GpsEphemeris] is shared by GPS and QZSS,
/// which broadcast the same message layout.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsEphemeris {
    /// Satellite
    pub sv: SV,
    /// Clock epoch
    pub toc: GnssTime,
    /// Clock polynomial
    pub clock: SvClock,
    /// Ephemeris epoch
    pub toe: GnssTime,
    /// Orbit
    pub orbit: KeplerOrbit,
    /// Issue of data, ephemeris
    pub iode: u16,
    /// Issue of data, clock
    pub iodc: u16,
    /// Codes on L2 channel
    pub code_flags: u8,
    /// L2 P data flag
    pub l2p_flag: bool,
    /// User range accuracy (m)
    pub accuracy: f64,
    /// Health bits (0 is healthy)
    pub health: u16,
    /// Group delay (s)
    pub tgd: f64,
    /// Curve fit interval (hours)
    pub fit_interval_hours: u16,
    /// Curve fit interval flag, as broadcast
    pub fit_interval_flag: u8,
    /// Transmission time of message
    pub transmission: GnssTime,
    pub(crate) validity: Option<Validity>,
}

impl GpsEphemeris {
    pub(crate) fn from_record(record: &NavRecord, policy: ValidityPolicy) -> Self {
        let f = &record.fields;
        let system = TimeSystem::from_constellation(record.sv.constellation);
        let week = f[18].max(0.0) as u32;
        let toe = GnssTime::from_week_seconds(system, week, f[8]);
        let iodc = f[23] as u16;

        // 0 / 1 are flags, anything else is expressed in hours already
        let (fit_interval_hours, fit_interval_flag) = match f[25] as u16 {
            raw @ (0 | 1) => (fit_interval_hours(iodc as i32, raw as u8), raw as u8),
            hours => (hours, fit_interval_flag(hours)),
        };

        let mut eph = Self {
            sv: record.sv,
            toc: record.toc,
            clock: SvClock::from_fields(record.clock),
            toe,
            orbit: KeplerOrbit::from_fields(f),
            iode: f[0] as u16,
            iodc,
            code_flags: f[17] as u8,
            l2p_flag: f[19] != 0.0,
            accuracy: f[20],
            health: f[21] as u16,
            tgd: f[22],
            fit_interval_hours,
            fit_interval_flag,
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
        f[0] = self.iode as f64;
        f[8] = toe;
        f[17] = self.code_flags as f64;
        f[18] = week as f64;
        f[19] = if self.l2p_flag { 1.0 } else { 0.0 };
        f[20] = self.accuracy;
        f[21] = self.health as f64;
        f[22] = self.tgd;
        f[23] = self.iodc as f64;
        f[24] = transmission_time_field(self.toe, self.transmission);
        f[25] = self.fit_interval_hours as f64;
        record
    }

    /// (Re)computes the validity window
    pub fn compute_validity(&mut self, policy: ValidityPolicy) {
        self.validity = Some(Validity::keplerian(
            self.toc,
            self.toe,
            self.transmission,
            self.fit_interval_hours,
            policy,
        ));
    }

    /// Validity window, once computed
    pub fn validity(&self) -> Result<Validity, Error> {
        self.validity.ok_or(Error::DataNotLoaded("validity"))
    }

    /// True if this ephemeris is healthy
    pub fn is_healthy(&self) -> bool {
        self.health == 0
    }
}
