//! Legacy GPS value object: subframe oriented, engineering units.
//! This is the interchange shape expected by external orbit / clock consumers.
use crate::{
    error::Error,
    navigation::{
        ephemeris::{transmission_time, transmission_time_field, Ephemeris, GpsEphemeris},
        ephemeris::{Kepler, KeplerOrbit, Perturbations, SvClock},
        fit::fit_interval_hours,
        validity::ValidityPolicy,
    },
    prelude::{Constellation, SV},
    time::{GnssTime, TimeSystem, FULL_WEEK, HALF_WEEK},
};

/// URA index upper bounds (m), index 15 means no accuracy prediction
const URA_BOUNDS: [f64; 15] = [
    2.4, 3.4, 4.85, 6.85, 9.65, 13.65, 24.0, 48.0, 96.0, 192.0, 384.0, 768.0, 1536.0, 3072.0,
    6144.0,
];

/// Converts an accuracy (m) to its URA index
pub fn ura_index(accuracy: f64) -> u8 {
    URA_BOUNDS
        .iter()
        .position(|bound| accuracy <= *bound)
        .unwrap_or(URA_BOUNDS.len()) as u8
}

/// Nominal accuracy (m) of a URA index: the upper bound of its band
pub fn ura_meters(index: u8) -> f64 {
    URA_BOUNDS
        .get(index as usize)
        .copied()
        .unwrap_or(f64::INFINITY)
}

/// [LegacyGpsEphemeris] keeps all epochs as seconds within the ToE week
/// and carries indices (URA, fit interval flag) rather than physical values.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegacyGpsEphemeris {
    pub prn: u8,
    /// ToE week
    pub week: u32,
    /// Handover word time (seconds, relative to ToE week)
    pub how_time: f64,
    pub toc: f64,
    pub toe: f64,
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
    pub iode: u16,
    pub iodc: u16,
    pub ura_index: u8,
    pub health: u16,
    pub code_flags: u8,
    pub l2p_flag: bool,
    pub tgd: f64,
    pub fit_interval_flag: u8,
    pub sqrt_a: f64,
    pub e: f64,
    pub i_0: f64,
    pub omega_0: f64,
    pub m_0: f64,
    pub omega: f64,
    pub dn: f64,
    pub i_dot: f64,
    pub omega_dot: f64,
    pub cuc: f64,
    pub cus: f64,
    pub crc: f64,
    pub crs: f64,
    pub cic: f64,
    pub cis: f64,
}

impl From<&GpsEphemeris> for LegacyGpsEphemeris {
    fn from(eph: &GpsEphemeris) -> Self {
        let (week, toe) = eph.toe.week_seconds();
        let (toc_week, toc) = eph.toc.week_seconds();
        let kepler = &eph.orbit.kepler;
        let perturbations = &eph.orbit.perturbations;
        Self {
            prn: eph.sv.prn,
            week,
            how_time: transmission_time_field(eph.toe, eph.transmission),
            toc: toc + (toc_week as f64 - week as f64) * FULL_WEEK,
            toe,
            af0: eph.clock.bias,
            af1: eph.clock.drift,
            af2: eph.clock.drift_rate,
            iode: eph.iode,
            iodc: eph.iodc,
            ura_index: ura_index(eph.accuracy),
            health: eph.health,
            code_flags: eph.code_flags,
            l2p_flag: eph.l2p_flag,
            tgd: eph.tgd,
            fit_interval_flag: eph.fit_interval_flag,
            sqrt_a: kepler.sqrt_a(),
            e: kepler.e,
            i_0: kepler.i_0,
            omega_0: kepler.omega_0,
            m_0: kepler.m_0,
            omega: kepler.omega,
            dn: perturbations.dn,
            i_dot: perturbations.i_dot,
            omega_dot: perturbations.omega_dot,
            cuc: perturbations.cuc,
            cus: perturbations.cus,
            crc: perturbations.crc,
            crs: perturbations.crs,
            cic: perturbations.cic,
            cis: perturbations.cis,
        }
    }
}

impl TryFrom<&Ephemeris> for LegacyGpsEphemeris {
    type Error = Error;
    /// Only GPS models (legacy or not) convert
    fn try_from(eph: &Ephemeris) -> Result<Self, Error> {
        match eph {
            Ephemeris::Gps(gps) | Ephemeris::LegacyGps(gps) => Ok(Self::from(gps)),
            other => Err(Error::TypeMismatch {
                expected: Constellation::GPS,
                found: other.constellation(),
            }),
        }
    }
}

impl LegacyGpsEphemeris {
    /// Builds the canonical model. The URA index becomes the upper bound
    /// of its band, the fit interval flag is resolved to hours.
    pub fn to_gps(&self, policy: ValidityPolicy) -> GpsEphemeris {
        let toe = GnssTime::from_week_seconds(TimeSystem::GPS, self.week, self.toe);
        let mut toc = self.toc;
        let mut toc_week = self.week as i64;
        if toc - self.toe > HALF_WEEK {
            toc_week -= 1;
            toc -= FULL_WEEK;
        } else if toc - self.toe < -HALF_WEEK {
            toc_week += 1;
            toc += FULL_WEEK;
        }
        let toc = GnssTime::from_week_seconds(
            TimeSystem::GPS,
            (toc_week.max(0)) as u32,
            toc.rem_euclid(FULL_WEEK),
        );
        let mut eph = GpsEphemeris {
            sv: SV::new(Constellation::GPS, self.prn),
            toc,
            clock: SvClock {
                bias: self.af0,
                drift: self.af1,
                drift_rate: self.af2,
            },
            toe,
            orbit: KeplerOrbit {
                kepler: Kepler {
                    a: self.sqrt_a.powi(2),
                    e: self.e,
                    i_0: self.i_0,
                    omega_0: self.omega_0,
                    m_0: self.m_0,
                    omega: self.omega,
                },
                perturbations: Perturbations {
                    dn: self.dn,
                    i_dot: self.i_dot,
                    omega_dot: self.omega_dot,
                    cuc: self.cuc,
                    cus: self.cus,
                    crc: self.crc,
                    crs: self.crs,
                    cic: self.cic,
                    cis: self.cis,
                },
            },
            iode: self.iode,
            iodc: self.iodc,
            code_flags: self.code_flags,
            l2p_flag: self.l2p_flag,
            accuracy: ura_meters(self.ura_index),
            health: self.health,
            tgd: self.tgd,
            fit_interval_hours: fit_interval_hours(self.iodc as i32, self.fit_interval_flag),
            fit_interval_flag: self.fit_interval_flag,
            transmission: transmission_time(toe, self.how_time),
            validity: None,
        };
        eph.compute_validity(policy);
        eph
    }

    /// Builds the [Ephemeris::LegacyGps] model
    pub fn to_ephemeris(&self, policy: ValidityPolicy) -> Ephemeris {
        Ephemeris::LegacyGps(self.to_gps(policy))
    }
}
