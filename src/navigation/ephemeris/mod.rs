//! Ephemeris models, one per constellation, wrapped in [Ephemeris]
mod beidou;
mod galileo;
mod glonass;
mod gps;
mod kepler;
mod legacy;

pub use beidou::BeiDouEphemeris;
pub use galileo::{DataSources, GalileoEphemeris};
pub use glonass::GlonassEphemeris;
pub use gps::GpsEphemeris;
pub use kepler::{Kepler, KeplerOrbit, Perturbations, SvClock};
pub use legacy::{ura_index, ura_meters, LegacyGpsEphemeris};

use std::cmp::Ordering;

use crate::{
    error::{Error, ParsingError},
    navigation::{
        record::NavRecord,
        validity::{Validity, ValidityPolicy},
    },
    prelude::{Constellation, SV},
    time::{GnssTime, FULL_WEEK, HALF_WEEK},
};

/// Resolves a broadcast transmission time against the ToE week.
/// Values within the week are assumed to lie within half a week of ToE,
/// anything else is an offset to the start of the ToE week.
pub(crate) fn transmission_time(toe: GnssTime, raw: f64) -> GnssTime {
    let (toe_week, toe_sow) = toe.week_seconds();
    if !(0.0..FULL_WEEK).contains(&raw) {
        return GnssTime::from_week_seconds(toe.system(), toe_week, raw);
    }
    let week = if raw - toe_sow > HALF_WEEK {
        toe_week.saturating_sub(1)
    } else if raw - toe_sow < -HALF_WEEK {
        toe_week + 1
    } else {
        toe_week
    };
    GnssTime::from_week_seconds(toe.system(), week, raw)
}

/// Transmission time expressed relative to the start of the ToE week
pub(crate) fn transmission_time_field(toe: GnssTime, transmission: GnssTime) -> f64 {
    let week_start = GnssTime::from_week_seconds(toe.system(), toe.week(), 0.0);
    (transmission - week_start).to_seconds()
}

/// [Ephemeris] is the model decoded from one NAV record.
/// [Ephemeris::LegacyGps] and [Ephemeris::Gps] share the same content,
/// the former marks models built from (or destined to) a [LegacyGpsEphemeris].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ephemeris {
    LegacyGps(GpsEphemeris),
    Gps(GpsEphemeris),
    Glonass(GlonassEphemeris),
    Galileo(GalileoEphemeris),
    BeiDou(BeiDouEphemeris),
    Qzss(GpsEphemeris),
}

impl Ephemeris {
    /// Builds the model matching the record constellation
    /// and derives its validity window.
    pub fn from_record(record: &NavRecord, policy: ValidityPolicy) -> Result<Self, ParsingError> {
        match record.sv.constellation {
            Constellation::GPS => Ok(Self::Gps(GpsEphemeris::from_record(record, policy))),
            Constellation::QZSS => Ok(Self::Qzss(GpsEphemeris::from_record(record, policy))),
            Constellation::Glonass => Ok(Self::Glonass(GlonassEphemeris::from_record(
                record, policy,
            ))),
            Constellation::Galileo => Ok(Self::Galileo(GalileoEphemeris::from_record(
                record, policy,
            ))),
            Constellation::BeiDou => Ok(Self::BeiDou(BeiDouEphemeris::from_record(
                record, policy,
            ))),
            c => Err(ParsingError::UnsupportedConstellation(c)),
        }
    }

    /// Builds the raw field table. Unused slots are zero.
    pub fn to_record(&self) -> NavRecord {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => eph.to_record(),
            Self::Glonass(eph) => eph.to_record(),
            Self::Galileo(eph) => eph.to_record(),
            Self::BeiDou(eph) => eph.to_record(),
        }
    }

    pub fn sv(&self) -> SV {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => eph.sv,
            Self::Glonass(eph) => eph.sv,
            Self::Galileo(eph) => eph.sv,
            Self::BeiDou(eph) => eph.sv,
        }
    }

    pub fn constellation(&self) -> Constellation {
        self.sv().constellation
    }

    /// Clock epoch
    pub fn toc(&self) -> GnssTime {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => eph.toc,
            Self::Glonass(eph) => eph.toc,
            Self::Galileo(eph) => eph.toc,
            Self::BeiDou(eph) => eph.toc,
        }
    }

    /// Ephemeris epoch. GLONASS models do not have one.
    pub fn toe(&self) -> Option<GnssTime> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => Some(eph.toe),
            Self::Glonass(_) => None,
            Self::Galileo(eph) => Some(eph.toe),
            Self::BeiDou(eph) => Some(eph.toe),
        }
    }

    /// Epoch the orbit is referenced to: ToE, or ToC for GLONASS
    pub fn reference_epoch(&self) -> GnssTime {
        self.toe().unwrap_or_else(|| self.toc())
    }

    pub fn clock(&self) -> SvClock {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => eph.clock,
            Self::Glonass(eph) => eph.clock,
            Self::Galileo(eph) => eph.clock,
            Self::BeiDou(eph) => eph.clock,
        }
    }

    /// Keplerian orbit, for all but GLONASS
    pub fn orbit(&self) -> Option<&KeplerOrbit> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => Some(&eph.orbit),
            Self::Glonass(_) => None,
            Self::Galileo(eph) => Some(&eph.orbit),
            Self::BeiDou(eph) => Some(&eph.orbit),
        }
    }

    /// Health indicator, as broadcast
    pub fn health(&self) -> u16 {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => eph.health,
            Self::Glonass(eph) => eph.health,
            Self::Galileo(eph) => eph.health,
            Self::BeiDou(eph) => eph.sat_h1,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.health() == 0
    }

    /// Ranging accuracy (m). GLONASS does not broadcast one.
    pub fn accuracy(&self) -> Option<f64> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => Some(eph.accuracy),
            Self::Glonass(_) => None,
            Self::Galileo(eph) => Some(eph.sisa),
            Self::BeiDou(eph) => Some(eph.accuracy),
        }
    }

    /// Validity window. [Error::DataNotLoaded] until it was computed.
    pub fn validity(&self) -> Result<Validity, Error> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => eph.validity(),
            Self::Glonass(eph) => eph.validity(),
            Self::Galileo(eph) => eph.validity(),
            Self::BeiDou(eph) => eph.validity(),
        }
    }

    /// True if `t` lies within the validity window
    pub fn is_valid(&self, t: &GnssTime) -> Result<bool, Error> {
        Ok(self.validity()?.contains(t))
    }

    /// (Re)computes the validity window
    pub fn compute_validity(&mut self, policy: ValidityPolicy) {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) | Self::Qzss(eph) => {
                eph.compute_validity(policy)
            },
            Self::Glonass(eph) => eph.compute_validity(policy),
            Self::Galileo(eph) => eph.compute_validity(policy),
            Self::BeiDou(eph) => eph.compute_validity(policy),
        }
    }

    /// GPS content, legacy or not
    pub fn as_gps(&self) -> Option<&GpsEphemeris> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) => Some(eph),
            _ => None,
        }
    }

    /// Relabels a legacy GPS model as [Ephemeris::Gps]
    pub fn to_gps(self) -> Result<Self, Error> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) => Ok(Self::Gps(eph)),
            other => Err(Error::TypeMismatch {
                expected: Constellation::GPS,
                found: other.constellation(),
            }),
        }
    }

    /// Relabels a GPS model as [Ephemeris::LegacyGps]
    pub fn to_legacy_gps(self) -> Result<Self, Error> {
        match self {
            Self::LegacyGps(eph) | Self::Gps(eph) => Ok(Self::LegacyGps(eph)),
            other => Err(Error::TypeMismatch {
                expected: Constellation::GPS,
                found: other.constellation(),
            }),
        }
    }

    /// One line, human readable, summary
    pub fn dump(&self) -> String {
        let validity = match self.validity() {
            Ok(validity) => format!("[{}, {})", validity.begin, validity.end),
            Err(_) => "undetermined".to_string(),
        };
        let label = match self {
            Self::LegacyGps(_) => "legacy GPS",
            Self::Gps(_) => "GPS",
            Self::Glonass(_) => "GLONASS",
            Self::Galileo(_) => "Galileo",
            Self::BeiDou(_) => "BeiDou",
            Self::Qzss(_) => "QZSS",
        };
        let clock = self.clock();
        format!(
            "{} {} toc {} ref {} clock ({:E}, {:E}, {:E}) health {} valid {}",
            self.sv(),
            label,
            self.toc(),
            self.reference_epoch(),
            clock.bias,
            clock.drift,
            clock.drift_rate,
            self.health(),
            validity,
        )
    }
}

impl std::fmt::Display for Ephemeris {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.dump())
    }
}

impl PartialOrd for Ephemeris {
    /// Models are ordered by clock epoch, then by satellite.
    /// Epochs in incompatible time systems do not compare,
    /// neither do distinct models sharing epoch and satellite.
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        match self.toc().partial_cmp(&rhs.toc())? {
            Ordering::Equal => match self.sv().cmp(&rhs.sv()) {
                Ordering::Equal if self != rhs => None,
                ordering => Some(ordering),
            },
            ordering => Some(ordering),
        }
    }
}

impl From<GpsEphemeris> for Ephemeris {
    fn from(eph: GpsEphemeris) -> Self {
        if eph.sv.constellation == Constellation::QZSS {
            Self::Qzss(eph)
        } else {
            Self::Gps(eph)
        }
    }
}

impl From<GlonassEphemeris> for Ephemeris {
    fn from(eph: GlonassEphemeris) -> Self {
        Self::Glonass(eph)
    }
}

impl From<GalileoEphemeris> for Ephemeris {
    fn from(eph: GalileoEphemeris) -> Self {
        Self::Galileo(eph)
    }
}

impl From<BeiDouEphemeris> for Ephemeris {
    fn from(eph: BeiDouEphemeris) -> Self {
        Self::BeiDou(eph)
    }
}

impl TryFrom<Ephemeris> for GpsEphemeris {
    type Error = Error;
    fn try_from(eph: Ephemeris) -> Result<Self, Error> {
        match eph {
            Ephemeris::LegacyGps(eph) | Ephemeris::Gps(eph) | Ephemeris::Qzss(eph) => Ok(eph),
            other => Err(Error::TypeMismatch {
                expected: Constellation::GPS,
                found: other.constellation(),
            }),
        }
    }
}

impl TryFrom<Ephemeris> for GlonassEphemeris {
    type Error = Error;
    fn try_from(eph: Ephemeris) -> Result<Self, Error> {
        match eph {
            Ephemeris::Glonass(eph) => Ok(eph),
            other => Err(Error::TypeMismatch {
                expected: Constellation::Glonass,
                found: other.constellation(),
            }),
        }
    }
}

impl TryFrom<Ephemeris> for GalileoEphemeris {
    type Error = Error;
    fn try_from(eph: Ephemeris) -> Result<Self, Error> {
        match eph {
            Ephemeris::Galileo(eph) => Ok(eph),
            other => Err(Error::TypeMismatch {
                expected: Constellation::Galileo,
                found: other.constellation(),
            }),
        }
    }
}

impl TryFrom<Ephemeris> for BeiDouEphemeris {
    type Error = Error;
    fn try_from(eph: Ephemeris) -> Result<Self, Error> {
        match eph {
            Ephemeris::BeiDou(eph) => Ok(eph),
            other => Err(Error::TypeMismatch {
                expected: Constellation::BeiDou,
                found: other.constellation(),
            }),
        }
    }
}

impl From<LegacyGpsEphemeris> for Ephemeris {
    fn from(legacy: LegacyGpsEphemeris) -> Self {
        legacy.to_ephemeris(ValidityPolicy::default())
    }
}
