//! Time system tagged instants, with week / seconds-of-week arithmetic.
use std::cmp::Ordering;
use std::ops::{Add, Sub};

use hifitime::{Duration, Epoch, TimeScale, Unit};

use crate::error::ParsingError;
use crate::prelude::Constellation;

/// Seconds in one week
pub const FULL_WEEK: f64 = 604_800.0;

/// Seconds in half a week
pub const HALF_WEEK: f64 = 302_400.0;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_WEEK: i128 = 604_800 * NANOS_PER_SECOND;

lazy_static! {
    static ref GPS_ORIGIN: Epoch = Epoch::from_gregorian(1980, 1, 6, 0, 0, 0, 0, TimeScale::TAI);
    static ref BDT_ORIGIN: Epoch = Epoch::from_gregorian(2006, 1, 1, 0, 0, 0, 0, TimeScale::TAI);
}

/// [TimeSystem] tags a [GnssTime].
/// [TimeSystem::Any] is a wildcard that compares with all other systems.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeSystem {
    #[default]
    Any,
    GPS,
    GLO,
    GAL,
    BDT,
    QZS,
}

impl std::fmt::Display for TimeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::GPS => write!(f, "GPS"),
            Self::GLO => write!(f, "GLO"),
            Self::GAL => write!(f, "GAL"),
            Self::BDT => write!(f, "BDT"),
            Self::QZS => write!(f, "QZS"),
        }
    }
}

impl TimeSystem {
    /// Time system a [Constellation] broadcasts in.
    /// SBAS follows GPS. Unknown systems map to [TimeSystem::Any].
    pub fn from_constellation(c: Constellation) -> Self {
        match c {
            Constellation::GPS => Self::GPS,
            Constellation::Glonass => Self::GLO,
            Constellation::Galileo => Self::GAL,
            Constellation::BeiDou => Self::BDT,
            Constellation::QZSS => Self::QZS,
            c if c.is_sbas() => Self::GPS,
            _ => Self::Any,
        }
    }
    /// True if instants expressed in both systems may be compared
    pub fn compatible(&self, rhs: Self) -> bool {
        *self == Self::Any || rhs == Self::Any || *self == rhs
    }
    /// [TimeScale] to use when converting to a true [Epoch]
    pub fn timescale(&self) -> TimeScale {
        match self {
            Self::Any | Self::GPS | Self::QZS => TimeScale::GPST,
            Self::GLO => TimeScale::UTC,
            Self::GAL => TimeScale::GST,
            Self::BDT => TimeScale::BDT,
        }
    }
    fn origin(&self) -> Epoch {
        match self {
            Self::BDT => *BDT_ORIGIN,
            _ => *GPS_ORIGIN,
        }
    }
}

/// [GnssTime] is a calendar instant expressed in a given [TimeSystem].
/// Arithmetic is carried out on the system's own continuous count,
/// which makes week / seconds-of-week conversions exact.
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GnssTime {
    /// Naive instant, TAI scale is only used as continuous storage
    epoch: Epoch,
    /// [TimeSystem] this instant is expressed in
    system: TimeSystem,
}

impl Default for GnssTime {
    fn default() -> Self {
        Self {
            epoch: *GPS_ORIGIN,
            system: TimeSystem::Any,
        }
    }
}

impl GnssTime {
    /// Builds a [GnssTime] from calendar fields.
    /// Seconds may exceed 59 (RINEX "59 60.0" epochs) and roll over.
    pub fn from_gregorian(
        system: TimeSystem,
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        seconds: f64,
    ) -> Result<Self, ParsingError> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(ParsingError::InvalidDate);
        }
        if hour > 23 || minute > 59 || !(0.0..86_400.0).contains(&seconds) {
            return Err(ParsingError::InvalidDate);
        }
        let base =
            Epoch::maybe_from_gregorian(year, month, day, hour, minute, 0, 0, TimeScale::TAI)
                .map_err(|_| ParsingError::InvalidDate)?;
        let nanos = (seconds * 1.0E9).round() as i128;
        Ok(Self {
            epoch: base + Duration::from_total_nanoseconds(nanos),
            system,
        })
    }

    /// Builds a [GnssTime] from week counter and seconds of week
    pub fn from_week_seconds(system: TimeSystem, week: u32, sow: f64) -> Self {
        let nanos = week as i128 * NANOS_PER_WEEK + (sow * 1.0E9).round() as i128;
        Self {
            epoch: system.origin() + Duration::from_total_nanoseconds(nanos),
            system,
        }
    }

    /// Returns the [TimeSystem] tag
    pub fn system(&self) -> TimeSystem {
        self.system
    }

    /// Copies and retags self. The calendar representation is preserved.
    pub fn with_system(&self, system: TimeSystem) -> Self {
        Self {
            epoch: self.epoch,
            system,
        }
    }

    fn nanos_since_origin(&self) -> i128 {
        (self.epoch - self.system.origin()).total_nanoseconds()
    }

    /// Returns (week counter, seconds of week)
    pub fn week_seconds(&self) -> (u32, f64) {
        let nanos = self.nanos_since_origin();
        let week = nanos.div_euclid(NANOS_PER_WEEK).max(0) as u32;
        let sow = nanos.rem_euclid(NANOS_PER_WEEK) as f64 / 1.0E9;
        (week, sow)
    }

    /// Returns the week counter
    pub fn week(&self) -> u32 {
        self.week_seconds().0
    }

    /// Returns the seconds elapsed within current week
    pub fn seconds_of_week(&self) -> f64 {
        self.week_seconds().1
    }

    /// True if seconds of week is an exact multiple of given number of seconds
    pub fn is_aligned(&self, seconds: u32) -> bool {
        let step = seconds as i128 * NANOS_PER_SECOND;
        step > 0 && self.nanos_since_origin().rem_euclid(NANOS_PER_WEEK) % step == 0
    }

    /// Rounds down to the previous multiple of `seconds`
    pub fn floor(&self, seconds: u32) -> Self {
        let step = seconds as i128 * NANOS_PER_SECOND;
        if step == 0 {
            return *self;
        }
        let rem = self.nanos_since_origin().rem_euclid(step);
        Self {
            epoch: self.epoch - Duration::from_total_nanoseconds(rem),
            system: self.system,
        }
    }

    /// Rounds up to the next multiple of `seconds`, unless already aligned
    pub fn ceil(&self, seconds: u32) -> Self {
        let step = seconds as i128 * NANOS_PER_SECOND;
        if step == 0 {
            return *self;
        }
        let rem = self.nanos_since_origin().rem_euclid(step);
        if rem == 0 {
            *self
        } else {
            Self {
                epoch: self.epoch + Duration::from_total_nanoseconds(step - rem),
                system: self.system,
            }
        }
    }

    /// Returns (year, month, day, hours, minutes, seconds, nanos)
    pub fn gregorian(&self) -> (i32, u8, u8, u8, u8, u8, u32) {
        self.epoch.to_gregorian_tai()
    }

    /// Converts to a true [Epoch], expressed in the [TimeScale] of this system
    pub fn to_epoch(&self) -> Epoch {
        let (y, m, d, hh, mm, ss, ns) = self.gregorian();
        Epoch::from_gregorian(y, m, d, hh, mm, ss, ns, self.system.timescale())
    }
}

impl std::fmt::Display for GnssTime {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (y, m, d, hh, mm, ss, ns) = self.gregorian();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            y, m, d, hh, mm, ss
        )?;
        if ns > 0 {
            write!(f, ".{:09}", ns)?;
        }
        write!(f, " {}", self.system)
    }
}

impl PartialEq for GnssTime {
    fn eq(&self, rhs: &Self) -> bool {
        self.system.compatible(rhs.system) && self.epoch == rhs.epoch
    }
}

impl PartialOrd for GnssTime {
    /// Instants only compare when their systems are compatible
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        if self.system.compatible(rhs.system) {
            self.epoch.partial_cmp(&rhs.epoch)
        } else {
            None
        }
    }
}

impl Add<Duration> for GnssTime {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        Self {
            epoch: self.epoch + rhs,
            system: self.system,
        }
    }
}

impl Sub<Duration> for GnssTime {
    type Output = Self;
    fn sub(self, rhs: Duration) -> Self {
        Self {
            epoch: self.epoch - rhs,
            system: self.system,
        }
    }
}

impl Sub for GnssTime {
    type Output = Duration;
    /// Elapsed time between two instants, regardless of their tags
    fn sub(self, rhs: Self) -> Duration {
        self.epoch - rhs.epoch
    }
}

impl GnssTime {
    /// Key used for total ordering in collections: time systems are ignored
    pub(crate) fn sort_key(&self) -> Epoch {
        self.epoch
    }
    /// Shorthand to add hours
    pub(crate) fn add_hours(&self, hours: f64) -> Self {
        *self + Unit::Hour * hours
    }
}
