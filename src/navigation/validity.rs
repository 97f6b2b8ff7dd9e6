//! Validity window derivation
use hifitime::{Duration, Unit};

use crate::{navigation::fit::DEFAULT_FIT_INTERVAL_HOURS, time::GnssTime};

/// GLONASS ephemerides are refreshed every 30 minutes
/// and remain usable 15 minutes either side of ToC
pub const GLONASS_HALF_WINDOW_MINUTES: f64 = 15.0;

/// Upload cycle: ToC off this grid reveals a mid-cycle upload
const UPLOAD_CYCLE_SECONDS: u32 = 7200;

/// Transmission times are resolved on this grid
const TRANSMISSION_GRID_SECONDS: u32 = 30;

/// How the validity window of a keplerian ephemeris is derived.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValidityPolicy {
    /// Signal in space interface derivation:
    /// begins at the (30 s floored) transmission time for mid-cycle uploads,
    /// or half a fit interval ahead of ToE otherwise.
    /// Ends half a fit interval after ToE rounded up to the hour.
    #[default]
    SignalInSpace,
    /// Begins at ToE and ends half a fit interval later.
    ToeCentered,
}

/// [Validity] is the half-open `[begin, end)` interval
/// during which an ephemeris may be used.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Validity {
    /// First valid instant
    pub begin: GnssTime,
    /// First instant past validity
    pub end: GnssTime,
}

impl Validity {
    /// True if `begin <= t < end`.
    /// Instants in an incompatible time system are never contained.
    pub fn contains(&self, t: &GnssTime) -> bool {
        self.begin <= *t && *t < self.end
    }

    /// Window length
    pub fn duration(&self) -> Duration {
        self.end - self.begin
    }

    /// Window for keplerian models (GPS, QZSS, Galileo, BeiDou).
    /// Fit intervals shorter than [DEFAULT_FIT_INTERVAL_HOURS] are widened to it,
    /// so the window is never empty.
    pub(crate) fn keplerian(
        toc: GnssTime,
        toe: GnssTime,
        transmission: GnssTime,
        fit_interval_hours: u16,
        policy: ValidityPolicy,
    ) -> Self {
        let half_fit = (fit_interval_hours.max(DEFAULT_FIT_INTERVAL_HOURS) / 2) as f64;
        match policy {
            ValidityPolicy::ToeCentered => Self {
                begin: toe,
                end: toe.add_hours(half_fit),
            },
            ValidityPolicy::SignalInSpace => {
                let end = toe.ceil(3600).add_hours(half_fit);
                let nominal = toe.add_hours(-half_fit);
                let begin = if toc.is_aligned(UPLOAD_CYCLE_SECONDS) {
                    nominal
                } else {
                    transmission.floor(TRANSMISSION_GRID_SECONDS)
                };
                if begin < end {
                    Self { begin, end }
                } else {
                    // transmission time past the fit interval
                    Self {
                        begin: nominal,
                        end,
                    }
                }
            },
        }
    }

    /// Window for GLONASS models, centered on ToC
    pub(crate) fn glonass(toc: GnssTime) -> Self {
        let half = Unit::Minute * GLONASS_HALF_WINDOW_MINUTES;
        Self {
            begin: toc - half,
            end: toc + half,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::time::TimeSystem;

    fn gpst(week: u32, sow: f64) -> GnssTime {
        GnssTime::from_week_seconds(TimeSystem::GPS, week, sow)
    }

    #[test]
    fn nominal_upload() {
        let toc = gpst(2000, 7200.0);
        let validity = Validity::keplerian(
            toc,
            toc,
            gpst(2000, 1800.0),
            4,
            ValidityPolicy::SignalInSpace,
        );
        assert_eq!(validity.begin.week_seconds(), (2000, 0.0));
        assert_eq!(validity.end.week_seconds(), (2000, 14400.0));
        assert!(validity.contains(&validity.begin));
        assert!(!validity.contains(&validity.end));
    }

    #[test]
    fn mid_cycle_upload() {
        let toc = gpst(2000, 9000.0);
        let validity = Validity::keplerian(
            toc,
            toc,
            gpst(2000, 5423.0),
            4,
            ValidityPolicy::SignalInSpace,
        );
        // floored to 30s
        assert_eq!(validity.begin.week_seconds(), (2000, 5400.0));
        // 9000 rounded up to 10800, plus 2h
        assert_eq!(validity.end.week_seconds(), (2000, 18000.0));
    }

    #[test]
    fn week_rollover() {
        let toe = gpst(2000, 604000.0);
        let validity = Validity::keplerian(
            toe,
            toe,
            gpst(2000, 597600.0),
            4,
            ValidityPolicy::SignalInSpace,
        );
        assert_eq!(validity.begin.week_seconds(), (2000, 597600.0));
        // 604000 rounds up to 604800 (next hour), plus 2h, minus a week
        assert_eq!(validity.end.week_seconds(), (2001, 7200.0));
        assert_eq!(validity.end.week(), validity.begin.week() + 1);
        assert!(validity.contains(&gpst(2001, 7199.0)));
        assert!(!validity.contains(&gpst(2001, 7200.0)));
    }

    #[test]
    fn late_transmission() {
        let toc = gpst(2000, 9000.0);
        let validity = Validity::keplerian(
            toc,
            toc,
            gpst(2000, 30000.0),
            4,
            ValidityPolicy::SignalInSpace,
        );
        assert!(validity.begin < validity.end);
        assert_eq!(validity.begin.week_seconds(), (2000, 1800.0));
    }

    #[test]
    fn toe_centered() {
        let toe = gpst(2000, 9000.0);
        let validity =
            Validity::keplerian(toe, toe, gpst(2000, 0.0), 6, ValidityPolicy::ToeCentered);
        assert_eq!(validity.begin, toe);
        assert_eq!(validity.end.week_seconds(), (2000, 19800.0));
    }

    #[test]
    fn short_fit_interval() {
        let toc = gpst(2000, 7200.0);
        for fit in [0, 1, 3] {
            for policy in [ValidityPolicy::SignalInSpace, ValidityPolicy::ToeCentered] {
                let validity = Validity::keplerian(toc, toc, toc, fit, policy);
                assert!(validity.begin < validity.end, "{} {:?}", fit, policy);
                assert!(validity.contains(&toc));
            }
        }
        let validity = Validity::keplerian(toc, toc, toc, 0, ValidityPolicy::SignalInSpace);
        assert_eq!(validity.begin.week_seconds(), (2000, 0.0));
        assert_eq!(validity.end.week_seconds(), (2000, 14400.0));
    }

    #[test]
    fn glonass() {
        let toc = GnssTime::from_gregorian(TimeSystem::GLO, 2020, 6, 25, 0, 15, 0.0).unwrap();
        let validity = Validity::glonass(toc);
        assert_eq!(validity.duration(), Unit::Minute * 30.0);
        assert!(validity.contains(&toc));
        let gps = toc.with_system(TimeSystem::GPS);
        assert!(!validity.contains(&gps));
    }
}
