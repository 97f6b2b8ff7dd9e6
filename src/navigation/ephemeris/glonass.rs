//! GLONASS ephemeris: state vector at ToC
use crate::{
    error::Error,
    navigation::{
        ephemeris::SvClock,
        record::NavRecord,
        validity::{Validity, ValidityPolicy},
    },
    prelude::SV,
    time::GnssTime,
};

/// [GlonassEphemeris] describes the satellite state in PZ-90 at ToC,
/// to be integrated by the consumer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlonassEphemeris {
    pub sv: SV,
    /// Reference epoch (UTC(SU) based)
    pub toc: GnssTime,
    /// Clock bias is -TauN, drift is GammaN (relative frequency bias)
    pub clock: SvClock,
    /// Message frame time, seconds of week
    pub frame_time: f64,
    /// Position (km)
    pub position: [f64; 3],
    /// Velocity (km.s⁻¹)
    pub velocity: [f64; 3],
    /// Lunisolar acceleration (km.s⁻²)
    pub acceleration: [f64; 3],
    /// Health (0 is healthy)
    pub health: u16,
    /// Frequency channel number
    pub channel: i8,
    /// Age of operational information (days)
    pub age: u16,
    pub(crate) validity: Option<Validity>,
}

impl GlonassEphemeris {
    pub(crate) fn from_record(record: &NavRecord, policy: ValidityPolicy) -> Self {
        let f = &record.fields;
        let mut eph = Self {
            sv: record.sv,
            toc: record.toc,
            clock: SvClock {
                bias: record.clock[0],
                drift: record.clock[1],
                drift_rate: 0.0,
            },
            frame_time: record.clock[2],
            position: [f[0], f[4], f[8]],
            velocity: [f[1], f[5], f[9]],
            acceleration: [f[2], f[6], f[10]],
            health: f[3] as u16,
            channel: f[7] as i8,
            age: f[11] as u16,
            validity: None,
        };
        eph.compute_validity(policy);
        eph
    }

    pub(crate) fn to_record(&self) -> NavRecord {
        let clock = [self.clock.bias, self.clock.drift, self.frame_time];
        let mut record = NavRecord::new(self.sv, self.toc, clock);
        let f = &mut record.fields;
        for axis in 0..3 {
            f[axis * 4] = self.position[axis];
            f[axis * 4 + 1] = self.velocity[axis];
            f[axis * 4 + 2] = self.acceleration[axis];
        }
        f[3] = self.health as f64;
        f[7] = self.channel as f64;
        f[11] = self.age as f64;
        record
    }

    /// GLONASS windows do not depend on the policy: ToC ± 15 min
    pub fn compute_validity(&mut self, _policy: ValidityPolicy) {
        self.validity = Some(Validity::glonass(self.toc));
    }

    pub fn validity(&self) -> Result<Validity, Error> {
        self.validity.ok_or(Error::DataNotLoaded("validity"))
    }
}
