/// [SvClock] is the onboard clock polynomial, referenced to ToC
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SvClock {
    /// Clock bias (s)
    pub bias: f64,
    /// Clock drift (s.s⁻¹)
    pub drift: f64,
    /// Clock drift rate (s.s⁻²)
    pub drift_rate: f64,
}

impl SvClock {
    pub(crate) fn from_fields(fields: [f64; 3]) -> Self {
        Self {
            bias: fields[0],
            drift: fields[1],
            drift_rate: fields[2],
        }
    }
    pub(crate) fn fields(&self) -> [f64; 3] {
        [self.bias, self.drift, self.drift_rate]
    }
    /// Clock offset (s) `dt` seconds after ToC
    pub fn offset(&self, dt: f64) -> f64 {
        self.bias + self.drift * dt + self.drift_rate * dt * dt
    }
}

/// [Kepler] stores all keplerian parameters
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kepler {
    /// semi major axis (m)
    pub a: f64,
    /// Eccentricity (n.a)
    pub e: f64,
    /// Inclination angle at reference time (rad)
    pub i_0: f64,
    /// Longitude of ascending node at reference time (rad)
    pub omega_0: f64,
    /// Mean anomaly at reference time (rad)
    pub m_0: f64,
    /// argument of perigee (rad)
    pub omega: f64,
}

impl Kepler {
    /// Square root of the semi major axis, as broadcast
    pub fn sqrt_a(&self) -> f64 {
        self.a.sqrt()
    }
}

/// Orbit [Perturbations]
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Perturbations {
    /// Mean motion difference from computed value [rad.s⁻¹]
    pub dn: f64,
    /// Inclination rate of change [rad.s⁻¹]
    pub i_dot: f64,
    /// Right ascension rate of change [rad.s⁻¹]
    pub omega_dot: f64,
    /// Amplitude of sine harmonic correction term of the argument
    /// of latitude [rad]
    pub cus: f64,
    /// Amplitude of cosine harmonic correction term of the argument
    /// of latitude [rad]
    pub cuc: f64,
    /// Amplitude of sine harmonic correction term of the angle of inclination [rad]
    pub cis: f64,
    /// Amplitude of cosine harmonic correction term of the angle of inclination [rad]
    pub cic: f64,
    /// Amplitude of sine harmonic correction term of the orbit radius [m]
    pub crs: f64,
    /// Amplitude of cosine harmonic correction term of the orbit radius [m]
    pub crc: f64,
}

/// Orbit description shared by all keplerian constellations,
/// as laid out in lines 1 to 4 of a NAV record.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeplerOrbit {
    pub kepler: Kepler,
    pub perturbations: Perturbations,
}

impl KeplerOrbit {
    /// Picks orbit terms from the 28 slot field table.
    /// Slot 0 (issue of data) and 8 (toe) are left to the caller.
    pub(crate) fn from_fields(fields: &[f64]) -> Self {
        Self {
            kepler: Kepler {
                a: fields[7].powi(2),
                e: fields[5],
                i_0: fields[12],
                omega_0: fields[10],
                m_0: fields[3],
                omega: fields[14],
            },
            perturbations: Perturbations {
                crs: fields[1],
                dn: fields[2],
                cuc: fields[4],
                cus: fields[6],
                cic: fields[9],
                cis: fields[11],
                crc: fields[13],
                omega_dot: fields[15],
                i_dot: fields[16],
            },
        }
    }

    /// Writes orbit terms into the 28 slot field table
    pub(crate) fn fill_fields(&self, fields: &mut [f64]) {
        fields[1] = self.perturbations.crs;
        fields[2] = self.perturbations.dn;
        fields[3] = self.kepler.m_0;
        fields[4] = self.perturbations.cuc;
        fields[5] = self.kepler.e;
        fields[6] = self.perturbations.cus;
        fields[7] = self.kepler.sqrt_a();
        fields[9] = self.perturbations.cic;
        fields[10] = self.kepler.omega_0;
        fields[11] = self.perturbations.cis;
        fields[12] = self.kepler.i_0;
        fields[13] = self.perturbations.crc;
        fields[14] = self.kepler.omega;
        fields[15] = self.perturbations.omega_dot;
        fields[16] = self.perturbations.i_dot;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clock_offset() {
        let clock = SvClock::from_fields([1.0E-4, 1.0E-11, 0.0]);
        assert_eq!(clock.fields(), [1.0E-4, 1.0E-11, 0.0]);
        assert_eq!(clock.offset(0.0), 1.0E-4);
        assert!((clock.offset(100.0) - 1.00001E-4).abs() < 1.0E-15);
    }

    #[test]
    fn orbit_slots() {
        let mut fields = [0.0_f64; 28];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = i as f64 + 1.0;
        }
        let orbit = KeplerOrbit::from_fields(&fields);
        assert_eq!(orbit.kepler.a, 64.0);
        assert_eq!(orbit.kepler.sqrt_a(), 8.0);
        assert_eq!(orbit.perturbations.crs, 2.0);
        assert_eq!(orbit.perturbations.i_dot, 17.0);

        let mut rebuilt = [0.0_f64; 28];
        orbit.fill_fields(&mut rebuilt);
        for i in 1..17 {
            if i != 8 {
                assert_eq!(rebuilt[i], fields[i], "slot {}", i);
            }
        }
    }
}
