//! Ephemeris collection, queried per satellite and instant
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    error::Error,
    header::NavHeader,
    navigation::{CodecConfig, Ephemeris, NavCodec, ValidityPolicy},
    prelude::{Epoch, SV},
    reader::BufferedReader,
    stream::{RecordStream, StreamConfig},
    time::GnssTime,
    writer::BufferedWriter,
};

/// [EphemerisStore] is an ordered multi map of [Ephemeris],
/// sorted by clock epoch then satellite.
/// Successive uploads for one satellite coexist: nothing is ever replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EphemerisStore {
    /// Header used when writing this store
    pub header: NavHeader,
    /// Policy applied to models inserted without a validity window
    pub policy: ValidityPolicy,
    entries: BTreeMap<(Epoch, SV), Vec<Ephemeris>>,
}

impl EphemerisStore {
    /// Builds an empty store, using given header when written.
    pub fn new(header: NavHeader) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    /// Copies and sets the [ValidityPolicy]
    pub fn with_validity_policy(&self, policy: ValidityPolicy) -> Self {
        let mut s = self.clone();
        s.policy = policy;
        s
    }

    /// Stores a new [Ephemeris]. Its validity window is computed
    /// if that was not done yet.
    pub fn insert(&mut self, mut ephemeris: Ephemeris) {
        if ephemeris.validity().is_err() {
            ephemeris.compute_validity(self.policy);
        }
        let key = (ephemeris.toc().sort_key(), ephemeris.sv());
        debug!("store: {}", ephemeris);
        self.entries.entry(key).or_default().push(ephemeris);
    }

    /// Best [Ephemeris] for `sv` at `t`: among those whose validity window
    /// contains `t`, the one referenced closest to `t`.
    /// Equidistant candidates resolve to the first one in store order.
    pub fn find(&self, sv: SV, t: GnssTime) -> Result<&Ephemeris, Error> {
        let mut best: Option<(&Ephemeris, i128)> = None;
        for ephemeris in self.all(sv) {
            if !ephemeris.is_valid(&t)? {
                continue;
            }
            let distance = (ephemeris.reference_epoch() - t).total_nanoseconds().abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => {},
                _ => best = Some((ephemeris, distance)),
            }
        }
        best.map(|(ephemeris, _)| ephemeris)
            .ok_or(Error::NotFound(sv))
    }

    /// All [Ephemeris] of one satellite, in epoch order.
    /// The returned iterator may be cloned to restart the enumeration.
    pub fn all(&self, sv: SV) -> impl Iterator<Item = &Ephemeris> + Clone + '_ {
        self.entries
            .iter()
            .filter(move |((_, key), _)| *key == sv)
            .flat_map(|(_, models)| models.iter())
    }

    /// All [Ephemeris], in store order
    pub fn iter(&self) -> impl Iterator<Item = &Ephemeris> + '_ {
        self.entries.values().flatten()
    }

    /// Total number of [Ephemeris]
    pub fn len(&self) -> usize {
        self.entries.values().map(|models| models.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Satellites, sorted, each listed once
    pub fn satellites(&self) -> Vec<SV> {
        self.entries
            .keys()
            .map(|(_, sv)| *sv)
            .unique()
            .sorted()
            .collect()
    }

    /// Oldest clock epoch
    pub fn first_epoch(&self) -> Option<GnssTime> {
        self.iter().next().map(|ephemeris| ephemeris.toc())
    }

    /// Most recent clock epoch
    pub fn last_epoch(&self) -> Option<GnssTime> {
        self.iter().last().map(|ephemeris| ephemeris.toc())
    }

    /// Loads a store from a NAV stream: file header, then all records.
    /// Malformed or unsupported records are skipped, unless the stream
    /// is configured to raise on failure.
    pub fn load<S: BufRead>(
        stream: &mut RecordStream<S>,
        config: CodecConfig,
    ) -> Result<Self, Error> {
        let header = NavHeader::parse(stream)?;
        let codec = NavCodec::from_header(&header).with_config(config.without_rewind());
        let mut store = Self::new(header).with_validity_policy(config.validity);
        loop {
            match codec.decode_ephemeris(stream) {
                Ok(ephemeris) => store.insert(ephemeris),
                Err(Error::EndOfInput) => break,
                Err(e @ Error::Format { .. }) => {
                    stream.conditional_raise()?;
                    warn!("{}: {}", stream.name(), e);
                },
                Err(e) => return Err(e),
            }
        }
        debug!("{}: {} ephemerides loaded", stream.name(), store.len());
        Ok(store)
    }

    /// Loads a store from a local NAV file.
    /// `.gz` files are supported with the `flate2` feature.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut stream: RecordStream<BufferedReader> =
            RecordStream::open(path, StreamConfig::default())?;
        Self::load(&mut stream, CodecConfig::default())
    }

    /// Writes header and all [Ephemeris], in store order
    pub fn write<W: Write>(&self, stream: &mut RecordStream<W>) -> Result<(), Error> {
        self.header.format(stream)?;
        let codec = NavCodec::from_header(&self.header);
        for ephemeris in self.iter() {
            codec.encode_ephemeris(ephemeris, stream)?;
        }
        stream.flush()
    }

    /// Writes this store into a local file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut stream: RecordStream<BufferedWriter<File>> =
            RecordStream::create(path, StreamConfig::default())?;
        self.write(&mut stream)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        navigation::{GpsEphemeris, Validity},
        prelude::Constellation,
        time::TimeSystem,
    };

    fn gpst(sow: f64) -> GnssTime {
        GnssTime::from_week_seconds(TimeSystem::GPS, 2000, sow)
    }

    /// GPS model referenced at `toe` and valid over `[begin, end)`
    fn model(prn: u8, toe: f64, begin: f64, end: f64) -> Ephemeris {
        Ephemeris::from(GpsEphemeris {
            sv: SV::new(Constellation::GPS, prn),
            toc: gpst(toe),
            toe: gpst(toe),
            validity: Some(Validity {
                begin: gpst(begin),
                end: gpst(end),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn overlapping_windows() {
        let g05 = SV::new(Constellation::GPS, 5);

        // both windows cover 1100: closest ToE wins, ties go to the earliest
        let mut store = EphemerisStore::default();
        store.insert(model(5, 1200.0, 1050.0, 1400.0));
        store.insert(model(5, 1000.0, 900.0, 1300.0));
        let found = store.find(g05, gpst(1100.0)).unwrap();
        assert_eq!(found.toe(), Some(gpst(1000.0)));
        let found = store.find(g05, gpst(1120.0)).unwrap();
        assert_eq!(found.toe(), Some(gpst(1200.0)));
        let found = store.find(g05, gpst(1080.0)).unwrap();
        assert_eq!(found.toe(), Some(gpst(1000.0)));

        // closest model does not cover 1100: the covering one is returned
        let mut store = EphemerisStore::default();
        store.insert(model(5, 1000.0, 900.0, 1100.0));
        store.insert(model(5, 1200.0, 1050.0, 1400.0));
        let found = store.find(g05, gpst(1100.0)).unwrap();
        assert_eq!(found.toe(), Some(gpst(1200.0)));
        let found = store.find(g05, gpst(1099.0)).unwrap();
        assert_eq!(found.toe(), Some(gpst(1000.0)));
    }

    #[test]
    fn not_found() {
        let mut store = EphemerisStore::default();
        store.insert(model(5, 1000.0, 900.0, 1100.0));
        let g05 = SV::new(Constellation::GPS, 5);
        let g06 = SV::new(Constellation::GPS, 6);
        assert_eq!(store.find(g06, gpst(1000.0)), Err(Error::NotFound(g06)));
        assert_eq!(store.find(g05, gpst(1100.0)), Err(Error::NotFound(g05)));
        assert_eq!(store.find(g05, gpst(899.0)), Err(Error::NotFound(g05)));
        // other time systems never match
        let gst = GnssTime::from_week_seconds(TimeSystem::GAL, 2000, 1000.0);
        assert_eq!(store.find(g05, gst), Err(Error::NotFound(g05)));
        // the wildcard does
        let any = gpst(1000.0).with_system(TimeSystem::Any);
        assert!(store.find(g05, any).is_ok());
    }

    #[test]
    fn enumeration() {
        let mut store = EphemerisStore::default();
        assert!(store.is_empty());
        assert_eq!(store.first_epoch(), None);

        store.insert(model(5, 7200.0, 0.0, 14400.0));
        store.insert(model(3, 7200.0, 0.0, 14400.0));
        store.insert(model(5, 0.0, 0.0, 7200.0));
        // duplicates are retained
        store.insert(model(5, 0.0, 0.0, 7200.0));

        assert_eq!(store.len(), 4);
        assert_eq!(
            store.satellites(),
            vec![SV::new(Constellation::GPS, 3), SV::new(Constellation::GPS, 5)]
        );
        assert_eq!(store.first_epoch(), Some(gpst(0.0)));
        assert_eq!(store.last_epoch(), Some(gpst(7200.0)));

        let all = store.all(SV::new(Constellation::GPS, 5));
        let epochs = all.clone().map(|eph| eph.toc()).collect::<Vec<_>>();
        assert_eq!(epochs, vec![gpst(0.0), gpst(0.0), gpst(7200.0)]);
        // restartable
        assert_eq!(all.count(), 3);

        let epochs = store.iter().map(|eph| eph.toc()).collect::<Vec<_>>();
        assert_eq!(epochs, vec![gpst(0.0), gpst(0.0), gpst(7200.0), gpst(7200.0)]);
    }

    #[test]
    fn validity_computed_on_insert() {
        let mut store = EphemerisStore::default();
        store.insert(Ephemeris::from(GpsEphemeris {
            sv: SV::new(Constellation::GPS, 1),
            toc: gpst(7200.0),
            toe: gpst(7200.0),
            transmission: gpst(0.0),
            fit_interval_hours: 4,
            ..Default::default()
        }));
        let eph = store.iter().next().unwrap();
        let validity = eph.validity().unwrap();
        assert_eq!(validity.begin, gpst(0.0));
        assert_eq!(validity.end, gpst(14400.0));
    }

    #[test]
    fn default_fit_interval() {
        let g01 = SV::new(Constellation::GPS, 1);
        let mut store = EphemerisStore::default();
        store.insert(Ephemeris::from(GpsEphemeris {
            sv: g01,
            toc: gpst(7200.0),
            toe: gpst(7200.0),
            transmission: gpst(7200.0),
            ..Default::default()
        }));
        let validity = store.iter().next().unwrap().validity().unwrap();
        assert!(validity.begin < validity.end);
        assert!(store.find(g01, gpst(7200.0)).is_ok());
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("rinex-nav-missing").join("none.rnx");
        assert!(matches!(
            EphemerisStore::from_file(&path),
            Err(Error::Io(_))
        ));
    }
}
