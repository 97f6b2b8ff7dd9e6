#[cfg(test)]
mod test {
    use crate::prelude::*;
    use crate::tests::toolkit::*;
    use itertools::Itertools;

    const MIXED: &str = "NAV/V3/MIXD00TST_R_20201770000_01D_MN.rnx";

    fn sv(constellation: Constellation, prn: u8) -> SV {
        SV::new(constellation, prn)
    }

    #[test]
    fn v3_mixed_content() {
        let store = load_store(MIXED);
        assert_eq!(store.header.version, Version::new(3, 4));
        assert_eq!(store.header.constellation, Constellation::Mixed);
        assert_eq!(
            store.header.comments,
            vec!["Merged GPS/GLO/GAL/BDS/SBAS navigation records".to_string()]
        );

        // SBAS record is not supported, G02 is corrupt
        assert_eq!(store.len(), 5);
        let expected = vec![
            sv(Constellation::GPS, 1),
            sv(Constellation::BeiDou, 5),
            sv(Constellation::Galileo, 1),
            sv(Constellation::Glonass, 21),
        ]
        .into_iter()
        .sorted()
        .collect::<Vec<_>>();
        assert_eq!(store.satellites(), expected);
        assert_eq!(store.all(sv(Constellation::GPS, 2)).count(), 0);

        assert_eq!(store.first_epoch(), Some(gpst(2020, 6, 25, 0, 0, 0.0)));
        let glot = GnssTime::from_gregorian(TimeSystem::GLO, 2022, 1, 1, 9, 15, 0.0).unwrap();
        assert_eq!(store.last_epoch(), Some(glot));

        for eph in store.iter() {
            assert!(eph.is_healthy(), "{}", eph.sv());
            assert!(eph.validity().is_ok());
        }
    }

    #[test]
    fn v3_mixed_gps() {
        let store = load_store(MIXED);
        let g01 = sv(Constellation::GPS, 1);
        let uploads = store.all(g01).collect::<Vec<_>>();
        assert_eq!(uploads.len(), 2);

        let eph = uploads[0];
        assert!(matches!(eph, Ephemeris::Gps(_)));
        assert_eq!(eph.toc(), gpst(2020, 6, 25, 0, 0, 0.0));
        assert_eq!(eph.clock().bias, -1.654210407287E-04);
        assert_eq!(eph.clock().drift, -1.023181539495E-11);
        assert_eq!(eph.accuracy(), Some(2.0));

        let gps = eph.as_gps().unwrap();
        assert_eq!(gps.iode, 35);
        assert_eq!(gps.iodc, 35);
        assert_eq!(gps.toe.week_seconds(), (2111, 345_600.0));
        assert_eq!(gps.transmission.week_seconds(), (2111, 338_388.0));
        assert_eq!(gps.fit_interval_hours, 4);
        assert_eq!(gps.orbit.kepler.e, 9.502093074843E-03);
        assert_close(gps.orbit.kepler.sqrt_a(), 5.153654594421E+03);
        assert_eq!(gps.tgd, 4.656612873077E-09);

        // nominal uploads: fit interval centered on ToE
        let validity = eph.validity().unwrap();
        assert_eq!(validity.begin, gpst(2020, 6, 24, 22, 0, 0.0));
        assert_eq!(validity.end, gpst(2020, 6, 25, 2, 0, 0.0));

        let next = uploads[1].as_gps().unwrap();
        assert_eq!(next.iode, 36);
        assert_eq!(next.toe.week_seconds(), (2111, 352_800.0));
        let validity = next.validity().unwrap();
        assert_eq!(validity.begin, gpst(2020, 6, 25, 0, 0, 0.0));
        assert_eq!(validity.end, gpst(2020, 6, 25, 4, 0, 0.0));
    }

    #[test]
    fn v3_mixed_queries() {
        let store = load_store(MIXED);
        let g01 = sv(Constellation::GPS, 1);

        for (t, toe) in [
            (gpst(2020, 6, 24, 22, 0, 0.0), Some(345_600.0)),
            (gpst(2020, 6, 24, 23, 59, 59.0), Some(345_600.0)),
            // both uploads apply, equidistant: first one wins
            (gpst(2020, 6, 25, 1, 0, 0.0), Some(345_600.0)),
            (gpst(2020, 6, 25, 1, 0, 1.0), Some(352_800.0)),
            (gpst(2020, 6, 25, 0, 59, 59.0), Some(345_600.0)),
            (gpst(2020, 6, 25, 2, 0, 0.0), Some(352_800.0)),
            (gpst(2020, 6, 25, 3, 59, 59.0), Some(352_800.0)),
            (gpst(2020, 6, 25, 4, 0, 0.0), None),
            (gpst(2020, 6, 24, 21, 59, 59.0), None),
        ] {
            match toe {
                Some(toe) => {
                    let eph = store.find(g01, t).unwrap();
                    assert_eq!(eph.toe().unwrap().seconds_of_week(), toe, "{}", t);
                },
                None => {
                    assert_eq!(store.find(g01, t), Err(Error::NotFound(g01)), "{}", t);
                },
            }
        }

        // never found in another time system
        let t = GnssTime::from_gregorian(TimeSystem::GAL, 2020, 6, 25, 1, 0, 0.0).unwrap();
        assert!(store.find(g01, t).is_err());

        // corrupt and unsupported records were dropped
        let t = gpst(2020, 6, 25, 0, 0, 0.0);
        let g02 = sv(Constellation::GPS, 2);
        assert_eq!(store.find(g02, t), Err(Error::NotFound(g02)));
    }

    #[test]
    fn v3_mixed_galileo() {
        let store = load_store(MIXED);
        let e01 = sv(Constellation::Galileo, 1);
        let gst = |h, m| GnssTime::from_gregorian(TimeSystem::GAL, 2021, 1, 1, h, m, 0.0).unwrap();

        let eph = store.all(e01).next().unwrap();
        let galileo = match eph {
            Ephemeris::Galileo(galileo) => galileo,
            _ => panic!("expecting galileo ephemeris"),
        };
        assert_eq!(galileo.iodnav, 13);
        assert_eq!(galileo.sisa, 3.12);
        assert_eq!(galileo.toe.seconds_of_week(), 468_600.0);
        assert_eq!(galileo.bgd_e5a_e1, 2.32830643654E-10);

        // mid-cycle upload: window starts at the transmission time
        let validity = eph.validity().unwrap();
        assert_eq!(validity.begin, gst(10, 22));
        assert_eq!(validity.end, gst(13, 0));

        assert_eq!(store.find(e01, gst(10, 10)), Err(Error::NotFound(e01)));
        assert!(store.find(e01, gst(10, 22)).is_ok());
        assert!(store.find(e01, gst(12, 59)).is_ok());
        assert!(store.find(e01, gst(13, 0)).is_err());
    }

    #[test]
    fn v3_mixed_beidou_glonass() {
        let store = load_store(MIXED);

        let c05 = sv(Constellation::BeiDou, 5);
        let bdt = |h, m| GnssTime::from_gregorian(TimeSystem::BDT, 2021, 1, 1, h, m, 0.0).unwrap();
        let eph = store.find(c05, bdt(0, 30)).unwrap();
        match eph {
            Ephemeris::BeiDou(beidou) => {
                assert_eq!(beidou.aode, 1);
                assert_eq!(beidou.toe.seconds_of_week(), 432_000.0);
                assert_eq!(beidou.tgd1, -5.99999994133E-10);
                assert_eq!(beidou.tgd2, -9.0E-09);
            },
            _ => panic!("expecting beidou ephemeris"),
        }
        assert!(store.find(c05, bdt(2, 0)).is_err());

        let r21 = sv(Constellation::Glonass, 21);
        let glot = |h, m| GnssTime::from_gregorian(TimeSystem::GLO, 2022, 1, 1, h, m, 0.0).unwrap();
        let eph = store.find(r21, glot(9, 0)).unwrap();
        assert_eq!(eph.toe(), None);
        assert_eq!(eph.reference_epoch(), glot(9, 15));
        match eph {
            Ephemeris::Glonass(glonass) => {
                assert_eq!(glonass.position[0], -1.488799804690E+03);
                assert_eq!(glonass.velocity[1], -2.049269676210E+00);
                assert_eq!(glonass.acceleration[2], -9.313225746150E-10);
                assert_eq!(glonass.channel, 1);
                assert_eq!(glonass.frame_time, 5.508E+05);
            },
            _ => panic!("expecting glonass ephemeris"),
        }
        assert!(store.find(r21, glot(9, 29)).is_ok());
        assert!(store.find(r21, glot(9, 30)).is_err());
        assert!(store.find(r21, glot(8, 59)).is_err());
    }

    #[test]
    fn v3_raise_on_failure() {
        let path = test_resource(MIXED);
        let mut stream =
            RecordStream::open(&path, StreamConfig::default().with_raise_on_failure()).unwrap();
        // first record is fine, the SBAS one comes next
        match EphemerisStore::load(&mut stream, CodecConfig::default()) {
            Err(Error::Format { line, .. }) => assert_eq!(line, 15),
            other => panic!("expecting format error, got {:?}", other),
        }
        assert!(stream.is_failed());
    }

    #[test]
    fn v3_toe_centered_policy() {
        let path = test_resource(MIXED);
        let mut stream = RecordStream::open(&path, StreamConfig::default()).unwrap();
        let config = CodecConfig::default().with_validity_policy(ValidityPolicy::ToeCentered);
        let store = EphemerisStore::load(&mut stream, config).unwrap();
        assert_eq!(store.policy, ValidityPolicy::ToeCentered);

        let g01 = sv(Constellation::GPS, 1);
        let eph = store.all(g01).next().unwrap();
        let validity = eph.validity().unwrap();
        assert_eq!(validity.begin, gpst(2020, 6, 25, 0, 0, 0.0));
        assert_eq!(validity.end, gpst(2020, 6, 25, 2, 0, 0.0));
        assert!(store.find(g01, gpst(2020, 6, 24, 23, 0, 0.0)).is_err());
    }

    #[test]
    fn v3_mixed_reload() {
        let store = load_store(MIXED);
        let reloaded = reload(&store);
        assert_stores_close(&store, &reloaded);
    }
}
