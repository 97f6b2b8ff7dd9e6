//! GPS / QZSS curve fit interval, derived from IODC and the fit interval flag.

/// Fit interval (hours) assumed when nothing better is known
pub const DEFAULT_FIT_INTERVAL_HOURS: u16 = 4;

/// Returns the curve fit interval (hours) described by
/// the issue of data clock and the fit interval flag.
/// This is a total function: IODC outside [0, 1023] and unknown
/// bands resolve to [DEFAULT_FIT_INTERVAL_HOURS].
pub fn fit_interval_hours(iodc: i32, flag: u8) -> u16 {
    if !(0..=1023).contains(&iodc) {
        return DEFAULT_FIT_INTERVAL_HOURS;
    }
    let low_byte = iodc & 0xFF;
    let upload_band = (240..=255).contains(&low_byte);
    match flag {
        0 if !upload_band => DEFAULT_FIT_INTERVAL_HOURS,
        0 | 1 => extended_fit_interval(iodc, upload_band),
        _ => DEFAULT_FIT_INTERVAL_HOURS,
    }
}

fn extended_fit_interval(iodc: i32, upload_band: bool) -> u16 {
    if !upload_band {
        return 6;
    }
    match iodc {
        240..=247 => 8,
        248..=255 | 496 => 14,
        497..=503 | 1021..=1023 => 26,
        504..=510 => 50,
        511 | 752..=756 => 74,
        757..=763 => 98,
        764..=767 | 1008..=1010 => 122,
        1011..=1020 => 146,
        _ => DEFAULT_FIT_INTERVAL_HOURS,
    }
}

/// Fit interval flag matching a number of hours
pub fn fit_interval_flag(hours: u16) -> u8 {
    if hours > DEFAULT_FIT_INTERVAL_HOURS {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn totality() {
        for iodc in -10..1100 {
            for flag in [0, 1] {
                let hours = fit_interval_hours(iodc, flag);
                assert!(
                    [4, 6, 8, 14, 26, 50, 74, 98, 122, 146].contains(&hours),
                    "iodc={} flag={} hours={}",
                    iodc,
                    flag,
                    hours
                );
            }
        }
    }

    #[test]
    fn nominal_flag() {
        assert_eq!(fit_interval_hours(0, 0), 4);
        assert_eq!(fit_interval_hours(239, 0), 4);
        assert_eq!(fit_interval_hours(240, 0), 8);
        assert_eq!(fit_interval_hours(255, 0), 14);
        assert_eq!(fit_interval_hours(256, 0), 4);
        assert_eq!(fit_interval_hours(496, 0), 14);
        assert_eq!(fit_interval_hours(511, 0), 74);
        assert_eq!(fit_interval_hours(1023, 0), 26);
        assert_eq!(fit_interval_hours(1024, 0), 4);
        assert_eq!(fit_interval_hours(-1, 0), 4);
    }

    #[test]
    fn extended_flag() {
        for (iodc, expected) in [
            (0, 6),
            (239, 6),
            (240, 8),
            (247, 8),
            (248, 14),
            (255, 14),
            (256, 6),
            (495, 6),
            (496, 14),
            (497, 26),
            (503, 26),
            (504, 50),
            (510, 50),
            (511, 74),
            (512, 6),
            (752, 74),
            (756, 74),
            (757, 98),
            (763, 98),
            (764, 122),
            (767, 122),
            (1007, 6),
            (1008, 122),
            (1010, 122),
            (1011, 146),
            (1020, 146),
            (1021, 26),
            (1023, 26),
            (1024, 4),
        ] {
            assert_eq!(fit_interval_hours(iodc, 1), expected, "iodc={}", iodc);
        }
    }

    #[test]
    fn flags() {
        assert_eq!(fit_interval_flag(4), 0);
        assert_eq!(fit_interval_flag(6), 1);
        assert_eq!(fit_interval_flag(146), 1);
    }
}
