#![doc(html_logo_url = "https://raw.githubusercontent.com/georust/meta/master/logo/logo.png")]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * RINEX-NAV is part of the Geo-Rust framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/georust/rinex/graphs/contributors)
 * This framework is shipped under both Apache-2.0 and MIT License.
 *
 * Documentation: https://github.com/georust/rinex
 */

extern crate gnss_rs as gnss;

#[macro_use]
extern crate lazy_static;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

pub mod header;
pub mod navigation;
pub mod reader;
pub mod store;
pub mod stream;
pub mod time;
pub mod version;
pub mod writer;

mod error;

#[cfg(test)]
mod tests;

/// Package to include all basic structures
pub mod prelude {
    // export
    pub use crate::{
        error::{Error, ParsingError},
        header::NavHeader,
        navigation::{
            BeiDouEphemeris, CodecConfig, Ephemeris, GalileoEphemeris, GlonassEphemeris,
            GpsEphemeris, KeplerOrbit, LegacyGpsEphemeris, NavCodec, NavRecord, SvClock,
            Validity, ValidityPolicy,
        },
        store::EphemerisStore,
        stream::{RecordStream, StreamConfig},
        time::{GnssTime, TimeSystem},
        version::Version,
    };

    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
}
