//! Broadcast navigation messages: record codec, ephemeris models
//! and their validity windows.
mod codec;
mod ephemeris;
mod fields;
mod fit;
mod record;
mod validity;

pub use codec::{CodecConfig, NavCodec};
pub use ephemeris::{
    ura_index, ura_meters, BeiDouEphemeris, DataSources, Ephemeris, GalileoEphemeris,
    GlonassEphemeris, GpsEphemeris, Kepler, KeplerOrbit, LegacyGpsEphemeris, Perturbations,
    SvClock,
};
pub use fields::{
    format_field, parse_fields, parse_float, strip_comment, COMMENT_MARKER, FIELDS_PER_LINE,
    FIELD_WIDTH,
};
pub use fit::{fit_interval_flag, fit_interval_hours, DEFAULT_FIT_INTERVAL_HOURS};
pub use record::{continuation_lines, is_supported, NavRecord};
pub use validity::{Validity, ValidityPolicy, GLONASS_HALF_WINDOW_MINUTES};
