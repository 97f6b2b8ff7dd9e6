//! rinex-nav lib test modules

mod nav_v3;


#[cfg(feature = "serde")]
mod serialization;
