//! Configuration cache for zipkeep
//!
//! Each backup target gets one JSON record under `{destination}/cache/`
//! holding its allow/deny filter lists and any extra scalar settings. The
//! record gates the first compression for a target: until a snapshot exists
//! on disk, no archive is written.

mod cache;

pub use cache::{ConfigCache, ConfigRecord};
