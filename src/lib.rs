//! Builds ffmpeg argument lists from input/output files, their streams and
//! declarative media profiles. Nothing here runs the tool or reads media.

pub mod core;
pub mod util;
