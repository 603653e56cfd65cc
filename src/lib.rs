//! Stitchgrid - photo to knitting and crochet chart converter
//!
//! Turns a photo into an indexed-color stitch grid that can be edited color
//! by color and rendered as a printable chart.
//! This library exposes modules for integration testing.

pub mod api;
pub mod chart;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
