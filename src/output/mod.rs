// src/output/mod.rs

//! Turning queued lines into operator-facing text.
//!
//! - [`filter`] drops blank lines and `tail`'s file banners.
//! - [`render`] formats `<host> -> <content>`, coloured or plain.
//! - [`sink`] abstracts stdout / stderr so tests can capture output.
//! - [`banner`] prints the startup banner and target listing.

pub mod banner;
pub mod filter;
pub mod render;
pub mod sink;

pub use banner::StartupInfo;
pub use filter::clean_line;
pub use render::{colors_enabled, Renderer};
pub use sink::{DiagnosticSink, RenderSink, StderrDiagnostics, StdoutSink};
