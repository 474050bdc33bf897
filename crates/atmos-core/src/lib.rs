//! Core of the immersive speaker-layout visualizer.
//!
//! The audio side ([`analysis`], [`snapshot`]) turns per-channel sample
//! blocks into per-speaker metrics. The UI side ([`camera`], [`projection`],
//! [`visualizer`], [`room`], [`view`]) turns the latest metrics into a
//! [`draw::DrawList`] that a host toolkit paints. Nothing here depends on a
//! windowing or audio backend.

pub mod analysis;
pub mod camera;
pub mod color;
pub mod config;
pub mod constants;
pub mod draw;
pub mod error;
pub mod heatmap;
pub mod layout;
pub mod projection;
pub mod room;
pub mod snapshot;
pub mod view;
pub mod visualizer;

pub use analysis::*;
pub use camera::*;
pub use color::*;
pub use config::*;
pub use constants::*;
pub use draw::*;
pub use error::*;
pub use heatmap::*;
pub use layout::*;
pub use projection::*;
pub use room::*;
pub use snapshot::*;
pub use view::*;
pub use visualizer::*;
