//! # SkinKit Craft
//!
//! The skin transformation stage. It rewrites each perimeter pass and each
//! infill pass of an annotated toolpath stream into several fractional-height
//! passes, giving the surface the finish of a much thinner carve height while
//! the per-layer machine thickness stays unchanged.
//!
//! The stage is a pure function over the text stream: two upfront scans
//! (machine parameters, boundary layers) feed a single forward pass that
//! captures perimeter loops and infill boundary sets and replays them through
//! the two generators.

pub mod config;
pub mod error;
pub mod event;
pub mod params;
pub mod prescan;
mod skin;

pub use config::SkinConfig;
pub use error::SkinError;
pub use params::MachineParameters;
pub use skin::{is_minimum_sides, is_procedure_done, skin_text};
