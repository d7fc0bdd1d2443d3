//! # SkinKit
//!
//! A post-processing stage for annotated G-code toolpaths. It rewrites each
//! perimeter and infill pass into several fractional-height sub-passes, so a
//! print gains the surface finish of a much thinner layer height without
//! changing the carved layer thickness.
//!
//! ## Architecture
//!
//! SkinKit is organized as a workspace with multiple crates:
//!
//! 1. **skinkit-core** - G-code lexing, output assembly, planar geometry
//! 2. **skinkit-craft** - The skin transformation stage
//! 3. **skinkit** - Command-line binary that ties the stages together

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

pub use skinkit_core::{GcodeError, Point2, Rotation2};
pub use skinkit_craft::{skin_text, SkinConfig, SkinError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Suffix inserted before the extension of a derived output file name.
const OUTPUT_SUFFIX: &str = "_skin";

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

/// Run the skin stage over one file on disk.
///
/// The rewritten stream lands at `output` when given, otherwise next to the
/// input with `_skin` appended to the file stem. Returns the path written.
pub fn skin_file(
    input: &Path,
    output: Option<&Path>,
    config: &SkinConfig,
) -> anyhow::Result<PathBuf> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let skinned = skin_text(&text, config)
        .with_context(|| format!("skinning {}", input.display()))?;
    let destination = match output {
        Some(path) => path.to_path_buf(),
        None => derived_output_path(input),
    };
    fs::write(&destination, skinned)
        .with_context(|| format!("writing {}", destination.display()))?;
    info!(
        input = %input.display(),
        output = %destination.display(),
        "skin stage finished"
    );
    Ok(destination)
}

/// Load the stage configuration from a JSON file.
pub fn load_config(path: &Path) -> anyhow::Result<SkinConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: SkinConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn derived_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|extension| format!(".{}", extension.to_string_lossy()))
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}{extension}"))
}
