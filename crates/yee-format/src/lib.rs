//! JSON run descriptions for the yee FDTD engine.
//!
//! A run document carries everything the engine takes from outside:
//! - Rank-local grid extent, spacing, origin and halo trims
//! - Initialisation mode (air everywhere or one of the probe fills)
//! - Materials with temperature-tabulated properties
//! - Source regions (centers, lengths, air gaps, frequencies)
//! - Stop time, worker count and verbosity
//!
//! [`RunSpec::build`] turns a document into ready-to-step engine inputs.

pub mod error;
pub mod schema;

pub use error::{FormatError, Result};
pub use schema::{
    GridSpec, MaterialSpec, ModeSpec, ProbeFillSpec, RunInputs, RunOutcome, RunSpec, SampleSpec,
    SourceSpec, TrimSpec, VerbositySpec,
};
