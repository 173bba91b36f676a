//! Rank-local FDTD electromagnetic solver on a staggered Yee grid.
//!
//! - Six field components with their own staggered extents and a one-node
//!   halo, populated from a material table
//! - Courant-limited time step and semi-implicit lossy-medium coefficients
//! - Leapfrog H/E update on a fixed worker team, with continuous-wave source
//!   regions overriding the electric field
//!
//! # Example
//!
//! ```no_run
//! use yee_em::{
//!     MaterialLibrary, NullProfiler, RankDomain, SimulationMode, SourceInjector, StepperOptions,
//!     TimeStepper, YeeGrid,
//! };
//!
//! # fn main() -> yee_em::Result<()> {
//! let materials = MaterialLibrary::with_air();
//! let spacing = [1e-3; 3];
//! let grid = YeeGrid::build(
//!     RankDomain::single_rank([32, 32, 32]),
//!     spacing,
//!     &SimulationMode::AirEverywhere,
//!     &materials,
//! )?;
//!
//! // One dipole-like region in the middle of the box, driven at 10 GHz
//! let mut sources = SourceInjector::new();
//! sources.set_region_count(1)?;
//! sources.set_center(0, [16e-3, 16e-3, 16e-3])?;
//! sources.set_lengths(0, [1e-3, 1e-3, 4e-3])?;
//! sources.set_frequencies(&[10e9])?;
//! sources.finalize_region(0, spacing)?;
//!
//! let mut stepper = TimeStepper::new(
//!     grid,
//!     sources,
//!     &materials,
//!     StepperOptions::new(1e-9),
//!     &mut NullProfiler,
//! )?;
//! let summary = stepper.run(&mut NullProfiler)?;
//! println!("{} iterations, energy {:.3e} J", summary.iterations, stepper.grid().total_energy());
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod error;
pub mod fdtd;
pub mod grid;
pub mod material;
pub mod mode;
pub mod profile;
pub mod source;
pub mod stability;
pub mod stepper;

pub use domain::{HaloTrim, RankDomain};
pub use error::{FdtdError, OrAbort, Result};
pub use grid::{
    Array3D, Axis, Component, ComponentField, FIELD_MEMORY, FieldKind, Vec3, YeeGrid,
};
pub use material::{
    Material, MaterialId, MaterialLibrary, MaterialTable, PropertyColumn, PropertySample,
};
pub use mode::{ProbeFill, SimulationMode};
pub use profile::{NullProfiler, Profiler, RunProfile};
pub use source::{NodeSpan, SourceInjector, SourceRegion, SourceSample};
pub use stability::{
    ComponentCoefficients, UpdateCoefficients, build_update_coefficients,
    compute_stable_time_step,
};
pub use stepper::{
    EngineState, RunSummary, SourceNode, SourceNodes, StepperOptions, TimeStepper, WorkerTeam,
};

/// Smallest worker team the engine accepts.
///
/// The surplus over what the sweeps need is left for the inter-rank
/// communication layer to progress messages asynchronously.
pub const MIN_WORKERS: usize = 6;

/// Seconds to display units (µs) for progress output.
pub const REPORT_TIME_SCALE: f64 = 1e6;

/// How much the engine prints to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    Quiet,
    /// One line at setup and one at the end of a run.
    #[default]
    Summary,
    /// Also per-region geometry and periodic progress.
    Detailed,
}
