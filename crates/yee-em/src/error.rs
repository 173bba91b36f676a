//! Error types for yee-em.
//!
//! Every precondition violation in the engine is a configuration or ordering
//! bug, never a transient condition, so nothing here is retried. Drivers turn
//! an error into a diagnostic plus process exit with [`OrAbort`].

use std::panic::Location;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FdtdError {
    #[error("material table is empty")]
    EmptyMaterialTable,

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("material {0} is defined twice")]
    DuplicateMaterial(String),

    #[error("material {0} has no property samples")]
    NoPropertySamples(String),

    #[error("too many materials ({0}); ids are limited to 256")]
    TooManyMaterials(usize),

    #[error("material {material} yields a non-finite time step (mu={mu}, eps={eps})")]
    NonFiniteTimeStep { material: String, mu: f64, eps: f64 },

    #[error("time step {0} must be finite and positive")]
    InvalidTimeStep(f64),

    #[error("grid extent (M,N,P)={0:?} is invalid")]
    EmptyGrid([usize; 3]),

    #[error("grid spacing {0:?} must be finite and positive")]
    InvalidSpacing([f64; 3]),

    #[error("direction should be between 0 and 2 but is {0}")]
    InvalidAxis(usize),

    #[error("expected {expected} values (one per source) but got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("{0} was already set")]
    AlreadySet(&'static str),

    #[error("{0} must be set first")]
    MissingPrerequisite(&'static str),

    #[error("source region {index} out of range ({count} regions)")]
    RegionOutOfRange { index: usize, count: usize },

    #[error("source region {0} is finalized; its geometry can no longer change")]
    RegionFinalized(usize),

    #[error("source region {0} is not finalized; call finalize_region first")]
    RegionNotFinalized(usize),

    #[error("source region {region} has invalid geometry: {detail}")]
    InvalidSourceGeometry { region: usize, detail: String },

    #[error("node {0:?} is not inside any source region")]
    NotInsideSource([usize; 3]),

    #[error("not enough worker threads: needs {required} but has {available}")]
    InsufficientWorkers { required: usize, available: usize },

    #[error("stop time {0} must be finite and non-negative")]
    InvalidStopTime(f64),

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, FdtdError>;

/// Terminate the process on error after a diagnostic naming the operation
/// and the call site.
pub trait OrAbort<T> {
    #[track_caller]
    fn or_abort(self, operation: &str) -> T;
}

impl<T, E: std::fmt::Display> OrAbort<T> for std::result::Result<T, E> {
    #[track_caller]
    fn or_abort(self, operation: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                let site = Location::caller();
                eprintln!("{}", diagnostic(operation, &err, site));
                std::process::exit(1);
            }
        }
    }
}

/// Format a fatal diagnostic the way drivers print it.
pub fn diagnostic(operation: &str, err: &dyn std::fmt::Display, site: &Location<'_>) -> String {
    format!(
        "In {operation} :: ERROR :: {err} Aborting.\nIn {}:{}",
        site.file(),
        site.line()
    )
}
