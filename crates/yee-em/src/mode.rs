//! Grid initialisation modes.

/// What a probe fill writes into a field component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFill {
    /// Global node index along the component's axis (-1 on a low halo node
    /// with no global counterpart).
    Global,
    /// Rank number plus one.
    Rank,
    /// Array index along the component's axis.
    Local,
}

/// How the grid is populated before stepping.
///
/// Every mode tags all nodes with air, so coefficients are always defined.
/// The probe modes additionally overwrite the field values with indices,
/// which makes decomposition and halo bookkeeping visible in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationMode {
    #[default]
    AirEverywhere,
    /// Each component holds its array index along its own axis.
    IndexProbe,
    RankProbe {
        electric: ProbeFill,
        magnetic: ProbeFill,
    },
}

impl SimulationMode {
    pub fn name(&self) -> &'static str {
        match self {
            SimulationMode::AirEverywhere => "air-everywhere",
            SimulationMode::IndexProbe => "index-probe",
            SimulationMode::RankProbe { .. } => "rank-probe",
        }
    }
}
