//! Run description schema and its conversion into engine inputs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use yee_em::material::AIR;
use yee_em::{
    Component, HaloTrim, Material, MaterialLibrary, ProbeFill, Profiler, PropertySample,
    RankDomain, RunSummary, SimulationMode, SourceInjector, StepperOptions, TimeStepper,
    Verbosity, WorkerTeam, YeeGrid,
};

use crate::error::{FormatError, Result};

/// Top-level run description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    /// Format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Run name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub grid: GridSpec,
    #[serde(default)]
    pub mode: ModeSpec,
    /// Materials; air is added when not listed.
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    /// Physical stop time (s).
    pub stop_time: f64,
    /// Worker team size; every hardware thread when absent.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub verbosity: VerbositySpec,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Rank-local grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    /// Local node count (M, N, P).
    pub extent: [usize; 3],
    /// Spacing (m).
    pub spacing: [f64; 3],
    /// Global index of local node (0, 0, 0).
    #[serde(default)]
    pub origin: [usize; 3],
    #[serde(default)]
    pub rank: usize,
    /// Halo trims; Yee staggering of an undivided domain when absent.
    #[serde(default)]
    pub trims: Option<TrimSpec>,
}

/// Per-component halo trim flags along x, y, z.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrimSpec {
    pub ex: [bool; 3],
    pub ey: [bool; 3],
    pub ez: [bool; 3],
    pub hx: [bool; 3],
    pub hy: [bool; 3],
    pub hz: [bool; 3],
}

impl From<TrimSpec> for HaloTrim {
    fn from(spec: TrimSpec) -> Self {
        HaloTrim::NONE
            .with(Component::Ex, spec.ex)
            .with(Component::Ey, spec.ey)
            .with(Component::Ez, spec.ez)
            .with(Component::Hx, spec.hx)
            .with(Component::Hy, spec.hy)
            .with(Component::Hz, spec.hz)
    }
}

/// Grid initialisation mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModeSpec {
    #[default]
    AirEverywhere,
    IndexProbe,
    RankProbe {
        electric: ProbeFillSpec,
        magnetic: ProbeFillSpec,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeFillSpec {
    Global,
    Rank,
    Local,
}

impl From<ProbeFillSpec> for ProbeFill {
    fn from(spec: ProbeFillSpec) -> Self {
        match spec {
            ProbeFillSpec::Global => ProbeFill::Global,
            ProbeFillSpec::Rank => ProbeFill::Rank,
            ProbeFillSpec::Local => ProbeFill::Local,
        }
    }
}

impl From<ModeSpec> for SimulationMode {
    fn from(spec: ModeSpec) -> Self {
        match spec {
            ModeSpec::AirEverywhere => SimulationMode::AirEverywhere,
            ModeSpec::IndexProbe => SimulationMode::IndexProbe,
            ModeSpec::RankProbe { electric, magnetic } => SimulationMode::RankProbe {
                electric: electric.into(),
                magnetic: magnetic.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySpec {
    Quiet,
    #[default]
    Summary,
    Detailed,
}

impl From<VerbositySpec> for Verbosity {
    fn from(spec: VerbositySpec) -> Self {
        match spec {
            VerbositySpec::Quiet => Verbosity::Quiet,
            VerbositySpec::Summary => Verbosity::Summary,
            VerbositySpec::Detailed => Verbosity::Detailed,
        }
    }
}

/// Material with its tabulated properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub name: String,
    /// Temperature at the start of the run (K).
    pub initial_temperature: f64,
    pub samples: Vec<SampleSpec>,
}

/// Properties at one temperature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SampleSpec {
    pub temperature: f64,
    pub permeability: f64,
    pub permittivity: f64,
    #[serde(default)]
    pub electric_conductivity: f64,
    #[serde(default)]
    pub magnetic_conductivity: f64,
}

impl From<SampleSpec> for PropertySample {
    fn from(s: SampleSpec) -> Self {
        PropertySample {
            temperature: s.temperature,
            permeability: s.permeability,
            permittivity: s.permittivity,
            electric_conductivity: s.electric_conductivity,
            magnetic_conductivity: s.magnetic_conductivity,
        }
    }
}

/// Excitation region. Positions and lengths in metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SourceSpec {
    pub center: [f64; 3],
    pub lengths: [f64; 3],
    #[serde(default)]
    pub air_gap: f64,
    /// Frequency (Hz).
    pub frequency: f64,
    /// 0, 1 or 2; z when absent.
    #[serde(default = "default_drive_axis")]
    pub drive_axis: usize,
}

fn default_drive_axis() -> usize {
    2
}

/// Engine inputs built from a [`RunSpec`].
#[derive(Debug)]
pub struct RunInputs {
    pub materials: MaterialLibrary,
    pub grid: YeeGrid,
    pub sources: SourceInjector,
    pub options: StepperOptions,
}

/// Result of [`RunInputs::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub grid: YeeGrid,
}

impl RunInputs {
    /// Step to the stop time and return the final grid.
    pub fn run(self, profiler: &mut dyn Profiler) -> Result<RunOutcome> {
        let RunInputs {
            materials,
            grid,
            sources,
            options,
        } = self;
        let mut stepper = TimeStepper::new(grid, sources, &materials, options, profiler)?;
        let summary = stepper.run(profiler)?;
        let (grid, _) = stepper.finish(profiler);
        Ok(RunOutcome { summary, grid })
    }
}

impl RunSpec {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: RunSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load a run description from file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save a run description to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that need the whole document; per-value checks happen in the
    /// engine.
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(FormatError::MissingField("version".to_string()));
        }
        if !(self.stop_time.is_finite() && self.stop_time >= 0.0) {
            return Err(FormatError::InvalidParameter(format!(
                "stop_time must be finite and non-negative, got {}",
                self.stop_time
            )));
        }
        for (i, m) in self.materials.iter().enumerate() {
            if m.samples.is_empty() {
                return Err(FormatError::MissingField(format!("materials[{i}].samples")));
            }
        }
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(FormatError::InvalidParameter(
                    "workers must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Material table with air first unless the document lists it.
    pub fn material_library(&self) -> Result<MaterialLibrary> {
        let mut lib = MaterialLibrary::new();
        if !self.materials.iter().any(|m| m.name == AIR) {
            lib.push(Material::air())?;
        }
        for m in &self.materials {
            let samples = m.samples.iter().copied().map(PropertySample::from).collect();
            lib.push(Material::new(m.name.clone(), m.initial_temperature, samples)?)?;
        }
        Ok(lib)
    }

    pub fn domain(&self) -> RankDomain {
        let trims = self.grid.trims.map(HaloTrim::from).unwrap_or_default();
        RankDomain::new(self.grid.rank, self.grid.extent, self.grid.origin, trims)
    }

    /// Source injector with every region set and finalized.
    pub fn source_injector(&self) -> Result<SourceInjector> {
        let mut injector = SourceInjector::new().with_verbosity(self.verbosity.into());
        injector.set_region_count(self.sources.len())?;
        for axis in 0..3 {
            let lengths: Vec<f64> = self.sources.iter().map(|s| s.lengths[axis]).collect();
            let centers: Vec<f64> = self.sources.iter().map(|s| s.center[axis]).collect();
            injector.set_lengths_along_axis(axis, &lengths)?;
            injector.set_centers_along_axis(axis, &centers)?;
        }
        let air_gaps: Vec<f64> = self.sources.iter().map(|s| s.air_gap).collect();
        let frequencies: Vec<f64> = self.sources.iter().map(|s| s.frequency).collect();
        injector.set_air_gaps(&air_gaps)?;
        injector.set_frequencies(&frequencies)?;
        for (i, s) in self.sources.iter().enumerate() {
            injector.set_drive_axis(i, s.drive_axis)?;
        }
        injector.finalize_all(self.grid.spacing)?;
        Ok(injector)
    }

    pub fn stepper_options(&self) -> StepperOptions {
        StepperOptions::new(self.stop_time)
            .with_workers(self.workers.unwrap_or_else(WorkerTeam::default_size))
            .with_verbosity(self.verbosity.into())
    }

    /// Build everything the engine needs for this run. Grid construction is
    /// reported to `profiler`; release the final grid with
    /// [`YeeGrid::release`].
    pub fn build(&self, profiler: &mut dyn Profiler) -> Result<RunInputs> {
        self.validate()?;
        let materials = self.material_library()?;
        let grid = YeeGrid::build_profiled(
            self.domain(),
            self.grid.spacing,
            &SimulationMode::from(self.mode),
            &materials,
            profiler,
        )?;
        let sources = self.source_injector()?;
        Ok(RunInputs {
            materials,
            grid,
            sources,
            options: self.stepper_options(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yee_em::{EngineState, FIELD_MEMORY, FdtdError, MaterialTable, NullProfiler, RunProfile};

    const MINIMAL: &str = r#"{
        "name": "cube",
        "grid": { "extent": [8, 8, 8], "spacing": [0.001, 0.001, 0.001] },
        "stop_time": 1e-11
    }"#;

    fn dipole_json() -> String {
        serde_json::json!({
            "version": "1.0",
            "name": "dipole",
            "grid": {
                "extent": [10, 10, 10],
                "spacing": [0.001, 0.001, 0.001]
            },
            "mode": { "type": "air_everywhere" },
            "materials": [{
                "name": "GLASS",
                "initial_temperature": 300.0,
                "samples": [{
                    "temperature": 300.0,
                    "permeability": 1.25663706212e-6,
                    "permittivity": 3.54e-11
                }]
            }],
            "sources": [{
                "center": [0.005, 0.005, 0.005],
                "lengths": [0.0, 0.0, 0.002],
                "air_gap": 0.001,
                "frequency": 1e10
            }],
            "stop_time": 2e-11,
            "workers": 6,
            "verbosity": "quiet"
        })
        .to_string()
    }

    #[test]
    fn test_minimal_defaults() {
        let spec = RunSpec::from_json_str(MINIMAL).unwrap();
        assert_eq!(spec.version, "1.0");
        assert_eq!(spec.mode, ModeSpec::AirEverywhere);
        assert_eq!(spec.verbosity, VerbositySpec::Summary);
        assert!(spec.sources.is_empty());
        assert_eq!(spec.domain(), RankDomain::single_rank([8, 8, 8]));
    }

    #[test]
    fn test_mode_tags() {
        let mode: ModeSpec = serde_json::from_str(
            r#"{ "type": "rank_probe", "electric": "global", "magnetic": "rank" }"#,
        )
        .unwrap();
        assert_eq!(
            SimulationMode::from(mode),
            SimulationMode::RankProbe {
                electric: ProbeFill::Global,
                magnetic: ProbeFill::Rank,
            }
        );
        let probe: ModeSpec = serde_json::from_str(r#"{ "type": "index_probe" }"#).unwrap();
        assert_eq!(probe, ModeSpec::IndexProbe);
    }

    #[test]
    fn test_explicit_trims() {
        let trims = TrimSpec {
            ex: [false; 3],
            ey: [false; 3],
            ez: [false, false, true],
            hx: [false; 3],
            hy: [false; 3],
            hz: [true, true, false],
        };
        let halo = HaloTrim::from(trims);
        assert_eq!(halo.get(Component::Ez), [false, false, true]);
        assert_eq!(halo.get(Component::Ex), [false; 3]);
    }

    #[test]
    fn test_rejects_negative_stop_time() {
        let json = MINIMAL.replace("1e-11", "-1.0");
        assert!(matches!(
            RunSpec::from_json_str(&json),
            Err(FormatError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RunSpec::from_json_str("{ \"name\": 3 }"),
            Err(FormatError::JsonError(_))
        ));
    }

    #[test]
    fn test_build_adds_air_and_finalizes_sources() {
        let spec = RunSpec::from_json_str(&dipole_json()).unwrap();
        let inputs = spec.build(&mut NullProfiler).unwrap();
        assert_eq!(inputs.materials.len(), 2);
        assert_eq!(inputs.materials.name_of(yee_em::MaterialId(0)), Some(AIR));
        assert_eq!(inputs.sources.region_count(), Some(1));
        let region = inputs.sources.region(0).unwrap();
        assert!(region.is_finalized());
        assert_eq!(region.span().unwrap().corner, [6, 6, 5]);
        assert_eq!(inputs.options.workers, 6);
        assert_eq!(inputs.options.verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_bad_drive_axis_surfaces_engine_error() {
        let mut spec = RunSpec::from_json_str(&dipole_json()).unwrap();
        spec.sources[0].drive_axis = 5;
        assert!(matches!(
            spec.build(&mut NullProfiler),
            Err(FormatError::Engine(FdtdError::InvalidAxis(5)))
        ));
    }

    #[test]
    fn test_run_to_stop() {
        let spec = RunSpec::from_json_str(&dipole_json()).unwrap();
        let mut profile = RunProfile::new();
        let inputs = spec.build(&mut profile).unwrap();
        let field_bytes = inputs.grid.memory_bytes();
        assert_eq!(profile.bytes(FIELD_MEMORY), field_bytes);
        assert!(profile.timings().any(|(name, _)| name == "grid_init"));

        let outcome = inputs.run(&mut profile).unwrap();
        assert_eq!(outcome.summary.state, EngineState::Stopped);
        assert!(outcome.summary.final_time >= spec.stop_time);
        assert!(outcome.summary.iterations > 0);
        assert!(outcome.grid.total_energy() > 0.0);
        assert_eq!(profile.live_bytes(), field_bytes);

        outcome.grid.release(&mut profile);
        assert_eq!(profile.live_bytes(), 0);
    }

    #[test]
    fn test_json_round_trip_keeps_sources() {
        let spec = RunSpec::from_json_str(&dipole_json()).unwrap();
        let again = RunSpec::from_json_str(&spec.to_json_string().unwrap()).unwrap();
        assert_eq!(again.sources.len(), 1);
        assert_eq!(again.sources[0].drive_axis, 2);
        assert_eq!(again.workers, Some(6));
    }
}
