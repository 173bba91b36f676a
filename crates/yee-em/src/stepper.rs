//! Time-stepping engine.
//!
//! One iteration is: H from E, E from H, source override on E, time advance.
//! Each sweep runs on a dedicated worker team and returns only when every
//! plane is written, which orders the phases. The driving thread alone
//! advances the clock.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::{FdtdError, Result};
use crate::grid::{Component, FieldKind, YeeGrid};
use crate::material::MaterialTable;
use crate::profile::Profiler;
use crate::source::SourceInjector;
use crate::stability::{UpdateCoefficients, build_update_coefficients, compute_stable_time_step};
use crate::{MIN_WORKERS, REPORT_TIME_SCALE, Verbosity};

/// Memory label of the coefficient arrays.
const COEFFICIENT_MEMORY: &str = "update_coefficients";

/// Fixed-size thread team the sweeps run on.
#[derive(Debug)]
pub struct WorkerTeam {
    pool: rayon::ThreadPool,
}

impl WorkerTeam {
    /// Build a team of `workers` threads. Fewer than [`MIN_WORKERS`] is
    /// a configuration error.
    pub fn new(workers: usize) -> Result<Self> {
        if workers < MIN_WORKERS {
            return Err(FdtdError::InsufficientWorkers {
                required: MIN_WORKERS,
                available: workers,
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("yee-worker-{i}"))
            .build()?;
        let available = pool.current_num_threads();
        if available < MIN_WORKERS {
            return Err(FdtdError::InsufficientWorkers {
                required: MIN_WORKERS,
                available,
            });
        }
        Ok(Self { pool })
    }

    /// Team size used when none is configured: every hardware thread, and
    /// never less than [`MIN_WORKERS`].
    pub fn default_size() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(MIN_WORKERS)
    }

    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` with the team as the current rayon pool.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepperOptions {
    /// Physical stop time (s).
    pub stop_time: f64,
    pub workers: usize,
    pub verbosity: Verbosity,
    /// Progress line every this many iterations at [`Verbosity::Detailed`].
    pub report_every: usize,
}

impl StepperOptions {
    pub fn new(stop_time: f64) -> Self {
        Self {
            stop_time,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl Default for StepperOptions {
    fn default() -> Self {
        Self {
            stop_time: 0.0,
            workers: WorkerTeam::default_size(),
            verbosity: Verbosity::default(),
            report_every: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Stopped,
}

/// An electric node overridden by a source region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceNode {
    /// Flat index into the component array.
    pub index: usize,
    pub region: usize,
}

/// Interior electric nodes lying inside a source region, per component.
#[derive(Debug, Clone, Default)]
pub struct SourceNodes {
    nodes: [Vec<SourceNode>; 3],
}

impl SourceNodes {
    /// Scan the interior of Ex, Ey and Ez, k-planes in parallel.
    pub fn collect(grid: &YeeGrid, injector: &SourceInjector) -> Result<Self> {
        let mut nodes: [Vec<SourceNode>; 3] = Default::default();
        for component in Component::ELECTRIC {
            let field = grid.values(component);
            let [nx, ny, nz] = field.size();
            nodes[component.slot()] = (1..nz.saturating_sub(1))
                .into_par_iter()
                .flat_map_iter(move |k| {
                    (1..ny.saturating_sub(1))
                        .flat_map(move |j| (1..nx.saturating_sub(1)).map(move |i| [i, j, k]))
                        .filter_map(move |node| {
                            let global = grid.node_to_global(node)?;
                            injector
                                .locate_region(global)
                                .map(|found| {
                                    found.map(|region| SourceNode {
                                        index: field.index(node[0], node[1], node[2]),
                                        region,
                                    })
                                })
                                .transpose()
                        })
                })
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(Self { nodes })
    }

    pub fn get(&self, component: Component) -> &[SourceNode] {
        match component.kind() {
            FieldKind::Electric => &self.nodes[component.slot()],
            FieldKind::Magnetic => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write each region's `[Ex, Ey, Ez]` sample onto its nodes.
    pub fn apply(&self, grid: &mut YeeGrid, samples: &[[f64; 3]]) {
        for component in Component::ELECTRIC {
            let slot = component.slot();
            let values = grid.electric[slot].values.as_mut_slice();
            for node in &self.nodes[slot] {
                values[node.index] = samples[node.region][slot];
            }
        }
    }
}

/// Outcome of [`TimeStepper::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    pub dt: f64,
    /// Physical time reached (s).
    pub final_time: f64,
    pub wall_time: Duration,
    pub state: EngineState,
}

/// Leapfrog driver owning the grid, the sources and the coefficients for the
/// length of one run.
#[derive(Debug)]
pub struct TimeStepper {
    grid: YeeGrid,
    injector: SourceInjector,
    coeffs: UpdateCoefficients,
    sources: SourceNodes,
    team: WorkerTeam,
    options: StepperOptions,
    current_time: f64,
    iteration: usize,
    state: EngineState,
}

impl TimeStepper {
    /// Check the worker team, derive dt from `table`, build the coefficients
    /// and locate the source nodes.
    pub fn new(
        grid: YeeGrid,
        injector: SourceInjector,
        table: &dyn MaterialTable,
        options: StepperOptions,
        profiler: &mut dyn Profiler,
    ) -> Result<Self> {
        if !(options.stop_time.is_finite() && options.stop_time >= 0.0) {
            return Err(FdtdError::InvalidStopTime(options.stop_time));
        }
        let team = WorkerTeam::new(options.workers)?;
        injector.check_ready()?;

        let dt = compute_stable_time_step(table, grid.spacing)?;

        profiler.start("build_update_coefficients");
        let coeffs = team.install(|| build_update_coefficients(&grid, dt))?;
        profiler.stop("build_update_coefficients");
        profiler.add_memory(COEFFICIENT_MEMORY, coeffs.memory_bytes());

        let sources = team.install(|| SourceNodes::collect(&grid, &injector))?;

        if options.verbosity >= Verbosity::Summary {
            eprintln!(
                "  Stepper: dt={:.6e} s, stop={:.6} us, nodes={}, workers={}, source nodes={}",
                dt,
                options.stop_time * REPORT_TIME_SCALE,
                grid.domain.node_count(),
                team.size(),
                sources.len()
            );
        }

        Ok(Self {
            grid,
            injector,
            coeffs,
            sources,
            team,
            options,
            current_time: 0.0,
            iteration: 0,
            state: EngineState::Running,
        })
    }

    pub fn dt(&self) -> f64 {
        self.coeffs.dt
    }

    /// Physical time (s).
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn grid(&self) -> &YeeGrid {
        &self.grid
    }

    /// Mutable grid access between iterations, e.g. for halo exchange.
    pub fn grid_mut(&mut self) -> &mut YeeGrid {
        &mut self.grid
    }

    pub fn injector(&self) -> &SourceInjector {
        &self.injector
    }

    pub fn coefficients(&self) -> &UpdateCoefficients {
        &self.coeffs
    }

    pub fn source_nodes(&self) -> &SourceNodes {
        &self.sources
    }

    pub fn team_size(&self) -> usize {
        self.team.size()
    }

    /// One full iteration, then the stop check. No-op once stopped.
    pub fn step(&mut self) -> Result<EngineState> {
        if self.state == EngineState::Stopped {
            return Ok(self.state);
        }

        let (grid, coeffs) = (&mut self.grid, &self.coeffs);
        self.team.install(|| grid.update_h_field(coeffs));
        self.team.install(|| grid.update_e_field(coeffs));

        let samples = (0..self.injector.regions().len())
            .map(|region| self.injector.electric_sample(region, self.current_time))
            .collect::<Result<Vec<_>>>()?;
        self.sources.apply(&mut self.grid, &samples);

        self.iteration += 1;
        self.current_time = self.iteration as f64 * self.coeffs.dt;
        if self.current_time >= self.options.stop_time {
            self.state = EngineState::Stopped;
        }
        Ok(self.state)
    }

    /// Step until the stop time is reached.
    pub fn run(&mut self, profiler: &mut dyn Profiler) -> Result<RunSummary> {
        let started = Instant::now();
        let verbosity = self.options.verbosity;
        let report_every = self.options.report_every.max(1);

        profiler.start("time_stepping");
        while self.state == EngineState::Running {
            if self.current_time >= self.options.stop_time {
                self.state = EngineState::Stopped;
                break;
            }
            self.step()?;
            if verbosity >= Verbosity::Detailed && self.iteration % report_every == 0 {
                eprintln!(
                    "  Stepper: iteration {} t={:.6} us",
                    self.iteration,
                    self.current_time * REPORT_TIME_SCALE
                );
            }
        }
        profiler.stop("time_stepping");

        let summary = RunSummary {
            iterations: self.iteration,
            dt: self.coeffs.dt,
            final_time: self.current_time,
            wall_time: started.elapsed(),
            state: self.state,
        };
        if verbosity >= Verbosity::Summary {
            eprintln!(
                "  Stepper: {} iterations, t={:.6} us, {:.3} s wall",
                summary.iterations,
                summary.final_time * REPORT_TIME_SCALE,
                summary.wall_time.as_secs_f64()
            );
        }
        Ok(summary)
    }

    /// End the run: release the coefficients and hand back the grid.
    pub fn finish(self, profiler: &mut dyn Profiler) -> (YeeGrid, SourceInjector) {
        profiler.remove_memory(COEFFICIENT_MEMORY, self.coeffs.memory_bytes());
        (self.grid, self.injector)
    }
}
