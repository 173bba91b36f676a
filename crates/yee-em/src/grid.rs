//! Yee grid storage for the rank-local FDTD domain.
//!
//! Each of the six field components lives in its own flat array with its own
//! extent, because of the staggering and of the per-face halo trims decided by
//! the domain decomposition. Node `(i, j, k)` of a component is stored at
//! `i + nx * (j + ny * k)`.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::domain::RankDomain;
use crate::error::{FdtdError, Result};
use crate::material::{AIR, MaterialId, MaterialTable, PropertyColumn};
use crate::mode::{ProbeFill, SimulationMode};
use crate::profile::Profiler;

/// Memory label of the field, property and tag arrays.
pub const FIELD_MEMORY: &str = "fields";

/// 3D vector alias.
pub type Vec3 = Vector3<f64>;

/// Spatial axis of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = FdtdError;

    fn try_from(direction: usize) -> Result<Self> {
        match direction {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            other => Err(FdtdError::InvalidAxis(other)),
        }
    }
}

/// Electric or magnetic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Electric,
    Magnetic,
}

/// One of the six staggered field components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Ex,
    Ey,
    Ez,
    Hx,
    Hy,
    Hz,
}

impl Component {
    pub const ELECTRIC: [Component; 3] = [Component::Ex, Component::Ey, Component::Ez];
    pub const MAGNETIC: [Component; 3] = [Component::Hx, Component::Hy, Component::Hz];
    pub const ALL: [Component; 6] = [
        Component::Ex,
        Component::Ey,
        Component::Ez,
        Component::Hx,
        Component::Hy,
        Component::Hz,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            Component::Ex | Component::Ey | Component::Ez => FieldKind::Electric,
            Component::Hx | Component::Hy | Component::Hz => FieldKind::Magnetic,
        }
    }

    /// Axis the component points along.
    pub fn axis(self) -> Axis {
        match self {
            Component::Ex | Component::Hx => Axis::X,
            Component::Ey | Component::Hy => Axis::Y,
            Component::Ez | Component::Hz => Axis::Z,
        }
    }

    /// Position in [`Component::ALL`].
    #[inline]
    pub fn ordinal(self) -> usize {
        match self.kind() {
            FieldKind::Electric => self.slot(),
            FieldKind::Magnetic => 3 + self.slot(),
        }
    }

    /// Position inside its own kind's `[x, y, z]` triple.
    #[inline]
    pub fn slot(self) -> usize {
        self.axis().index()
    }

    /// The two curl terms of the update: `(axis, source component)` for the
    /// added term first, the subtracted term second.
    ///
    /// The axis also selects the grid spacing dividing the matching drive
    /// coefficient: Ex→(y,z), Ey→(z,x), Ez→(x,y), Hx→(z,y), Hy→(x,z), Hz→(y,x).
    pub fn curl_terms(self) -> [(Axis, Component); 2] {
        match self {
            Component::Ex => [(Axis::Y, Component::Hz), (Axis::Z, Component::Hy)],
            Component::Ey => [(Axis::Z, Component::Hx), (Axis::X, Component::Hz)],
            Component::Ez => [(Axis::X, Component::Hy), (Axis::Y, Component::Hx)],
            Component::Hx => [(Axis::Z, Component::Ey), (Axis::Y, Component::Ez)],
            Component::Hy => [(Axis::X, Component::Ez), (Axis::Z, Component::Ex)],
            Component::Hz => [(Axis::Y, Component::Ex), (Axis::X, Component::Ey)],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Component::Ex => "Ex",
            Component::Ey => "Ey",
            Component::Ez => "Ez",
            Component::Hx => "Hx",
            Component::Hy => "Hy",
            Component::Hz => "Hz",
        }
    }
}

/// 3D array storage for grid fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Array3D {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    data: Vec<f64>,
}

impl Array3D {
    /// Create a new 3D array filled with zeros.
    pub fn zeros(size: [usize; 3]) -> Self {
        Self::filled(size, 0.0)
    }

    /// Create a new 3D array filled with a constant value.
    pub fn filled(size: [usize; 3], value: f64) -> Self {
        Self {
            nx: size[0],
            ny: size[1],
            nz: size[2],
            data: vec![value; size[0] * size[1] * size[2]],
        }
    }

    #[inline]
    pub fn size(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of `(i, j, k)`. No bounds checking.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    /// Number of values in one constant-k plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.nx * self.ny
    }

    /// Get value at (i, j, k) with bounds checking.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        if i < self.nx && j < self.ny && k < self.nz {
            self.data[self.index(i, j, k)]
        } else {
            0.0
        }
    }

    /// Set value at (i, j, k) with bounds checking.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        if i < self.nx && j < self.ny && k < self.nz {
            let idx = self.index(i, j, k);
            self.data[idx] = value;
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Fill every node from its `(i, j, k)`, one k-plane per task.
    pub fn par_fill_with<F>(&mut self, f: F)
    where
        F: Fn(usize, usize, usize) -> f64 + Sync,
    {
        let (nx, ny) = (self.nx, self.ny);
        let plane = self.plane_len().max(1);
        self.data
            .par_chunks_mut(plane)
            .enumerate()
            .for_each(|(k, slab)| {
                for j in 0..ny {
                    for i in 0..nx {
                        slab[i + nx * j] = f(i, j, k);
                    }
                }
            });
    }

    /// Compute squared norm of all values.
    pub fn norm_squared(&self) -> f64 {
        self.data.iter().map(|&x| x * x).sum()
    }
}

/// Field values of one component together with the per-node material data
/// that drives its update.
///
/// For electric components `property` is the permittivity and `conductivity`
/// the electric conductivity; for magnetic components they are the
/// permeability and the magnetic conductivity.
#[derive(Debug, Clone)]
pub struct ComponentField {
    pub component: Component,
    pub values: Array3D,
    pub property: Array3D,
    pub conductivity: Array3D,
    material: Vec<MaterialId>,
}

impl ComponentField {
    fn new(component: Component, size: [usize; 3]) -> Self {
        let n = size[0] * size[1] * size[2];
        Self {
            component,
            values: Array3D::zeros(size),
            property: Array3D::zeros(size),
            conductivity: Array3D::zeros(size),
            material: vec![MaterialId::default(); n],
        }
    }

    #[inline]
    pub fn size(&self) -> [usize; 3] {
        self.values.size()
    }

    /// Material tag of every node, same indexing as `values`.
    pub fn materials(&self) -> &[MaterialId] {
        &self.material
    }

    /// Bytes held by this component (values, property, conductivity, tags).
    pub fn memory_bytes(&self) -> usize {
        let n = self.values.len();
        3 * n * std::mem::size_of::<f64>() + n * std::mem::size_of::<MaterialId>()
    }
}

/// Rank-local Yee grid: six staggered components plus a one-node halo on
/// every face.
#[derive(Debug, Clone)]
pub struct YeeGrid {
    pub domain: RankDomain,

    /// Grid spacing (m) along x, y, z.
    pub spacing: [f64; 3],

    /// Ex, Ey, Ez.
    pub electric: [ComponentField; 3],

    /// Hx, Hy, Hz.
    pub magnetic: [ComponentField; 3],
}

impl YeeGrid {
    /// Allocate all arrays for `domain` and populate them for `mode`.
    ///
    /// Material tags are assigned here once and never change afterwards;
    /// permittivity, permeability and conductivities are then read from
    /// `table` at each material's initial temperature.
    pub fn build(
        domain: RankDomain,
        spacing: [f64; 3],
        mode: &SimulationMode,
        table: &dyn MaterialTable,
    ) -> Result<Self> {
        let mut grid = Self::allocate(domain, spacing)?;
        grid.assign_materials(mode, table)?;
        grid.initialize_properties(table)?;
        Ok(grid)
    }

    /// [`YeeGrid::build`] timed as `grid_init`, with the arrays reported
    /// under [`FIELD_MEMORY`]. Pair with [`YeeGrid::release`].
    pub fn build_profiled(
        domain: RankDomain,
        spacing: [f64; 3],
        mode: &SimulationMode,
        table: &dyn MaterialTable,
        profiler: &mut dyn Profiler,
    ) -> Result<Self> {
        profiler.start("grid_init");
        let grid = Self::build(domain, spacing, mode, table);
        profiler.stop("grid_init");
        let grid = grid?;
        profiler.add_memory(FIELD_MEMORY, grid.memory_bytes());
        Ok(grid)
    }

    /// Drop the grid and report its arrays as freed.
    pub fn release(self, profiler: &mut dyn Profiler) {
        profiler.remove_memory(FIELD_MEMORY, self.memory_bytes());
    }

    /// Allocate zeroed arrays. Every node is tagged with material 0 until
    /// [`YeeGrid::assign_materials`] runs.
    pub fn allocate(domain: RankDomain, spacing: [f64; 3]) -> Result<Self> {
        let extent = domain.extent;
        if extent.iter().any(|&n| n == 0) {
            return Err(FdtdError::EmptyGrid(extent));
        }
        if spacing.iter().any(|&d| !(d.is_finite() && d > 0.0)) {
            return Err(FdtdError::InvalidSpacing(spacing));
        }

        let field = |c: Component| ComponentField::new(c, domain.component_size(c));
        let electric = Component::ELECTRIC.map(field);
        let magnetic = Component::MAGNETIC.map(field);

        Ok(Self {
            domain,
            spacing,
            electric,
            magnetic,
        })
    }

    pub fn field(&self, component: Component) -> &ComponentField {
        match component.kind() {
            FieldKind::Electric => &self.electric[component.slot()],
            FieldKind::Magnetic => &self.magnetic[component.slot()],
        }
    }

    pub fn field_mut(&mut self, component: Component) -> &mut ComponentField {
        match component.kind() {
            FieldKind::Electric => &mut self.electric[component.slot()],
            FieldKind::Magnetic => &mut self.magnetic[component.slot()],
        }
    }

    /// Field values of one component.
    pub fn values(&self, component: Component) -> &Array3D {
        &self.field(component).values
    }

    pub fn values_mut(&mut self, component: Component) -> &mut Array3D {
        &mut self.field_mut(component).values
    }

    pub fn fields(&self) -> impl Iterator<Item = &ComponentField> {
        self.electric.iter().chain(self.magnetic.iter())
    }

    /// Global node of an array node, undoing the one-node halo shift.
    ///
    /// `None` for the low halo node of a rank whose origin is 0.
    pub fn node_to_global(&self, node: [usize; 3]) -> Option<[usize; 3]> {
        let local = [
            node[0].checked_sub(1)?,
            node[1].checked_sub(1)?,
            node[2].checked_sub(1)?,
        ];
        Some(self.domain.local_to_global(local))
    }

    /// Array node of a global node owned by this rank.
    pub fn global_to_node(&self, global: [usize; 3]) -> Option<[usize; 3]> {
        let local = self.domain.global_to_local(global)?;
        Some(local.map(|n| n + 1))
    }

    /// Tag every node with a material and apply the mode's field fill.
    pub fn assign_materials(
        &mut self,
        mode: &SimulationMode,
        table: &dyn MaterialTable,
    ) -> Result<()> {
        let air = table
            .id_of(AIR)
            .ok_or_else(|| FdtdError::UnknownMaterial(AIR.to_string()))?;

        let domain = self.domain;
        for field in self.electric.iter_mut().chain(self.magnetic.iter_mut()) {
            field.material.par_iter_mut().for_each(|tag| *tag = air);

            let fill = match (mode, field.component.kind()) {
                (SimulationMode::AirEverywhere, _) => None,
                (SimulationMode::IndexProbe, _) => Some(ProbeFill::Local),
                (SimulationMode::RankProbe { electric, .. }, FieldKind::Electric) => {
                    Some(*electric)
                }
                (SimulationMode::RankProbe { magnetic, .. }, FieldKind::Magnetic) => {
                    Some(*magnetic)
                }
            };
            if let Some(fill) = fill {
                let axis = field.component.axis().index();
                let rank_value = (domain.rank + 1) as f64;
                field.values.par_fill_with(|i, j, k| {
                    let node = [i, j, k];
                    match fill {
                        ProbeFill::Local => node[axis] as f64,
                        ProbeFill::Rank => rank_value,
                        ProbeFill::Global => node
                            .iter()
                            .all(|&n| n > 0)
                            .then(|| {
                                domain.local_to_global([i - 1, j - 1, k - 1])[axis] as f64
                            })
                            .unwrap_or(-1.0),
                    }
                });
            }
        }
        Ok(())
    }

    /// Fill permittivity/permeability and conductivities from each node's
    /// material tag at that material's initial temperature.
    pub fn initialize_properties(&mut self, table: &dyn MaterialTable) -> Result<()> {
        for field in self.electric.iter_mut().chain(self.magnetic.iter_mut()) {
            let (property_col, conductivity_col) = match field.component.kind() {
                FieldKind::Electric => (
                    PropertyColumn::Permittivity,
                    PropertyColumn::ElectricConductivity,
                ),
                FieldKind::Magnetic => (
                    PropertyColumn::Permeability,
                    PropertyColumn::MagneticConductivity,
                ),
            };

            // Tags are few; resolve each distinct one once.
            let mut resolved: Vec<(MaterialId, f64, f64)> = Vec::new();
            for &tag in &field.material {
                if resolved.iter().any(|(id, _, _)| *id == tag) {
                    continue;
                }
                let temperature = table.initial_temperature(tag)?;
                resolved.push((
                    tag,
                    table.property(temperature, tag, property_col)?,
                    table.property(temperature, tag, conductivity_col)?,
                ));
            }

            let lookup = |tag: MaterialId| {
                resolved
                    .iter()
                    .find(|(id, _, _)| *id == tag)
                    .map(|&(_, p, s)| (p, s))
                    .unwrap_or((f64::NAN, f64::NAN))
            };
            let materials = &field.material;
            field
                .property
                .as_mut_slice()
                .par_iter_mut()
                .zip(field.conductivity.as_mut_slice().par_iter_mut())
                .zip(materials.par_iter())
                .for_each(|((p, s), &tag)| {
                    let (prop, cond) = lookup(tag);
                    *p = prop;
                    *s = cond;
                });
        }
        Ok(())
    }

    /// Get E-field vector at array node (i, j, k) (out-of-range components read 0).
    pub fn e_field_at(&self, i: usize, j: usize, k: usize) -> Vec3 {
        Vec3::new(
            self.electric[0].values.get(i, j, k),
            self.electric[1].values.get(i, j, k),
            self.electric[2].values.get(i, j, k),
        )
    }

    /// Get H-field vector at array node (i, j, k) (out-of-range components read 0).
    pub fn h_field_at(&self, i: usize, j: usize, k: usize) -> Vec3 {
        Vec3::new(
            self.magnetic[0].values.get(i, j, k),
            self.magnetic[1].values.get(i, j, k),
            self.magnetic[2].values.get(i, j, k),
        )
    }

    /// Volume of one cell (m³).
    pub fn cell_volume(&self) -> f64 {
        self.spacing.iter().product()
    }

    /// Total electromagnetic energy held by the rank, halo included.
    ///
    /// Energy density: u = (1/2)(ε|E|² + μ|H|²)
    pub fn total_energy(&self) -> f64 {
        let dv = self.cell_volume();
        self.fields()
            .map(|field| {
                field
                    .values
                    .as_slice()
                    .par_iter()
                    .zip(field.property.as_slice().par_iter())
                    .map(|(&v, &p)| 0.5 * p * v * v)
                    .sum::<f64>()
            })
            .sum::<f64>()
            * dv
    }

    /// Bytes held by all six components.
    pub fn memory_bytes(&self) -> usize {
        self.fields().map(ComponentField::memory_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialLibrary;
    use crate::profile::RunProfile;

    fn air_grid(extent: [usize; 3], mode: SimulationMode) -> YeeGrid {
        let table = MaterialLibrary::with_air();
        YeeGrid::build(
            RankDomain::single_rank(extent),
            [1e-3, 1e-3, 1e-3],
            &mode,
            &table,
        )
        .unwrap()
    }

    #[test]
    fn test_array3d_basic() {
        let mut arr = Array3D::zeros([4, 4, 4]);
        arr.set(1, 2, 3, 5.0);
        assert_eq!(arr.get(1, 2, 3), 5.0);
        assert_eq!(arr.get(0, 0, 0), 0.0);
        assert_eq!(arr.index(1, 2, 3), 1 + 4 * (2 + 4 * 3));
        // Out of range reads are zero, writes are ignored
        arr.set(4, 0, 0, 1.0);
        assert_eq!(arr.get(4, 0, 0), 0.0);
    }

    #[test]
    fn test_par_fill_matches_indexing() {
        let mut arr = Array3D::zeros([3, 4, 5]);
        arr.par_fill_with(|i, j, k| (i + 10 * j + 100 * k) as f64);
        assert_eq!(arr.get(2, 3, 4), 432.0);
        assert_eq!(arr.as_slice()[arr.index(1, 2, 3)], 321.0);
    }

    #[test]
    fn test_axis_conversion() {
        assert_eq!(Axis::try_from(2).unwrap(), Axis::Z);
        assert!(matches!(Axis::try_from(3), Err(FdtdError::InvalidAxis(3))));
    }

    #[test]
    fn test_component_sizes_follow_staggering() {
        let grid = air_grid([10, 8, 6], SimulationMode::AirEverywhere);
        // Single rank: E trimmed on its own axis, H on the two others
        assert_eq!(grid.values(Component::Ex).size(), [11, 10, 8]);
        assert_eq!(grid.values(Component::Ey).size(), [12, 9, 8]);
        assert_eq!(grid.values(Component::Ez).size(), [12, 10, 7]);
        assert_eq!(grid.values(Component::Hx).size(), [12, 9, 7]);
        assert_eq!(grid.values(Component::Hy).size(), [11, 10, 7]);
        assert_eq!(grid.values(Component::Hz).size(), [11, 9, 8]);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = YeeGrid::allocate(RankDomain::single_rank([0, 4, 4]), [1.0; 3]).unwrap_err();
        assert!(matches!(err, FdtdError::EmptyGrid([0, 4, 4])));
    }

    #[test]
    fn test_air_everywhere_properties() {
        let grid = air_grid([4, 4, 4], SimulationMode::AirEverywhere);
        let air = MaterialLibrary::with_air();
        let id = air.id_of(AIR).unwrap();
        let ex = grid.field(Component::Ex);
        assert!(ex.materials().iter().all(|&m| m == id));
        let eps = air
            .property(air.initial_temperature(id).unwrap(), id, PropertyColumn::Permittivity)
            .unwrap();
        assert!(ex.property.as_slice().iter().all(|&p| p == eps));
        assert!(grid.field(Component::Hz).conductivity.as_slice().iter().all(|&s| s == 0.0));
        assert_eq!(grid.total_energy(), 0.0);
    }

    #[test]
    fn test_index_probe_fill() {
        let grid = air_grid([4, 4, 4], SimulationMode::IndexProbe);
        assert_eq!(grid.values(Component::Ex).get(3, 1, 2), 3.0);
        assert_eq!(grid.values(Component::Ey).get(3, 1, 2), 1.0);
        assert_eq!(grid.values(Component::Hz).get(3, 1, 2), 2.0);
    }

    #[test]
    fn test_rank_probe_fill() {
        let table = MaterialLibrary::with_air();
        let domain = RankDomain::single_rank([4, 4, 4])
            .with_rank(2)
            .with_origin([10, 20, 30]);
        let mode = SimulationMode::RankProbe {
            electric: ProbeFill::Global,
            magnetic: ProbeFill::Rank,
        };
        let grid = YeeGrid::build(domain, [1.0; 3], &mode, &table).unwrap();
        // Array node 1 is local node 0
        assert_eq!(grid.values(Component::Ey).get(2, 1, 2), 20.0);
        assert_eq!(grid.values(Component::Ez).get(2, 3, 3), 32.0);
        assert_eq!(grid.values(Component::Hx).get(2, 2, 2), 3.0);
    }

    #[test]
    fn test_global_mapping_skips_low_halo_at_origin() {
        let grid = air_grid([4, 4, 4], SimulationMode::AirEverywhere);
        assert_eq!(grid.node_to_global([0, 1, 1]), None);
        assert_eq!(grid.node_to_global([1, 2, 3]), Some([0, 1, 2]));
    }

    #[test]
    fn test_profiled_build_reports_fields() {
        let table = MaterialLibrary::with_air();
        let mut profile = RunProfile::new();
        let grid = YeeGrid::build_profiled(
            RankDomain::single_rank([4, 5, 6]),
            [1e-3; 3],
            &SimulationMode::AirEverywhere,
            &table,
            &mut profile,
        )
        .unwrap();
        let bytes = grid.memory_bytes();
        assert!(bytes > 0);
        assert_eq!(profile.bytes(FIELD_MEMORY), bytes);
        assert!(profile.timings().any(|(name, _)| name == "grid_init"));

        grid.release(&mut profile);
        assert_eq!(profile.bytes(FIELD_MEMORY), 0);
        assert_eq!(profile.live_bytes(), 0);
        assert_eq!(profile.peak_bytes(), bytes);
    }

    #[test]
    fn test_profiled_build_closes_span_on_error() {
        let table = MaterialLibrary::with_air();
        let mut profile = RunProfile::new();
        let result = YeeGrid::build_profiled(
            RankDomain::single_rank([0, 4, 4]),
            [1e-3; 3],
            &SimulationMode::AirEverywhere,
            &table,
            &mut profile,
        );
        assert!(matches!(result, Err(FdtdError::EmptyGrid(_))));
        assert!(profile.timings().any(|(name, _)| name == "grid_init"));
        assert_eq!(profile.live_bytes(), 0);
    }

    #[test]
    fn test_global_to_node_inverts_node_to_global() {
        let table = MaterialLibrary::with_air();
        let domain = RankDomain::single_rank([4, 4, 4]).with_origin([8, 0, 4]);
        let grid = YeeGrid::build(domain, [1e-3; 3], &SimulationMode::AirEverywhere, &table)
            .unwrap();
        assert_eq!(grid.global_to_node([8, 0, 4]), Some([1, 1, 1]));
        assert_eq!(grid.node_to_global([1, 1, 1]), Some([8, 0, 4]));
        assert_eq!(grid.global_to_node([11, 3, 7]), Some([4, 4, 4]));
        assert_eq!(grid.global_to_node([12, 0, 4]), None);
        assert_eq!(grid.global_to_node([7, 0, 4]), None);
    }

    #[test]
    fn test_energy_counts_each_component() {
        let mut grid = air_grid([4, 4, 4], SimulationMode::AirEverywhere);
        grid.values_mut(Component::Ez).set(2, 2, 2, 1.0);
        let eps = grid.field(Component::Ez).property.get(2, 2, 2);
        let expected = 0.5 * eps * grid.cell_volume();
        assert!((grid.total_energy() - expected).abs() < 1e-30);
        assert_eq!(grid.e_field_at(2, 2, 2), Vec3::new(0.0, 0.0, 1.0));
    }
}
