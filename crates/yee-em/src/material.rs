//! Material property lookup.
//!
//! The solver only ever asks a table for one scalar at a time: a property
//! column of one material at one temperature. [`MaterialLibrary`] is the
//! in-memory implementation, interpolating linearly between tabulated
//! temperatures.

use crate::error::{FdtdError, Result};

/// Vacuum permeability (H/m).
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// Vacuum permittivity (F/m).
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;

/// Name of the background material every simulation mode starts from.
pub const AIR: &str = "AIR";

/// Small integer tag of a material; node arrays store one per node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u8);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Property columns of a material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyColumn {
    Permeability = 4,
    Permittivity = 5,
    ElectricConductivity = 6,
    MagneticConductivity = 7,
}

impl PropertyColumn {
    #[inline]
    pub fn column(self) -> usize {
        self as usize
    }
}

/// Lookup from (temperature, material, column) to a property value.
pub trait MaterialTable: Sync {
    fn property(&self, temperature: f64, id: MaterialId, column: PropertyColumn) -> Result<f64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Temperature the material starts the simulation at.
    fn initial_temperature(&self, id: MaterialId) -> Result<f64>;

    fn id_of(&self, name: &str) -> Option<MaterialId>;

    fn name_of(&self, id: MaterialId) -> Option<&str>;

    /// Every material id, in ascending order.
    fn ids(&self) -> Vec<MaterialId> {
        (0..self.len().min(u8::MAX as usize + 1))
            .map(|i| MaterialId(i as u8))
            .collect()
    }
}

/// Electromagnetic properties tabulated at one temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySample {
    /// Temperature (K).
    pub temperature: f64,
    pub permeability: f64,
    pub permittivity: f64,
    pub electric_conductivity: f64,
    pub magnetic_conductivity: f64,
}

impl PropertySample {
    fn column(&self, column: PropertyColumn) -> f64 {
        match column {
            PropertyColumn::Permeability => self.permeability,
            PropertyColumn::Permittivity => self.permittivity,
            PropertyColumn::ElectricConductivity => self.electric_conductivity,
            PropertyColumn::MagneticConductivity => self.magnetic_conductivity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub initial_temperature: f64,
    /// Samples sorted by temperature.
    samples: Vec<PropertySample>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        initial_temperature: f64,
        mut samples: Vec<PropertySample>,
    ) -> Result<Self> {
        let name = name.into();
        if samples.is_empty() {
            return Err(FdtdError::NoPropertySamples(name));
        }
        samples.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
        Ok(Self {
            name,
            initial_temperature,
            samples,
        })
    }

    /// Lossless air at 300 K, vacuum permeability and permittivity.
    pub fn air() -> Self {
        Self {
            name: AIR.to_string(),
            initial_temperature: 300.0,
            samples: vec![PropertySample {
                temperature: 300.0,
                permeability: MU_0,
                permittivity: EPSILON_0,
                electric_conductivity: 0.0,
                magnetic_conductivity: 0.0,
            }],
        }
    }

    pub fn samples(&self) -> &[PropertySample] {
        &self.samples
    }

    /// Piecewise-linear in temperature, clamped to the first and last sample.
    pub fn property_at(&self, temperature: f64, column: PropertyColumn) -> f64 {
        let samples = &self.samples;
        let first = samples[0];
        let last = samples[samples.len() - 1];
        if temperature <= first.temperature {
            return first.column(column);
        }
        if temperature >= last.temperature {
            return last.column(column);
        }

        let upper = samples.partition_point(|s| s.temperature <= temperature);
        let (lo, hi) = (samples[upper - 1], samples[upper]);
        let span = hi.temperature - lo.temperature;
        if span <= 0.0 {
            return lo.column(column);
        }
        let t = (temperature - lo.temperature) / span;
        lo.column(column) + t * (hi.column(column) - lo.column(column))
    }
}

/// In-memory material table. Ids are assigned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding only [`Material::air`].
    pub fn with_air() -> Self {
        Self {
            materials: vec![Material::air()],
        }
    }

    pub fn push(&mut self, material: Material) -> Result<MaterialId> {
        if self.id_of(&material.name).is_some() {
            return Err(FdtdError::DuplicateMaterial(material.name));
        }
        let id = u8::try_from(self.materials.len())
            .map_err(|_| FdtdError::TooManyMaterials(self.materials.len() + 1))?;
        self.materials.push(material);
        Ok(MaterialId(id))
    }

    pub fn get(&self, id: MaterialId) -> Result<&Material> {
        self.materials
            .get(id.index())
            .ok_or_else(|| FdtdError::UnknownMaterial(format!("id {}", id.0)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u8), m))
    }
}

impl MaterialTable for MaterialLibrary {
    fn property(&self, temperature: f64, id: MaterialId, column: PropertyColumn) -> Result<f64> {
        Ok(self.get(id)?.property_at(temperature, column))
    }

    fn len(&self) -> usize {
        self.materials.len()
    }

    fn initial_temperature(&self, id: MaterialId) -> Result<f64> {
        Ok(self.get(id)?.initial_temperature)
    }

    fn id_of(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|i| MaterialId(i as u8))
    }

    fn name_of(&self, id: MaterialId) -> Option<&str> {
        self.materials.get(id.index()).map(|m| m.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(temperature: f64, sigma: f64) -> PropertySample {
        PropertySample {
            temperature,
            permeability: MU_0,
            permittivity: 4.0 * EPSILON_0,
            electric_conductivity: sigma,
            magnetic_conductivity: 0.0,
        }
    }

    #[test]
    fn test_column_numbers() {
        assert_eq!(PropertyColumn::Permeability.column(), 4);
        assert_eq!(PropertyColumn::MagneticConductivity.column(), 7);
    }

    #[test]
    fn test_interpolation_and_clamping() {
        let copper = Material::new(
            "COPPER",
            300.0,
            vec![sample(400.0, 4.0e7), sample(300.0, 6.0e7)],
        )
        .unwrap();
        let col = PropertyColumn::ElectricConductivity;
        assert_relative_eq!(copper.property_at(350.0, col), 5.0e7);
        assert_relative_eq!(copper.property_at(200.0, col), 6.0e7);
        assert_relative_eq!(copper.property_at(900.0, col), 4.0e7);
    }

    #[test]
    fn test_library_lookup() {
        let mut lib = MaterialLibrary::with_air();
        let id = lib
            .push(Material::new("SILICA", 293.0, vec![sample(293.0, 0.0)]).unwrap())
            .unwrap();
        assert_eq!(id, MaterialId(1));
        assert_eq!(lib.id_of(AIR), Some(MaterialId(0)));
        assert_eq!(lib.name_of(id), Some("SILICA"));
        assert_eq!(lib.initial_temperature(id).unwrap(), 293.0);
        assert_relative_eq!(
            lib.property(293.0, id, PropertyColumn::Permittivity).unwrap(),
            4.0 * EPSILON_0
        );
        assert!(matches!(
            lib.property(300.0, MaterialId(9), PropertyColumn::Permittivity),
            Err(FdtdError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_samples() {
        let mut lib = MaterialLibrary::with_air();
        assert!(matches!(
            lib.push(Material::air()),
            Err(FdtdError::DuplicateMaterial(_))
        ));
        assert!(matches!(
            Material::new("X", 300.0, Vec::new()),
            Err(FdtdError::NoPropertySamples(_))
        ));
    }
}
