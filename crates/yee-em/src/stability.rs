//! Courant time step and per-node update coefficients.
//!
//! Lossy media use the semi-implicit update
//!
//! ```text
//! COEF  = σ dt / (2 p)
//! decay = (1 - COEF) / (1 + COEF)
//! drive = 1 / (1 + COEF) · dt / (p · Δaxis)
//! ```
//!
//! where `p` is ε for electric components and μ for magnetic ones.

use rayon::prelude::*;

use crate::error::{FdtdError, Result};
use crate::grid::{Array3D, Component, YeeGrid};
use crate::material::{MaterialTable, PropertyColumn};

/// Courant limit of one material: `1 / (c · sqrt(1/dx² + 1/dy² + 1/dz²))`
/// with `c = 1/sqrt(μ ε)`.
pub fn courant_time_step(mu: f64, eps: f64, spacing: [f64; 3]) -> f64 {
    let c = 1.0 / (mu * eps).sqrt();
    let inv = spacing.iter().map(|d| 1.0 / (d * d)).sum::<f64>().sqrt();
    1.0 / (c * inv)
}

/// Largest stable time step over every material of the table, each taken at
/// its initial temperature.
pub fn compute_stable_time_step(table: &dyn MaterialTable, spacing: [f64; 3]) -> Result<f64> {
    if table.is_empty() {
        return Err(FdtdError::EmptyMaterialTable);
    }
    if spacing.iter().any(|&d| !(d.is_finite() && d > 0.0)) {
        return Err(FdtdError::InvalidSpacing(spacing));
    }

    let mut dt = f64::INFINITY;
    for id in table.ids() {
        let temperature = table.initial_temperature(id)?;
        let mu = table.property(temperature, id, PropertyColumn::Permeability)?;
        let eps = table.property(temperature, id, PropertyColumn::Permittivity)?;
        let dt_m = courant_time_step(mu, eps, spacing);
        if !(dt_m.is_finite() && dt_m > 0.0) {
            return Err(FdtdError::NonFiniteTimeStep {
                material: table.name_of(id).unwrap_or("?").to_string(),
                mu,
                eps,
            });
        }
        dt = dt.min(dt_m);
    }
    Ok(dt)
}

/// Decay and drive coefficients of a single node.
#[inline]
pub fn node_coefficients(
    conductivity: f64,
    property: f64,
    dt: f64,
    spacings: [f64; 2],
) -> (f64, [f64; 2]) {
    let coef = conductivity * dt / (2.0 * property);
    let decay = (1.0 - coef) / (1.0 + coef);
    let scale = 1.0 / (1.0 + coef);
    let drive = spacings.map(|d| scale * dt / (property * d));
    (decay, drive)
}

/// Coefficient arrays of one component, sized like its field.
#[derive(Debug, Clone)]
pub struct ComponentCoefficients {
    pub component: Component,
    pub decay: Array3D,
    /// In the order of [`Component::curl_terms`].
    pub drive: [Array3D; 2],
}

impl ComponentCoefficients {
    pub fn memory_bytes(&self) -> usize {
        3 * self.decay.len() * std::mem::size_of::<f64>()
    }
}

/// Coefficients of all six components for one time step.
#[derive(Debug, Clone)]
pub struct UpdateCoefficients {
    pub dt: f64,
    fields: Vec<ComponentCoefficients>,
}

impl UpdateCoefficients {
    pub fn get(&self, component: Component) -> &ComponentCoefficients {
        &self.fields[component.ordinal()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentCoefficients> {
        self.fields.iter()
    }

    pub fn memory_bytes(&self) -> usize {
        self.fields.iter().map(ComponentCoefficients::memory_bytes).sum()
    }
}

/// Build the 18 coefficient arrays from the grid's material data.
pub fn build_update_coefficients(grid: &YeeGrid, dt: f64) -> Result<UpdateCoefficients> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(FdtdError::InvalidTimeStep(dt));
    }

    let fields = Component::ALL
        .iter()
        .map(|&component| {
            let field = grid.field(component);
            let size = field.size();
            let [(a1, _), (a2, _)] = component.curl_terms();
            let spacings = [grid.spacing[a1.index()], grid.spacing[a2.index()]];

            let mut decay = Array3D::zeros(size);
            let mut drive1 = Array3D::zeros(size);
            let mut drive2 = Array3D::zeros(size);
            decay
                .as_mut_slice()
                .par_iter_mut()
                .zip(drive1.as_mut_slice().par_iter_mut())
                .zip(drive2.as_mut_slice().par_iter_mut())
                .zip(
                    field
                        .property
                        .as_slice()
                        .par_iter()
                        .zip(field.conductivity.as_slice().par_iter()),
                )
                .for_each(|(((d, c1), c2), (&p, &s))| {
                    let (decay, [drive1, drive2]) = node_coefficients(s, p, dt, spacings);
                    *d = decay;
                    *c1 = drive1;
                    *c2 = drive2;
                });

            ComponentCoefficients {
                component,
                decay,
                drive: [drive1, drive2],
            }
        })
        .collect();

    Ok(UpdateCoefficients { dt, fields })
}
