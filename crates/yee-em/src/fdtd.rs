//! Leapfrog update equations on the staggered grid.
//!
//! Both halves share one shape:
//!
//! ```text
//! F = decay·F + drive₁·Δ₁(G₁) - drive₂·Δ₂(G₂)
//! ```
//!
//! with `(axis, G)` pairs from [`Component::curl_terms`]. Magnetic components
//! take forward differences of E (`G[n+1] - G[n]`), electric components
//! backward differences of H (`G[n] - G[n-1]`). Only interior nodes are
//! written; the one-node halo on every face is left untouched.

use std::ops::Range;

use rayon::prelude::*;

use crate::grid::{Array3D, Axis, Component, FieldKind, YeeGrid};
use crate::stability::{ComponentCoefficients, UpdateCoefficients};

/// Direction of the finite difference along a curl axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difference {
    /// `G[n + 1] - G[n]`
    Forward,
    /// `G[n] - G[n - 1]`
    Backward,
}

impl Difference {
    pub fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Magnetic => Difference::Forward,
            FieldKind::Electric => Difference::Backward,
        }
    }
}

/// Nodes of `target` written by a sweep: `1..size-1` on every axis, further
/// clamped so every neighbour read stays inside its own array.
pub fn sweep_bounds(
    target: [usize; 3],
    terms: [([usize; 3], Axis); 2],
    difference: Difference,
) -> [Range<usize>; 3] {
    std::array::from_fn(|a| {
        let mut hi = target[a].saturating_sub(1);
        for (size, axis) in terms {
            let reach = usize::from(difference == Difference::Forward && axis.index() == a);
            hi = hi.min(size[a].saturating_sub(reach));
        }
        1..hi.max(1)
    })
}

/// One sweep over a single component, k-planes spread over the current
/// thread pool.
///
/// Each node reads only the other field kind, so planes are independent.
pub fn update_component(
    target: &mut Array3D,
    coeffs: &ComponentCoefficients,
    terms: [(Axis, &Array3D); 2],
    difference: Difference,
) {
    let size = target.size();
    let [(axis1, g1), (axis2, g2)] = terms;
    let [ri, rj, rk] = sweep_bounds(
        size,
        [(g1.size(), axis1), (g2.size(), axis2)],
        difference,
    );
    if ri.is_empty() || rj.is_empty() || rk.is_empty() {
        return;
    }

    let nx = size[0];
    let plane = target.plane_len();
    let decay = coeffs.decay.as_slice();
    let [drive1, drive2] = [coeffs.drive[0].as_slice(), coeffs.drive[1].as_slice()];

    // Flat offset of the neighbour one step along `axis` in `g`.
    let stride = |g: &Array3D, axis: Axis| match axis {
        Axis::X => 1,
        Axis::Y => g.nx,
        Axis::Z => g.nx * g.ny,
    };
    let (s1, s2) = (stride(g1, axis1), stride(g2, axis2));
    let (v1, v2) = (g1.as_slice(), g2.as_slice());

    target
        .as_mut_slice()
        .par_chunks_mut(plane)
        .enumerate()
        .filter(|(k, _)| rk.contains(k))
        .for_each(|(k, slab)| {
            for j in rj.clone() {
                for i in ri.clone() {
                    let local = i + nx * j;
                    let index = local + plane * k;
                    let (n1, n2) = (g1.index(i, j, k), g2.index(i, j, k));
                    let (d1, d2) = match difference {
                        Difference::Forward => (v1[n1 + s1] - v1[n1], v2[n2 + s2] - v2[n2]),
                        Difference::Backward => (v1[n1] - v1[n1 - s1], v2[n2] - v2[n2 - s2]),
                    };
                    slab[local] =
                        decay[index] * slab[local] + drive1[index] * d1 - drive2[index] * d2;
                }
            }
        });
}

impl YeeGrid {
    /// Update Hx, Hy, Hz from E.
    ///
    /// ∂H/∂t = -(1/μ) ∇ × E
    pub fn update_h_field(&mut self, coeffs: &UpdateCoefficients) {
        let electric = &self.electric;
        for component in Component::MAGNETIC {
            let target = &mut self.magnetic[component.slot()].values;
            let [(a1, c1), (a2, c2)] = component.curl_terms();
            update_component(
                target,
                coeffs.get(component),
                [
                    (a1, &electric[c1.slot()].values),
                    (a2, &electric[c2.slot()].values),
                ],
                Difference::for_kind(component.kind()),
            );
        }
    }

    /// Update Ex, Ey, Ez from H.
    ///
    /// ∂E/∂t = (1/ε) ∇ × H - (σ/ε) E
    pub fn update_e_field(&mut self, coeffs: &UpdateCoefficients) {
        let magnetic = &self.magnetic;
        for component in Component::ELECTRIC {
            let target = &mut self.electric[component.slot()].values;
            let [(a1, c1), (a2, c2)] = component.curl_terms();
            update_component(
                target,
                coeffs.get(component),
                [
                    (a1, &magnetic[c1.slot()].values),
                    (a2, &magnetic[c2.slot()].values),
                ],
                Difference::for_kind(component.kind()),
            );
        }
    }
}
