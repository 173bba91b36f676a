//! Rank-local view of the decomposed global grid.
//!
//! The decomposition itself happens elsewhere; this is the data it hands to a
//! rank: the local extent, the origin of the local block in global node
//! coordinates, and which halo nodes each component drops.

use crate::grid::{Component, FieldKind};

/// Per-component, per-axis halo trims.
///
/// Every component array starts at `extent + 2` nodes along each axis (one
/// halo node per face). A set flag removes the high-side halo node on that
/// axis, so array node 1 is always local node 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaloTrim {
    flags: [[bool; 3]; 6],
}

impl HaloTrim {
    /// No trims: every component is `extent + 2` on every axis.
    pub const NONE: HaloTrim = HaloTrim {
        flags: [[false; 3]; 6],
    };

    /// Yee staggering on a single, undivided domain: each E component loses
    /// one node along its own axis, each H component along the two others.
    pub fn yee() -> Self {
        let mut trims = Self::NONE;
        for component in Component::ALL {
            let own = component.axis().index();
            for axis in 0..3 {
                let trimmed = match component.kind() {
                    FieldKind::Electric => axis == own,
                    FieldKind::Magnetic => axis != own,
                };
                trims.set(component, axis, trimmed);
            }
        }
        trims
    }

    pub fn get(&self, component: Component) -> [bool; 3] {
        self.flags[component.ordinal()]
    }

    pub fn set(&mut self, component: Component, axis: usize, trimmed: bool) {
        if axis < 3 {
            self.flags[component.ordinal()][axis] = trimmed;
        }
    }

    pub fn with(mut self, component: Component, flags: [bool; 3]) -> Self {
        self.flags[component.ordinal()] = flags;
        self
    }
}

impl Default for HaloTrim {
    fn default() -> Self {
        Self::yee()
    }
}

/// What one rank owns of the global grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankDomain {
    pub rank: usize,
    /// Local node count (M, N, P).
    pub extent: [usize; 3],
    /// Global node index of local node (0, 0, 0).
    pub origin: [usize; 3],
    pub trims: HaloTrim,
}

impl RankDomain {
    pub fn new(rank: usize, extent: [usize; 3], origin: [usize; 3], trims: HaloTrim) -> Self {
        Self {
            rank,
            extent,
            origin,
            trims,
        }
    }

    /// Whole grid on rank 0 with Yee trims.
    pub fn single_rank(extent: [usize; 3]) -> Self {
        Self::new(0, extent, [0; 3], HaloTrim::yee())
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_origin(mut self, origin: [usize; 3]) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_trims(mut self, trims: HaloTrim) -> Self {
        self.trims = trims;
        self
    }

    /// Array extent of one component: local extent plus the 2-node halo,
    /// minus one on every trimmed axis.
    pub fn component_size(&self, component: Component) -> [usize; 3] {
        let trims = self.trims.get(component);
        std::array::from_fn(|axis| self.extent[axis] + 2 - usize::from(trims[axis]))
    }

    pub fn node_count(&self) -> usize {
        self.extent.iter().product()
    }

    pub fn local_to_global(&self, local: [usize; 3]) -> [usize; 3] {
        std::array::from_fn(|axis| local[axis] + self.origin[axis])
    }

    /// Half-open containment: `origin <= g < origin + extent` on all axes.
    pub fn contains_global(&self, global: [usize; 3]) -> bool {
        (0..3).all(|axis| {
            global[axis] >= self.origin[axis]
                && global[axis] < self.origin[axis] + self.extent[axis]
        })
    }

    pub fn global_to_local(&self, global: [usize; 3]) -> Option<[usize; 3]> {
        if !self.contains_global(global) {
            return None;
        }
        Some(std::array::from_fn(|axis| global[axis] - self.origin[axis]))
    }
}
