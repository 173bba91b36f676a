//! Continuous-wave excitation regions.
//!
//! A region is a box of global grid nodes around a physical center. Inside it
//! the electric field is overwritten every step: the two transverse components
//! are zeroed and the component along the drive axis is set to
//! `sin(2π f t)`. The magnetic field is left to the update.
//!
//! Geometry is set in stages (region count, then lengths and centers, then
//! [`SourceInjector::finalize_region`]) and lookups are only valid once the
//! regions involved are finalized.

use std::f64::consts::PI;

use crate::error::{FdtdError, Result};
use crate::grid::{Axis, FieldKind};
use crate::Verbosity;

/// Box of nodes: `corner[a] <= node[a] <= corner[a] + count[a]` on every axis.
///
/// Both ends are inclusive, so two regions whose boxes touch share their
/// boundary nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpan {
    pub corner: [usize; 3],
    pub count: [usize; 3],
}

/// Largest node offset a span may reach along one axis.
const MAX_SPAN_NODES: f64 = u32::MAX as f64;

impl NodeSpan {
    /// Nodes covered by `length` around `center`. Quotients by the spacing
    /// are truncated; the low face below 0 clamps to node 1.
    ///
    /// `None` when a coordinate is not finite or lands beyond
    /// [`MAX_SPAN_NODES`] nodes.
    fn around(center: [f64; 3], length: [f64; 3], spacing: [f64; 3]) -> Option<Self> {
        let nodes = |x: f64, d: f64| {
            let q = (x / d).trunc();
            (q.is_finite() && q <= MAX_SPAN_NODES).then(|| q as usize + 1)
        };
        let mut span = Self {
            corner: [0; 3],
            count: [0; 3],
        };
        for a in 0..3 {
            if !(center[a].is_finite() && length[a].is_finite()) {
                return None;
            }
            let low = (center[a] - length[a] / 2.0).max(0.0);
            span.corner[a] = nodes(low, spacing[a])?;
            span.count[a] = nodes(length[a].max(0.0), spacing[a])?;
        }
        Some(span)
    }

    pub fn contains(&self, node: [usize; 3]) -> bool {
        (0..3).all(|a| {
            node[a] >= self.corner[a]
                && self.corner[a]
                    .checked_add(self.count[a])
                    .is_none_or(|high| node[a] <= high)
        })
    }
}

/// One excitation region.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRegion {
    center: [f64; 3],
    length: [f64; 3],
    center_set: bool,
    length_set: bool,
    /// Length of the gap along the drive axis (m).
    pub air_gap: f64,
    frequency: Option<f64>,
    pub drive_axis: Axis,
    spans: Option<(NodeSpan, NodeSpan)>,
}

impl Default for SourceRegion {
    fn default() -> Self {
        Self {
            center: [0.0; 3],
            length: [0.0; 3],
            center_set: false,
            length_set: false,
            air_gap: 0.0,
            frequency: None,
            drive_axis: Axis::Z,
            spans: None,
        }
    }
}

impl SourceRegion {
    pub fn center(&self) -> [f64; 3] {
        self.center
    }

    pub fn length(&self) -> [f64; 3] {
        self.length
    }

    pub fn frequency(&self) -> Option<f64> {
        self.frequency
    }

    pub fn is_finalized(&self) -> bool {
        self.spans.is_some()
    }

    /// Full node span, once finalized.
    pub fn span(&self) -> Option<NodeSpan> {
        self.spans.map(|(full, _)| full)
    }

    /// Air-gap node span, once finalized.
    pub fn air_gap_span(&self) -> Option<NodeSpan> {
        self.spans.map(|(_, gap)| gap)
    }

    fn compute_spans(&self, index: usize, spacing: [f64; 3]) -> Result<(NodeSpan, NodeSpan)> {
        let invalid = |detail: String| FdtdError::InvalidSourceGeometry {
            region: index,
            detail,
        };
        let full = NodeSpan::around(self.center, self.length, spacing).ok_or_else(|| {
            invalid(format!(
                "center {:?} and lengths {:?} do not map onto grid nodes",
                self.center, self.length
            ))
        })?;
        let mut gap_length = self.length;
        gap_length[self.drive_axis.index()] = self.air_gap;
        let gap = NodeSpan::around(self.center, gap_length, spacing).ok_or_else(|| {
            invalid(format!(
                "air gap {} does not map onto grid nodes",
                self.air_gap
            ))
        })?;
        Ok((full, gap))
    }

    /// Drive value at `time`: `sin(2π f t)`.
    pub fn drive(&self, time: f64) -> Option<f64> {
        self.frequency.map(|f| (2.0 * PI * f * time).sin())
    }

    /// Electric field imposed at `time`, indexed x, y, z.
    pub fn electric_sample(&self, time: f64) -> Option<[f64; 3]> {
        let value = self.drive(time)?;
        let mut field = [0.0; 3];
        field[self.drive_axis.index()] = value;
        Some(field)
    }
}

/// Field override for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSample {
    pub region: usize,
    /// Ex, Ey, Ez.
    pub electric: [f64; 3],
}

/// Owner of all excitation regions of a run.
#[derive(Debug, Clone, Default)]
pub struct SourceInjector {
    regions: Vec<SourceRegion>,
    count_set: bool,
    verbosity: Verbosity,
}

impl SourceInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Fix the number of regions. Only the first call has an effect.
    pub fn set_region_count(&mut self, count: usize) -> Result<()> {
        if self.count_set {
            let err = FdtdError::AlreadySet("number of sources");
            eprintln!("  Source: set_region_count({count}) rejected: {err}");
            return Err(err);
        }
        self.regions = vec![SourceRegion::default(); count];
        self.count_set = true;
        Ok(())
    }

    /// Number of regions, once set.
    pub fn region_count(&self) -> Option<usize> {
        self.count_set.then_some(self.regions.len())
    }

    pub fn regions(&self) -> &[SourceRegion] {
        &self.regions
    }

    pub fn region(&self, index: usize) -> Result<&SourceRegion> {
        self.regions.get(index).ok_or(FdtdError::RegionOutOfRange {
            index,
            count: self.regions.len(),
        })
    }

    fn region_mut(&mut self, index: usize) -> Result<&mut SourceRegion> {
        let count = self.regions.len();
        let region = self
            .regions
            .get_mut(index)
            .ok_or(FdtdError::RegionOutOfRange { index, count })?;
        if region.is_finalized() {
            return Err(FdtdError::RegionFinalized(index));
        }
        Ok(region)
    }

    /// Check a bulk setter's input before anything is written.
    fn check_bulk(&self, values: &[f64]) -> Result<()> {
        if !self.count_set {
            return Err(FdtdError::MissingPrerequisite("number of sources"));
        }
        if values.len() != self.regions.len() {
            return Err(FdtdError::LengthMismatch {
                expected: self.regions.len(),
                got: values.len(),
            });
        }
        Ok(())
    }

    fn check_geometry_open(&self) -> Result<()> {
        match self.regions.iter().position(SourceRegion::is_finalized) {
            Some(index) => Err(FdtdError::RegionFinalized(index)),
            None => Ok(()),
        }
    }

    /// Set the length along `axis` of every region, one value per region.
    pub fn set_lengths_along_axis(&mut self, axis: usize, values: &[f64]) -> Result<()> {
        self.check_bulk(values)?;
        let axis = Axis::try_from(axis)?.index();
        self.check_geometry_open()?;
        for (region, &value) in self.regions.iter_mut().zip(values) {
            region.length[axis] = value;
            region.length_set = true;
        }
        Ok(())
    }

    /// Set the center coordinate along `axis` of every region.
    pub fn set_centers_along_axis(&mut self, axis: usize, values: &[f64]) -> Result<()> {
        self.check_bulk(values)?;
        let axis = Axis::try_from(axis)?.index();
        self.check_geometry_open()?;
        for (region, &value) in self.regions.iter_mut().zip(values) {
            region.center[axis] = value;
            region.center_set = true;
        }
        Ok(())
    }

    pub fn set_frequencies(&mut self, frequencies: &[f64]) -> Result<()> {
        self.check_bulk(frequencies)?;
        for (region, &f) in self.regions.iter_mut().zip(frequencies) {
            region.frequency = Some(f);
        }
        Ok(())
    }

    pub fn set_air_gaps(&mut self, air_gaps: &[f64]) -> Result<()> {
        self.check_bulk(air_gaps)?;
        self.check_geometry_open()?;
        for (region, &gap) in self.regions.iter_mut().zip(air_gaps) {
            region.air_gap = gap;
        }
        Ok(())
    }

    /// Set all three lengths of one region. Ignored once lengths are set;
    /// returns whether the values were taken.
    pub fn set_lengths(&mut self, index: usize, length: [f64; 3]) -> Result<bool> {
        let region = self.region_mut(index)?;
        if region.length_set {
            return Ok(false);
        }
        region.length = length;
        region.length_set = true;
        Ok(true)
    }

    /// Set the center of one region. Ignored once the center is set.
    pub fn set_center(&mut self, index: usize, center: [f64; 3]) -> Result<bool> {
        let region = self.region_mut(index)?;
        if region.center_set {
            return Ok(false);
        }
        region.center = center;
        region.center_set = true;
        Ok(true)
    }

    pub fn set_drive_axis(&mut self, index: usize, axis: usize) -> Result<()> {
        let axis = Axis::try_from(axis)?;
        self.region_mut(index)?.drive_axis = axis;
        Ok(())
    }

    /// Compute the node spans of region `index` for the given grid spacing.
    ///
    /// Finalizing again with inputs that give the same spans is a no-op;
    /// different spans are rejected.
    pub fn finalize_region(&mut self, index: usize, spacing: [f64; 3]) -> Result<()> {
        if !self.count_set {
            return Err(FdtdError::MissingPrerequisite("number of sources"));
        }
        let verbosity = self.verbosity;
        let count = self.regions.len();
        let region = self
            .regions
            .get_mut(index)
            .ok_or(FdtdError::RegionOutOfRange { index, count })?;
        if !(region.center_set && region.length_set) {
            return Err(FdtdError::MissingPrerequisite("source center and lengths"));
        }
        if spacing.iter().any(|&d| !(d.is_finite() && d > 0.0)) {
            return Err(FdtdError::InvalidSpacing(spacing));
        }

        let spans = region.compute_spans(index, spacing)?;
        match region.spans {
            Some(existing) if existing == spans => return Ok(()),
            Some(_) => return Err(FdtdError::RegionFinalized(index)),
            None => region.spans = Some(spans),
        }

        if verbosity >= Verbosity::Detailed {
            let (full, gap) = spans;
            eprintln!(
                "  Source[{index}]: corner={:?} nodes={:?} air-gap corner={:?} nodes={:?}",
                full.corner, full.count, gap.corner, gap.count
            );
        }
        Ok(())
    }

    /// Finalize every region.
    pub fn finalize_all(&mut self, spacing: [f64; 3]) -> Result<()> {
        for index in 0..self.regions.len() {
            self.finalize_region(index, spacing)?;
        }
        Ok(())
    }

    /// First region, by ascending index, containing the global node.
    pub fn locate_region(&self, node: [usize; 3]) -> Result<Option<usize>> {
        if !self.count_set {
            return Err(FdtdError::MissingPrerequisite("number of sources"));
        }
        for (index, region) in self.regions.iter().enumerate() {
            let span = region.span().ok_or(FdtdError::RegionNotFinalized(index))?;
            if span.contains(node) {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    pub fn is_inside_air_gap(&self, node: [usize; 3]) -> Result<bool> {
        if !self.count_set {
            return Err(FdtdError::MissingPrerequisite("number of sources"));
        }
        for (index, region) in self.regions.iter().enumerate() {
            let gap = region
                .air_gap_span()
                .ok_or(FdtdError::RegionNotFinalized(index))?;
            if gap.contains(node) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Field override at a global node.
    ///
    /// Magnetic nodes are never overridden. An electric node outside every
    /// region is an error.
    pub fn sample(
        &self,
        node: [usize; 3],
        time: f64,
        kind: FieldKind,
    ) -> Result<Option<SourceSample>> {
        if kind == FieldKind::Magnetic {
            return Ok(None);
        }
        let region = self
            .locate_region(node)?
            .ok_or(FdtdError::NotInsideSource(node))?;
        let electric = self.electric_sample(region, time)?;
        Ok(Some(SourceSample { region, electric }))
    }

    /// Electric field imposed by region `index` at `time`.
    pub fn electric_sample(&self, index: usize, time: f64) -> Result<[f64; 3]> {
        self.region(index)?
            .electric_sample(time)
            .ok_or(FdtdError::MissingPrerequisite("source frequencies"))
    }

    /// Ensure every region can be sampled.
    pub fn check_ready(&self) -> Result<()> {
        if !self.count_set {
            return Err(FdtdError::MissingPrerequisite("number of sources"));
        }
        for (index, region) in self.regions.iter().enumerate() {
            if !region.is_finalized() {
                return Err(FdtdError::RegionNotFinalized(index));
            }
            if region.frequency.is_none() {
                return Err(FdtdError::MissingPrerequisite("source frequencies"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_region(center: [f64; 3], length: [f64; 3]) -> SourceInjector {
        let mut src = SourceInjector::new();
        src.set_region_count(1).unwrap();
        for axis in 0..3 {
            src.set_lengths_along_axis(axis, &[length[axis]]).unwrap();
            src.set_centers_along_axis(axis, &[center[axis]]).unwrap();
        }
        src.set_frequencies(&[1e9]).unwrap();
        src
    }

    #[test]
    fn test_region_count_set_once() {
        let mut src = SourceInjector::new();
        src.set_region_count(2).unwrap();
        assert!(matches!(
            src.set_region_count(5),
            Err(FdtdError::AlreadySet(_))
        ));
        assert_eq!(src.region_count(), Some(2));
    }

    #[test]
    fn test_bulk_setters_validate() {
        let mut src = SourceInjector::new();
        assert!(matches!(
            src.set_lengths_along_axis(0, &[1.0]),
            Err(FdtdError::MissingPrerequisite(_))
        ));
        src.set_region_count(2).unwrap();
        assert!(matches!(
            src.set_lengths_along_axis(0, &[1.0]),
            Err(FdtdError::LengthMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            src.set_centers_along_axis(3, &[1.0, 2.0]),
            Err(FdtdError::InvalidAxis(3))
        ));
    }

    #[test]
    fn test_finalize_spans() {
        let mut src = one_region([5.0; 3], [2.0; 3]);
        src.finalize_region(0, [1.0; 3]).unwrap();
        let span = src.region(0).unwrap().span().unwrap();
        assert_eq!(span.corner, [5, 5, 5]);
        assert_eq!(span.count, [3, 3, 3]);
        // Same inputs again: idempotent
        src.finalize_region(0, [1.0; 3]).unwrap();
        assert_eq!(src.region(0).unwrap().span(), Some(span));
        // Different spacing changes the spans: rejected
        assert!(matches!(
            src.finalize_region(0, [0.5; 3]),
            Err(FdtdError::RegionFinalized(0))
        ));
    }

    #[test]
    fn test_finalize_rejects_unmappable_geometry() {
        let mut src = SourceInjector::new();
        src.set_region_count(1).unwrap();
        src.set_center(0, [5.0; 3]).unwrap();
        src.set_lengths(0, [f64::INFINITY, 1.0, 1.0]).unwrap();
        assert!(matches!(
            src.finalize_region(0, [1.0; 3]),
            Err(FdtdError::InvalidSourceGeometry { region: 0, .. })
        ));
        assert!(!src.region(0).unwrap().is_finalized());

        let mut src = one_region([1e-3; 3], [1e30, 1e-3, 1e-3]);
        assert!(matches!(
            src.finalize_region(0, [1e-3; 3]),
            Err(FdtdError::InvalidSourceGeometry { .. })
        ));

        let mut src = one_region([5.0; 3], [2.0; 3]);
        src.set_air_gaps(&[f64::NAN]).unwrap();
        assert!(matches!(
            src.finalize_all([1.0; 3]),
            Err(FdtdError::InvalidSourceGeometry { region: 0, .. })
        ));
    }

    #[test]
    fn test_contains_saturates_at_upper_bound() {
        let span = NodeSpan {
            corner: [1, 1, 1],
            count: [usize::MAX, 0, 0],
        };
        assert!(span.contains([usize::MAX, 1, 1]));
        assert!(!span.contains([0, 1, 1]));
        assert!(!span.contains([5, 2, 1]));
    }

    #[test]
    fn test_finalize_requires_geometry() {
        let mut src = SourceInjector::new();
        src.set_region_count(1).unwrap();
        src.set_centers_along_axis(0, &[1.0]).unwrap();
        assert!(matches!(
            src.finalize_region(0, [1.0; 3]),
            Err(FdtdError::MissingPrerequisite(_))
        ));
    }

    #[test]
    fn test_per_region_setters_ignored_after_first() {
        let mut src = SourceInjector::new();
        src.set_region_count(1).unwrap();
        assert!(src.set_center(0, [1.0, 2.0, 3.0]).unwrap());
        assert!(!src.set_center(0, [9.0; 3]).unwrap());
        assert_eq!(src.region(0).unwrap().center(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_air_gap_span_uses_drive_axis() {
        let mut src = one_region([10.0; 3], [4.0, 4.0, 8.0]);
        src.set_air_gaps(&[2.0]).unwrap();
        src.finalize_all([1.0; 3]).unwrap();
        let gap = src.region(0).unwrap().air_gap_span().unwrap();
        assert_eq!(gap.corner, [9, 9, 10]);
        assert_eq!(gap.count, [5, 5, 3]);
        assert!(src.is_inside_air_gap([10, 10, 12]).unwrap());
        assert!(!src.is_inside_air_gap([10, 10, 7]).unwrap());
        assert_eq!(src.locate_region([10, 10, 7]).unwrap(), Some(0));
    }

    #[test]
    fn test_locate_requires_finalized() {
        let src = one_region([5.0; 3], [2.0; 3]);
        assert!(matches!(
            src.locate_region([5, 5, 5]),
            Err(FdtdError::RegionNotFinalized(0))
        ));
    }

    #[test]
    fn test_sample_electric_and_magnetic() {
        let mut src = one_region([5.0; 3], [2.0; 3]);
        src.finalize_region(0, [1.0; 3]).unwrap();
        let t = 1.0 / (4.0 * 1e9);
        let sample = src.sample([6, 6, 6], t, FieldKind::Electric).unwrap().unwrap();
        assert_eq!(sample.region, 0);
        assert_eq!(sample.electric[0], 0.0);
        assert_eq!(sample.electric[1], 0.0);
        assert_abs_diff_eq!(sample.electric[2], 1.0, epsilon = 1e-12);
        assert_eq!(src.sample([6, 6, 6], t, FieldKind::Magnetic).unwrap(), None);
        assert!(matches!(
            src.sample([0, 0, 0], t, FieldKind::Electric),
            Err(FdtdError::NotInsideSource([0, 0, 0]))
        ));
    }

    #[test]
    fn test_setters_rejected_after_finalize() {
        let mut src = one_region([5.0; 3], [2.0; 3]);
        src.finalize_region(0, [1.0; 3]).unwrap();
        assert!(matches!(
            src.set_lengths_along_axis(0, &[3.0]),
            Err(FdtdError::RegionFinalized(0))
        ));
        assert!(matches!(
            src.set_center(0, [1.0; 3]),
            Err(FdtdError::RegionFinalized(0))
        ));
    }
}
