use crate::layout::{DescriptorRangeType, ShaderVariableType, ShaderVisibility};
use crate::root_params::{DescriptorRange, RangeOffset, RangeSpan, RootParameter, RootViewKind};
use std::ops::Deref;

/// Append-only collection of the root parameters of a root signature under construction.
///
/// Descriptor tables and root views (including inline constants) are kept apart, in the order they were added. The
/// ranges of all tables share one arena, where each table owns the contiguous [`RangeSpan`] it was given. Growing a
/// table shifts the spans of all tables after it, already set ranges and table sizes are never modified.
#[derive(Debug, Clone, Default)]
pub struct RootParamsManager {
	tables: Vec<RootParameter>,
	views: Vec<RootParameter>,
	ranges: Vec<Option<DescriptorRange>>,
}

impl RootParamsManager {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_root_view(
		&mut self,
		kind: RootViewKind,
		root_index: u32,
		register: u32,
		space: u32,
		visibility: ShaderVisibility,
		variable_type: ShaderVariableType,
	) -> u32 {
		self.views.push(RootParameter::new_view(
			kind,
			root_index,
			register,
			space,
			visibility,
			variable_type,
		));
		self.views.len() as u32 - 1
	}

	pub fn add_root_constants(
		&mut self,
		root_index: u32,
		register: u32,
		space: u32,
		num_values: u32,
		visibility: ShaderVisibility,
		variable_type: ShaderVariableType,
	) -> u32 {
		self.views.push(RootParameter::new_constants(
			root_index,
			register,
			space,
			num_values,
			visibility,
			variable_type,
		));
		self.views.len() as u32 - 1
	}

	/// Appends a new descriptor table with `initial_range_count` unset ranges and returns its table index.
	pub fn add_root_table(
		&mut self,
		root_index: u32,
		visibility: ShaderVisibility,
		variable_type: ShaderVariableType,
		initial_range_count: u32,
	) -> u32 {
		let span = RangeSpan {
			start: self.ranges.len() as u32,
			len: initial_range_count,
		};
		self.ranges
			.extend(std::iter::repeat(None).take(initial_range_count as usize));
		self.tables
			.push(RootParameter::new_table(root_index, span, visibility, variable_type));
		self.tables.len() as u32 - 1
	}

	/// Reserves `extra_count` additional unset ranges at the end of the table at `table_index`.
	pub fn add_descriptor_ranges(&mut self, table_index: u32, extra_count: u32) {
		debug_assert!((table_index as usize) < self.tables.len(), "Table index is out of range");
		if extra_count == 0 {
			return;
		}

		let span = self.tables[table_index as usize].range_span();
		let at = span.end() as usize;
		self.ranges
			.splice(at..at, std::iter::repeat(None).take(extra_count as usize));

		let grown = &mut self.tables[table_index as usize];
		*grown = grown.relocated(RangeSpan {
			start: span.start,
			len: span.len + extra_count,
		});
		// spans are laid out in table order
		for table in &mut self.tables[table_index as usize + 1..] {
			let old = table.range_span();
			*table = table.relocated(RangeSpan {
				start: old.start + extra_count,
				len: old.len,
			});
		}
	}

	#[inline]
	pub fn num_root_tables(&self) -> u32 {
		self.tables.len() as u32
	}

	#[inline]
	pub fn num_root_views(&self) -> u32 {
		self.views.len() as u32
	}

	/// Total number of root parameters, which is also the root index the next parameter receives.
	#[inline]
	pub fn num_root_parameters(&self) -> u32 {
		self.num_root_tables() + self.num_root_views()
	}

	#[inline]
	pub fn root_table(&self, table_index: u32) -> RootTable<'_> {
		debug_assert!((table_index as usize) < self.tables.len(), "Table index is out of range");
		let param = &self.tables[table_index as usize];
		RootTable {
			param,
			ranges: &self.ranges[param.range_span().to_range()],
		}
	}

	#[inline]
	pub fn root_table_mut(&mut self, table_index: u32) -> RootTableMut<'_> {
		debug_assert!((table_index as usize) < self.tables.len(), "Table index is out of range");
		let param = &mut self.tables[table_index as usize];
		let span = param.range_span();
		RootTableMut {
			param,
			ranges: &mut self.ranges[span.to_range()],
		}
	}

	#[inline]
	pub fn root_view(&self, view_index: u32) -> &RootParameter {
		debug_assert!((view_index as usize) < self.views.len(), "Root view index is out of range");
		&self.views[view_index as usize]
	}

	pub fn root_tables(&self) -> impl ExactSizeIterator<Item = RootTable<'_>> + '_ {
		(0..self.num_root_tables()).map(|i| self.root_table(i))
	}

	pub fn root_views(&self) -> impl ExactSizeIterator<Item = &RootParameter> + '_ {
		self.views.iter()
	}

	/// Checks a complete layout in debug builds. Root indices must be unique and dense, every range of every table
	/// must be set, and the ranges of a table must neither overlap nor exceed the table size.
	pub fn debug_verify(&self) {
		if !cfg!(debug_assertions) {
			return;
		}
		let mut root_indices = self
			.tables
			.iter()
			.chain(&self.views)
			.map(RootParameter::root_index)
			.collect::<Vec<_>>();
		root_indices.sort_unstable();
		debug_assert!(
			root_indices.iter().copied().eq(0..root_indices.len() as u32),
			"Root indices must be unique and dense, got {:?}",
			root_indices
		);

		for table in self.root_tables() {
			debug_assert!(
				table.ranges.iter().all(Option::is_some),
				"Descriptor table at root index {} has unset ranges",
				table.root_index()
			);
			let mut ranges = table.ranges().collect::<Vec<_>>();
			ranges.sort_unstable_by_key(|r| r.offset_from_table_start);
			for pair in ranges.windows(2) {
				debug_assert!(
					pair[0].end() <= pair[1].offset_from_table_start,
					"Descriptor ranges of the table at root index {} overlap: {:?} and {:?}",
					table.root_index(),
					pair[0],
					pair[1]
				);
			}
			debug_assert!(
				ranges.last().map_or(0, |r| r.end()) <= table.descriptor_table_size(),
				"Descriptor ranges exceed the size of the table at root index {}",
				table.root_index()
			);
		}
	}
}

/// Shared access to a descriptor table of a [`RootParamsManager`] and its ranges.
#[derive(Debug, Copy, Clone)]
pub struct RootTable<'a> {
	param: &'a RootParameter,
	ranges: &'a [Option<DescriptorRange>],
}

impl<'a> RootTable<'a> {
	#[inline]
	pub fn param(&self) -> &'a RootParameter {
		self.param
	}

	#[inline]
	pub fn num_ranges(&self) -> u32 {
		self.ranges.len() as u32
	}

	/// The range at `range_index`, `None` if it has not been set yet.
	#[inline]
	pub fn range(&self, range_index: u32) -> Option<&'a DescriptorRange> {
		debug_assert!((range_index as usize) < self.ranges.len(), "Invalid descriptor range index");
		self.ranges[range_index as usize].as_ref()
	}

	/// All ranges that have been set, in range index order.
	pub fn ranges(&self) -> impl Iterator<Item = &'a DescriptorRange> + 'a {
		self.ranges.iter().flatten()
	}
}

impl Deref for RootTable<'_> {
	type Target = RootParameter;

	fn deref(&self) -> &Self::Target {
		self.param
	}
}

/// Mutable access to a descriptor table of a [`RootParamsManager`], to fill in its ranges.
#[derive(Debug)]
pub struct RootTableMut<'a> {
	param: &'a mut RootParameter,
	ranges: &'a mut [Option<DescriptorRange>],
}

impl RootTableMut<'_> {
	/// Sets the range at `range_index`, which must not have been set before. Returns the resolved offset of the range
	/// from the start of the table.
	pub fn set_descriptor_range(
		&mut self,
		range_index: u32,
		range_type: DescriptorRangeType,
		register: u32,
		count: u32,
		space: u32,
		offset: RangeOffset,
	) -> u32 {
		self.param
			.set_descriptor_range(self.ranges, range_index, range_type, register, count, space, offset)
	}

	#[inline]
	pub fn num_ranges(&self) -> u32 {
		self.ranges.len() as u32
	}
}

impl Deref for RootTableMut<'_> {
	type Target = RootParameter;

	fn deref(&self) -> &Self::Target {
		self.param
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn snapshot(mgr: &RootParamsManager) -> Vec<(u32, u32, Vec<DescriptorRange>)> {
		mgr.root_tables()
			.map(|t| (t.root_index(), t.descriptor_table_size(), t.ranges().copied().collect()))
			.collect()
	}

	#[test]
	fn test_add_parameters() {
		let mut mgr = RootParamsManager::new();
		assert_eq!(
			mgr.add_root_view(
				RootViewKind::Cbv,
				0,
				0,
				0,
				ShaderVisibility::Vertex,
				ShaderVariableType::Static
			),
			0
		);
		assert_eq!(
			mgr.add_root_table(1, ShaderVisibility::Pixel, ShaderVariableType::Mutable, 1),
			0
		);
		assert_eq!(
			mgr.add_root_constants(2, 1, 0, 4, ShaderVisibility::All, ShaderVariableType::Static),
			1
		);
		assert_eq!(mgr.num_root_tables(), 1);
		assert_eq!(mgr.num_root_views(), 2);
		assert_eq!(mgr.num_root_parameters(), 3);
		assert_eq!(mgr.root_table(0).num_ranges(), 1);
		assert!(mgr.root_table(0).range(0).is_none());
		assert_eq!(mgr.root_view(1).root_index(), 2);
	}

	#[test]
	fn test_growth_preserves_ranges() {
		let mut mgr = RootParamsManager::new();
		for (root_index, count) in [(0, 4), (1, 2), (2, 1)] {
			let t = mgr.add_root_table(root_index, ShaderVisibility::Pixel, ShaderVariableType::Mutable, 1);
			mgr.root_table_mut(t)
				.set_descriptor_range(0, DescriptorRangeType::Srv, root_index, count, 0, RangeOffset::Append);
		}
		let before = snapshot(&mgr);

		mgr.add_descriptor_ranges(0, 2);
		mgr.add_descriptor_ranges(1, 1);
		let after = snapshot(&mgr);
		assert_eq!(before, after);

		// new ranges are unset and land at the end of the grown table
		assert_eq!(mgr.root_table(0).num_ranges(), 3);
		assert!(mgr.root_table(0).range(1).is_none());
		assert!(mgr.root_table(0).range(2).is_none());
		assert_eq!(mgr.root_table(1).num_ranges(), 2);
		assert_eq!(mgr.root_table(2).num_ranges(), 1);
		assert_eq!(mgr.root_table(2).range(0).unwrap().base_register, 2);

		let offset =
			mgr.root_table_mut(0)
				.set_descriptor_range(1, DescriptorRangeType::Uav, 0, 3, 0, RangeOffset::Append);
		assert_eq!(offset, 4);
		assert_eq!(mgr.root_table(0).descriptor_table_size(), 7);
		assert_eq!(mgr.root_table(1).descriptor_table_size(), 2);
		assert_eq!(mgr.root_table(2).descriptor_table_size(), 1);
	}

	#[test]
	fn test_growth_of_empty_tables() {
		let mut mgr = RootParamsManager::new();
		mgr.add_root_table(0, ShaderVisibility::All, ShaderVariableType::Static, 0);
		mgr.add_root_table(1, ShaderVisibility::All, ShaderVariableType::Static, 0);
		mgr.add_descriptor_ranges(1, 1);
		mgr.add_descriptor_ranges(0, 2);
		assert_eq!(mgr.root_table(0).range_span(), RangeSpan { start: 0, len: 2 });
		assert_eq!(mgr.root_table(1).range_span(), RangeSpan { start: 2, len: 1 });

		mgr.root_table_mut(1)
			.set_descriptor_range(0, DescriptorRangeType::Sampler, 0, 1, 0, RangeOffset::Append);
		mgr.add_descriptor_ranges(0, 1);
		assert_eq!(mgr.root_table(1).range(0).unwrap().range_type, DescriptorRangeType::Sampler);
		// shifted tables keep their size and root index
		assert_eq!(mgr.root_table(1).range_span(), RangeSpan { start: 3, len: 1 });
		assert_eq!(mgr.root_table(1).descriptor_table_size(), 1);
		assert_eq!(mgr.root_table(1).root_index(), 1);
		assert_eq!(mgr.root_table(0).ranges().count(), 0);
	}

	#[cfg(debug_assertions)]
	#[test]
	#[should_panic(expected = "already been initialized")]
	fn test_double_set_panics() {
		let mut mgr = RootParamsManager::new();
		let t = mgr.add_root_table(0, ShaderVisibility::All, ShaderVariableType::Static, 1);
		let mut table = mgr.root_table_mut(t);
		table.set_descriptor_range(0, DescriptorRangeType::Cbv, 0, 1, 0, RangeOffset::Append);
		table.set_descriptor_range(0, DescriptorRangeType::Cbv, 0, 1, 0, RangeOffset::Append);
	}

	#[test]
	fn test_verify_complete_layout() {
		let mut mgr = RootParamsManager::new();
		mgr.add_root_view(RootViewKind::Cbv, 1, 0, 0, ShaderVisibility::All, ShaderVariableType::Static);
		let t = mgr.add_root_table(0, ShaderVisibility::Pixel, ShaderVariableType::Mutable, 2);
		let mut table = mgr.root_table_mut(t);
		table.set_descriptor_range(0, DescriptorRangeType::Srv, 0, 2, 0, RangeOffset::Explicit(2));
		table.set_descriptor_range(1, DescriptorRangeType::Uav, 0, 2, 0, RangeOffset::Explicit(0));
		mgr.debug_verify();
	}

	#[cfg(debug_assertions)]
	#[test]
	#[should_panic(expected = "unique and dense")]
	fn test_verify_root_index_gap_panics() {
		let mut mgr = RootParamsManager::new();
		mgr.add_root_view(RootViewKind::Cbv, 0, 0, 0, ShaderVisibility::All, ShaderVariableType::Static);
		mgr.add_root_constants(2, 1, 0, 4, ShaderVisibility::All, ShaderVariableType::Static);
		mgr.debug_verify();
	}

	#[cfg(debug_assertions)]
	#[test]
	#[should_panic(expected = "overlap")]
	fn test_verify_overlapping_ranges_panics() {
		let mut mgr = RootParamsManager::new();
		let t = mgr.add_root_table(0, ShaderVisibility::Pixel, ShaderVariableType::Static, 2);
		let mut table = mgr.root_table_mut(t);
		table.set_descriptor_range(0, DescriptorRangeType::Srv, 0, 4, 0, RangeOffset::Append);
		table.set_descriptor_range(1, DescriptorRangeType::Srv, 4, 2, 0, RangeOffset::Explicit(3));
		mgr.debug_verify();
	}

	#[cfg(debug_assertions)]
	#[test]
	#[should_panic(expected = "unset ranges")]
	fn test_verify_unset_range_panics() {
		let mut mgr = RootParamsManager::new();
		let t = mgr.add_root_table(0, ShaderVisibility::Pixel, ShaderVariableType::Static, 1);
		mgr.add_descriptor_ranges(t, 1);
		mgr.root_table_mut(t)
			.set_descriptor_range(0, DescriptorRangeType::Srv, 0, 1, 0, RangeOffset::Append);
		mgr.debug_verify();
	}
}
