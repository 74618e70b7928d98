use crate::cache::{CpuDescriptorHandle, DescriptorHeapRange, DescriptorHeapType, TrackedResource};
use crate::layout::{DescriptorRangeType, ShaderVariableType};
use crate::platform::RootSignaturePlatform;
use std::sync::Arc;

/// A single slot of a [`CacheTable`].
pub struct CachedResource<P: RootSignaturePlatform> {
	range_type: DescriptorRangeType,
	cpu_descriptor: Option<CpuDescriptorHandle>,
	object: Option<Arc<TrackedResource<P>>>,
	dirty: bool,
}

impl<P: RootSignaturePlatform> CachedResource<P> {
	fn new(range_type: DescriptorRangeType) -> Self {
		Self {
			range_type,
			cpu_descriptor: None,
			object: None,
			dirty: false,
		}
	}

	#[inline]
	pub fn range_type(&self) -> DescriptorRangeType {
		self.range_type
	}

	/// The non shader visible descriptor of the bound view, copied into a shader visible heap when committing.
	#[inline]
	pub fn cpu_descriptor(&self) -> Option<CpuDescriptorHandle> {
		self.cpu_descriptor
	}

	/// The resource the bound view refers to. Samplers have no resource.
	#[inline]
	pub fn object(&self) -> Option<&Arc<TrackedResource<P>>> {
		self.object.as_ref()
	}

	#[inline]
	pub fn is_bound(&self) -> bool {
		self.cpu_descriptor.is_some() || self.object.is_some()
	}

	/// Whether the binding changed since it was last copied into the persistent shader visible heap.
	#[inline]
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	#[inline]
	pub(crate) fn clear_dirty(&mut self) {
		self.dirty = false;
	}
}

/// The cached bindings of one root parameter, indexed by offset from the table start. Root views have exactly one
/// slot, inline constants have none but carry their values instead.
pub struct CacheTable<P: RootSignaturePlatform> {
	variable_type: ShaderVariableType,
	table_start_offset: Option<u32>,
	resources: Vec<CachedResource<P>>,
	constants: Vec<u32>,
}

impl<P: RootSignaturePlatform> CacheTable<P> {
	pub(crate) fn new_table(
		variable_type: ShaderVariableType,
		table_start_offset: Option<u32>,
		slots: impl IntoIterator<Item = DescriptorRangeType>,
	) -> Self {
		Self {
			variable_type,
			table_start_offset,
			resources: slots.into_iter().map(CachedResource::new).collect(),
			constants: Vec::new(),
		}
	}

	pub(crate) fn new_root_view(variable_type: ShaderVariableType, range_type: DescriptorRangeType) -> Self {
		Self::new_table(variable_type, None, [range_type])
	}

	pub(crate) fn new_constants(variable_type: ShaderVariableType, num_values: u32) -> Self {
		Self {
			variable_type,
			table_start_offset: None,
			resources: Vec::new(),
			constants: vec![0; num_values as usize],
		}
	}

	#[inline]
	pub fn variable_type(&self) -> ShaderVariableType {
		self.variable_type
	}

	/// Offset of this table within the cache's persistent shader visible descriptors. `None` for dynamic tables,
	/// which are copied to per-context descriptors on every commit, and for root views and constants.
	#[inline]
	pub fn table_start_offset(&self) -> Option<u32> {
		self.table_start_offset
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.resources.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}

	#[inline]
	pub fn resource(&self, offset: u32) -> &CachedResource<P> {
		debug_assert!(
			(offset as usize) < self.resources.len(),
			"offset {} out of bounds for table of {} slots",
			offset,
			self.resources.len()
		);
		&self.resources[offset as usize]
	}

	#[inline]
	pub fn resources(&self) -> &[CachedResource<P>] {
		&self.resources
	}

	#[inline]
	pub(crate) fn resources_mut(&mut self) -> &mut [CachedResource<P>] {
		&mut self.resources
	}

	#[inline]
	pub fn constants(&self) -> &[u32] {
		&self.constants
	}
}

/// Storage of the resources bound to one resource binding instance of a pipeline, laid out by root index as
/// dictated by the [`RootSignature`] that created it via [`RootSignature::init_resource_cache`].
///
/// A cache must only ever be committed with the root signature that initialized it.
///
/// [`RootSignature`]: crate::signature::RootSignature
/// [`RootSignature::init_resource_cache`]: crate::signature::RootSignature::init_resource_cache
pub struct ShaderResourceCache<P: RootSignaturePlatform> {
	tables: Vec<CacheTable<P>>,
	heaps: [Option<P::DescriptorAllocation>; 2],
}

impl<P: RootSignaturePlatform> ShaderResourceCache<P> {
	pub(crate) fn new(
		tables: Vec<CacheTable<P>>,
		cbv_srv_uav: Option<P::DescriptorAllocation>,
		sampler: Option<P::DescriptorAllocation>,
	) -> Self {
		Self {
			tables,
			heaps: [cbv_srv_uav, sampler],
		}
	}

	#[inline]
	pub fn num_tables(&self) -> usize {
		self.tables.len()
	}

	#[inline]
	pub fn table(&self, root_index: u32) -> &CacheTable<P> {
		debug_assert!((root_index as usize) < self.tables.len(), "root index out of bounds");
		&self.tables[root_index as usize]
	}

	#[inline]
	pub fn resource(&self, root_index: u32, offset: u32) -> &CachedResource<P> {
		self.table(root_index).resource(offset)
	}

	/// The persistent shader visible descriptors of all static and mutable tables of the given heap type.
	#[inline]
	pub fn heap_range(&self, heap_type: DescriptorHeapType) -> Option<&DescriptorHeapRange> {
		self.heaps[heap_type as usize].as_deref()
	}

	/// Binds a view to the slot at `offset` within the table at `root_index` and marks the slot dirty.
	///
	/// Descriptor table slots require `cpu_descriptor`, root views require `object`.
	pub fn set_resource(
		&mut self,
		root_index: u32,
		offset: u32,
		cpu_descriptor: Option<CpuDescriptorHandle>,
		object: Option<Arc<TrackedResource<P>>>,
	) {
		let slot = self.slot_mut(root_index, offset);
		slot.cpu_descriptor = cpu_descriptor;
		slot.object = object;
		slot.dirty = true;
	}

	/// Unbinds the slot. An unbound slot is skipped by every transition and commit.
	pub fn reset_resource(&mut self, root_index: u32, offset: u32) {
		let slot = self.slot_mut(root_index, offset);
		slot.cpu_descriptor = None;
		slot.object = None;
		slot.dirty = true;
	}

	pub fn set_constants(&mut self, root_index: u32, values: &[u32]) {
		let table = &mut self.tables[root_index as usize];
		debug_assert_eq!(
			table.constants.len(),
			values.len(),
			"root index {} expects {} constants",
			root_index,
			table.constants.len()
		);
		table.constants.copy_from_slice(values);
	}

	/// Number of slots that were rebound since they were last committed.
	pub fn dirty_count(&self) -> usize {
		self.tables
			.iter()
			.flat_map(|table| table.resources.iter())
			.filter(|slot| slot.dirty)
			.count()
	}

	#[inline]
	fn slot_mut(&mut self, root_index: u32, offset: u32) -> &mut CachedResource<P> {
		debug_assert!((root_index as usize) < self.tables.len(), "root index out of bounds");
		let table = &mut self.tables[root_index as usize];
		debug_assert!(
			(offset as usize) < table.resources.len(),
			"offset {} out of bounds for root index {} with {} slots",
			offset,
			root_index,
			table.resources.len()
		);
		&mut table.resources[offset as usize]
	}

	/// Mutable access to the tables alongside shared access to the persistent heaps, as needed while committing.
	#[inline]
	pub(crate) fn split_mut(&mut self) -> (&mut [CacheTable<P>], [Option<&DescriptorHeapRange>; 2]) {
		let heaps = [self.heaps[0].as_deref(), self.heaps[1].as_deref()];
		(&mut self.tables, heaps)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cache::ResourceState;
	use crate::platform::null::{NullPlatform, NullResource};

	fn cache() -> ShaderResourceCache<NullPlatform> {
		ShaderResourceCache::new(
			vec![
				CacheTable::new_table(
					ShaderVariableType::Mutable,
					Some(0),
					[DescriptorRangeType::Srv, DescriptorRangeType::Srv, DescriptorRangeType::Uav],
				),
				CacheTable::new_root_view(ShaderVariableType::Static, DescriptorRangeType::Cbv),
				CacheTable::new_constants(ShaderVariableType::Static, 3),
			],
			None,
			None,
		)
	}

	#[test]
	fn test_bind_and_reset() {
		let mut cache = cache();
		assert_eq!(cache.num_tables(), 3);
		assert_eq!(cache.dirty_count(), 0);
		assert!(!cache.resource(0, 1).is_bound());

		let buffer = TrackedResource::<NullPlatform>::new(NullResource::new(0x100), "buffer", ResourceState::COMMON);
		cache.set_resource(0, 1, Some(CpuDescriptorHandle(0x10)), Some(buffer.clone()));
		cache.set_resource(1, 0, None, Some(buffer));
		assert_eq!(cache.dirty_count(), 2);
		let slot = cache.resource(0, 1);
		assert!(slot.is_bound());
		assert!(slot.is_dirty());
		assert_eq!(slot.cpu_descriptor(), Some(CpuDescriptorHandle(0x10)));
		assert_eq!(slot.range_type(), DescriptorRangeType::Srv);
		assert_eq!(cache.resource(0, 2).range_type(), DescriptorRangeType::Uav);

		cache.reset_resource(0, 1);
		let slot = cache.resource(0, 1);
		assert!(!slot.is_bound());
		// unbinding must be committed as well
		assert!(slot.is_dirty());
	}

	#[test]
	fn test_constants() {
		let mut cache = cache();
		let table = cache.table(2);
		assert!(table.is_empty());
		assert_eq!(table.constants(), [0, 0, 0]);
		assert_eq!(table.table_start_offset(), None);
		cache.set_constants(2, &[1, 2, 3]);
		assert_eq!(cache.table(2).constants(), [1, 2, 3]);
		assert_eq!(cache.dirty_count(), 0);
	}

	#[cfg(debug_assertions)]
	#[test]
	#[should_panic(expected = "out of bounds")]
	fn test_offset_out_of_bounds() {
		let mut cache = cache();
		cache.set_resource(1, 1, None, None);
	}
}
