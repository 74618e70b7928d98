use crate::cache::{CacheTable, DescriptorHeapType, ShaderResourceCache};
use crate::layout::{DescriptorRangeType, ShaderStage, ShaderVariableType, VariableTypeArray};
use crate::platform::{CommandContext, PipelineBindPoint, RootSignaturePlatform};
use crate::root_params::{RootParameterKind, RootParamsManager};
use crate::signature::builder::RootTableMap;
use crate::signature::commit::CommitFn;
use crate::signature::{
	CacheInitError, CommitError, RootSignatureBuilder, RootSignatureDesc, StaticSamplerAttribs,
};
use log::debug;
use std::fmt::{Debug, Formatter};

/// How descriptor tables are committed, decided once when the root signature is created.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CommitStrategy {
	/// No dynamic descriptor table slots exist: only slots rebound since the last commit are copied.
	StaticMutable,
	/// Dynamic tables are copied to freshly allocated per-context descriptors on every commit, static and mutable
	/// tables behave like [`CommitStrategy::StaticMutable`].
	StaticMutableDynamic,
}

/// Where the descriptors of a table live.
#[derive(Copy, Clone, Debug)]
pub(super) struct TableLayout {
	pub root_index: u32,
	pub heap_type: DescriptorHeapType,
	pub variable_type: ShaderVariableType,
	/// offset into the persistent descriptors of a cache, `None` for dynamic tables
	pub start_offset: Option<u32>,
}

/// A finalized root signature. Immutable, committing only reads it, so it may be shared between any number of
/// recording threads as long as each brings its own cache and command context.
pub struct RootSignature<P: RootSignaturePlatform> {
	native: P::RootSignature,
	desc: RootSignatureDesc,
	params: RootParamsManager,
	static_samplers: Vec<StaticSamplerAttribs>,
	srv_cbv_uav_tables: RootTableMap,
	sampler_tables: RootTableMap,
	total_srv_cbv_uav_slots: VariableTypeArray<u32>,
	total_sampler_slots: VariableTypeArray<u32>,
	pub(super) table_layouts: Vec<TableLayout>,
	persistent_slots: [u32; 2],
	pub(super) dynamic_slots: [u32; 2],
	commit_strategy: CommitStrategy,
	commit: CommitFn<P>,
	transition_and_commit: CommitFn<P>,
}

impl<P: RootSignaturePlatform> RootSignature<P> {
	pub(crate) fn new(native: P::RootSignature, desc: RootSignatureDesc, builder: RootSignatureBuilder) -> Self {
		let mut persistent_slots = [0; 2];
		let mut dynamic_slots = [0; 2];
		let table_layouts: Vec<TableLayout> = builder
			.params
			.root_tables()
			.map(|table| {
				let heap_type = table
					.ranges()
					.next()
					.map_or(DescriptorHeapType::CbvSrvUav, |range| range.range_type.heap_type());
				let size = table.descriptor_table_size();
				let start_offset = if table.variable_type() == ShaderVariableType::Dynamic {
					dynamic_slots[heap_type as usize] += size;
					None
				} else {
					let start = persistent_slots[heap_type as usize];
					persistent_slots[heap_type as usize] += size;
					Some(start)
				};
				TableLayout {
					root_index: table.root_index(),
					heap_type,
					variable_type: table.variable_type(),
					start_offset,
				}
			})
			.collect();

		let dynamic_total = builder.total_srv_cbv_uav_slots[ShaderVariableType::Dynamic]
			+ builder.total_sampler_slots[ShaderVariableType::Dynamic];
		let commit_strategy = if dynamic_total == 0 {
			CommitStrategy::StaticMutable
		} else {
			CommitStrategy::StaticMutableDynamic
		};
		debug!(
			"Root signature commit strategy {:?}, persistent slots {:?}, dynamic slots {:?}",
			commit_strategy, persistent_slots, dynamic_slots
		);

		Self {
			native,
			desc,
			params: builder.params,
			static_samplers: builder.static_samplers,
			srv_cbv_uav_tables: builder.srv_cbv_uav_tables,
			sampler_tables: builder.sampler_tables,
			total_srv_cbv_uav_slots: builder.total_srv_cbv_uav_slots,
			total_sampler_slots: builder.total_sampler_slots,
			table_layouts,
			persistent_slots,
			dynamic_slots,
			commit_strategy,
			commit: commit_strategy.commit_fn::<P, false>(),
			transition_and_commit: commit_strategy.commit_fn::<P, true>(),
		}
	}

	#[inline]
	pub fn native(&self) -> &P::RootSignature {
		&self.native
	}

	/// The description the native root signature was created from.
	#[inline]
	pub fn desc(&self) -> &RootSignatureDesc {
		&self.desc
	}

	#[inline]
	pub fn params(&self) -> &RootParamsManager {
		&self.params
	}

	#[inline]
	pub fn static_samplers(&self) -> &[StaticSamplerAttribs] {
		&self.static_samplers
	}

	#[inline]
	pub fn num_root_parameters(&self) -> u32 {
		self.params.num_root_parameters()
	}

	#[inline]
	pub fn total_srv_cbv_uav_slots(&self, variable_type: ShaderVariableType) -> u32 {
		self.total_srv_cbv_uav_slots[variable_type]
	}

	#[inline]
	pub fn total_sampler_slots(&self, variable_type: ShaderVariableType) -> u32 {
		self.total_sampler_slots[variable_type]
	}

	/// Root index of the CBV/SRV/UAV descriptor table of `stage` for `variable_type`, if any.
	pub fn srv_cbv_uav_table_root_index(&self, variable_type: ShaderVariableType, stage: ShaderStage) -> Option<u32> {
		self.srv_cbv_uav_tables[variable_type.to_usize()][stage.to_usize()]
			.map(|table_index| self.table_layouts[table_index as usize].root_index)
	}

	/// Root index of the sampler descriptor table of `stage` for `variable_type`, if any.
	pub fn sampler_table_root_index(&self, variable_type: ShaderVariableType, stage: ShaderStage) -> Option<u32> {
		self.sampler_tables[variable_type.to_usize()][stage.to_usize()]
			.map(|table_index| self.table_layouts[table_index as usize].root_index)
	}

	#[inline]
	pub fn commit_strategy(&self) -> CommitStrategy {
		self.commit_strategy
	}

	/// Number of persistent shader visible descriptors a cache of this root signature needs for all static and mutable
	/// tables of `heap_type`.
	#[inline]
	pub fn persistent_descriptor_count(&self, heap_type: DescriptorHeapType) -> u32 {
		self.persistent_slots[heap_type as usize]
	}

	/// Number of descriptors every commit of [`CommitStrategy::StaticMutableDynamic`] allocates from the context.
	#[inline]
	pub fn dynamic_descriptor_count(&self, heap_type: DescriptorHeapType) -> u32 {
		self.dynamic_slots[heap_type as usize]
	}

	/// Creates an empty cache laid out for this root signature, with persistent shader visible descriptors for all
	/// static and mutable tables.
	pub fn init_resource_cache(&self, platform: &P) -> Result<ShaderResourceCache<P>, CacheInitError<P>> {
		let mut tables: Vec<Option<CacheTable<P>>> = (0..self.num_root_parameters()).map(|_| None).collect();
		for (table, layout) in self.params.root_tables().zip(&self.table_layouts) {
			let mut slots = vec![DescriptorRangeType::Srv; table.descriptor_table_size() as usize];
			for range in table.ranges() {
				slots[range.offset_from_table_start as usize..range.end() as usize].fill(range.range_type);
			}
			tables[layout.root_index as usize] =
				Some(CacheTable::new_table(table.variable_type(), layout.start_offset, slots));
		}
		for view in self.params.root_views() {
			let table = match *view.kind() {
				RootParameterKind::View { kind, .. } => {
					CacheTable::new_root_view(view.variable_type(), kind.range_type())
				}
				RootParameterKind::Constants { num_values, .. } => {
					CacheTable::new_constants(view.variable_type(), num_values)
				}
				RootParameterKind::Table { .. } => {
					debug_assert!(false, "Descriptor table in the root view list");
					continue;
				}
			};
			tables[view.root_index() as usize] = Some(table);
		}

		let mut heaps = [None, None];
		for heap in DescriptorHeapType::VALUES {
			let count = self.persistent_slots[heap as usize];
			if count > 0 {
				// Safety: the allocation is owned by the cache and released when it is dropped
				let allocation = unsafe { platform.allocate_gpu_descriptors(heap, count) }
					.map_err(|source| CacheInitError::DescriptorAllocation { heap, count, source })?;
				heaps[heap as usize] = Some(allocation);
			}
		}
		let [cbv_srv_uav, sampler] = heaps;
		Ok(ShaderResourceCache::new(tables.into_iter().flatten().collect(), cbv_srv_uav, sampler))
	}

	/// Records barriers for every bound resource that is not yet in the state its binding requires.
	pub fn transition_resources(&self, cache: &ShaderResourceCache<P>, ctx: &mut P::CommandContext) {
		profiling::function_scope!();
		debug_assert_eq!(
			cache.num_tables(),
			self.num_root_parameters() as usize,
			"Cache was not initialized by this root signature"
		);
		for root_index in 0..cache.num_tables() as u32 {
			for slot in cache.table(root_index).resources() {
				if let Some(object) = slot.object() {
					object.transition_to(ctx, slot.range_type().required_state());
				}
			}
		}
	}

	/// Copies the descriptors bound in `cache` to shader visible descriptors and points every descriptor table of
	/// `bind_point` at them. Resources must already be in their required states, see [`Self::transition_resources`].
	#[inline]
	pub fn commit_descriptor_handles(
		&self,
		platform: &P,
		cache: &mut ShaderResourceCache<P>,
		ctx: &mut P::CommandContext,
		bind_point: PipelineBindPoint,
	) -> Result<(), CommitError<P>> {
		(self.commit)(self, platform, cache, ctx, bind_point)
	}

	/// Like [`Self::commit_descriptor_handles`], but transitions resources in the same pass.
	#[inline]
	pub fn transition_and_commit_descriptor_handles(
		&self,
		platform: &P,
		cache: &mut ShaderResourceCache<P>,
		ctx: &mut P::CommandContext,
		bind_point: PipelineBindPoint,
	) -> Result<(), CommitError<P>> {
		(self.transition_and_commit)(self, platform, cache, ctx, bind_point)
	}

	/// Sets the GPU virtual address of every bound root view and the values of every inline constants parameter.
	/// Addresses of dynamic buffers are resolved for the recording context `context_id`.
	pub fn commit_root_views(
		&self,
		cache: &ShaderResourceCache<P>,
		ctx: &mut P::CommandContext,
		bind_point: PipelineBindPoint,
		context_id: u32,
	) {
		profiling::function_scope!();
		for view in self.params.root_views() {
			let root_index = view.root_index();
			let table = cache.table(root_index);
			match *view.kind() {
				RootParameterKind::View { kind, .. } => {
					let slot = table.resource(0);
					let Some(object) = slot.object() else {
						continue;
					};
					object.transition_to(ctx, slot.range_type().required_state());
					// Safety: the resource is kept alive by the cache
					unsafe {
						let address = P::gpu_virtual_address(&object.platform, context_id);
						ctx.set_root_view(bind_point, root_index, kind, address);
					}
				}
				RootParameterKind::Constants { .. } => unsafe {
					ctx.set_root_constants(bind_point, root_index, table.constants());
				},
				RootParameterKind::Table { .. } => debug_assert!(false, "Descriptor table in the root view list"),
			}
		}
	}
}

impl<P: RootSignaturePlatform> Debug for RootSignature<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RootSignature")
			.field("desc", &self.desc)
			.field("commit_strategy", &self.commit_strategy)
			.finish_non_exhaustive()
	}
}
