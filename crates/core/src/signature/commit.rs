use crate::cache::{CacheTable, CachedResource, DescriptorHeapRange, DescriptorHeapType, ShaderResourceCache};
use crate::layout::ShaderVariableType;
use crate::platform::{CommandContext, PipelineBindPoint, RootSignaturePlatform};
use crate::signature::root_signature::TableLayout;
use crate::signature::{CommitError, CommitStrategy, RootSignature};

pub(super) type CommitFn<P> = fn(
	&RootSignature<P>,
	&P,
	&mut ShaderResourceCache<P>,
	&mut <P as RootSignaturePlatform>::CommandContext,
	PipelineBindPoint,
) -> Result<(), CommitError<P>>;

impl CommitStrategy {
	pub(super) fn commit_fn<P: RootSignaturePlatform, const TRANSITION: bool>(self) -> CommitFn<P> {
		match self {
			CommitStrategy::StaticMutable => commit_static_mutable::<P, TRANSITION>,
			CommitStrategy::StaticMutableDynamic => commit_static_mutable_dynamic::<P, TRANSITION>,
		}
	}
}

#[inline]
fn transition_slot<P: RootSignaturePlatform>(slot: &CachedResource<P>, ctx: &mut P::CommandContext) {
	if let Some(object) = slot.object() {
		object.transition_to(ctx, slot.range_type().required_state());
	}
}

/// Copies the dirty slots of a static or mutable table to its persistent descriptors and binds them.
fn commit_persistent_table<P: RootSignaturePlatform, const TRANSITION: bool>(
	platform: &P,
	ctx: &mut P::CommandContext,
	bind_point: PipelineBindPoint,
	layout: &TableLayout,
	table: &mut CacheTable<P>,
	heap: Option<&DescriptorHeapRange>,
) {
	debug_assert_eq!(table.table_start_offset(), layout.start_offset);
	if table.is_empty() {
		return;
	}
	let (Some(start), Some(heap)) = (layout.start_offset, heap) else {
		debug_assert!(false, "Static and mutable tables must have persistent descriptors");
		return;
	};

	for (offset, slot) in table.resources_mut().iter_mut().enumerate() {
		if TRANSITION {
			transition_slot(slot, ctx);
		}
		if slot.is_dirty() {
			if let Some(src) = slot.cpu_descriptor() {
				// Safety: dst lies within the persistent descriptors of this table
				unsafe { platform.copy_descriptors(heap.cpu_handle(start + offset as u32), src, 1, layout.heap_type) };
			}
			slot.clear_dirty();
		}
	}
	// Safety: the persistent descriptors live as long as the cache
	unsafe { ctx.set_descriptor_table(bind_point, layout.root_index, heap.gpu_handle(start)) };
}

/// Copies every slot of a dynamic table to `range` starting at `start`, regardless of whether it is dirty.
fn commit_dynamic_table<P: RootSignaturePlatform, const TRANSITION: bool>(
	platform: &P,
	ctx: &mut P::CommandContext,
	bind_point: PipelineBindPoint,
	layout: &TableLayout,
	table: &mut CacheTable<P>,
	range: &DescriptorHeapRange,
	start: u32,
) {
	for (offset, slot) in table.resources_mut().iter_mut().enumerate() {
		if TRANSITION {
			transition_slot(slot, ctx);
		}
		if let Some(src) = slot.cpu_descriptor() {
			// Safety: dst lies within the dynamic descriptors allocated for this commit
			unsafe { platform.copy_descriptors(range.cpu_handle(start + offset as u32), src, 1, layout.heap_type) };
		}
		slot.clear_dirty();
	}
	// Safety: dynamic descriptors stay valid until the context finished executing
	unsafe { ctx.set_descriptor_table(bind_point, layout.root_index, range.gpu_handle(start)) };
}

pub(super) fn commit_static_mutable<P: RootSignaturePlatform, const TRANSITION: bool>(
	sig: &RootSignature<P>,
	platform: &P,
	cache: &mut ShaderResourceCache<P>,
	ctx: &mut P::CommandContext,
	bind_point: PipelineBindPoint,
) -> Result<(), CommitError<P>> {
	profiling::function_scope!();
	debug_assert_eq!(
		cache.num_tables(),
		sig.num_root_parameters() as usize,
		"Cache was not initialized by this root signature"
	);
	let (tables, heaps) = cache.split_mut();
	for layout in &sig.table_layouts {
		if layout.variable_type == ShaderVariableType::Dynamic {
			debug_assert!(tables[layout.root_index as usize].is_empty(), "Dynamic slots require dynamic commits");
			continue;
		}
		commit_persistent_table::<P, TRANSITION>(
			platform,
			ctx,
			bind_point,
			layout,
			&mut tables[layout.root_index as usize],
			heaps[layout.heap_type as usize],
		);
	}
	Ok(())
}

pub(super) fn commit_static_mutable_dynamic<P: RootSignaturePlatform, const TRANSITION: bool>(
	sig: &RootSignature<P>,
	platform: &P,
	cache: &mut ShaderResourceCache<P>,
	ctx: &mut P::CommandContext,
	bind_point: PipelineBindPoint,
) -> Result<(), CommitError<P>> {
	profiling::function_scope!();
	debug_assert_eq!(
		cache.num_tables(),
		sig.num_root_parameters() as usize,
		"Cache was not initialized by this root signature"
	);

	let mut dynamic = [None, None];
	for heap in DescriptorHeapType::VALUES {
		let count = sig.dynamic_slots[heap as usize];
		if count > 0 {
			let range = ctx
				.allocate_dynamic_gpu_descriptors(heap, count)
				.map_err(|source| CommitError::DynamicDescriptorAllocation { heap, count, source })?;
			dynamic[heap as usize] = Some(range);
		}
	}
	let mut dynamic_offsets = [0u32; 2];

	let (tables, heaps) = cache.split_mut();
	for layout in &sig.table_layouts {
		let table = &mut tables[layout.root_index as usize];
		if layout.variable_type == ShaderVariableType::Dynamic {
			let start = dynamic_offsets[layout.heap_type as usize];
			dynamic_offsets[layout.heap_type as usize] += table.len() as u32;
			let Some(range) = &dynamic[layout.heap_type as usize] else {
				debug_assert!(table.is_empty(), "Dynamic table without dynamic descriptors");
				continue;
			};
			if table.is_empty() {
				continue;
			}
			commit_dynamic_table::<P, TRANSITION>(platform, ctx, bind_point, layout, table, range, start);
		} else {
			commit_persistent_table::<P, TRANSITION>(
				platform,
				ctx,
				bind_point,
				layout,
				table,
				heaps[layout.heap_type as usize],
			);
		}
	}
	Ok(())
}
