use crate::cache::{
	CpuDescriptorHandle, DescriptorHeapRange, DescriptorHeapType, GpuDescriptorHandle, GpuVirtualAddress,
	ResourceState,
};
use crate::root_params::RootViewKind;
use crate::signature::RootSignatureDesc;
use std::error::Error;
use std::ops::Deref;

#[cfg(all(windows, feature = "d3d12"))]
pub mod d3d12;
#[cfg(any(test, feature = "null"))]
pub mod null;

/// Whether root arguments are set on the graphics or on the compute root signature of a command list.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PipelineBindPoint {
	Graphics,
	Compute,
}

impl PipelineBindPoint {
	#[inline]
	pub fn from_is_compute(is_compute: bool) -> Self {
		if is_compute {
			PipelineBindPoint::Compute
		} else {
			PipelineBindPoint::Graphics
		}
	}
}

/// Internal interface for device level API calls, may change at any time!
pub unsafe trait RootSignaturePlatform: Sized + Send + Sync + 'static {
	type RootSignature: 'static + Send + Sync;
	type Resource: 'static + Send + Sync;
	type DescriptorAllocation: 'static + Send + Sync + Deref<Target = DescriptorHeapRange>;
	type CommandContext: CommandContext<Self>;
	type CreationError: 'static + Error + Send + Sync;
	type AllocationError: 'static + Error + Send + Sync;

	/// Serialize `desc` and create the native root signature from it.
	unsafe fn create_root_signature(
		&self,
		desc: &RootSignatureDesc,
	) -> Result<Self::RootSignature, Self::CreationError>;

	/// Allocate `count` persistent descriptors in the shader visible heap of `heap_type`. They are released when the
	/// returned allocation is dropped.
	unsafe fn allocate_gpu_descriptors(
		&self,
		heap_type: DescriptorHeapType,
		count: u32,
	) -> Result<Self::DescriptorAllocation, Self::AllocationError>;

	/// Copy `count` descriptors starting at `src` to `dst`, see `CopyDescriptorsSimple`.
	unsafe fn copy_descriptors(
		&self,
		dst: CpuDescriptorHandle,
		src: CpuDescriptorHandle,
		count: u32,
		heap_type: DescriptorHeapType,
	);

	/// The GPU virtual address of a buffer. Dynamic buffers are suballocated per recording context, so their address
	/// depends on the `context_id` recording the command.
	unsafe fn gpu_virtual_address(resource: &Self::Resource, context_id: u32) -> GpuVirtualAddress;
}

/// A command list that is currently recording, owned by a single thread.
pub unsafe trait CommandContext<P: RootSignaturePlatform> {
	unsafe fn resource_barrier(&mut self, resource: &P::Resource, before: ResourceState, after: ResourceState);

	/// Allocate `count` shader visible descriptors that stay valid until the recorded commands finished executing.
	fn allocate_dynamic_gpu_descriptors(
		&mut self,
		heap_type: DescriptorHeapType,
		count: u32,
	) -> Result<DescriptorHeapRange, P::AllocationError>;

	unsafe fn set_descriptor_table(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		base_descriptor: GpuDescriptorHandle,
	);

	unsafe fn set_root_view(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		kind: RootViewKind,
		address: GpuVirtualAddress,
	);

	unsafe fn set_root_constants(&mut self, bind_point: PipelineBindPoint, root_index: u32, values: &[u32]);
}
