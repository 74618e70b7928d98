use crate::cache::{DescriptorHeapRange, DescriptorHeapType, GpuDescriptorHandle, GpuVirtualAddress, ResourceState};
use crate::platform::d3d12::{
	native_resource_state, D3D12AllocationError, D3D12DescriptorAllocation, D3D12Platform, D3D12Resource,
};
use crate::platform::{CommandContext, PipelineBindPoint};
use crate::root_params::RootViewKind;
use std::mem::ManuallyDrop;
use windows::Win32::Graphics::Direct3D12::{
	ID3D12GraphicsCommandList, D3D12_GPU_DESCRIPTOR_HANDLE, D3D12_RESOURCE_BARRIER, D3D12_RESOURCE_BARRIER_0,
	D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES, D3D12_RESOURCE_BARRIER_FLAG_NONE, D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
	D3D12_RESOURCE_TRANSITION_BARRIER,
};

/// Linear allocator over the dynamic descriptors reserved by a [`D3D12CommandContext`].
#[derive(Debug)]
struct DynamicDescriptors {
	allocation: D3D12DescriptorAllocation,
	used: u32,
}

impl DynamicDescriptors {
	fn allocate(&mut self, count: u32) -> Result<DescriptorHeapRange, D3D12AllocationError> {
		let available = self.allocation.count - self.used;
		if count > available {
			return Err(D3D12AllocationError {
				heap_type: self.allocation.heap_type,
				requested: count,
				available,
			});
		}
		let first = self.used;
		self.used += count;
		Ok(DescriptorHeapRange {
			count,
			cpu_start: self.allocation.cpu_handle(first),
			gpu_start: self.allocation.gpu_handle(first),
			..*self.allocation
		})
	}
}

/// A graphics command list that is recording, together with the dynamic descriptors handed out to commits recorded
/// into it.
///
/// Dynamic descriptors are only reclaimed by [`Self::reset`] or by dropping the context, both of which must only
/// happen once the GPU finished executing the list.
pub struct D3D12CommandContext {
	list: ID3D12GraphicsCommandList,
	dynamic: [DynamicDescriptors; 2],
}

impl D3D12CommandContext {
	/// Reserves `dynamic_capacity` descriptors per [`DescriptorHeapType`] for dynamic commits and binds the shader
	/// visible heaps of `platform` to `list`.
	pub fn new(
		platform: &D3D12Platform,
		list: ID3D12GraphicsCommandList,
		dynamic_capacity: [u32; 2],
	) -> Result<Self, D3D12AllocationError> {
		let [cbv_srv_uav, sampler] = DescriptorHeapType::VALUES;
		let dynamic = [
			DynamicDescriptors {
				allocation: platform.heap(cbv_srv_uav).allocate(dynamic_capacity[cbv_srv_uav as usize])?,
				used: 0,
			},
			DynamicDescriptors {
				allocation: platform.heap(sampler).allocate(dynamic_capacity[sampler as usize])?,
				used: 0,
			},
		];
		let ctx = Self { list, dynamic };
		ctx.bind_descriptor_heaps(platform);
		Ok(ctx)
	}

	fn bind_descriptor_heaps(&self, platform: &D3D12Platform) {
		let heaps = DescriptorHeapType::VALUES.map(|heap| Some(platform.heap(heap).native().clone()));
		unsafe { self.list.SetDescriptorHeaps(&heaps) };
	}

	#[inline]
	pub fn command_list(&self) -> &ID3D12GraphicsCommandList {
		&self.list
	}

	/// Starts recording into `list`, reusing all dynamic descriptors.
	///
	/// # Safety
	/// The GPU must have finished executing everything previously recorded through this context.
	pub unsafe fn reset(&mut self, platform: &D3D12Platform, list: ID3D12GraphicsCommandList) {
		self.list = list;
		for dynamic in &mut self.dynamic {
			dynamic.used = 0;
		}
		self.bind_descriptor_heaps(platform);
	}

	/// Number of dynamic descriptors of `heap_type` handed out since creation or the last reset.
	#[inline]
	pub fn dynamic_descriptors_used(&self, heap_type: DescriptorHeapType) -> u32 {
		self.dynamic[heap_type as usize].used
	}
}

unsafe impl CommandContext<D3D12Platform> for D3D12CommandContext {
	unsafe fn resource_barrier(&mut self, resource: &D3D12Resource, before: ResourceState, after: ResourceState) {
		let barrier = D3D12_RESOURCE_BARRIER {
			Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
			Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
			Anonymous: D3D12_RESOURCE_BARRIER_0 {
				Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
					// borrows without AddRef, ManuallyDrop skips the matching Release
					pResource: ManuallyDrop::new(Some(unsafe { std::mem::transmute_copy(&resource.resource) })),
					Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
					StateBefore: native_resource_state(before),
					StateAfter: native_resource_state(after),
				}),
			},
		};
		unsafe { self.list.ResourceBarrier(&[barrier]) };
	}

	fn allocate_dynamic_gpu_descriptors(
		&mut self,
		heap_type: DescriptorHeapType,
		count: u32,
	) -> Result<DescriptorHeapRange, D3D12AllocationError> {
		self.dynamic[heap_type as usize].allocate(count)
	}

	unsafe fn set_descriptor_table(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		base_descriptor: GpuDescriptorHandle,
	) {
		let handle = D3D12_GPU_DESCRIPTOR_HANDLE { ptr: base_descriptor.0 };
		unsafe {
			match bind_point {
				PipelineBindPoint::Graphics => self.list.SetGraphicsRootDescriptorTable(root_index, handle),
				PipelineBindPoint::Compute => self.list.SetComputeRootDescriptorTable(root_index, handle),
			}
		}
	}

	unsafe fn set_root_view(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		kind: RootViewKind,
		address: GpuVirtualAddress,
	) {
		let list = &self.list;
		unsafe {
			match (bind_point, kind) {
				(PipelineBindPoint::Graphics, RootViewKind::Cbv) => {
					list.SetGraphicsRootConstantBufferView(root_index, address)
				}
				(PipelineBindPoint::Graphics, RootViewKind::Srv) => {
					list.SetGraphicsRootShaderResourceView(root_index, address)
				}
				(PipelineBindPoint::Graphics, RootViewKind::Uav) => {
					list.SetGraphicsRootUnorderedAccessView(root_index, address)
				}
				(PipelineBindPoint::Compute, RootViewKind::Cbv) => {
					list.SetComputeRootConstantBufferView(root_index, address)
				}
				(PipelineBindPoint::Compute, RootViewKind::Srv) => {
					list.SetComputeRootShaderResourceView(root_index, address)
				}
				(PipelineBindPoint::Compute, RootViewKind::Uav) => {
					list.SetComputeRootUnorderedAccessView(root_index, address)
				}
			}
		}
	}

	unsafe fn set_root_constants(&mut self, bind_point: PipelineBindPoint, root_index: u32, values: &[u32]) {
		let len = values.len() as u32;
		let ptr = values.as_ptr().cast();
		unsafe {
			match bind_point {
				PipelineBindPoint::Graphics => self.list.SetGraphicsRoot32BitConstants(root_index, len, ptr, 0),
				PipelineBindPoint::Compute => self.list.SetComputeRoot32BitConstants(root_index, len, ptr, 0),
			}
		}
	}
}
