//! The D3D12 platform, built on the `windows` crate.

use crate::cache::{
	CpuDescriptorHandle, DescriptorHeapRange, DescriptorHeapType, GpuDescriptorHandle, GpuVirtualAddress,
};
use crate::platform::RootSignaturePlatform;
use crate::signature::RootSignatureDesc;
use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;
use windows::Win32::Graphics::Direct3D12::{
	ID3D12DescriptorHeap, ID3D12Device, ID3D12Resource, ID3D12RootSignature, D3D12_CPU_DESCRIPTOR_HANDLE,
	D3D12_DESCRIPTOR_HEAP_DESC, D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE, D3D12_DESCRIPTOR_HEAP_TYPE,
};

mod context;
mod convert;

pub use context::*;
pub use convert::*;

#[derive(Error)]
pub enum D3D12CreationError {
	#[error("Failed to serialize root signature: {message}")]
	Serialize {
		message: String,
		#[source]
		source: windows::core::Error,
	},
	#[error("Failed to create root signature: {0}")]
	Create(#[source] windows::core::Error),
}

impl Debug for D3D12CreationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(self, f)
	}
}

#[derive(Error)]
#[error("Out of {heap_type:?} descriptors: requested {requested}, {available} available")]
pub struct D3D12AllocationError {
	pub heap_type: DescriptorHeapType,
	pub requested: u32,
	pub available: u32,
}

impl Debug for D3D12AllocationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		std::fmt::Display::fmt(self, f)
	}
}

#[inline]
pub(crate) fn native_heap_type(heap_type: DescriptorHeapType) -> D3D12_DESCRIPTOR_HEAP_TYPE {
	// DescriptorHeapType values match D3D12_DESCRIPTOR_HEAP_TYPE
	D3D12_DESCRIPTOR_HEAP_TYPE(heap_type as i32)
}

/// First fit allocator over the descriptors of a shader visible heap. Free ranges are kept sorted and merged.
#[derive(Debug)]
struct FreeList {
	free: Vec<(u32, u32)>,
}

impl FreeList {
	fn new(capacity: u32) -> Self {
		Self {
			free: if capacity > 0 { vec![(0, capacity)] } else { Vec::new() },
		}
	}

	fn largest(&self) -> u32 {
		self.free.iter().map(|&(_, len)| len).max().unwrap_or(0)
	}

	fn allocate(&mut self, count: u32) -> Option<u32> {
		let index = self.free.iter().position(|&(_, len)| len >= count)?;
		let (start, len) = self.free[index];
		if len == count {
			self.free.remove(index);
		} else {
			self.free[index] = (start + count, len - count);
		}
		Some(start)
	}

	fn free(&mut self, start: u32, count: u32) {
		let index = self.free.partition_point(|&(s, _)| s < start);
		self.free.insert(index, (start, count));
		if index + 1 < self.free.len() && start + count == self.free[index + 1].0 {
			self.free[index].1 += self.free[index + 1].1;
			self.free.remove(index + 1);
		}
		if index > 0 && self.free[index - 1].0 + self.free[index - 1].1 == start {
			self.free[index - 1].1 += self.free[index].1;
			self.free.remove(index);
		}
	}
}

pub(crate) struct ShaderVisibleHeap {
	heap: ID3D12DescriptorHeap,
	heap_type: DescriptorHeapType,
	cpu_start: CpuDescriptorHandle,
	gpu_start: GpuDescriptorHandle,
	increment: u32,
	free_list: Mutex<FreeList>,
}

// Safety: descriptor heaps are free threaded, the free list is guarded by its mutex
unsafe impl Send for ShaderVisibleHeap {}
unsafe impl Sync for ShaderVisibleHeap {}

impl ShaderVisibleHeap {
	fn new(device: &ID3D12Device, heap_type: DescriptorHeapType, capacity: u32) -> windows::core::Result<Self> {
		unsafe {
			let heap: ID3D12DescriptorHeap = device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
				Type: native_heap_type(heap_type),
				NumDescriptors: capacity,
				Flags: D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE,
				NodeMask: 0,
			})?;
			Ok(Self {
				heap_type,
				cpu_start: CpuDescriptorHandle(heap.GetCPUDescriptorHandleForHeapStart().ptr),
				gpu_start: GpuDescriptorHandle(heap.GetGPUDescriptorHandleForHeapStart().ptr),
				increment: device.GetDescriptorHandleIncrementSize(native_heap_type(heap_type)),
				free_list: Mutex::new(FreeList::new(capacity)),
				heap,
			})
		}
	}

	pub(crate) fn native(&self) -> &ID3D12DescriptorHeap {
		&self.heap
	}

	fn allocate(self: &Arc<Self>, count: u32) -> Result<D3D12DescriptorAllocation, D3D12AllocationError> {
		let first = if count == 0 {
			0
		} else {
			let mut free_list = self.free_list.lock();
			free_list.allocate(count).ok_or_else(|| D3D12AllocationError {
				heap_type: self.heap_type,
				requested: count,
				available: free_list.largest(),
			})?
		};
		Ok(D3D12DescriptorAllocation {
			range: DescriptorHeapRange {
				heap_type: self.heap_type,
				cpu_start: CpuDescriptorHandle(self.cpu_start.0 + first as usize * self.increment as usize),
				gpu_start: GpuDescriptorHandle(self.gpu_start.0 + first as u64 * self.increment as u64),
				count,
				increment: self.increment,
			},
			first,
			heap: self.clone(),
		})
	}
}

/// Descriptors of a shader visible heap, returned to the heap on drop.
pub struct D3D12DescriptorAllocation {
	range: DescriptorHeapRange,
	first: u32,
	heap: Arc<ShaderVisibleHeap>,
}

impl Deref for D3D12DescriptorAllocation {
	type Target = DescriptorHeapRange;

	fn deref(&self) -> &Self::Target {
		&self.range
	}
}

impl Drop for D3D12DescriptorAllocation {
	fn drop(&mut self) {
		if self.range.count > 0 {
			self.heap.free_list.lock().free(self.first, self.range.count);
		}
	}
}

impl Debug for D3D12DescriptorAllocation {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("D3D12DescriptorAllocation")
			.field("range", &self.range)
			.finish()
	}
}

pub struct D3D12RootSignature(pub ID3D12RootSignature);

// Safety: root signatures are immutable after creation
unsafe impl Send for D3D12RootSignature {}
unsafe impl Sync for D3D12RootSignature {}

/// A buffer or texture. Dynamic buffers live in upload memory that is suballocated per recording context, so they
/// carry one offset into the buffer per context.
pub struct D3D12Resource {
	pub resource: ID3D12Resource,
	pub context_offsets: Option<Box<[u64]>>,
}

// Safety: resources are free threaded, states are tracked outside
unsafe impl Send for D3D12Resource {}
unsafe impl Sync for D3D12Resource {}

impl D3D12Resource {
	pub fn new(resource: ID3D12Resource) -> Self {
		Self {
			resource,
			context_offsets: None,
		}
	}

	pub fn new_dynamic(resource: ID3D12Resource, context_offsets: impl Into<Box<[u64]>>) -> Self {
		Self {
			resource,
			context_offsets: Some(context_offsets.into()),
		}
	}
}

/// Shader visible descriptor heap sizes of a [`D3D12Platform`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct D3D12HeapSizes {
	pub cbv_srv_uav: u32,
	pub sampler: u32,
}

impl Default for D3D12HeapSizes {
	fn default() -> Self {
		Self {
			cbv_srv_uav: 1_000_000,
			// D3D12_MAX_SHADER_VISIBLE_SAMPLER_HEAP_SIZE
			sampler: 2048,
		}
	}
}

/// A device together with one shader visible heap per [`DescriptorHeapType`]. Persistent descriptors of resource
/// caches and the dynamic descriptors of [`D3D12CommandContext`]s are both allocated from these heaps.
pub struct D3D12Platform {
	device: ID3D12Device,
	heaps: [Arc<ShaderVisibleHeap>; 2],
}

// Safety: ID3D12Device is free threaded
unsafe impl Send for D3D12Platform {}
unsafe impl Sync for D3D12Platform {}

impl D3D12Platform {
	pub fn new(device: ID3D12Device, sizes: D3D12HeapSizes) -> windows::core::Result<Self> {
		let heaps = [
			Arc::new(ShaderVisibleHeap::new(&device, DescriptorHeapType::CbvSrvUav, sizes.cbv_srv_uav)?),
			Arc::new(ShaderVisibleHeap::new(&device, DescriptorHeapType::Sampler, sizes.sampler)?),
		];
		Ok(Self { device, heaps })
	}

	#[inline]
	pub fn device(&self) -> &ID3D12Device {
		&self.device
	}

	#[inline]
	pub(crate) fn heap(&self, heap_type: DescriptorHeapType) -> &Arc<ShaderVisibleHeap> {
		&self.heaps[heap_type as usize]
	}
}

unsafe impl RootSignaturePlatform for D3D12Platform {
	type RootSignature = D3D12RootSignature;
	type Resource = D3D12Resource;
	type DescriptorAllocation = D3D12DescriptorAllocation;
	type CommandContext = D3D12CommandContext;
	type CreationError = D3D12CreationError;
	type AllocationError = D3D12AllocationError;

	unsafe fn create_root_signature(
		&self,
		desc: &RootSignatureDesc,
	) -> Result<Self::RootSignature, Self::CreationError> {
		unsafe { convert::create_root_signature(&self.device, desc) }
	}

	unsafe fn allocate_gpu_descriptors(
		&self,
		heap_type: DescriptorHeapType,
		count: u32,
	) -> Result<Self::DescriptorAllocation, Self::AllocationError> {
		self.heap(heap_type).allocate(count)
	}

	unsafe fn copy_descriptors(
		&self,
		dst: CpuDescriptorHandle,
		src: CpuDescriptorHandle,
		count: u32,
		heap_type: DescriptorHeapType,
	) {
		unsafe {
			self.device.CopyDescriptorsSimple(
				count,
				D3D12_CPU_DESCRIPTOR_HANDLE { ptr: dst.0 },
				D3D12_CPU_DESCRIPTOR_HANDLE { ptr: src.0 },
				native_heap_type(heap_type),
			)
		}
	}

	unsafe fn gpu_virtual_address(resource: &Self::Resource, context_id: u32) -> GpuVirtualAddress {
		let base = unsafe { resource.resource.GetGPUVirtualAddress() };
		match &resource.context_offsets {
			None => base,
			Some(offsets) => base + offsets[context_id as usize],
		}
	}
}
