//! A platform that talks to no GPU at all. It hands out fake descriptor handles and addresses and records every call,
//! which makes it suitable for validating layouts and for testing.

use crate::cache::{
	CpuDescriptorHandle, DescriptorHeapRange, DescriptorHeapType, GpuDescriptorHandle, GpuVirtualAddress,
	ResourceState,
};
use crate::platform::{CommandContext, PipelineBindPoint, RootSignaturePlatform};
use crate::root_params::RootViewKind;
use crate::signature::RootSignatureDesc;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::ops::Deref;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::Relaxed;
use thiserror::Error;

/// Byte distance between adjacent descriptors, per [`DescriptorHeapType`].
pub const NULL_DESCRIPTOR_INCREMENT: [u32; 2] = [32, 16];
const PERSISTENT_CPU_BASE: [usize; 2] = [0x1000_0000, 0x2000_0000];
const PERSISTENT_GPU_BASE: [u64; 2] = [0x1_0000_0000, 0x2_0000_0000];
const DYNAMIC_CPU_BASE: [usize; 2] = [0x3000_0000, 0x4000_0000];
const DYNAMIC_GPU_BASE: [u64; 2] = [0x3_0000_0000, 0x4_0000_0000];

fn heap_range(
	heap_type: DescriptorHeapType,
	cpu_base: usize,
	gpu_base: u64,
	first: u32,
	count: u32,
) -> DescriptorHeapRange {
	let increment = NULL_DESCRIPTOR_INCREMENT[heap_type as usize];
	DescriptorHeapRange {
		heap_type,
		cpu_start: CpuDescriptorHandle(cpu_base + first as usize * increment as usize),
		gpu_start: GpuDescriptorHandle(gpu_base + first as u64 * increment as u64),
		count,
		increment,
	}
}

#[derive(Debug, Error)]
pub enum NullCreationError {
	#[error("Root signature creation was configured to fail")]
	Rejected,
}

#[derive(Debug, Error)]
#[error("Out of {heap_type:?} descriptors: requested {requested}, {available} available")]
pub struct NullAllocationError {
	pub heap_type: DescriptorHeapType,
	pub requested: u32,
	pub available: u32,
}

/// A descriptor copy done by [`NullPlatform::copy_descriptors`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DescriptorCopy {
	pub dst: CpuDescriptorHandle,
	pub src: CpuDescriptorHandle,
	pub count: u32,
	pub heap_type: DescriptorHeapType,
}

struct NullPlatformState {
	next_descriptor: [u32; 2],
	capacity: [u32; 2],
	copies: Vec<DescriptorCopy>,
	root_signatures_created: u32,
}

pub struct NullPlatform {
	state: Mutex<NullPlatformState>,
	fail_creation: AtomicBool,
}

impl Default for NullPlatform {
	fn default() -> Self {
		Self::new()
	}
}

impl NullPlatform {
	pub fn new() -> Self {
		Self::with_capacity(1_000_000, 2048)
	}

	/// A platform with shader visible heaps of the given sizes, like `D3D12_DESCRIPTOR_HEAP_DESC::NumDescriptors`.
	pub fn with_capacity(cbv_srv_uav: u32, sampler: u32) -> Self {
		Self {
			state: Mutex::new(NullPlatformState {
				next_descriptor: [0; 2],
				capacity: [cbv_srv_uav, sampler],
				copies: Vec::new(),
				root_signatures_created: 0,
			}),
			fail_creation: AtomicBool::new(false),
		}
	}

	/// Makes every following root signature creation fail, as the device would for invalid layouts.
	pub fn set_fail_creation(&self, fail: bool) {
		self.fail_creation.store(fail, Relaxed);
	}

	pub fn root_signatures_created(&self) -> u32 {
		self.state.lock().root_signatures_created
	}

	/// All descriptor copies done so far.
	pub fn copies(&self) -> Vec<DescriptorCopy> {
		self.state.lock().copies.clone()
	}

	/// Returns and forgets all descriptor copies done so far.
	pub fn take_copies(&self) -> Vec<DescriptorCopy> {
		std::mem::take(&mut self.state.lock().copies)
	}
}

#[derive(Debug)]
pub struct NullRootSignature {
	pub desc: RootSignatureDesc,
}

/// A buffer or texture at a fake GPU address. Dynamic buffers are suballocated per context, each context sees the
/// buffer `context_stride` bytes further into upload memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NullResource {
	pub gpu_address: GpuVirtualAddress,
	pub context_stride: u64,
}

impl NullResource {
	pub fn new(gpu_address: GpuVirtualAddress) -> Self {
		Self {
			gpu_address,
			context_stride: 0,
		}
	}

	pub fn new_dynamic(gpu_address: GpuVirtualAddress, context_stride: u64) -> Self {
		Self {
			gpu_address,
			context_stride,
		}
	}
}

#[derive(Debug)]
pub struct NullDescriptorAllocation {
	range: DescriptorHeapRange,
}

impl Deref for NullDescriptorAllocation {
	type Target = DescriptorHeapRange;

	fn deref(&self) -> &Self::Target {
		&self.range
	}
}

unsafe impl RootSignaturePlatform for NullPlatform {
	type RootSignature = NullRootSignature;
	type Resource = NullResource;
	type DescriptorAllocation = NullDescriptorAllocation;
	type CommandContext = NullCommandContext;
	type CreationError = NullCreationError;
	type AllocationError = NullAllocationError;

	unsafe fn create_root_signature(
		&self,
		desc: &RootSignatureDesc,
	) -> Result<Self::RootSignature, Self::CreationError> {
		if self.fail_creation.load(Relaxed) {
			return Err(NullCreationError::Rejected);
		}
		self.state.lock().root_signatures_created += 1;
		Ok(NullRootSignature { desc: desc.clone() })
	}

	unsafe fn allocate_gpu_descriptors(
		&self,
		heap_type: DescriptorHeapType,
		count: u32,
	) -> Result<Self::DescriptorAllocation, Self::AllocationError> {
		let mut state = self.state.lock();
		let heap = heap_type as usize;
		let first = state.next_descriptor[heap];
		let available = state.capacity[heap] - first;
		if count > available {
			return Err(NullAllocationError {
				heap_type,
				requested: count,
				available,
			});
		}
		state.next_descriptor[heap] += count;
		Ok(NullDescriptorAllocation {
			range: heap_range(heap_type, PERSISTENT_CPU_BASE[heap], PERSISTENT_GPU_BASE[heap], first, count),
		})
	}

	unsafe fn copy_descriptors(
		&self,
		dst: CpuDescriptorHandle,
		src: CpuDescriptorHandle,
		count: u32,
		heap_type: DescriptorHeapType,
	) {
		self.state.lock().copies.push(DescriptorCopy {
			dst,
			src,
			count,
			heap_type,
		});
	}

	unsafe fn gpu_virtual_address(resource: &Self::Resource, context_id: u32) -> GpuVirtualAddress {
		resource.gpu_address + context_id as u64 * resource.context_stride
	}
}

/// A command recorded into a [`NullCommandContext`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum NullCommand {
	Barrier {
		resource: NullResource,
		before: ResourceState,
		after: ResourceState,
	},
	SetDescriptorTable {
		bind_point: PipelineBindPoint,
		root_index: u32,
		base_descriptor: GpuDescriptorHandle,
	},
	SetRootView {
		bind_point: PipelineBindPoint,
		root_index: u32,
		kind: RootViewKind,
		address: GpuVirtualAddress,
	},
	SetRootConstants {
		bind_point: PipelineBindPoint,
		root_index: u32,
		values: SmallVec<[u32; 8]>,
	},
}

/// Records commands and hands out dynamic descriptors from a linear per-context range.
#[derive(Debug)]
pub struct NullCommandContext {
	pub commands: Vec<NullCommand>,
	next_dynamic: [u32; 2],
	dynamic_capacity: [u32; 2],
	dynamic_allocations: u32,
}

impl Default for NullCommandContext {
	fn default() -> Self {
		Self::new()
	}
}

impl NullCommandContext {
	pub fn new() -> Self {
		Self::with_dynamic_capacity(65536, 1024)
	}

	pub fn with_dynamic_capacity(cbv_srv_uav: u32, sampler: u32) -> Self {
		Self {
			commands: Vec::new(),
			next_dynamic: [0; 2],
			dynamic_capacity: [cbv_srv_uav, sampler],
			dynamic_allocations: 0,
		}
	}

	/// Number of successful [`CommandContext::allocate_dynamic_gpu_descriptors`] calls.
	pub fn dynamic_allocations(&self) -> u32 {
		self.dynamic_allocations
	}

	pub fn barriers(&self) -> impl Iterator<Item = &NullCommand> {
		self.commands
			.iter()
			.filter(|cmd| matches!(cmd, NullCommand::Barrier { .. }))
	}

	pub fn clear(&mut self) {
		self.commands.clear();
	}
}

unsafe impl CommandContext<NullPlatform> for NullCommandContext {
	unsafe fn resource_barrier(&mut self, resource: &NullResource, before: ResourceState, after: ResourceState) {
		self.commands.push(NullCommand::Barrier {
			resource: *resource,
			before,
			after,
		});
	}

	fn allocate_dynamic_gpu_descriptors(
		&mut self,
		heap_type: DescriptorHeapType,
		count: u32,
	) -> Result<DescriptorHeapRange, NullAllocationError> {
		let heap = heap_type as usize;
		let first = self.next_dynamic[heap];
		let available = self.dynamic_capacity[heap] - first;
		if count > available {
			return Err(NullAllocationError {
				heap_type,
				requested: count,
				available,
			});
		}
		self.next_dynamic[heap] += count;
		self.dynamic_allocations += 1;
		Ok(heap_range(heap_type, DYNAMIC_CPU_BASE[heap], DYNAMIC_GPU_BASE[heap], first, count))
	}

	unsafe fn set_descriptor_table(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		base_descriptor: GpuDescriptorHandle,
	) {
		self.commands.push(NullCommand::SetDescriptorTable {
			bind_point,
			root_index,
			base_descriptor,
		});
	}

	unsafe fn set_root_view(
		&mut self,
		bind_point: PipelineBindPoint,
		root_index: u32,
		kind: RootViewKind,
		address: GpuVirtualAddress,
	) {
		self.commands.push(NullCommand::SetRootView {
			bind_point,
			root_index,
			kind,
			address,
		});
	}

	unsafe fn set_root_constants(&mut self, bind_point: PipelineBindPoint, root_index: u32, values: &[u32]) {
		self.commands.push(NullCommand::SetRootConstants {
			bind_point,
			root_index,
			values: SmallVec::from_slice(values),
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signature::RootSignature;
	use static_assertions::assert_impl_all;

	assert_impl_all!(NullPlatform: Send, Sync);
	assert_impl_all!(RootSignature<NullPlatform>: Send, Sync);

	#[test]
	fn test_persistent_allocations_do_not_overlap() -> anyhow::Result<()> {
		let platform = NullPlatform::with_capacity(10, 4);
		unsafe {
			let a = platform.allocate_gpu_descriptors(DescriptorHeapType::CbvSrvUav, 6)?;
			let b = platform.allocate_gpu_descriptors(DescriptorHeapType::CbvSrvUav, 4)?;
			assert_eq!(b.cpu_start, CpuDescriptorHandle(a.cpu_start.0 + 6 * a.increment as usize));
			assert!(platform
				.allocate_gpu_descriptors(DescriptorHeapType::CbvSrvUav, 1)
				.is_err());
			let s = platform.allocate_gpu_descriptors(DescriptorHeapType::Sampler, 4)?;
			assert_eq!(s.increment, NULL_DESCRIPTOR_INCREMENT[1]);
		}
		Ok(())
	}

	#[test]
	fn test_dynamic_address_per_context() {
		let resource = NullResource::new_dynamic(0x1000, 0x100);
		unsafe {
			assert_eq!(NullPlatform::gpu_virtual_address(&resource, 0), 0x1000);
			assert_eq!(NullPlatform::gpu_virtual_address(&resource, 3), 0x1300);
		}
	}
}
