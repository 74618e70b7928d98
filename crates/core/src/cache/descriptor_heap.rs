/// Values match `D3D12_DESCRIPTOR_HEAP_TYPE`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DescriptorHeapType {
	CbvSrvUav = 0,
	Sampler = 1,
}

impl DescriptorHeapType {
	pub const VALUES: [DescriptorHeapType; 2] = [DescriptorHeapType::CbvSrvUav, DescriptorHeapType::Sampler];
}

/// A CPU-side descriptor handle, as written by `Create*View` and read by descriptor copies.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct CpuDescriptorHandle(pub usize);

/// A GPU-side descriptor handle into a shader visible heap, used to point a descriptor table at it.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct GpuDescriptorHandle(pub u64);

pub type GpuVirtualAddress = u64;

/// A contiguous run of descriptors in a shader visible heap.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DescriptorHeapRange {
	pub heap_type: DescriptorHeapType,
	pub cpu_start: CpuDescriptorHandle,
	pub gpu_start: GpuDescriptorHandle,
	pub count: u32,
	/// byte distance between two adjacent descriptors, see `GetDescriptorHandleIncrementSize`
	pub increment: u32,
}

impl DescriptorHeapRange {
	#[inline]
	pub fn cpu_handle(&self, offset: u32) -> CpuDescriptorHandle {
		debug_assert!(
			offset < self.count,
			"offset {} out of bounds for {} descriptors",
			offset,
			self.count
		);
		CpuDescriptorHandle(self.cpu_start.0 + offset as usize * self.increment as usize)
	}

	#[inline]
	pub fn gpu_handle(&self, offset: u32) -> GpuDescriptorHandle {
		debug_assert!(
			offset < self.count,
			"offset {} out of bounds for {} descriptors",
			offset,
			self.count
		);
		GpuDescriptorHandle(self.gpu_start.0 + offset as u64 * self.increment as u64)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_handle_offsets() {
		let range = DescriptorHeapRange {
			heap_type: DescriptorHeapType::CbvSrvUav,
			cpu_start: CpuDescriptorHandle(0x1000),
			gpu_start: GpuDescriptorHandle(0x8000_0000),
			count: 8,
			increment: 32,
		};
		assert_eq!(range.cpu_handle(0), CpuDescriptorHandle(0x1000));
		assert_eq!(range.cpu_handle(3), CpuDescriptorHandle(0x1000 + 3 * 32));
		assert_eq!(range.gpu_handle(7), GpuDescriptorHandle(0x8000_0000 + 7 * 32));
	}
}
