use crate::cache::{DescriptorHeapType, ResourceState};
use crate::layout::ShaderVariableType;

/// The type of descriptors in a descriptor table range. Values match `D3D12_DESCRIPTOR_RANGE_TYPE`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DescriptorRangeType {
	Srv = 0,
	Uav = 1,
	Cbv = 2,
	Sampler = 3,
}

impl DescriptorRangeType {
	/// Samplers live in their own descriptor heap, everything else shares the CBV/SRV/UAV heap.
	#[inline]
	pub fn heap_type(self) -> DescriptorHeapType {
		match self {
			DescriptorRangeType::Sampler => DescriptorHeapType::Sampler,
			DescriptorRangeType::Srv | DescriptorRangeType::Uav | DescriptorRangeType::Cbv => {
				DescriptorHeapType::CbvSrvUav
			}
		}
	}

	/// The state a resource bound to this range must be in when the GPU accesses it. Samplers are not resources and
	/// require no state.
	#[inline]
	pub fn required_state(self) -> ResourceState {
		match self {
			DescriptorRangeType::Cbv => ResourceState::VERTEX_AND_CONSTANT_BUFFER,
			DescriptorRangeType::Srv => {
				ResourceState::NON_PIXEL_SHADER_RESOURCE | ResourceState::PIXEL_SHADER_RESOURCE
			}
			DescriptorRangeType::Uav => ResourceState::UNORDERED_ACCESS,
			DescriptorRangeType::Sampler => ResourceState::empty(),
		}
	}
}

/// What kind of resource a shader declares, as reported by reflection.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderResourceCategory {
	ConstantBuffer,
	TextureSrv,
	BufferSrv,
	TextureUav,
	BufferUav,
	Sampler,
}

impl ShaderResourceCategory {
	#[inline]
	pub fn range_type(self) -> DescriptorRangeType {
		match self {
			ShaderResourceCategory::ConstantBuffer => DescriptorRangeType::Cbv,
			ShaderResourceCategory::TextureSrv | ShaderResourceCategory::BufferSrv => DescriptorRangeType::Srv,
			ShaderResourceCategory::TextureUav | ShaderResourceCategory::BufferUav => DescriptorRangeType::Uav,
			ShaderResourceCategory::Sampler => DescriptorRangeType::Sampler,
		}
	}

	/// Whether this is a buffer, as only buffers may be bound as root views.
	#[inline]
	pub fn is_buffer(self) -> bool {
		matches!(
			self,
			ShaderResourceCategory::ConstantBuffer
				| ShaderResourceCategory::BufferSrv
				| ShaderResourceCategory::BufferUav
		)
	}
}

/// A single resource declared by a shader.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ShaderResourceAttribs {
	pub name: String,
	pub category: ShaderResourceCategory,
	/// first shader register, e.g. `3` for `register(t3)`
	pub bind_point: u32,
	pub space: u32,
	/// array size, 1 for non-arrays
	pub bind_count: u32,
	pub variable_type: ShaderVariableType,
}

impl ShaderResourceAttribs {
	pub fn new(
		name: impl Into<String>,
		category: ShaderResourceCategory,
		bind_point: u32,
		bind_count: u32,
		variable_type: ShaderVariableType,
	) -> Self {
		Self {
			name: name.into(),
			category,
			bind_point,
			space: 0,
			bind_count,
			variable_type,
		}
	}

	pub fn with_space(self, space: u32) -> Self {
		Self { space, ..self }
	}

	#[inline]
	pub fn range_type(&self) -> DescriptorRangeType {
		self.category.range_type()
	}
}
