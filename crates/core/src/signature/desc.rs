use crate::layout::{DescriptorRangeType, ShaderVariableType, ShaderVisibility, VariableTypeArray};
use crate::root_params::{DescriptorRange, RootViewKind};
use crate::signature::StaticSamplerBinding;
use bitflags::bitflags;

bitflags! {
	/// Values match `D3D12_ROOT_SIGNATURE_FLAGS`.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct RootSignatureFlags: u32 {
		const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 0x1;
		const DENY_VERTEX_SHADER_ROOT_ACCESS = 0x2;
		const DENY_HULL_SHADER_ROOT_ACCESS = 0x4;
		const DENY_DOMAIN_SHADER_ROOT_ACCESS = 0x8;
		const DENY_GEOMETRY_SHADER_ROOT_ACCESS = 0x10;
		const DENY_PIXEL_SHADER_ROOT_ACCESS = 0x20;
		const ALLOW_STREAM_OUTPUT = 0x40;
	}
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RootParameterDescKind {
	Table { ranges: Vec<DescriptorRange> },
	View { kind: RootViewKind, register: u32, space: u32 },
	Constants { register: u32, space: u32, num_values: u32 },
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RootParameterDesc {
	pub kind: RootParameterDescKind,
	pub visibility: ShaderVisibility,
	/// not part of the native description, kept to attribute descriptor slots
	pub variable_type: ShaderVariableType,
}

impl RootParameterDesc {
	/// Cost of this parameter in the root argument budget, in DWORDs.
	#[inline]
	pub fn root_dword_cost(&self) -> u32 {
		match self.kind {
			RootParameterDescKind::Table { .. } => 1,
			RootParameterDescKind::View { .. } => 2,
			RootParameterDescKind::Constants { num_values, .. } => num_values,
		}
	}
}

/// Platform independent description of a root signature. Parameters are ordered by root index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootSignatureDesc {
	pub parameters: Vec<RootParameterDesc>,
	pub static_samplers: Vec<StaticSamplerBinding>,
	pub flags: RootSignatureFlags,
}

/// Number of descriptor heap slots used by descriptor tables, per [`ShaderVariableType`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SlotTotals {
	pub cbv_srv_uav: VariableTypeArray<u32>,
	pub sampler: VariableTypeArray<u32>,
}

impl RootSignatureDesc {
	pub fn root_dword_cost(&self) -> u32 {
		self.parameters.iter().map(RootParameterDesc::root_dword_cost).sum()
	}

	/// Recomputes the descriptor table slot totals from the described ranges.
	pub fn slot_totals(&self) -> SlotTotals {
		let mut totals = SlotTotals::default();
		for param in &self.parameters {
			if let RootParameterDescKind::Table { ranges } = &param.kind {
				for range in ranges {
					let total = match range.range_type {
						DescriptorRangeType::Sampler => &mut totals.sampler,
						_ => &mut totals.cbv_srv_uav,
					};
					total[param.variable_type] += range.count;
				}
			}
		}
		totals
	}
}
