use crate::cache::ResourceState;
use crate::layout::{AddressMode, BorderColor, CompareFunction, Filter, SamplerDesc, ShaderVisibility};
use crate::platform::d3d12::{D3D12CreationError, D3D12RootSignature};
use crate::root_params::RootViewKind;
use crate::signature::{RootParameterDesc, RootParameterDescKind, RootSignatureDesc, StaticSamplerBinding};
use windows::Win32::Foundation::E_FAIL;
use windows::Win32::Graphics::Direct3D::{ID3DBlob, D3D_ROOT_SIGNATURE_VERSION_1};
use windows::Win32::Graphics::Direct3D12::*;

#[inline]
pub fn native_resource_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
	// ResourceState bits match D3D12_RESOURCE_STATES
	D3D12_RESOURCE_STATES(state.bits() as i32)
}

#[inline]
pub fn native_visibility(visibility: ShaderVisibility) -> D3D12_SHADER_VISIBILITY {
	D3D12_SHADER_VISIBILITY(visibility as i32)
}

fn native_filter(desc: &SamplerDesc) -> D3D12_FILTER {
	let bits = |filter: Filter| match filter {
		Filter::Nearest => 0,
		Filter::Linear => 1,
	};
	let mut filter = if desc.max_anisotropy.is_some() {
		D3D12_FILTER_ANISOTROPIC.0
	} else {
		bits(desc.min_filter) << 4 | bits(desc.mag_filter) << 2 | bits(desc.mipmap_mode)
	};
	if desc.compare.is_some() {
		// D3D12_FILTER_REDUCTION_TYPE_COMPARISON
		filter |= 1 << 7;
	}
	D3D12_FILTER(filter)
}

fn native_address_mode(mode: AddressMode) -> D3D12_TEXTURE_ADDRESS_MODE {
	match mode {
		AddressMode::ClampToEdge => D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
		AddressMode::Repeat => D3D12_TEXTURE_ADDRESS_MODE_WRAP,
		AddressMode::MirrorRepeat => D3D12_TEXTURE_ADDRESS_MODE_MIRROR,
		AddressMode::ClampToBorder => D3D12_TEXTURE_ADDRESS_MODE_BORDER,
	}
}

fn native_compare(compare: CompareFunction) -> D3D12_COMPARISON_FUNC {
	match compare {
		CompareFunction::Never => D3D12_COMPARISON_FUNC_NEVER,
		CompareFunction::Less => D3D12_COMPARISON_FUNC_LESS,
		CompareFunction::Equal => D3D12_COMPARISON_FUNC_EQUAL,
		CompareFunction::LessEqual => D3D12_COMPARISON_FUNC_LESS_EQUAL,
		CompareFunction::Greater => D3D12_COMPARISON_FUNC_GREATER,
		CompareFunction::NotEqual => D3D12_COMPARISON_FUNC_NOT_EQUAL,
		CompareFunction::GreaterEqual => D3D12_COMPARISON_FUNC_GREATER_EQUAL,
		CompareFunction::Always => D3D12_COMPARISON_FUNC_ALWAYS,
	}
}

fn native_border_color(color: BorderColor) -> D3D12_STATIC_BORDER_COLOR {
	match color {
		BorderColor::TransparentBlack => D3D12_STATIC_BORDER_COLOR_TRANSPARENT_BLACK,
		BorderColor::OpaqueBlack => D3D12_STATIC_BORDER_COLOR_OPAQUE_BLACK,
		BorderColor::OpaqueWhite => D3D12_STATIC_BORDER_COLOR_OPAQUE_WHITE,
	}
}

pub fn native_static_sampler(sampler: &StaticSamplerBinding) -> D3D12_STATIC_SAMPLER_DESC {
	let desc = &sampler.desc;
	D3D12_STATIC_SAMPLER_DESC {
		Filter: native_filter(desc),
		AddressU: native_address_mode(desc.address_mode_u),
		AddressV: native_address_mode(desc.address_mode_v),
		AddressW: native_address_mode(desc.address_mode_w),
		MipLODBias: desc.mip_lod_bias,
		MaxAnisotropy: desc.max_anisotropy.unwrap_or(1),
		ComparisonFunc: native_compare(desc.compare.unwrap_or(CompareFunction::Never)),
		BorderColor: native_border_color(desc.border_color),
		MinLOD: desc.min_lod,
		MaxLOD: desc.max_lod.unwrap_or(f32::MAX),
		ShaderRegister: sampler.shader_register,
		RegisterSpace: sampler.register_space,
		ShaderVisibility: native_visibility(sampler.visibility),
	}
}

/// Native descriptor ranges of each parameter, indexed like `desc.parameters`. Must outlive the root parameters
/// pointing into it.
fn native_ranges(desc: &RootSignatureDesc) -> Vec<Vec<D3D12_DESCRIPTOR_RANGE>> {
	desc.parameters
		.iter()
		.map(|param| match &param.kind {
			RootParameterDescKind::Table { ranges } => ranges
				.iter()
				.map(|range| D3D12_DESCRIPTOR_RANGE {
					RangeType: D3D12_DESCRIPTOR_RANGE_TYPE(range.range_type as i32),
					NumDescriptors: range.count,
					BaseShaderRegister: range.base_register,
					RegisterSpace: range.register_space,
					OffsetInDescriptorsFromTableStart: range.offset_from_table_start,
				})
				.collect(),
			_ => Vec::new(),
		})
		.collect()
}

fn native_parameter(param: &RootParameterDesc, ranges: &[D3D12_DESCRIPTOR_RANGE]) -> D3D12_ROOT_PARAMETER {
	let (parameter_type, anonymous) = match param.kind {
		RootParameterDescKind::Table { .. } => (
			D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
			D3D12_ROOT_PARAMETER_0 {
				DescriptorTable: D3D12_ROOT_DESCRIPTOR_TABLE {
					NumDescriptorRanges: ranges.len() as u32,
					pDescriptorRanges: ranges.as_ptr(),
				},
			},
		),
		RootParameterDescKind::View { kind, register, space } => (
			match kind {
				RootViewKind::Cbv => D3D12_ROOT_PARAMETER_TYPE_CBV,
				RootViewKind::Srv => D3D12_ROOT_PARAMETER_TYPE_SRV,
				RootViewKind::Uav => D3D12_ROOT_PARAMETER_TYPE_UAV,
			},
			D3D12_ROOT_PARAMETER_0 {
				Descriptor: D3D12_ROOT_DESCRIPTOR {
					ShaderRegister: register,
					RegisterSpace: space,
				},
			},
		),
		RootParameterDescKind::Constants {
			register,
			space,
			num_values,
		} => (
			D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS,
			D3D12_ROOT_PARAMETER_0 {
				Constants: D3D12_ROOT_CONSTANTS {
					ShaderRegister: register,
					RegisterSpace: space,
					Num32BitValues: num_values,
				},
			},
		),
	};
	D3D12_ROOT_PARAMETER {
		ParameterType: parameter_type,
		Anonymous: anonymous,
		ShaderVisibility: native_visibility(param.visibility),
	}
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
	// Safety: the blob owns `GetBufferSize` bytes at `GetBufferPointer` for as long as it lives
	unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

/// Serializes `desc` as a version 1.0 root signature and creates it on `device`.
pub unsafe fn create_root_signature(
	device: &ID3D12Device,
	desc: &RootSignatureDesc,
) -> Result<D3D12RootSignature, D3D12CreationError> {
	let ranges = native_ranges(desc);
	let parameters = desc
		.parameters
		.iter()
		.zip(&ranges)
		.map(|(param, ranges)| native_parameter(param, ranges))
		.collect::<Vec<_>>();
	let static_samplers = desc.static_samplers.iter().map(native_static_sampler).collect::<Vec<_>>();

	let native = D3D12_ROOT_SIGNATURE_DESC {
		NumParameters: parameters.len() as u32,
		pParameters: parameters.as_ptr(),
		NumStaticSamplers: static_samplers.len() as u32,
		pStaticSamplers: static_samplers.as_ptr(),
		// RootSignatureFlags bits match D3D12_ROOT_SIGNATURE_FLAGS
		Flags: D3D12_ROOT_SIGNATURE_FLAGS(desc.flags.bits() as i32),
	};

	let mut blob = None;
	let mut error_blob = None;
	let serialized = unsafe {
		D3D12SerializeRootSignature(&native, D3D_ROOT_SIGNATURE_VERSION_1, &mut blob, Some(&mut error_blob))
	};
	let blob: ID3DBlob = match (serialized, blob) {
		(Ok(()), Some(blob)) => blob,
		(result, _) => {
			let message = error_blob
				.as_ref()
				.map(|error| String::from_utf8_lossy(blob_bytes(error)).into_owned())
				.unwrap_or_default();
			let source = result.err().unwrap_or_else(|| E_FAIL.into());
			return Err(D3D12CreationError::Serialize { message, source });
		}
	};

	let root_signature = unsafe { device.CreateRootSignature::<ID3D12RootSignature>(0, blob_bytes(&blob)) }
		.map_err(D3D12CreationError::Create)?;
	Ok(D3D12RootSignature(root_signature))
}
