/// Texel mixing mode when sampling between texels.
///
/// Docs copied from wgpu.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum Filter {
	/// Nearest neighbor sampling.
	///
	/// This creates a pixelated effect when used as a mag filter
	#[default]
	Nearest = 0,
	/// Linear Interpolation
	///
	/// This makes textures smooth but blurry when used as a mag filter.
	Linear = 1,
}

/// How edges should be handled in texture addressing.
///
/// Docs copied from wgpu.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
pub enum AddressMode {
	/// Clamp the value to the edge of the texture
	///
	/// -0.25 -> 0.0
	/// 1.25  -> 1.0
	#[default]
	ClampToEdge = 0,
	/// Repeat the texture in a tiling fashion
	///
	/// -0.25 -> 0.75
	/// 1.25 -> 0.25
	Repeat = 1,
	/// Repeat the texture, mirroring it every repeat
	///
	/// -0.25 -> 0.25
	/// 1.25 -> 0.75
	MirrorRepeat = 2,
	/// Clamp the value to the border of the texture
	///
	/// -0.25 -> border
	/// 1.25 -> border
	ClampToBorder = 3,
}

/// Color variation to use when sampler addressing mode is [`AddressMode::ClampToBorder`]
///
/// Docs copied from wgpu.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum BorderColor {
	/// [0, 0, 0, 0]
	#[default]
	TransparentBlack,
	/// [0, 0, 0, 1]
	OpaqueBlack,
	/// [1, 1, 1, 1]
	OpaqueWhite,
}

/// Comparison function used by comparison samplers, e.g. for shadow map lookups.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CompareFunction {
	Never,
	Less,
	Equal,
	LessEqual,
	Greater,
	NotEqual,
	GreaterEqual,
	#[default]
	Always,
}

#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct SamplerDesc {
	pub mag_filter: Filter,
	pub min_filter: Filter,
	pub mipmap_mode: Filter,
	pub address_mode_u: AddressMode,
	pub address_mode_v: AddressMode,
	pub address_mode_w: AddressMode,
	pub mip_lod_bias: f32,
	pub max_anisotropy: Option<u32>,
	pub compare: Option<CompareFunction>,
	pub min_lod: f32,
	pub max_lod: Option<f32>,
	pub border_color: BorderColor,
}

/// Declares that the sampler named `sampler_name` of a shader is baked into the root signature as a static sampler
/// instead of being bound through a descriptor table.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticSamplerDesc {
	pub sampler_name: String,
	pub desc: SamplerDesc,
}

impl StaticSamplerDesc {
	pub fn new(sampler_name: impl Into<String>, desc: SamplerDesc) -> Self {
		Self {
			sampler_name: sampler_name.into(),
			desc,
		}
	}
}
