use bitflags::bitflags;

/// Number of distinct [`ShaderStage`]s, used to size the per-stage root table maps.
pub const SHADER_STAGE_COUNT: usize = 6;

#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
	Vertex,
	Pixel,
	Geometry,
	Hull,
	Domain,
	Compute,
}

impl ShaderStage {
	pub const VALUES: [ShaderStage; SHADER_STAGE_COUNT] = [
		ShaderStage::Vertex,
		ShaderStage::Pixel,
		ShaderStage::Geometry,
		ShaderStage::Hull,
		ShaderStage::Domain,
		ShaderStage::Compute,
	];

	#[inline]
	pub fn to_usize(self) -> usize {
		self as usize
	}

	#[inline]
	pub fn to_stages(self) -> ShaderStages {
		match self {
			ShaderStage::Vertex => ShaderStages::VERTEX,
			ShaderStage::Pixel => ShaderStages::PIXEL,
			ShaderStage::Geometry => ShaderStages::GEOMETRY,
			ShaderStage::Hull => ShaderStages::HULL,
			ShaderStage::Domain => ShaderStages::DOMAIN,
			ShaderStage::Compute => ShaderStages::COMPUTE,
		}
	}

	/// The visibility of root parameters serving this stage. Compute pipelines only ever run a single stage, so their
	/// parameters are visible to [`ShaderVisibility::All`].
	#[inline]
	pub fn visibility(self) -> ShaderVisibility {
		match self {
			ShaderStage::Vertex => ShaderVisibility::Vertex,
			ShaderStage::Pixel => ShaderVisibility::Pixel,
			ShaderStage::Geometry => ShaderVisibility::Geometry,
			ShaderStage::Hull => ShaderVisibility::Hull,
			ShaderStage::Domain => ShaderVisibility::Domain,
			ShaderStage::Compute => ShaderVisibility::All,
		}
	}
}

bitflags! {
	/// A set of [`ShaderStage`]s, used to accumulate the visibility of static samplers shared between stages.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct ShaderStages: u32 {
		const VERTEX = 1 << 0;
		const PIXEL = 1 << 1;
		const GEOMETRY = 1 << 2;
		const HULL = 1 << 3;
		const DOMAIN = 1 << 4;
		const COMPUTE = 1 << 5;
	}
}

/// Which stages may access a root parameter or static sampler. Mirrors `D3D12_SHADER_VISIBILITY`, which can only
/// express a single stage or all of them.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderVisibility {
	All = 0,
	Vertex = 1,
	Hull = 2,
	Domain = 3,
	Geometry = 4,
	Pixel = 5,
}

impl ShaderVisibility {
	/// Narrowest visibility covering all `stages`. Anything but exactly one graphics stage maps to
	/// [`ShaderVisibility::All`].
	pub fn from_stages(stages: ShaderStages) -> Self {
		if stages == ShaderStages::VERTEX {
			ShaderVisibility::Vertex
		} else if stages == ShaderStages::PIXEL {
			ShaderVisibility::Pixel
		} else if stages == ShaderStages::GEOMETRY {
			ShaderVisibility::Geometry
		} else if stages == ShaderStages::HULL {
			ShaderVisibility::Hull
		} else if stages == ShaderStages::DOMAIN {
			ShaderVisibility::Domain
		} else {
			ShaderVisibility::All
		}
	}
}
