use crate::layout::{SamplerDesc, ShaderStages, ShaderVisibility};

/// A static sampler declared by one or more shader stages, baked into the root signature.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticSamplerAttribs {
	pub sampler_name: String,
	pub desc: SamplerDesc,
	pub shader_register: u32,
	pub register_space: u32,
	pub array_size: u32,
	/// all stages declaring this sampler
	pub stages: ShaderStages,
}

impl StaticSamplerAttribs {
	#[inline]
	pub fn visibility(&self) -> ShaderVisibility {
		ShaderVisibility::from_stages(self.stages)
	}

	/// Register one past the last array element.
	#[inline]
	pub fn register_end(&self) -> u32 {
		self.shader_register + self.array_size
	}

	/// Whether both samplers claim at least one common register in the same space.
	pub fn overlaps(&self, other: &Self) -> bool {
		self.register_space == other.register_space
			&& self.shader_register < other.register_end()
			&& other.shader_register < self.register_end()
	}

	/// One native static sampler per array element, at consecutive registers.
	pub fn bindings(&self) -> impl Iterator<Item = StaticSamplerBinding> + '_ {
		let visibility = self.visibility();
		(0..self.array_size).map(move |i| StaticSamplerBinding {
			desc: self.desc,
			shader_register: self.shader_register + i,
			register_space: self.register_space,
			visibility,
		})
	}
}

/// A single native static sampler, see `D3D12_STATIC_SAMPLER_DESC`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StaticSamplerBinding {
	pub desc: SamplerDesc,
	pub shader_register: u32,
	pub register_space: u32,
	pub visibility: ShaderVisibility,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_array_expansion() {
		let attribs = StaticSamplerAttribs {
			sampler_name: "Shadow".into(),
			desc: SamplerDesc::default(),
			shader_register: 2,
			register_space: 1,
			array_size: 3,
			stages: ShaderStages::PIXEL,
		};
		let bindings = attribs.bindings().collect::<Vec<_>>();
		assert_eq!(bindings.len(), 3);
		assert_eq!(
			bindings.iter().map(|b| b.shader_register).collect::<Vec<_>>(),
			[2, 3, 4]
		);
		assert!(bindings
			.iter()
			.all(|b| b.register_space == 1 && b.visibility == ShaderVisibility::Pixel));
	}

	#[test]
	fn test_shared_sampler_visible_to_all() {
		let attribs = StaticSamplerAttribs {
			sampler_name: "Linear".into(),
			desc: SamplerDesc::default(),
			shader_register: 0,
			register_space: 0,
			array_size: 1,
			stages: ShaderStages::VERTEX | ShaderStages::PIXEL,
		};
		assert_eq!(attribs.visibility(), ShaderVisibility::All);
	}

	#[test]
	fn test_overlapping_arrays() {
		let sampler = |shader_register, register_space, array_size| StaticSamplerAttribs {
			sampler_name: "Sampler".into(),
			desc: SamplerDesc::default(),
			shader_register,
			register_space,
			array_size,
			stages: ShaderStages::PIXEL,
		};
		assert!(sampler(0, 0, 4).overlaps(&sampler(2, 0, 1)));
		assert!(sampler(3, 0, 2).overlaps(&sampler(0, 0, 4)));
		assert!(!sampler(0, 0, 4).overlaps(&sampler(4, 0, 2)));
		assert!(!sampler(0, 0, 4).overlaps(&sampler(2, 1, 1)));
	}
}
