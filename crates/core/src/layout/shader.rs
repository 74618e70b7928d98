use crate::layout::{ShaderResourceAttribs, ShaderResourceCategory, ShaderStage, StaticSamplerDesc};

/// Reflection data of a single shader: its stage, every resource it declares and which of its samplers are static.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderResources {
	pub name: String,
	pub stage: ShaderStage,
	pub resources: Vec<ShaderResourceAttribs>,
	pub static_samplers: Vec<StaticSamplerDesc>,
}

impl ShaderResources {
	pub fn new(name: impl Into<String>, stage: ShaderStage) -> Self {
		Self {
			name: name.into(),
			stage,
			resources: Vec::new(),
			static_samplers: Vec::new(),
		}
	}

	pub fn with_resource(mut self, resource: ShaderResourceAttribs) -> Self {
		self.resources.push(resource);
		self
	}

	pub fn with_static_sampler(mut self, static_sampler: StaticSamplerDesc) -> Self {
		self.static_samplers.push(static_sampler);
		self
	}

	pub fn samplers(&self) -> impl Iterator<Item = &ShaderResourceAttribs> {
		self.resources
			.iter()
			.filter(|res| res.category == ShaderResourceCategory::Sampler)
	}

	pub fn static_sampler(&self, sampler_name: &str) -> Option<&StaticSamplerDesc> {
		self.static_samplers.iter().find(|s| s.sampler_name == sampler_name)
	}

	/// Whether `resource` is a sampler that was declared static and thus has no slot in any descriptor table.
	pub fn is_static_sampler(&self, resource: &ShaderResourceAttribs) -> bool {
		resource.category == ShaderResourceCategory::Sampler && self.static_sampler(&resource.name).is_some()
	}
}
