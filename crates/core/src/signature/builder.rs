use crate::layout::{
	DescriptorRangeType, ShaderResourceAttribs, ShaderResources, ShaderStage, ShaderVariableType, VariableTypeArray,
	SHADER_STAGE_COUNT, VARIABLE_TYPE_COUNT,
};
use crate::platform::RootSignaturePlatform;
use crate::root_params::{RangeOffset, RootParameterKind, RootParamsManager};
use crate::signature::{
	RootParameterDesc, RootParameterDescKind, RootSignature, RootSignatureDesc, RootSignatureError, RootSignatureFlags,
	RootViewPolicy, SingleConstantBufferAsRootView, StaticSamplerAttribs,
};
use log::{debug, trace, warn};

/// The D3D12 root argument limit, in DWORDs.
pub const MAX_ROOT_DWORDS: u32 = 64;

/// Table index per [`ShaderVariableType`] and [`ShaderStage`], `None` while no table exists for that bucket.
pub(crate) type RootTableMap = [[Option<u32>; SHADER_STAGE_COUNT]; VARIABLE_TYPE_COUNT];

pub struct RootSignatureCreateInfo {
	pub flags: RootSignatureFlags,
	/// Layouts exceeding this root argument budget fail [`RootSignatureBuilder::finalize`].
	pub max_root_dwords: u32,
	pub root_view_policy: Box<dyn RootViewPolicy>,
}

impl Default for RootSignatureCreateInfo {
	fn default() -> Self {
		Self {
			flags: RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
			max_root_dwords: MAX_ROOT_DWORDS,
			root_view_policy: Box::new(SingleConstantBufferAsRootView),
		}
	}
}

/// Where a resource ended up: the root parameter and, for descriptor tables, the offset of its first descriptor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResourceSlot {
	pub root_index: u32,
	pub offset_from_table_start: u32,
}

/// A [`ResourceSlot`] assigned to a named shader resource by [`RootSignatureBuilder::allocate_shader_resources`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResourceBinding {
	pub stage: ShaderStage,
	pub name: String,
	pub root_index: u32,
	pub offset: u32,
	pub range_type: DescriptorRangeType,
}

/// Accumulates root parameters and static samplers until [`Self::finalize`] creates the native root signature.
///
/// Root indices are handed out in allocation order, so identical sequences of allocations always produce identical
/// root signatures.
pub struct RootSignatureBuilder {
	pub(crate) info: RootSignatureCreateInfo,
	pub(crate) params: RootParamsManager,
	pub(crate) static_samplers: Vec<StaticSamplerAttribs>,
	pub(crate) srv_cbv_uav_tables: RootTableMap,
	pub(crate) sampler_tables: RootTableMap,
	pub(crate) total_srv_cbv_uav_slots: VariableTypeArray<u32>,
	pub(crate) total_sampler_slots: VariableTypeArray<u32>,
}

impl Default for RootSignatureBuilder {
	fn default() -> Self {
		Self::new(RootSignatureCreateInfo::default())
	}
}

impl RootSignatureBuilder {
	pub fn new(info: RootSignatureCreateInfo) -> Self {
		Self {
			info,
			params: RootParamsManager::new(),
			static_samplers: Vec::new(),
			srv_cbv_uav_tables: [[None; SHADER_STAGE_COUNT]; VARIABLE_TYPE_COUNT],
			sampler_tables: [[None; SHADER_STAGE_COUNT]; VARIABLE_TYPE_COUNT],
			total_srv_cbv_uav_slots: VariableTypeArray::default(),
			total_sampler_slots: VariableTypeArray::default(),
		}
	}

	/// Collects the samplers every shader declares static. A sampler at the same register and space in multiple
	/// stages results in a single static sampler visible to all of them.
	pub fn allocate_static_samplers(&mut self, shaders: &[ShaderResources]) {
		for shader in shaders {
			for sampler in shader.samplers() {
				let Some(static_sampler) = shader.static_sampler(&sampler.name) else {
					continue;
				};
				let existing = self
					.static_samplers
					.iter()
					.position(|s| s.shader_register == sampler.bind_point && s.register_space == sampler.space);
				let index = match existing {
					Some(index) => {
						let existing = &mut self.static_samplers[index];
						if existing.desc != static_sampler.desc {
							warn!(
								"Static sampler '{}' of shader '{}' differs from '{}' at register s{} space{}, keeping the first one",
								sampler.name, shader.name, existing.sampler_name, sampler.bind_point, sampler.space
							);
						}
						existing.stages |= shader.stage.to_stages();
						existing.array_size = existing.array_size.max(sampler.bind_count);
						index
					}
					None => {
						self.static_samplers.push(StaticSamplerAttribs {
							sampler_name: sampler.name.clone(),
							desc: static_sampler.desc,
							shader_register: sampler.bind_point,
							register_space: sampler.space,
							array_size: sampler.bind_count,
							stages: shader.stage.to_stages(),
						});
						self.static_samplers.len() - 1
					}
				};

				let current = &self.static_samplers[index];
				let overlapping = self
					.static_samplers
					.iter()
					.enumerate()
					.find(|&(i, other)| i != index && other.overlaps(current));
				if let Some((_, other)) = overlapping {
					warn!(
						"Static sampler '{}' of shader '{}' at s{}..s{} space{} overlaps '{}' at s{}..s{}",
						sampler.name,
						shader.name,
						current.shader_register,
						current.register_end(),
						current.register_space,
						other.sampler_name,
						other.shader_register,
						other.register_end()
					);
				}
			}

			for declared in &shader.static_samplers {
				if !shader.samplers().any(|s| s.name == declared.sampler_name) {
					warn!(
						"Static sampler '{}' is declared for shader '{}' which has no sampler of that name",
						declared.sampler_name, shader.name
					);
				}
			}
		}
	}

	/// Assigns `resource` of `stage` either a root view or a range in the descriptor table of its bucket.
	pub fn allocate_resource_slot(
		&mut self,
		stage: ShaderStage,
		resource: &ShaderResourceAttribs,
		range_type: DescriptorRangeType,
	) -> ResourceSlot {
		let variable_type = resource.variable_type;
		let root_index = self.params.num_root_parameters();

		if range_type != DescriptorRangeType::Sampler {
			if let Some(kind) = self.info.root_view_policy.root_view_kind(stage, resource) {
				debug_assert_eq!(
					kind.range_type(),
					range_type,
					"Root view kind does not match the range type of '{}'",
					resource.name
				);
				self.params.add_root_view(
					kind,
					root_index,
					resource.bind_point,
					resource.space,
					stage.visibility(),
					variable_type,
				);
				trace!("{:?} '{}': root view {:?} at root index {}", stage, resource.name, kind, root_index);
				return ResourceSlot {
					root_index,
					offset_from_table_start: 0,
				};
			}
		}

		let (tables, total_slots) = if range_type == DescriptorRangeType::Sampler {
			(&mut self.sampler_tables, &mut self.total_sampler_slots)
		} else {
			(&mut self.srv_cbv_uav_tables, &mut self.total_srv_cbv_uav_slots)
		};
		let entry = &mut tables[variable_type.to_usize()][stage.to_usize()];
		let table_index = match *entry {
			Some(table_index) => {
				self.params.add_descriptor_ranges(table_index, 1);
				table_index
			}
			None => {
				let table_index = self
					.params
					.add_root_table(root_index, stage.visibility(), variable_type, 1);
				*entry = Some(table_index);
				table_index
			}
		};

		let mut table = self.params.root_table_mut(table_index);
		let range_index = table.num_ranges() - 1;
		let offset_from_table_start = table.set_descriptor_range(
			range_index,
			range_type,
			resource.bind_point,
			resource.bind_count,
			resource.space,
			RangeOffset::Append,
		);
		total_slots[variable_type] += resource.bind_count;

		let slot = ResourceSlot {
			root_index: table.root_index(),
			offset_from_table_start,
		};
		trace!(
			"{:?} '{}': {:?} table at root index {}, offset {}",
			stage,
			resource.name,
			variable_type,
			slot.root_index,
			slot.offset_from_table_start
		);
		slot
	}

	/// Adds `num_values` inline 32-bit constants at `register` and returns their root index.
	pub fn allocate_root_constants(
		&mut self,
		stage: ShaderStage,
		register: u32,
		space: u32,
		num_values: u32,
		variable_type: ShaderVariableType,
	) -> u32 {
		let root_index = self.params.num_root_parameters();
		self.params
			.add_root_constants(root_index, register, space, num_values, stage.visibility(), variable_type);
		root_index
	}

	/// Allocates static samplers and a slot for every other resource of `shaders`, in declaration order.
	pub fn allocate_shader_resources(&mut self, shaders: &[ShaderResources]) -> Vec<ResourceBinding> {
		self.allocate_static_samplers(shaders);
		let mut bindings = Vec::new();
		for shader in shaders {
			for resource in &shader.resources {
				if shader.is_static_sampler(resource) {
					continue;
				}
				let range_type = resource.range_type();
				let slot = self.allocate_resource_slot(shader.stage, resource, range_type);
				bindings.push(ResourceBinding {
					stage: shader.stage,
					name: resource.name.clone(),
					root_index: slot.root_index,
					offset: slot.offset_from_table_start,
					range_type,
				});
			}
		}
		bindings
	}

	#[inline]
	pub fn params(&self) -> &RootParamsManager {
		&self.params
	}

	#[inline]
	pub fn static_samplers(&self) -> &[StaticSamplerAttribs] {
		&self.static_samplers
	}

	#[inline]
	pub fn total_srv_cbv_uav_slots(&self, variable_type: ShaderVariableType) -> u32 {
		self.total_srv_cbv_uav_slots[variable_type]
	}

	#[inline]
	pub fn total_sampler_slots(&self, variable_type: ShaderVariableType) -> u32 {
		self.total_sampler_slots[variable_type]
	}

	/// The platform independent description of everything allocated so far.
	pub fn desc(&self) -> RootSignatureDesc {
		self.params.debug_verify();
		let mut parameters = vec![None; self.params.num_root_parameters() as usize];
		for table in self.params.root_tables() {
			parameters[table.root_index() as usize] = Some(RootParameterDesc {
				kind: RootParameterDescKind::Table {
					ranges: table.ranges().copied().collect(),
				},
				visibility: table.visibility(),
				variable_type: table.variable_type(),
			});
		}
		for view in self.params.root_views() {
			let kind = match *view.kind() {
				RootParameterKind::View { kind, register, space } => {
					RootParameterDescKind::View { kind, register, space }
				}
				RootParameterKind::Constants {
					register,
					space,
					num_values,
				} => RootParameterDescKind::Constants {
					register,
					space,
					num_values,
				},
				RootParameterKind::Table { .. } => {
					debug_assert!(false, "Descriptor table in the root view list");
					continue;
				}
			};
			parameters[view.root_index() as usize] = Some(RootParameterDesc {
				kind,
				visibility: view.visibility(),
				variable_type: view.variable_type(),
			});
		}

		RootSignatureDesc {
			parameters: parameters.into_iter().flatten().collect(),
			static_samplers: self.static_samplers.iter().flat_map(|s| s.bindings()).collect(),
			flags: self.info.flags,
		}
	}

	/// Creates the native root signature. Fails if the layout exceeds the root argument budget or the platform
	/// rejects it, in which case the layout has to be reduced.
	pub fn finalize<P: RootSignaturePlatform>(self, platform: &P) -> Result<RootSignature<P>, RootSignatureError<P>> {
		let desc = self.desc();
		let dwords = desc.root_dword_cost();
		if dwords > self.info.max_root_dwords {
			return Err(RootSignatureError::RootArgumentBudgetExceeded {
				dwords,
				max: self.info.max_root_dwords,
			});
		}

		// Safety: desc only references root indices and ranges allocated by this builder
		let native = unsafe { platform.create_root_signature(&desc) }.map_err(RootSignatureError::Platform)?;
		debug!(
			"Created root signature with {} tables, {} root views and constants, {} static samplers ({} DWORDs)",
			self.params.num_root_tables(),
			self.params.num_root_views(),
			desc.static_samplers.len(),
			dwords
		);
		Ok(RootSignature::new(native, desc, self))
	}
}
