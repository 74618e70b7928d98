#![cfg(test)]

use crate::binding;
use root_binding::cache::{CpuDescriptorHandle, DescriptorHeapType, ResourceState, TrackedResource};
use root_binding::layout::{
	Filter, SamplerDesc, ShaderResourceAttribs, ShaderResourceCategory, ShaderResources, ShaderStage,
	ShaderVariableType, ShaderVisibility, StaticSamplerDesc,
};
use root_binding::platform::null::{NullCommand, NullCommandContext, NullPlatform, NullResource};
use root_binding::platform::PipelineBindPoint;
use root_binding::root_params::RootViewKind;
use root_binding::signature::{CommitStrategy, ResourceBinding, RootSignature, RootSignatureBuilder};
use std::sync::Arc;

fn shaders() -> Vec<ShaderResources> {
	use ShaderResourceCategory::*;
	use ShaderVariableType::*;
	let linear = SamplerDesc {
		mag_filter: Filter::Linear,
		min_filter: Filter::Linear,
		mipmap_mode: Filter::Linear,
		..SamplerDesc::default()
	};
	vec![
		ShaderResources::new("mesh.vs", ShaderStage::Vertex)
			.with_resource(ShaderResourceAttribs::new("Camera", ConstantBuffer, 0, 1, Static))
			.with_resource(ShaderResourceAttribs::new("Instances", BufferSrv, 0, 1, Mutable)),
		ShaderResources::new("mesh.ps", ShaderStage::Pixel)
			.with_resource(ShaderResourceAttribs::new("Albedo", TextureSrv, 0, 1, Static))
			.with_resource(ShaderResourceAttribs::new("Normal", TextureSrv, 1, 1, Static))
			.with_resource(ShaderResourceAttribs::new("Linear", Sampler, 0, 1, Static))
			.with_resource(ShaderResourceAttribs::new("Shadow", Sampler, 1, 1, Mutable))
			.with_resource(ShaderResourceAttribs::new("Lights", BufferUav, 0, 1, Dynamic))
			.with_resource(ShaderResourceAttribs::new("Material", ConstantBuffer, 1, 1, Mutable))
			.with_static_sampler(StaticSamplerDesc::new("Linear", linear)),
	]
}

fn build(platform: &NullPlatform) -> anyhow::Result<(RootSignature, Vec<ResourceBinding>)> {
	let mut builder = RootSignatureBuilder::default();
	let bindings = builder.allocate_shader_resources(&shaders());
	Ok((builder.finalize(platform)?, bindings))
}

fn table_roots(ctx: &NullCommandContext) -> Vec<u32> {
	ctx.commands
		.iter()
		.filter_map(|cmd| match cmd {
			NullCommand::SetDescriptorTable { root_index, .. } => Some(*root_index),
			_ => None,
		})
		.collect()
}

#[test]
fn test_layout() -> anyhow::Result<()> {
	let platform = NullPlatform::new();
	let (sig, bindings) = build(&platform)?;

	// the static sampler takes no slot
	assert_eq!(bindings.len(), 7);
	assert!(bindings.iter().all(|b| b.name != "Linear"));
	let root_indices = bindings.iter().map(|b| (b.name.as_str(), b.root_index)).collect::<Vec<_>>();
	assert_eq!(
		root_indices,
		[
			("Camera", 0),
			("Instances", 1),
			("Albedo", 2),
			("Normal", 2),
			("Shadow", 3),
			("Lights", 4),
			("Material", 5),
		]
	);
	assert_eq!(binding(&bindings, "Normal").offset, 1);

	assert_eq!(sig.num_root_parameters(), 6);
	assert_eq!(sig.params().num_root_views(), 2);
	assert_eq!(sig.desc().static_samplers.len(), 1);
	assert_eq!(sig.desc().static_samplers[0].shader_register, 0);
	assert_eq!(sig.desc().static_samplers[0].visibility, ShaderVisibility::Pixel);
	assert_eq!(sig.commit_strategy(), CommitStrategy::StaticMutableDynamic);
	assert_eq!(sig.persistent_descriptor_count(DescriptorHeapType::CbvSrvUav), 3);
	assert_eq!(sig.persistent_descriptor_count(DescriptorHeapType::Sampler), 1);
	assert_eq!(sig.dynamic_descriptor_count(DescriptorHeapType::CbvSrvUav), 1);
	assert_eq!(sig.dynamic_descriptor_count(DescriptorHeapType::Sampler), 0);
	assert_eq!(
		sig.srv_cbv_uav_table_root_index(ShaderVariableType::Static, ShaderStage::Pixel),
		Some(2)
	);
	assert_eq!(
		sig.sampler_table_root_index(ShaderVariableType::Mutable, ShaderStage::Pixel),
		Some(3)
	);
	// root views are not part of any table
	assert_eq!(sig.total_srv_cbv_uav_slots(ShaderVariableType::Static), 2);
	assert_eq!(sig.total_srv_cbv_uav_slots(ShaderVariableType::Mutable), 1);
	Ok(())
}

#[test]
fn test_bind_and_draw() -> anyhow::Result<()> {
	let platform = NullPlatform::new();
	let (sig, bindings) = build(&platform)?;
	let mut cache = sig.init_resource_cache(&platform)?;

	let camera = TrackedResource::new(NullResource::new(0x1_0000), "camera", ResourceState::COMMON);
	let instances = TrackedResource::new(NullResource::new(0x2_0000), "instances", ResourceState::COPY_DEST);
	let albedo = TrackedResource::new(NullResource::new(0x3_0000), "albedo", ResourceState::COMMON);
	let normal = TrackedResource::new(
		NullResource::new(0x4_0000),
		"normal",
		ResourceState::PIXEL_SHADER_RESOURCE | ResourceState::NON_PIXEL_SHADER_RESOURCE,
	);
	let lights = TrackedResource::new(NullResource::new(0x5_0000), "lights", ResourceState::UNORDERED_ACCESS);
	let material = TrackedResource::new_dynamic(NullResource::new_dynamic(0x6_0000, 0x100), "material");

	let views: [(&str, Option<usize>, Arc<TrackedResource>); 6] = [
		("Camera", None, camera.clone()),
		("Instances", Some(0x10), instances.clone()),
		("Albedo", Some(0x20), albedo.clone()),
		("Normal", Some(0x30), normal),
		("Lights", Some(0x40), lights),
		("Material", None, material),
	];
	for (name, descriptor, object) in views {
		let b = binding(&bindings, name);
		cache.set_resource(b.root_index, b.offset, descriptor.map(CpuDescriptorHandle), Some(object));
	}
	let shadow = binding(&bindings, "Shadow");
	cache.set_resource(shadow.root_index, shadow.offset, Some(CpuDescriptorHandle(0x50)), None);
	assert_eq!(cache.dirty_count(), 7);

	let mut ctx = NullCommandContext::new();
	sig.transition_and_commit_descriptor_handles(&platform, &mut cache, &mut ctx, PipelineBindPoint::Graphics)?;
	sig.commit_root_views(&cache, &mut ctx, PipelineBindPoint::Graphics, 3);

	let transitioned = ctx
		.barriers()
		.filter_map(|cmd| match cmd {
			NullCommand::Barrier { resource, .. } => Some(resource.gpu_address),
			_ => None,
		})
		.collect::<Vec<_>>();
	assert_eq!(transitioned, [0x2_0000, 0x3_0000, 0x1_0000]);
	assert_eq!(instances.state(), ResourceState::NON_PIXEL_SHADER_RESOURCE | ResourceState::PIXEL_SHADER_RESOURCE);
	assert_eq!(camera.state(), ResourceState::VERTEX_AND_CONSTANT_BUFFER);

	// 3 persistent CBV/SRV/UAV, 1 persistent sampler and 1 dynamic copy
	assert_eq!(platform.take_copies().len(), 5);
	assert_eq!(table_roots(&ctx), [1, 2, 3, 4]);
	let root_views = ctx
		.commands
		.iter()
		.filter_map(|cmd| match cmd {
			NullCommand::SetRootView {
				root_index,
				kind,
				address,
				..
			} => Some((*root_index, *kind, *address)),
			_ => None,
		})
		.collect::<Vec<_>>();
	assert_eq!(
		root_views,
		[(0, RootViewKind::Cbv, 0x1_0000), (5, RootViewKind::Cbv, 0x6_0000 + 3 * 0x100)]
	);

	// next draw: only the dynamic table is copied again
	ctx.clear();
	sig.transition_and_commit_descriptor_handles(&platform, &mut cache, &mut ctx, PipelineBindPoint::Graphics)?;
	let copies = platform.take_copies();
	assert_eq!(copies.len(), 1);
	assert_eq!(copies[0].src, CpuDescriptorHandle(0x40));
	assert_eq!(ctx.barriers().count(), 0);
	assert_eq!(table_roots(&ctx), [1, 2, 3, 4]);

	// rebinding a static texture copies just that slot
	let albedo_binding = binding(&bindings, "Albedo");
	cache.set_resource(albedo_binding.root_index, 0, Some(CpuDescriptorHandle(0x21)), Some(albedo));
	sig.commit_descriptor_handles(&platform, &mut cache, &mut ctx, PipelineBindPoint::Graphics)?;
	let srcs = platform.take_copies().into_iter().map(|c| c.src).collect::<Vec<_>>();
	assert_eq!(srcs, [CpuDescriptorHandle(0x21), CpuDescriptorHandle(0x40)]);
	Ok(())
}

#[test]
fn test_caches_get_distinct_descriptors() -> anyhow::Result<()> {
	let platform = NullPlatform::new();
	let (sig, _) = build(&platform)?;
	let a = sig.init_resource_cache(&platform)?;
	let b = sig.init_resource_cache(&platform)?;
	for heap in DescriptorHeapType::VALUES {
		let (a, b) = (a.heap_range(heap).copied(), b.heap_range(heap).copied());
		let (Some(a), Some(b)) = (a, b) else {
			panic!("missing {:?} descriptors", heap);
		};
		assert_eq!(a.count, b.count);
		assert_ne!(a.gpu_start, b.gpu_start);
	}
	Ok(())
}
