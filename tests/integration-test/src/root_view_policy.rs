#![cfg(test)]

use crate::binding;
use root_binding::cache::{ResourceState, TrackedResource};
use root_binding::layout::{
	DescriptorRangeType, ShaderResourceAttribs, ShaderResourceCategory, ShaderResources, ShaderStage,
	ShaderVariableType,
};
use root_binding::platform::null::{NullCommand, NullCommandContext, NullPlatform, NullResource};
use root_binding::platform::PipelineBindPoint;
use root_binding::root_params::RootViewKind;
use root_binding::signature::{
	AlwaysDescriptorTable, RootParameterDescKind, RootSignatureBuilder, RootSignatureCreateInfo,
};

fn particles() -> ShaderResources {
	use ShaderResourceCategory::*;
	use ShaderVariableType::*;
	ShaderResources::new("particles.cs", ShaderStage::Compute)
		.with_resource(ShaderResourceAttribs::new("Params", ConstantBuffer, 0, 1, Static))
		.with_resource(ShaderResourceAttribs::new("Emitters", BufferSrv, 0, 1, Mutable))
		.with_resource(ShaderResourceAttribs::new("Particles", BufferUav, 0, 1, Mutable))
		.with_resource(ShaderResourceAttribs::new("Noise", TextureSrv, 1, 1, Static))
}

#[test]
fn test_buffers_as_root_views() -> anyhow::Result<()> {
	let platform = NullPlatform::new();
	let mut builder = RootSignatureBuilder::new(RootSignatureCreateInfo {
		root_view_policy: Box::new(|_stage: ShaderStage, res: &ShaderResourceAttribs| {
			if !res.category.is_buffer() || res.bind_count != 1 {
				return None;
			}
			Some(match res.range_type() {
				DescriptorRangeType::Cbv => RootViewKind::Cbv,
				DescriptorRangeType::Srv => RootViewKind::Srv,
				_ => RootViewKind::Uav,
			})
		}),
		..RootSignatureCreateInfo::default()
	});
	let bindings = builder.allocate_shader_resources(&[particles()]);
	let sig = builder.finalize(&platform)?;

	assert_eq!(sig.params().num_root_views(), 3);
	assert_eq!(sig.params().num_root_tables(), 1);
	// 3 root views and 1 table
	assert_eq!(sig.desc().root_dword_cost(), 3 * 2 + 1);

	let mut cache = sig.init_resource_cache(&platform)?;
	let emitters = TrackedResource::new(NullResource::new(0x1000), "emitters", ResourceState::COPY_DEST);
	let particles = TrackedResource::new(NullResource::new(0x2000), "particles", ResourceState::COMMON);
	for (name, object) in [("Emitters", emitters), ("Particles", particles)] {
		let b = binding(&bindings, name);
		cache.set_resource(b.root_index, b.offset, None, Some(object));
	}

	let mut ctx = NullCommandContext::new();
	sig.commit_root_views(&cache, &mut ctx, PipelineBindPoint::Compute, 0);
	let views = ctx
		.commands
		.iter()
		.filter_map(|cmd| match cmd {
			NullCommand::SetRootView {
				bind_point,
				root_index,
				kind,
				address,
			} => Some((*bind_point, *root_index, *kind, *address)),
			_ => None,
		})
		.collect::<Vec<_>>();
	// unbound Params is skipped
	assert_eq!(
		views,
		[
			(PipelineBindPoint::Compute, binding(&bindings, "Emitters").root_index, RootViewKind::Srv, 0x1000),
			(PipelineBindPoint::Compute, binding(&bindings, "Particles").root_index, RootViewKind::Uav, 0x2000),
		]
	);
	assert_eq!(ctx.barriers().count(), 2);
	Ok(())
}

#[test]
fn test_always_descriptor_table() -> anyhow::Result<()> {
	let platform = NullPlatform::new();
	let mut builder = RootSignatureBuilder::new(RootSignatureCreateInfo {
		root_view_policy: Box::new(AlwaysDescriptorTable),
		..RootSignatureCreateInfo::default()
	});
	let bindings = builder.allocate_shader_resources(&[particles()]);
	let sig = builder.finalize(&platform)?;

	assert_eq!(sig.params().num_root_views(), 0);
	// one static and one mutable table for the single compute stage
	assert_eq!(sig.params().num_root_tables(), 2);
	assert_eq!(binding(&bindings, "Params").root_index, binding(&bindings, "Noise").root_index);
	assert_eq!(binding(&bindings, "Noise").offset, 1);
	assert_eq!(binding(&bindings, "Particles").offset, 1);
	let ranges = sig
		.desc()
		.parameters
		.iter()
		.map(|param| match &param.kind {
			RootParameterDescKind::Table { ranges } => ranges.len(),
			_ => 0,
		})
		.collect::<Vec<_>>();
	assert_eq!(ranges, [2, 2]);
	Ok(())
}
