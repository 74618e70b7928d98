#![cfg(test)]

use root_binding::cache::CpuDescriptorHandle;
use root_binding::layout::{
	ShaderResourceAttribs, ShaderResourceCategory, ShaderResources, ShaderStage, ShaderVariableType,
};
use root_binding::platform::null::{NullCommand, NullCommandContext, NullPlatform};
use root_binding::platform::PipelineBindPoint;
use root_binding::signature::RootSignatureBuilder;
use std::collections::HashSet;

const THREADS: usize = 4;
const COMMITS: usize = 8;

#[test]
fn test_shared_signature_per_thread_caches() -> anyhow::Result<()> {
	use ShaderResourceCategory::*;
	use ShaderVariableType::*;
	let platform = NullPlatform::new();
	let mut builder = RootSignatureBuilder::default();
	let shader = ShaderResources::new("cull.cs", ShaderStage::Compute)
		.with_resource(ShaderResourceAttribs::new("Draws", BufferSrv, 0, 2, Mutable))
		.with_resource(ShaderResourceAttribs::new("Visible", BufferUav, 0, 1, Dynamic));
	let bindings = builder.allocate_shader_resources(&[shader]);
	let sig = builder.finalize(&platform)?;

	let dynamic_tables = std::thread::scope(|scope| {
		let threads = (0..THREADS)
			.map(|thread| {
				let (sig, platform, bindings) = (&sig, &platform, &bindings);
				scope.spawn(move || -> anyhow::Result<Vec<u64>> {
					let mut cache = sig.init_resource_cache(platform)?;
					for b in bindings {
						let count = if b.name == "Draws" { 2 } else { 1 };
						for i in 0..count {
							let descriptor = CpuDescriptorHandle(thread * 0x100 + b.root_index as usize * 0x10 + i);
							cache.set_resource(b.root_index, b.offset + i as u32, Some(descriptor), None);
						}
					}
					let mut ctx = NullCommandContext::new();
					for _ in 0..COMMITS {
						sig.commit_descriptor_handles(platform, &mut cache, &mut ctx, PipelineBindPoint::Compute)?;
					}
					assert_eq!(cache.dirty_count(), 0);
					Ok(ctx
						.commands
						.iter()
						.filter_map(|cmd| match cmd {
							NullCommand::SetDescriptorTable {
								root_index: 1,
								base_descriptor,
								..
							} => Some(base_descriptor.0),
							_ => None,
						})
						.collect())
				})
			})
			.collect::<Vec<_>>();
		threads
			.into_iter()
			.map(|t| t.join().expect("commit thread panicked"))
			.collect::<anyhow::Result<Vec<_>>>()
	})?;

	// every thread copies its 2 mutable slots once and its dynamic slot on every commit
	assert_eq!(platform.copies().len(), THREADS * (2 + COMMITS));
	for tables in &dynamic_tables {
		assert_eq!(tables.len(), COMMITS);
		assert_eq!(tables.iter().collect::<HashSet<_>>().len(), COMMITS);
	}
	Ok(())
}
