use crate::layout::{ShaderResourceAttribs, ShaderResourceCategory, ShaderStage};
use crate::root_params::RootViewKind;

/// Decides which resources are bound directly as root views instead of through a descriptor table.
///
/// A root view costs two DWORDs of the root argument budget, a descriptor table one, but saves the indirection
/// through the descriptor heap. Only buffers can be root views, as they are bound by GPU virtual address.
pub trait RootViewPolicy: Send + Sync {
	fn root_view_kind(&self, stage: ShaderStage, resource: &ShaderResourceAttribs) -> Option<RootViewKind>;
}

/// Binds every non-array constant buffer as a root CBV, everything else goes into descriptor tables.
#[derive(Copy, Clone, Debug, Default)]
pub struct SingleConstantBufferAsRootView;

impl RootViewPolicy for SingleConstantBufferAsRootView {
	fn root_view_kind(&self, _stage: ShaderStage, resource: &ShaderResourceAttribs) -> Option<RootViewKind> {
		(resource.category == ShaderResourceCategory::ConstantBuffer && resource.bind_count == 1)
			.then_some(RootViewKind::Cbv)
	}
}

/// Never creates root views.
#[derive(Copy, Clone, Debug, Default)]
pub struct AlwaysDescriptorTable;

impl RootViewPolicy for AlwaysDescriptorTable {
	fn root_view_kind(&self, _stage: ShaderStage, _resource: &ShaderResourceAttribs) -> Option<RootViewKind> {
		None
	}
}

impl<F> RootViewPolicy for F
where
	F: Fn(ShaderStage, &ShaderResourceAttribs) -> Option<RootViewKind> + Send + Sync,
{
	fn root_view_kind(&self, stage: ShaderStage, resource: &ShaderResourceAttribs) -> Option<RootViewKind> {
		self(stage, resource)
	}
}
