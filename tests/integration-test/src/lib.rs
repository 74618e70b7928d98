pub mod graphics_pipeline;
pub mod multi_thread;
pub mod root_view_policy;

use root_binding::signature::ResourceBinding;

/// the binding of the resource called `name`, panics if the shaders declared no such resource
pub fn binding<'a>(bindings: &'a [ResourceBinding], name: &str) -> &'a ResourceBinding {
	bindings
		.iter()
		.find(|b| b.name == name)
		.unwrap_or_else(|| panic!("no binding named '{}'", name))
}
