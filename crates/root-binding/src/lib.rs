/// The primary platform is D3D12
#[cfg(all(windows, feature = "d3d12"))]
pub type P = root_binding_core::platform::d3d12::D3D12Platform;
/// The primary platform is the null platform
#[cfg(all(feature = "null", not(all(windows, feature = "d3d12"))))]
pub type P = root_binding_core::platform::null::NullPlatform;
#[cfg(not(any(all(windows, feature = "d3d12"), feature = "null")))]
compile_error!("Must select a primary platform by enabling a feature like \"d3d12\" on windows or \"null\"");

pub mod cache {
	pub type CachedResource = root_binding_core::cache::CachedResource<crate::P>;
	pub type CacheTable = root_binding_core::cache::CacheTable<crate::P>;
	pub type ShaderResourceCache = root_binding_core::cache::ShaderResourceCache<crate::P>;
	pub type TrackedResource = root_binding_core::cache::TrackedResource<crate::P>;

	pub use root_binding_core::cache::*;
}

pub mod layout {
	pub use root_binding_core::layout::*;
}

pub mod platform {
	pub use root_binding_core::platform::*;
}

pub mod root_params {
	pub use root_binding_core::root_params::*;
}

pub mod signature {
	pub type RootSignature = root_binding_core::signature::RootSignature<crate::P>;
	pub type RootSignatureError = root_binding_core::signature::RootSignatureError<crate::P>;
	pub type CacheInitError = root_binding_core::signature::CacheInitError<crate::P>;
	pub type CommitError = root_binding_core::signature::CommitError<crate::P>;

	pub use root_binding_core::signature::*;
}
