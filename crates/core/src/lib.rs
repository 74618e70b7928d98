//! Root signature construction and shader resource binding for D3D12-style backends.
//!
//! A [`RootSignatureBuilder`] assigns every shader resource a root index, either as an inline root view, as inline
//! constants or as a range inside a descriptor table, grouped per shader stage and [`ShaderVariableType`]. After
//! [`RootSignatureBuilder::finalize`] the resulting [`RootSignature`] is immutable and may be shared between recording
//! threads, each of which commits its own [`ShaderResourceCache`] into its own command context.
//!
//! # Safety
//! Contract violations such as querying the table size of a root view, initializing a descriptor range twice or
//! indexing out of bounds are only checked by debug assertions. Release builds trust the caller.
//!
//! [`RootSignatureBuilder`]: signature::RootSignatureBuilder
//! [`RootSignatureBuilder::finalize`]: signature::RootSignatureBuilder::finalize
//! [`RootSignature`]: signature::RootSignature
//! [`ShaderVariableType`]: layout::ShaderVariableType
//! [`ShaderResourceCache`]: cache::ShaderResourceCache

pub mod cache;
pub mod layout;
pub mod platform;
pub mod root_params;
pub mod signature;
