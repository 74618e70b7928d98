use crate::platform::RootSignaturePlatform;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

#[derive(Error)]
pub enum RootSignatureError<P: RootSignaturePlatform> {
	#[error("Root signature requires {dwords} DWORDs of root arguments, exceeding the limit of {max}")]
	RootArgumentBudgetExceeded { dwords: u32, max: u32 },
	#[error("Platform Error: {0}")]
	Platform(#[source] P::CreationError),
}

impl<P: RootSignaturePlatform> Debug for RootSignatureError<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self, f)
	}
}

#[derive(Error)]
pub enum CacheInitError<P: RootSignaturePlatform> {
	#[error("Failed to allocate {count} persistent {heap:?} descriptors: {source}")]
	DescriptorAllocation {
		heap: crate::cache::DescriptorHeapType,
		count: u32,
		#[source]
		source: P::AllocationError,
	},
}

impl<P: RootSignaturePlatform> Debug for CacheInitError<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self, f)
	}
}

#[derive(Error)]
pub enum CommitError<P: RootSignaturePlatform> {
	#[error("Failed to allocate {count} dynamic {heap:?} descriptors: {source}")]
	DynamicDescriptorAllocation {
		heap: crate::cache::DescriptorHeapType,
		count: u32,
		#[source]
		source: P::AllocationError,
	},
}

impl<P: RootSignaturePlatform> Debug for CommitError<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self, f)
	}
}
