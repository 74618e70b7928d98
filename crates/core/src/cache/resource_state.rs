use crate::platform::{CommandContext, RootSignaturePlatform};
use bitflags::bitflags;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;

bitflags! {
	/// The state a GPU resource is in. Bits match `D3D12_RESOURCE_STATES`, so converting is a plain cast.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct ResourceState: u32 {
		const VERTEX_AND_CONSTANT_BUFFER = 0x1;
		const INDEX_BUFFER = 0x2;
		const RENDER_TARGET = 0x4;
		const UNORDERED_ACCESS = 0x8;
		const DEPTH_WRITE = 0x10;
		const DEPTH_READ = 0x20;
		const NON_PIXEL_SHADER_RESOURCE = 0x40;
		const PIXEL_SHADER_RESOURCE = 0x80;
		const STREAM_OUT = 0x100;
		const INDIRECT_ARGUMENT = 0x200;
		const COPY_DEST = 0x400;
		const COPY_SOURCE = 0x800;
		const RESOLVE_DEST = 0x1000;
		const RESOLVE_SOURCE = 0x2000;
		const GENERIC_READ = 0x1 | 0x2 | 0x40 | 0x80 | 0x200 | 0x800;
	}
}

impl ResourceState {
	/// `D3D12_RESOURCE_STATE_COMMON`, which has no bits set
	pub const COMMON: Self = Self::empty();
}

/// A GPU resource together with the state it was last transitioned to.
///
/// Dynamic resources live in upload memory, are suballocated per recording context and are never transitioned.
pub struct TrackedResource<P: RootSignaturePlatform> {
	pub platform: P::Resource,
	name: String,
	dynamic: bool,
	state: AtomicU32,
}

impl<P: RootSignaturePlatform> TrackedResource<P> {
	pub fn new(platform: P::Resource, name: impl Into<String>, initial_state: ResourceState) -> Arc<Self> {
		Arc::new(Self {
			platform,
			name: name.into(),
			dynamic: false,
			state: AtomicU32::new(initial_state.bits()),
		})
	}

	pub fn new_dynamic(platform: P::Resource, name: impl Into<String>) -> Arc<Self> {
		Arc::new(Self {
			platform,
			name: name.into(),
			dynamic: true,
			state: AtomicU32::new(ResourceState::GENERIC_READ.bits()),
		})
	}

	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn is_dynamic(&self) -> bool {
		self.dynamic
	}

	#[inline]
	pub fn state(&self) -> ResourceState {
		ResourceState::from_bits_retain(self.state.load(Relaxed))
	}

	/// Overrides the tracked state, e.g. after a transition recorded outside of this crate.
	#[inline]
	pub fn set_state(&self, state: ResourceState) {
		self.state.store(state.bits(), Relaxed);
	}

	/// Records a barrier into `ctx` if this resource is not yet in all of the `required` states. Returns whether a
	/// barrier was recorded.
	///
	/// The state is swapped atomically, so if several contexts transition the same resource concurrently only the
	/// first one records the barrier.
	pub fn transition_to(&self, ctx: &mut P::CommandContext, required: ResourceState) -> bool {
		if self.dynamic || required.is_empty() {
			return false;
		}
		let mut current = self.state.load(Relaxed);
		loop {
			if ResourceState::from_bits_retain(current).contains(required) {
				return false;
			}
			match self
				.state
				.compare_exchange_weak(current, required.bits(), Relaxed, Relaxed)
			{
				Ok(_) => break,
				Err(actual) => current = actual,
			}
		}
		// Safety: the resource is alive for as long as self is
		unsafe { ctx.resource_barrier(&self.platform, ResourceState::from_bits_retain(current), required) };
		true
	}
}

impl<P: RootSignaturePlatform> Debug for TrackedResource<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TrackedResource")
			.field("name", &self.name)
			.field("dynamic", &self.dynamic)
			.field("state", &self.state())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::platform::null::{NullCommand, NullCommandContext, NullPlatform, NullResource};

	#[test]
	fn test_transition_only_when_missing() {
		let mut ctx = NullCommandContext::new();
		let texture =
			TrackedResource::<NullPlatform>::new(NullResource::new(0x100), "texture", ResourceState::COPY_DEST);
		let srv = ResourceState::NON_PIXEL_SHADER_RESOURCE | ResourceState::PIXEL_SHADER_RESOURCE;
		assert!(texture.transition_to(&mut ctx, srv));
		assert_eq!(texture.state(), srv);
		assert!(!texture.transition_to(&mut ctx, srv));
		// a subset of the current state needs no barrier
		assert!(!texture.transition_to(&mut ctx, ResourceState::PIXEL_SHADER_RESOURCE));
		assert!(!texture.transition_to(&mut ctx, ResourceState::empty()));
		assert_eq!(
			ctx.commands,
			[NullCommand::Barrier {
				resource: NullResource::new(0x100),
				before: ResourceState::COPY_DEST,
				after: srv,
			}]
		);
	}

	#[test]
	fn test_dynamic_never_transitions() {
		let mut ctx = NullCommandContext::new();
		let upload = TrackedResource::<NullPlatform>::new_dynamic(NullResource::new_dynamic(0x200, 0x40), "upload");
		assert!(upload.is_dynamic());
		assert!(!upload.transition_to(&mut ctx, ResourceState::UNORDERED_ACCESS));
		assert_eq!(upload.state(), ResourceState::GENERIC_READ);
		assert!(ctx.commands.is_empty());
	}

	#[test]
	fn test_concurrent_transition_records_one_barrier() {
		const THREADS: usize = 8;
		let buffers = (0..64)
			.map(|i| TrackedResource::<NullPlatform>::new(NullResource::new(i * 0x100), "buffer", ResourceState::COMMON))
			.collect::<Vec<_>>();
		let barriers = std::thread::scope(|scope| {
			let threads = (0..THREADS)
				.map(|_| {
					scope.spawn(|| {
						let mut ctx = NullCommandContext::new();
						for buffer in &buffers {
							buffer.transition_to(&mut ctx, ResourceState::UNORDERED_ACCESS);
						}
						ctx.barriers().count()
					})
				})
				.collect::<Vec<_>>();
			threads.into_iter().map(|t| t.join().unwrap()).sum::<usize>()
		});
		assert_eq!(barriers, buffers.len());
		assert!(buffers.iter().all(|b| b.state() == ResourceState::UNORDERED_ACCESS));
	}
}
