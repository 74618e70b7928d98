use std::ops::{Index, IndexMut};

/// Number of distinct [`ShaderVariableType`]s.
pub const VARIABLE_TYPE_COUNT: usize = 3;

/// How often the resource bound to a shader variable is expected to change.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ShaderVariableType {
	/// Bound once when the pipeline is created and never changed afterward.
	#[default]
	Static,
	/// Bound per resource binding instance, may change occasionally but not between draws using the same binding.
	Mutable,
	/// May change before every draw or dispatch without rebinding anything else.
	Dynamic,
}

impl ShaderVariableType {
	pub const VALUES: [ShaderVariableType; VARIABLE_TYPE_COUNT] = [
		ShaderVariableType::Static,
		ShaderVariableType::Mutable,
		ShaderVariableType::Dynamic,
	];

	#[inline]
	pub fn to_usize(self) -> usize {
		self as usize
	}
}

/// An `[T; VARIABLE_TYPE_COUNT]` that can be indexed by [`ShaderVariableType`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct VariableTypeArray<T>([T; VARIABLE_TYPE_COUNT]);

impl<T> VariableTypeArray<T> {
	#[inline]
	pub fn new(mut f: impl FnMut(ShaderVariableType) -> T) -> Self {
		Self(ShaderVariableType::VALUES.map(&mut f))
	}

	pub fn iter(&self) -> impl Iterator<Item = (ShaderVariableType, &T)> {
		ShaderVariableType::VALUES.into_iter().zip(self.0.iter())
	}
}

impl<T> Index<ShaderVariableType> for VariableTypeArray<T> {
	type Output = T;

	#[inline]
	fn index(&self, index: ShaderVariableType) -> &Self::Output {
		self.0.index(index.to_usize())
	}
}

impl<T> IndexMut<ShaderVariableType> for VariableTypeArray<T> {
	#[inline]
	fn index_mut(&mut self, index: ShaderVariableType) -> &mut Self::Output {
		self.0.index_mut(index.to_usize())
	}
}
