use crate::layout::{DescriptorRangeType, ShaderVariableType, ShaderVisibility};

/// The kind of descriptor bound directly as a root argument, without going through a descriptor table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RootViewKind {
	Cbv,
	Srv,
	Uav,
}

impl RootViewKind {
	#[inline]
	pub fn range_type(self) -> DescriptorRangeType {
		match self {
			RootViewKind::Cbv => DescriptorRangeType::Cbv,
			RootViewKind::Srv => DescriptorRangeType::Srv,
			RootViewKind::Uav => DescriptorRangeType::Uav,
		}
	}
}

/// Where a descriptor range starts within its table.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RangeOffset {
	/// Directly after the end of the furthest range set so far, see `D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND`.
	#[default]
	Append,
	Explicit(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DescriptorRange {
	pub range_type: DescriptorRangeType,
	pub base_register: u32,
	pub register_space: u32,
	pub count: u32,
	pub offset_from_table_start: u32,
}

impl DescriptorRange {
	/// Offset one past the last descriptor of this range.
	#[inline]
	pub fn end(&self) -> u32 {
		self.offset_from_table_start + self.count
	}
}

/// The ranges of a descriptor table, as a span into the range arena of the owning [`RootParamsManager`].
///
/// [`RootParamsManager`]: crate::root_params::RootParamsManager
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct RangeSpan {
	pub start: u32,
	pub len: u32,
}

impl RangeSpan {
	#[inline]
	pub fn end(&self) -> u32 {
		self.start + self.len
	}

	#[inline]
	pub fn to_range(self) -> std::ops::Range<usize> {
		self.start as usize..self.end() as usize
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RootParameterKind {
	View {
		kind: RootViewKind,
		register: u32,
		space: u32,
	},
	Constants {
		register: u32,
		space: u32,
		num_values: u32,
	},
	Table {
		ranges: RangeSpan,
		table_size: u32,
	},
}

/// One entry of a root signature. Everything but the ranges of a descriptor table is fixed at construction.
///
/// Copying a root view or constants is a plain copy. A copied descriptor table still refers to the same ranges of
/// the arena it was created in, use [`RootParameter::relocated`] to move it to a different span.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RootParameter {
	kind: RootParameterKind,
	root_index: u32,
	visibility: ShaderVisibility,
	variable_type: ShaderVariableType,
}

impl RootParameter {
	pub fn new_view(
		kind: RootViewKind,
		root_index: u32,
		register: u32,
		space: u32,
		visibility: ShaderVisibility,
		variable_type: ShaderVariableType,
	) -> Self {
		Self {
			kind: RootParameterKind::View { kind, register, space },
			root_index,
			visibility,
			variable_type,
		}
	}

	pub fn new_constants(
		root_index: u32,
		register: u32,
		space: u32,
		num_values: u32,
		visibility: ShaderVisibility,
		variable_type: ShaderVariableType,
	) -> Self {
		Self {
			kind: RootParameterKind::Constants {
				register,
				space,
				num_values,
			},
			root_index,
			visibility,
			variable_type,
		}
	}

	pub fn new_table(
		root_index: u32,
		ranges: RangeSpan,
		visibility: ShaderVisibility,
		variable_type: ShaderVariableType,
	) -> Self {
		Self {
			kind: RootParameterKind::Table { ranges, table_size: 0 },
			root_index,
			visibility,
			variable_type,
		}
	}

	/// A copy of this descriptor table pointing at a different, at least as large, span of the range arena. Already
	/// set ranges must have been copied into the new span by the caller, the table size carries over.
	pub fn relocated(&self, new_ranges: RangeSpan) -> Self {
		let table_size = match self.kind {
			RootParameterKind::Table { ranges, table_size } => {
				debug_assert!(new_ranges.len >= ranges.len, "New table must be larger than source one");
				table_size
			}
			_ => {
				debug_assert!(false, "Root parameter is expected to be a descriptor table");
				0
			}
		};
		Self {
			kind: RootParameterKind::Table {
				ranges: new_ranges,
				table_size,
			},
			..*self
		}
	}

	#[inline]
	pub fn kind(&self) -> &RootParameterKind {
		&self.kind
	}

	#[inline]
	pub fn root_index(&self) -> u32 {
		self.root_index
	}

	#[inline]
	pub fn visibility(&self) -> ShaderVisibility {
		self.visibility
	}

	#[inline]
	pub fn variable_type(&self) -> ShaderVariableType {
		self.variable_type
	}

	#[inline]
	pub fn is_table(&self) -> bool {
		matches!(self.kind, RootParameterKind::Table { .. })
	}

	/// Number of descriptors spanned by this descriptor table.
	#[inline]
	pub fn descriptor_table_size(&self) -> u32 {
		match self.kind {
			RootParameterKind::Table { table_size, .. } => table_size,
			_ => {
				debug_assert!(false, "Incorrect parameter type: descriptor table is expected");
				0
			}
		}
	}

	#[inline]
	pub fn range_span(&self) -> RangeSpan {
		match self.kind {
			RootParameterKind::Table { ranges, .. } => ranges,
			_ => {
				debug_assert!(false, "Incorrect parameter type: descriptor table is expected");
				RangeSpan::default()
			}
		}
	}

	/// Fills the range at `range_index` within `ranges`, the slice of the arena covered by this table. Every range must
	/// be set exactly once. Returns the resolved offset from the table start.
	pub(crate) fn set_descriptor_range(
		&mut self,
		ranges: &mut [Option<DescriptorRange>],
		range_index: u32,
		range_type: DescriptorRangeType,
		register: u32,
		count: u32,
		space: u32,
		offset: RangeOffset,
	) -> u32 {
		let RootParameterKind::Table { ranges: span, table_size } = &mut self.kind else {
			debug_assert!(false, "Incorrect parameter type: descriptor table is expected");
			return 0;
		};
		debug_assert_eq!(span.len as usize, ranges.len(), "range slice does not match table span");
		debug_assert!(range_index < span.len, "Invalid descriptor range index");
		let range = &mut ranges[range_index as usize];
		debug_assert!(
			range.is_none(),
			"Descriptor range has already been initialized, table size may be updated incorrectly"
		);

		let offset_from_table_start = match offset {
			RangeOffset::Append => *table_size,
			RangeOffset::Explicit(offset) => offset,
		};
		*range = Some(DescriptorRange {
			range_type,
			base_register: register,
			register_space: space,
			count,
			offset_from_table_start,
		});
		*table_size = (*table_size).max(offset_from_table_start + count);
		offset_from_table_start
	}
}
