//! Encoded parameter bindings and their native view.

use std::ffi::c_void;
use std::marker::PhantomData;

use crate::arena::PinnedBuffer;
use crate::sql_type::{CDataType, DynamicKind, ParamDirection, SqlDataType};

/// Indicator value marking a NULL element (`SQL_NULL_DATA`).
pub const SQL_NULL_DATA: isize = -1;

/// Type and layout metadata of one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Value family that produced the binding; selects the decoder.
    pub kind: DynamicKind,
    /// C-level type of the buffer.
    pub c_type: CDataType,
    /// SQL-level type of the parameter.
    pub sql_type: SqlDataType,
    /// Parameter direction.
    pub direction: ParamDirection,
    /// Declared column size (precision for decimals, row count for TVPs).
    pub param_size: u64,
    /// Declared decimal digits (scale).
    pub digits: i16,
    /// Width of one element in bytes.
    pub stride: usize,
    /// Buffer length reported to the driver, in bytes.
    pub buffer_len: usize,
    /// UTC offset of timestamp-with-offset values, in minutes.
    pub offset_minutes: i32,
    /// Whether this is a table-valued parameter.
    pub is_tvp: bool,
    /// Schema of a table-valued parameter's type.
    pub tvp_schema: Option<String>,
}

impl ParamDescriptor {
    /// Descriptor for an input parameter with no size information yet.
    #[must_use]
    pub fn new(kind: DynamicKind, c_type: CDataType, sql_type: SqlDataType) -> Self {
        Self {
            kind,
            c_type,
            sql_type,
            direction: ParamDirection::Input,
            param_size: 0,
            digits: 0,
            stride: 0,
            buffer_len: 0,
            offset_minutes: 0,
            is_tvp: false,
            tvp_schema: None,
        }
    }
}

/// One parameter (or result column) encoded into native storage.
///
/// The buffer and the indicator vector are allocated once, at their final
/// size, by the routine that builds the binding.
#[derive(Debug)]
pub struct Binding {
    descriptor: ParamDescriptor,
    buffer: PinnedBuffer,
    indicator: Box<[isize]>,
}

impl Binding {
    /// Assemble a binding from its parts.
    #[must_use]
    pub fn new(descriptor: ParamDescriptor, buffer: PinnedBuffer, indicator: Vec<isize>) -> Self {
        Self {
            descriptor,
            buffer,
            indicator: indicator.into_boxed_slice(),
        }
    }

    /// Replace the parameter direction.
    #[must_use]
    pub fn with_direction(mut self, direction: ParamDirection) -> Self {
        self.descriptor.direction = direction;
        self
    }

    /// Type and layout metadata.
    #[must_use]
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }

    pub(crate) fn descriptor_mut(&mut self) -> &mut ParamDescriptor {
        &mut self.descriptor
    }

    /// Backing storage.
    #[must_use]
    pub fn buffer(&self) -> &PinnedBuffer {
        &self.buffer
    }

    /// Mutable backing storage, as the driver sees it after execution.
    pub fn buffer_mut(&mut self) -> &mut PinnedBuffer {
        &mut self.buffer
    }

    /// Per-element NULL markers and byte counts.
    #[must_use]
    pub fn indicator(&self) -> &[isize] {
        &self.indicator
    }

    /// Mutable indicator entries.
    pub fn indicator_mut(&mut self) -> &mut [isize] {
        &mut self.indicator
    }

    /// Number of logical elements (1 for scalars).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.indicator.len()
    }

    /// Whether the driver writes a value back into this binding.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.descriptor.direction.is_output()
    }

    /// Run `f` with the native view of this binding.
    ///
    /// The pointers in [`NativeParam`] borrow this binding mutably, so the
    /// storage cannot be touched, moved or dropped while they are live.
    pub fn with_native<R>(&mut self, f: impl FnOnce(&NativeParam<'_>) -> R) -> R {
        f(&self.native())
    }

    pub(crate) fn native(&mut self) -> NativeParam<'_> {
        NativeParam {
            c_type: self.descriptor.c_type.code(),
            sql_type: self.descriptor.sql_type.code(),
            direction: self.descriptor.direction.code(),
            column_size: self.descriptor.param_size,
            decimal_digits: self.descriptor.digits,
            value_ptr: self.buffer.as_mut_ptr(),
            buffer_len: self.descriptor.buffer_len,
            indicator_ptr: self.indicator.as_mut_ptr(),
            stride: self.descriptor.stride,
            elements: self.indicator.len(),
            _borrow: PhantomData,
        }
    }
}

/// The argument tuple of one native parameter-binding call.
///
/// Only reachable inside a `with_native` scope; the lifetime ties every
/// pointer to the binding that owns the memory.
#[derive(Debug)]
pub struct NativeParam<'a> {
    /// `SQL_C_*` code.
    pub c_type: i16,
    /// `SQL_*` code.
    pub sql_type: i16,
    /// `SQL_PARAM_*` code.
    pub direction: i16,
    /// Declared column size.
    pub column_size: u64,
    /// Declared decimal digits.
    pub decimal_digits: i16,
    /// Start of the element storage, null for NULL bindings.
    pub value_ptr: *mut c_void,
    /// Buffer length in bytes.
    pub buffer_len: usize,
    /// Start of the indicator vector.
    pub indicator_ptr: *mut isize,
    /// Width of one element in bytes.
    pub stride: usize,
    /// Number of elements.
    pub elements: usize,
    _borrow: PhantomData<&'a mut Binding>,
}
