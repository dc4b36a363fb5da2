//! Pinned backing storage for one binding.
//!
//! A [`PinnedBuffer`] owns exactly one typed, fixed-length slice. The slice is
//! a `Box<[T]>`, so it can never grow or reallocate: once a pointer to it has
//! been handed to the driver, the element bytes stay at the same address
//! until the buffer is dropped, even if the owning binding moves.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr;

use mssql_types::{
    SqlDateStruct, SqlNumericStruct, SqlTimeStruct, SqlTimestampOffsetStruct, SqlTimestampStruct,
};

/// Which element type a [`PinnedBuffer`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaKind {
    /// No storage (NULL bindings).
    Empty,
    /// Bytes: bits, narrow text, binary.
    Bytes,
    /// UTF-16 code units.
    Wide,
    /// Signed 32-bit integers.
    Int32,
    /// Unsigned 32-bit integers.
    Uint32,
    /// Signed 64-bit integers.
    Int64,
    /// Doubles.
    Double,
    /// `SQL_NUMERIC_STRUCT`.
    Numeric,
    /// `SQL_DATE_STRUCT`.
    Date,
    /// `SQL_SS_TIME2_STRUCT`.
    Time,
    /// `SQL_TIMESTAMP_STRUCT`.
    Timestamp,
    /// `SQL_SS_TIMESTAMPOFFSET_STRUCT`.
    TimestampOffset,
}

#[derive(Debug)]
enum Storage {
    Empty,
    Bytes(Box<[u8]>),
    Wide(Box<[u16]>),
    Int32(Box<[i32]>),
    Uint32(Box<[u32]>),
    Int64(Box<[i64]>),
    Double(Box<[f64]>),
    Numeric(Box<[SqlNumericStruct]>),
    Date(Box<[SqlDateStruct]>),
    Time(Box<[SqlTimeStruct]>),
    Timestamp(Box<[SqlTimestampStruct]>),
    TimestampOffset(Box<[SqlTimestampOffsetStruct]>),
}

/// An element type that can live in a [`PinnedBuffer`].
pub trait ArenaElement: Copy + Default + 'static {
    #[doc(hidden)]
    fn wrap(elements: Box<[Self]>) -> PinnedBuffer;
    #[doc(hidden)]
    fn slice(buffer: &PinnedBuffer) -> Option<&[Self]>;
    #[doc(hidden)]
    fn slice_mut(buffer: &mut PinnedBuffer) -> Option<&mut [Self]>;
}

macro_rules! impl_arena_element {
    ($t:ty, $variant:ident) => {
        impl ArenaElement for $t {
            fn wrap(elements: Box<[Self]>) -> PinnedBuffer {
                PinnedBuffer {
                    storage: Storage::$variant(elements),
                }
            }

            fn slice(buffer: &PinnedBuffer) -> Option<&[Self]> {
                match &buffer.storage {
                    Storage::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(buffer: &mut PinnedBuffer) -> Option<&mut [Self]> {
                match &mut buffer.storage {
                    Storage::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_arena_element!(u8, Bytes);
impl_arena_element!(u16, Wide);
impl_arena_element!(i32, Int32);
impl_arena_element!(u32, Uint32);
impl_arena_element!(i64, Int64);
impl_arena_element!(f64, Double);
impl_arena_element!(SqlNumericStruct, Numeric);
impl_arena_element!(SqlDateStruct, Date);
impl_arena_element!(SqlTimeStruct, Time);
impl_arena_element!(SqlTimestampStruct, Timestamp);
impl_arena_element!(SqlTimestampOffsetStruct, TimestampOffset);

/// Owned, non-resizable storage for one binding's native data.
#[derive(Debug)]
pub struct PinnedBuffer {
    storage: Storage,
}

impl Default for PinnedBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl PinnedBuffer {
    /// A buffer with no storage; its pointer is null.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            storage: Storage::Empty,
        }
    }

    /// A buffer of `len` zero-valued elements of `T`.
    #[must_use]
    pub fn zeroed<T: ArenaElement>(len: usize) -> Self {
        T::wrap(vec![T::default(); len].into_boxed_slice())
    }

    /// Take ownership of already-encoded elements.
    #[must_use]
    pub fn from_vec<T: ArenaElement>(elements: Vec<T>) -> Self {
        T::wrap(elements.into_boxed_slice())
    }

    /// Which element type this buffer holds.
    #[must_use]
    pub fn kind(&self) -> ArenaKind {
        match &self.storage {
            Storage::Empty => ArenaKind::Empty,
            Storage::Bytes(_) => ArenaKind::Bytes,
            Storage::Wide(_) => ArenaKind::Wide,
            Storage::Int32(_) => ArenaKind::Int32,
            Storage::Uint32(_) => ArenaKind::Uint32,
            Storage::Int64(_) => ArenaKind::Int64,
            Storage::Double(_) => ArenaKind::Double,
            Storage::Numeric(_) => ArenaKind::Numeric,
            Storage::Date(_) => ArenaKind::Date,
            Storage::Time(_) => ArenaKind::Time,
            Storage::Timestamp(_) => ArenaKind::Timestamp,
            Storage::TimestampOffset(_) => ArenaKind::TimestampOffset,
        }
    }

    /// Elements as `T`, if this buffer holds `T`.
    #[must_use]
    pub fn get<T: ArenaElement>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Mutable elements as `T`, if this buffer holds `T`.
    ///
    /// The slice length is fixed; only element contents can change.
    pub fn get_mut<T: ArenaElement>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(self)
    }

    /// Number of elements held.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Empty => 0,
            Storage::Bytes(v) => v.len(),
            Storage::Wide(v) => v.len(),
            Storage::Int32(v) => v.len(),
            Storage::Uint32(v) => v.len(),
            Storage::Int64(v) => v.len(),
            Storage::Double(v) => v.len(),
            Storage::Numeric(v) => v.len(),
            Storage::Date(v) => v.len(),
            Storage::Time(v) => v.len(),
            Storage::Timestamp(v) => v.len(),
            Storage::TimestampOffset(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of one element in bytes.
    #[must_use]
    pub fn element_size(&self) -> usize {
        match &self.storage {
            Storage::Empty => 0,
            Storage::Bytes(_) => size_of::<u8>(),
            Storage::Wide(_) => size_of::<u16>(),
            Storage::Int32(_) => size_of::<i32>(),
            Storage::Uint32(_) => size_of::<u32>(),
            Storage::Int64(_) => size_of::<i64>(),
            Storage::Double(_) => size_of::<f64>(),
            Storage::Numeric(_) => size_of::<SqlNumericStruct>(),
            Storage::Date(_) => size_of::<SqlDateStruct>(),
            Storage::Time(_) => size_of::<SqlTimeStruct>(),
            Storage::Timestamp(_) => size_of::<SqlTimestampStruct>(),
            Storage::TimestampOffset(_) => size_of::<SqlTimestampOffsetStruct>(),
        }
    }

    /// Total size of the storage in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_size()
    }

    /// Address of the first element, or null when there is no storage.
    #[must_use]
    pub fn as_ptr(&self) -> *const c_void {
        match &self.storage {
            Storage::Empty => ptr::null(),
            Storage::Bytes(v) => v.as_ptr().cast(),
            Storage::Wide(v) => v.as_ptr().cast(),
            Storage::Int32(v) => v.as_ptr().cast(),
            Storage::Uint32(v) => v.as_ptr().cast(),
            Storage::Int64(v) => v.as_ptr().cast(),
            Storage::Double(v) => v.as_ptr().cast(),
            Storage::Numeric(v) => v.as_ptr().cast(),
            Storage::Date(v) => v.as_ptr().cast(),
            Storage::Time(v) => v.as_ptr().cast(),
            Storage::Timestamp(v) => v.as_ptr().cast(),
            Storage::TimestampOffset(v) => v.as_ptr().cast(),
        }
    }

    /// Writable address of the first element, or null when there is no storage.
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        match &mut self.storage {
            Storage::Empty => ptr::null_mut(),
            Storage::Bytes(v) => v.as_mut_ptr().cast(),
            Storage::Wide(v) => v.as_mut_ptr().cast(),
            Storage::Int32(v) => v.as_mut_ptr().cast(),
            Storage::Uint32(v) => v.as_mut_ptr().cast(),
            Storage::Int64(v) => v.as_mut_ptr().cast(),
            Storage::Double(v) => v.as_mut_ptr().cast(),
            Storage::Numeric(v) => v.as_mut_ptr().cast(),
            Storage::Date(v) => v.as_mut_ptr().cast(),
            Storage::Time(v) => v.as_mut_ptr().cast(),
            Storage::Timestamp(v) => v.as_mut_ptr().cast(),
            Storage::TimestampOffset(v) => v.as_mut_ptr().cast(),
        }
    }
}
