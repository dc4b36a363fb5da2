//! # mssql-bind
//!
//! Parameter binding for the SQL Server ODBC driver.
//!
//! This crate turns dynamic [`ParamValue`]s into the buffers, indicator
//! vectors and type codes that `SQLBindParameter` consumes, reserves
//! storage for output parameters and result columns, and decodes what the
//! driver writes back.
//!
//! ## Resolution Order
//!
//! [`bind_value`] looks at a value in this order:
//!
//! 1. Table-valued parameters
//! 2. Arrays, bound column-wise with one indicator per element
//! 3. Directives: stored procedure parameters and explicit SQL types
//! 4. Scalars, typed by their variant
//!
//! ## Example
//!
//! ```rust
//! use mssql_bind::{BindConfig, ParameterSet, ParamValue, unbind};
//!
//! let values = vec![ParamValue::from(42), ParamValue::from("hello"), ParamValue::Null];
//! let set = ParameterSet::from_values(&values, BindConfig::default())?;
//! assert_eq!(set.len(), 3);
//! assert_eq!(unbind(&set.bindings()[1])?, ParamValue::from("hello"));
//! # Ok::<(), mssql_bind::BindError>(())
//! ```
//!
//! ## Memory
//!
//! Every [`Binding`] owns its element storage through a [`PinnedBuffer`]
//! whose heap allocation never moves. Raw pointers are only handed out
//! inside [`Binding::with_native`] and [`ParameterSet::with_native`], so the
//! storage outlives every native call that reads or writes it.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod arena;
pub mod array;
pub mod binding;
pub mod config;
pub mod directive;
pub mod error;
pub mod param_set;
pub mod reserve;
pub mod resolve;
pub mod scalar;
pub mod sql_type;
pub mod tvp;
pub mod unbind;

pub use arena::{ArenaElement, ArenaKind, PinnedBuffer};
pub use array::{ArrayTally, bind_array};
pub use binding::{Binding, NativeParam, ParamDescriptor, SQL_NULL_DATA};
pub use config::{BindConfig, BindContext};
pub use directive::{bind_directive, bind_procedure, bind_typed};
pub use error::BindError;
pub use param_set::{NativeBinder, ParameterSet};
pub use reserve::{reserve_column, reserve_output};
pub use resolve::bind_value;
pub use sql_type::{CDataType, DynamicKind, ParamDirection, SqlDataType};
pub use tvp::bind_tvp;
pub use unbind::unbind;

// Re-export the value model so callers need only this crate.
pub use mssql_types::{Directive, ParamValue, ProcedureParam, TvpParam, TypedParam};
