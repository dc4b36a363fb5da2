//! Table-valued parameter descriptors.
//!
//! A table-valued parameter is bound in two steps. The first binding,
//! built here, declares the table type and the number of rows; the driver
//! answers with a data-at-execution request and the rows are streamed
//! column by column afterwards. Only the first step belongs to this crate.
//!
//! For `SQL_SS_TABLE` the driver reinterprets the usual arguments:
//!
//! | Argument | Meaning |
//! |----------|---------|
//! | column size | maximum number of rows |
//! | decimal digits | always 0 |
//! | buffer | UTF-16 name of the table type |
//! | buffer length | byte length of the type name |
//! | indicator | number of rows actually available |

use std::mem::size_of;

use mssql_types::{TvpParam, encode_utf16};

use crate::arena::PinnedBuffer;
use crate::binding::{Binding, ParamDescriptor};
use crate::sql_type::{CDataType, DynamicKind, ParamDirection, SqlDataType};

/// Build the `SQL_C_DEFAULT` / `SQL_SS_TABLE` binding for a table type.
///
/// The type name is stored NUL-terminated; the schema, if any, is kept on
/// the descriptor for the statement attribute that selects it.
#[must_use]
pub fn bind_tvp(tvp: &TvpParam) -> Binding {
    let mut name = encode_utf16(&tvp.type_name, None);
    let name_bytes = name.len() * size_of::<u16>();
    name.push(0);

    let mut descriptor =
        ParamDescriptor::new(DynamicKind::Null, CDataType::Default, SqlDataType::SsTable);
    descriptor.direction = ParamDirection::Input;
    descriptor.param_size = u64::from(tvp.row_count);
    descriptor.digits = 0;
    descriptor.stride = name.len() * size_of::<u16>();
    descriptor.buffer_len = name_bytes;
    descriptor.is_tvp = true;
    descriptor.tvp_schema = tvp.schema.clone();

    tracing::trace!(
        type_name = %tvp.type_name,
        rows = tvp.row_count,
        "binding table-valued parameter"
    );
    Binding::new(
        descriptor,
        PinnedBuffer::from_vec(name),
        vec![tvp.row_count as isize],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tvp_descriptor() {
        let tvp = TvpParam::new("UserIdList").schema("dbo").row_count(3);
        let binding = bind_tvp(&tvp);
        let desc = binding.descriptor();

        assert!(desc.is_tvp);
        assert_eq!(desc.c_type, CDataType::Default);
        assert_eq!(desc.sql_type, SqlDataType::SsTable);
        assert_eq!(desc.param_size, 3);
        assert_eq!(desc.digits, 0);
        assert_eq!(desc.buffer_len, 20);
        assert_eq!(desc.tvp_schema.as_deref(), Some("dbo"));
        assert_eq!(binding.indicator(), &[3]);
        assert_eq!(binding.buffer().get::<u16>().unwrap().last(), Some(&0));
    }

    #[test]
    fn test_tvp_defaults_to_one_row() {
        let binding = bind_tvp(&TvpParam::new("T"));
        assert_eq!(binding.descriptor().param_size, 1);
        assert_eq!(binding.indicator(), &[1]);
        assert_eq!(binding.descriptor().tvp_schema, None);
    }
}
