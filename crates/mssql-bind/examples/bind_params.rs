//! Parameter binding walkthrough.
//!
//! Binds a mix of inferred, explicitly typed, array and output parameters,
//! prints what the driver would receive, then decodes a simulated output.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=mssql_bind=trace cargo run --example bind_params
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use mssql_bind::{
    BindConfig, BindError, ParamValue, ParameterSet, ProcedureParam, SqlDataType, TypedParam,
};

fn main() -> Result<(), BindError> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let values = vec![
        ParamValue::from(42),
        ParamValue::Number(2.75),
        ParamValue::from("héllo"),
        ParamValue::typed(
            TypedParam::new(SqlDataType::Numeric.code(), 1234.5)
                .precision(10)
                .scale(2),
        ),
        ParamValue::Array(vec!["a".into(), ParamValue::Null, "bb".into()]),
        ParamValue::procedure(ProcedureParam::output("int", 0)),
    ];

    let mut set = ParameterSet::from_values(&values, BindConfig::default())?;
    set.with_native(|natives| {
        for (number, native) in natives.iter().enumerate() {
            println!(
                "#{}: c_type={} sql_type={} size={} digits={} buffer_len={} elements={}",
                number + 1,
                native.c_type,
                native.sql_type,
                native.column_size,
                native.decimal_digits,
                native.buffer_len,
                native.elements,
            );
        }
    })?;

    // Pretend the procedure wrote its output.
    if let Some(output) = set.get_mut(5) {
        if let Some(slot) = output.buffer_mut().get_mut::<i32>() {
            slot[0] = 7;
        }
    }
    for (index, value) in set.unbind_outputs()? {
        println!("output #{}: {value:?}", index + 1);
    }

    Ok(())
}
