//! Ordered parameter lists and the native binding seam.

use std::error::Error as StdError;

use mssql_types::ParamValue;

use crate::binding::{Binding, NativeParam};
use crate::config::BindConfig;
use crate::error::BindError;
use crate::resolve::bind_value;
use crate::unbind::unbind;

/// The native side of parameter binding.
///
/// Implemented over an ODBC statement handle: `bind_parameter` maps onto
/// `SQLBindParameter` and `execute` onto `SQLExecute`. Both are called
/// while every parameter buffer is borrowed, so the pointers stay valid
/// until `execute` returns.
pub trait NativeBinder {
    /// Error reported by the driver.
    type Error: StdError + Send + Sync + 'static;

    /// Bind one parameter; `number` is 1-based.
    fn bind_parameter(&mut self, number: u16, param: &NativeParam<'_>) -> Result<(), Self::Error>;

    /// Execute the statement with the bound parameters.
    fn execute(&mut self) -> Result<(), Self::Error>;
}

fn native_error<E: StdError + Send + Sync + 'static>(e: E) -> BindError {
    BindError::Native(Box::new(e))
}

/// The bindings for one statement execution.
///
/// Binding stops at the first failure. The failure is remembered, and a
/// set carrying one refuses further values and never reaches the driver.
#[derive(Debug, Default)]
pub struct ParameterSet {
    config: BindConfig,
    bindings: Vec<Binding>,
    last_error: Option<(usize, String)>,
}

impl ParameterSet {
    /// Create an empty set using `config` for every binding.
    #[must_use]
    pub fn new(config: BindConfig) -> Self {
        Self {
            config,
            bindings: Vec::new(),
            last_error: None,
        }
    }

    /// Bind every value in order, stopping at the first failure.
    pub fn from_values(values: &[ParamValue], config: BindConfig) -> Result<Self, BindError> {
        let mut set = Self::new(config);
        set.bind_all(values)?;
        Ok(set)
    }

    fn check_usable(&self) -> Result<(), BindError> {
        match &self.last_error {
            Some((index, reason)) => Err(BindError::Rejected {
                index: *index,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Bind one more value as the next parameter.
    pub fn bind(&mut self, value: &ParamValue) -> Result<(), BindError> {
        self.check_usable()?;
        let index = self.bindings.len();
        match bind_value(value, &self.config) {
            Ok(binding) => {
                self.bindings.push(binding);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "parameter binding failed");
                self.last_error = Some((index, e.to_string()));
                Err(BindError::Parameter {
                    index,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Bind `values` in order, stopping at the first failure.
    pub fn bind_all(&mut self, values: &[ParamValue]) -> Result<(), BindError> {
        for value in values {
            self.bind(value)?;
        }
        tracing::debug!(
            parameters = self.bindings.len(),
            outputs = self.bindings.iter().filter(|b| b.is_output()).count(),
            "parameter set bound"
        );
        Ok(())
    }

    /// Index and message of the failure that made this set unusable.
    #[must_use]
    pub fn last_error(&self) -> Option<(usize, &str)> {
        self.last_error
            .as_ref()
            .map(|(index, reason)| (*index, reason.as_str()))
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no parameter is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The bound parameters in order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Mutable access to one binding, e.g. to simulate a driver write.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Binding> {
        self.bindings.get_mut(index)
    }

    /// Run `f` with the native view of every parameter.
    ///
    /// Fails without calling `f` if the set carries a binding failure.
    pub fn with_native<R>(
        &mut self,
        f: impl FnOnce(&[NativeParam<'_>]) -> R,
    ) -> Result<R, BindError> {
        self.check_usable()?;
        let natives: Vec<NativeParam<'_>> =
            self.bindings.iter_mut().map(Binding::native).collect();
        Ok(f(&natives))
    }

    /// Bind every parameter through `binder` and execute.
    pub fn execute<B: NativeBinder>(&mut self, binder: &mut B) -> Result<(), BindError> {
        let count = self.bindings.len();
        if count > usize::from(u16::MAX) {
            return Err(BindError::TooManyParameters(count));
        }
        tracing::debug!(parameters = count, "binding parameters to driver");

        self.with_native(|natives| -> Result<(), BindError> {
            for (number, native) in (1..=u16::MAX).zip(natives) {
                tracing::trace!(
                    number,
                    c_type = native.c_type,
                    sql_type = native.sql_type,
                    elements = native.elements,
                    "native bind"
                );
                binder.bind_parameter(number, native).map_err(native_error)?;
            }
            binder.execute().map_err(native_error)
        })?
    }

    /// Decode every output and input/output parameter.
    ///
    /// Returns `(index, value)` pairs in parameter order.
    pub fn unbind_outputs(&self) -> Result<Vec<(usize, ParamValue)>, BindError> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.is_output())
            .map(|(index, binding)| unbind(binding).map(|value| (index, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mssql_types::ProcedureParam;

    #[derive(Debug, thiserror::Error)]
    #[error("driver refused parameter {0}")]
    struct Refused(u16);

    #[derive(Default)]
    struct Recorder {
        bound: Vec<(u16, i16, i16, usize)>,
        executed: bool,
        refuse: Option<u16>,
    }

    impl NativeBinder for Recorder {
        type Error = Refused;

        fn bind_parameter(&mut self, number: u16, param: &NativeParam<'_>) -> Result<(), Refused> {
            if self.refuse == Some(number) {
                return Err(Refused(number));
            }
            self.bound
                .push((number, param.c_type, param.sql_type, param.elements));
            Ok(())
        }

        fn execute(&mut self) -> Result<(), Refused> {
            self.executed = true;
            Ok(())
        }
    }

    #[test]
    fn test_execute_binds_in_order() {
        let values = vec![1.into(), "a".into(), ParamValue::Null];
        let mut set = ParameterSet::from_values(&values, BindConfig::default()).unwrap();
        let mut recorder = Recorder::default();
        set.execute(&mut recorder).unwrap();

        assert!(recorder.executed);
        assert_eq!(
            recorder.bound,
            vec![(1, -16, 4, 1), (2, -8, -9, 1), (3, 1, 1, 1)]
        );
    }

    #[test]
    fn test_failure_short_circuits() {
        let values = vec![1.into(), ParamValue::Number(f64::NAN), 2.into()];
        let mut set = ParameterSet::new(BindConfig::default());
        let err = set.bind_all(&values).unwrap_err();

        assert!(matches!(err, BindError::Parameter { index: 1, .. }));
        assert!(err.is_number_error());
        assert_eq!(set.len(), 1);
        assert_eq!(set.last_error().map(|(i, _)| i), Some(1));

        assert!(matches!(set.bind(&3.into()), Err(BindError::Rejected { index: 1, .. })));
        let mut recorder = Recorder::default();
        assert!(set.execute(&mut recorder).is_err());
        assert!(recorder.bound.is_empty());
        assert!(!recorder.executed);
    }

    #[test]
    fn test_driver_error_is_wrapped() {
        let values: Vec<ParamValue> = vec![1.into(), 2.into()];
        let mut set = ParameterSet::from_values(&values, BindConfig::default()).unwrap();
        let mut recorder = Recorder {
            refuse: Some(2),
            ..Recorder::default()
        };
        let err = set.execute(&mut recorder).unwrap_err();
        assert!(matches!(err, BindError::Native(_)));
        assert!(!recorder.executed);
    }

    #[test]
    fn test_unbind_outputs() {
        let values = vec![
            5.into(),
            ParamValue::procedure(ProcedureParam::output("int", 0)),
        ];
        let mut set = ParameterSet::from_values(&values, BindConfig::default()).unwrap();
        set.get_mut(1)
            .unwrap()
            .buffer_mut()
            .get_mut::<i32>()
            .unwrap()[0] = 99;

        let outputs = set.unbind_outputs().unwrap();
        assert_eq!(outputs, vec![(1, ParamValue::Int32(99))]);
    }
}
