use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeterError {
    #[error("cannot mark a negative number of events ({0})")]
    NegativeAmount(i64),
}
