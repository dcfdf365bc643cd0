use thiserror::Error;

pub type CsResult<T> = Result<T, CsError>;

#[derive(Error, Debug)]
pub enum CsError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
