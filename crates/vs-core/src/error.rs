use thiserror::Error;

pub type VsResult<T> = Result<T, VsError>;

#[derive(Error, Debug)]
pub enum VsError {
    #[error("Non-finite numeric value for {what}: {value} (index={index})")]
    NonFinite {
        what: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
