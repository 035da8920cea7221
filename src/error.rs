use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("constraint scope references unknown variable ?{0}")]
    UnknownVariable(u32),
    #[error("constraint scope must contain at least one variable")]
    EmptyScope,
    #[error("variable ?{0} has an empty initial domain")]
    EmptyDomain(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed problem input: {0}")]
    MalformedProblem(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<SolverError>,
        backtrace: Box<Backtrace>,
    },
}

impl Error {
    /// The underlying solver error, without the captured backtrace.
    pub fn kind(&self) -> &SolverError {
        match self {
            Error::Inner { inner, .. } => inner,
        }
    }
}

impl From<SolverError> for Error {
    fn from(inner: SolverError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}
