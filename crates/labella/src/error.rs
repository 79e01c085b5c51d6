pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid input: node {node} has {field} = {value}")]
    InvalidInput {
        node: usize,
        field: &'static str,
        value: f64,
    },

    #[error(transparent)]
    Solver(#[from] labella_vpsc::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
