#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("constraint {constraint} references missing variable {variable}")]
    MissingVariable { constraint: usize, variable: usize },

    #[error("{field} of {owner} {index} must be finite, got {value}")]
    NonFinite {
        owner: &'static str,
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("{field} of variable {index} must be positive, got {value}")]
    NonPositive {
        field: &'static str,
        index: usize,
        value: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
