/// Coarse failure classes. Callers branch on these; none is retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The generation call itself failed.
    Transport,
    /// The response could not be parsed or had the wrong shape.
    Schema,
    /// The response parsed but held nothing usable.
    EmptyResult,
}

#[derive(Debug, thiserror::Error)]
pub enum ReasonError {
    #[error("generation request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("generation request could not be completed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no JSON found in generated response")]
    NoJson,

    #[error("generated response has unexpected shape: {0}")]
    Schema(String),

    #[error("generated response contained no valid entries")]
    EmptyResult,
}

impl ReasonError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReasonError::Transport { .. } | ReasonError::Request(_) => FailureKind::Transport,
            ReasonError::NoJson | ReasonError::Schema(_) => FailureKind::Schema,
            ReasonError::EmptyResult => FailureKind::EmptyResult,
        }
    }
}
