use thiserror::Error;

/// Failures of a single completion request.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The endpoint answered with a non-success status. The turn is dropped.
    #[error("completion endpoint returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status, but no `choices[0].message.content` in the body.
    #[error("unexpected completion response: {0}")]
    MalformedResponse(String),
}

/// Failures raised by a workflow planner. Always caught by the session loop.
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("search failed: {0}")]
    Search(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("{0}")]
    Planner(String),
}
