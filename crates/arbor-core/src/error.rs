pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a parent is required to add a node to the tree")]
    ParentRequired,

    #[error("node not found: {name}")]
    NodeNotFound { name: String },

    #[error("node already exists: {name}")]
    DuplicateNode { name: String },

    #[error("cannot remove the root node: {name}")]
    CannotRemoveRoot { name: String },

    #[error("invalid tree data: {message}")]
    InvalidData { message: String },

    #[error("tree data JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
