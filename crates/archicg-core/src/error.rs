pub use archicg_graphlib::CycleError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("Relationship {relation} is not allowed from {source_kind} to {target}")]
    InvalidRelationship {
        relation: String,
        source_kind: String,
        target: String,
    },

    #[error("No action registered under {name:?}")]
    UnknownAction { name: String },

    #[error("Action {name:?} got a payload of the wrong shape")]
    PayloadMismatch { name: String },

    #[error("Element id {id:?} is already in use")]
    DuplicateId { id: String },

    #[error("No node with id {id:?}")]
    MissingNode { id: String },

    #[error("No edge with id {id:?}")]
    MissingEdge { id: String },

    #[error("Malformed model document: {message}")]
    MalformedDocument { message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
