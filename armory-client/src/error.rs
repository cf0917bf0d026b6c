use armory_core::{DraftError, Resource};
use thiserror::Error;

/// Transport-level failure talking to a backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// The server-provided `detail`, if the server answered with one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A mutation kind, used to word fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    fn gerund(self) -> &'static str {
        match self {
            Operation::Create => "creating",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
        }
    }

    /// Message shown when the server gives no `detail`.
    pub fn fallback_message(self, resource: Resource) -> String {
        format!(
            "An error occurred while {} the {}.",
            self.gerund(),
            resource.singular().to_lowercase()
        )
    }
}

/// Failure of a resource manager operation, as shown to the user.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Loading the collection failed.
    #[error("Failed to load {resource}: {source}")]
    Fetch {
        resource: Resource,
        #[source]
        source: ClientError,
    },

    /// The server refused a create or update.
    #[error("{detail}")]
    Validation {
        detail: String,
        #[source]
        source: ClientError,
    },

    /// The draft failed local validation; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] DraftError),

    /// The photo could not be read or uploaded; nothing else was sent.
    #[error("Failed to upload photo.")]
    Upload(#[source] ClientError),

    #[error("{detail}")]
    Delete {
        detail: String,
        #[source]
        source: ClientError,
    },

    /// The task running the request went away before answering.
    #[error("Request cancelled")]
    Cancelled,
}

impl ResourceError {
    pub(crate) fn from_mutation(op: Operation, resource: Resource, source: ClientError) -> Self {
        let detail = source
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| op.fallback_message(resource));
        match op {
            Operation::Create | Operation::Update => ResourceError::Validation { detail, source },
            Operation::Delete => ResourceError::Delete { detail, source },
        }
    }

    /// Whether the failure happened before any create/update/delete request.
    pub fn is_local(&self) -> bool {
        matches!(self, ResourceError::Rejected(_) | ResourceError::Upload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_messages() {
        assert_eq!(
            Operation::Create.fallback_message(Resource::Categories),
            "An error occurred while creating the category."
        );
        assert_eq!(
            Operation::Update.fallback_message(Resource::Weapons),
            "An error occurred while updating the weapon."
        );
    }

    #[test]
    fn server_detail_wins_over_fallback() {
        let err = ResourceError::from_mutation(
            Operation::Create,
            Resource::Rarities,
            ClientError::Api {
                status: 400,
                detail: Some("Rarity already exists".to_string()),
            },
        );
        assert_eq!(err.to_string(), "Rarity already exists");

        let err = ResourceError::from_mutation(
            Operation::Delete,
            Resource::Types,
            ClientError::MalformedResponse("empty".to_string()),
        );
        assert!(matches!(err, ResourceError::Delete { .. }));
        assert_eq!(err.to_string(), "An error occurred while deleting the type.");
    }

    #[test]
    fn api_error_display() {
        let err = ClientError::Api { status: 404, detail: None };
        assert_eq!(err.to_string(), "API error: 404 - no detail");
        assert_eq!(err.status(), Some(404));
    }
}
