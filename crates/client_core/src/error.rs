use std::fmt;

use shared::{domain::TodoId, error::RemoteError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to {operation} todos: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: RemoteError,
    },
    #[error("todo {0} is not in the current list")]
    NotListed(TodoId),
}

impl ControllerError {
    pub fn remote(operation: Operation, source: RemoteError) -> Self {
        Self::Remote { operation, source }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Remote { operation, .. } => Some(*operation),
            Self::NotListed(_) => None,
        }
    }

    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            Self::NotListed(_) => None,
        }
    }
}
