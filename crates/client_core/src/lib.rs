use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::User,
    error::RemoteError,
    protocol::{Filter, Order},
};

pub mod controller;
pub mod error;
pub mod repository;
pub mod transport;

pub use controller::{
    Draft, EditState, Outcome, SkipReason, StagedEdit, TodoListController, TodoListState, TodoRow,
};
pub use error::{ControllerError, Operation};
pub use repository::TodoRepository;
pub use transport::{RestBackend, ServiceConfig};

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Supplies the user the current session is authenticated as.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when there is no authenticated session.
    async fn current_user(&self) -> RemoteResult<Option<User>>;
}

/// Generic row access over a named collection of the hosted database.
///
/// Rows travel as JSON objects; typed access lives in [`TodoRepository`].
#[async_trait]
pub trait RemoteTable: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> RemoteResult<Vec<Value>>;

    /// Returns the stored row, including server-assigned columns.
    async fn insert(&self, table: &str, row: Value) -> RemoteResult<Value>;

    /// Returns the first updated row. Fails with `NotFound` when nothing matched.
    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> RemoteResult<Value>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> RemoteResult<()>;
}
