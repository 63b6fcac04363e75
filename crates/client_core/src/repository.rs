use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{NewTodo, TodoId, TodoItem, TodoPatch, UserId},
    error::{ErrorCode, RemoteError},
    protocol::{Filter, Order, TODOS_TABLE},
};

use crate::{RemoteResult, RemoteTable};

const OWNER_FIELD: &str = "user_id";
const ID_FIELD: &str = "id";
const CREATED_AT_FIELD: &str = "created_at";

/// Typed view of the `todos` collection.
#[derive(Clone)]
pub struct TodoRepository {
    table: Arc<dyn RemoteTable>,
    name: String,
}

impl TodoRepository {
    pub fn new(table: Arc<dyn RemoteTable>) -> Self {
        Self::with_table_name(table, TODOS_TABLE)
    }

    pub fn with_table_name(table: Arc<dyn RemoteTable>, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
        }
    }

    /// All items owned by `owner`, newest first.
    pub async fn list_for_owner(&self, owner: UserId) -> RemoteResult<Vec<TodoItem>> {
        let rows = self
            .table
            .select(
                &self.name,
                &[Filter::eq(OWNER_FIELD, owner)],
                Some(&Order::descending(CREATED_AT_FIELD)),
            )
            .await?;
        rows.into_iter().map(from_row).collect()
    }

    pub async fn insert(&self, new_todo: &NewTodo) -> RemoteResult<TodoItem> {
        let row = self.table.insert(&self.name, to_row(new_todo)?).await?;
        from_row(row)
    }

    pub async fn update(&self, id: TodoId, patch: &TodoPatch) -> RemoteResult<TodoItem> {
        let row = self
            .table
            .update(&self.name, &[Filter::eq(ID_FIELD, id)], to_row(patch)?)
            .await?;
        from_row(row)
    }

    pub async fn delete(&self, id: TodoId) -> RemoteResult<()> {
        self.table
            .delete(&self.name, &[Filter::eq(ID_FIELD, id)])
            .await
    }
}

fn to_row<T: Serialize>(value: &T) -> RemoteResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| RemoteError::new(ErrorCode::Decode, format!("unable to encode row: {err}")))
}

fn from_row<T: DeserializeOwned>(row: Value) -> RemoteResult<T> {
    serde_json::from_value(row)
        .map_err(|err| RemoteError::new(ErrorCode::Decode, format!("malformed todo row: {err}")))
}
