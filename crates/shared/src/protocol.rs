//! Query vocabulary shared by the table service clients.

use serde::{Deserialize, Serialize};

pub const TODOS_TABLE: &str = "todos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl ToString) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// `("user_id", "eq.<value>")` in PostgREST query syntax.
    pub fn to_query_pair(&self) -> (String, String) {
        (self.field.clone(), format!("eq.{}", self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// `"created_at.desc"` in PostgREST query syntax.
    pub fn to_query_value(&self) -> String {
        let dir = match self.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        format!("{}.{dir}", self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_renders_equality_operator() {
        let filter = Filter::eq("id", 42);
        assert_eq!(filter.to_query_pair(), ("id".to_string(), "eq.42".to_string()));

        let owner = Filter::eq("user_id", "abc");
        assert_eq!(owner.to_query_pair(), ("user_id".to_string(), "eq.abc".to_string()));
    }

    #[test]
    fn order_renders_direction_suffix() {
        assert_eq!(Order::descending("created_at").to_query_value(), "created_at.desc");
        assert_eq!(Order::ascending("subject").to_query_value(), "subject.asc");
    }
}
