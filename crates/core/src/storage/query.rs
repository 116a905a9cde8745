use serde_json::Value;

use super::codec::Item;
use super::error::InputError;

/// A partition-scoped range query.
///
/// `partition` must hold exactly one field: the partition key name and the
/// value to match.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub partition: Item,
    pub should_reverse: bool,
    pub limit: Option<usize>,
}

impl Query {
    /// Queries `table` for every item whose `name` attribute equals `value`.
    pub fn partition(table: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        let mut partition = Item::new();
        partition.insert(name.into(), value);
        Self {
            table: table.into(),
            partition,
            should_reverse: false,
            limit: None,
        }
    }

    /// Orders results by descending sort key.
    pub fn reversed(mut self) -> Self {
        self.should_reverse = true;
        self
    }

    /// Returns at most `limit` items.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks the descriptor and returns the request the driver should run.
    pub fn to_request(&self) -> Result<QueryRequest, InputError> {
        if self.table.is_empty() {
            return Err(InputError::new("table"));
        }
        if self.partition.len() != 1 {
            return Err(InputError::nested("partition", "key"));
        }
        let Some((name, value)) = self.partition.iter().next() else {
            return Err(InputError::nested("partition", "key"));
        };
        if name.is_empty() || value.is_null() {
            return Err(InputError::nested("partition", "key"));
        }
        if self.limit == Some(0) {
            return Err(InputError::new("limit"));
        }
        Ok(QueryRequest {
            partition_name: name.clone(),
            partition_value: value.clone(),
            scan_forward: !self.should_reverse,
            limit: self.limit,
        })
    }
}

/// A validated query as handed to the store driver.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub partition_name: String,
    pub partition_value: Value,
    /// Ascending sort-key order when true.
    pub scan_forward: bool,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_query_is_ascending_and_unbounded() {
        let request = Query::partition("dev-connections", "user", json!("u1"))
            .to_request()
            .unwrap();
        assert_eq!(request.partition_name, "user");
        assert_eq!(request.partition_value, json!("u1"));
        assert!(request.scan_forward);
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_reversed_and_limited_query() {
        let request = Query::partition("t", "user", json!("u1"))
            .reversed()
            .limit(1)
            .to_request()
            .unwrap();
        assert!(!request.scan_forward);
        assert_eq!(request.limit, Some(1));
    }

    #[test]
    fn test_missing_table_is_rejected() {
        let err = Query::partition("", "user", json!("u1"))
            .to_request()
            .unwrap_err();
        assert_eq!(err, InputError::new("table"));
    }

    #[test]
    fn test_partition_must_have_a_single_field() {
        let mut query = Query::partition("t", "user", json!("u1"));
        query.partition.insert("token".to_string(), json!("x"));
        assert_eq!(
            query.to_request().unwrap_err(),
            InputError::nested("partition", "key")
        );

        query.partition.clear();
        assert_eq!(
            query.to_request().unwrap_err(),
            InputError::nested("partition", "key")
        );
    }

    #[test]
    fn test_null_partition_value_is_rejected() {
        let err = Query::partition("t", "user", Value::Null)
            .to_request()
            .unwrap_err();
        assert_eq!(err, InputError::nested("partition", "key"));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = Query::partition("t", "user", json!("u1"))
            .limit(0)
            .to_request()
            .unwrap_err();
        assert_eq!(err, InputError::new("limit"));
    }
}
