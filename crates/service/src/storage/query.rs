use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Conjunction of field-equality predicates over a document's JSON form.
/// An empty filter matches every document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self { Self::default() }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// A single-field change applied in place to a matched document.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Add `by` to an integer field; a missing or null field counts as 0.
    /// Works across the whole `i64` and `u64` range; a result outside both is a `Conflict`.
    Inc { field: String, by: i64 },
    /// Append `value` to an array field; a missing or null field starts empty.
    Push { field: String, value: Value },
}

impl Mutation {
    pub fn inc(field: impl Into<String>, by: i64) -> Self {
        Self::Inc { field: field.into(), by }
    }

    pub fn push<T: Serialize>(field: impl Into<String>, value: &T) -> Result<Self, ServiceError> {
        let value = serde_json::to_value(value).map_err(|e| ServiceError::Validation(e.to_string()))?;
        Ok(Self::Push { field: field.into(), value })
    }

    /// Apply to `doc`. On error `doc` is left untouched.
    pub fn apply(&self, doc: &mut Value) -> Result<(), ServiceError> {
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| ServiceError::unavailable("stored document is not an object"))?;
        match self {
            Mutation::Inc { field, by } => {
                let current = numeric_field(obj, field)?;
                let next = integer_value(current + i128::from(*by))
                    .ok_or_else(|| ServiceError::Conflict(format!("field `{field}` is out of range")))?;
                obj.insert(field.clone(), next);
            }
            Mutation::Push { field, value } => match obj.get_mut(field) {
                Some(Value::Array(items)) => items.push(value.clone()),
                None | Some(Value::Null) => {
                    obj.insert(field.clone(), Value::Array(vec![value.clone()]));
                }
                Some(_) => {
                    return Err(ServiceError::unavailable(format!("field `{field}` is not an array")));
                }
            },
        }
        Ok(())
    }
}

fn numeric_field(obj: &Map<String, Value>, field: &str) -> Result<i128, ServiceError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .map(i128::from)
            .or_else(|| v.as_i64().map(i128::from))
            .ok_or_else(|| ServiceError::unavailable(format!("field `{field}` is not an integer"))),
    }
}

fn integer_value(n: i128) -> Option<Value> {
    if n >= 0 {
        u64::try_from(n).ok().map(Value::from)
    } else {
        i64::try_from(n).ok().map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_all_clauses() {
        let doc = json!({"username": "a", "password": "p1"});
        assert!(Filter::all().matches(&doc));
        assert!(Filter::eq("username", "a").matches(&doc));
        assert!(Filter::eq("username", "a").and("password", "p1").matches(&doc));
        assert!(!Filter::eq("username", "a").and("password", "wrong").matches(&doc));
        assert!(!Filter::eq("missing", "a").matches(&doc));
    }

    #[test]
    fn filter_compares_numbers_across_int_types() {
        let doc = json!({"id": 1u64});
        assert!(Filter::eq("id", 1i64).matches(&doc));
        assert!(Filter::eq("id", 1u64).matches(&doc));
        assert!(!Filter::eq("id", 2u64).matches(&doc));
    }

    #[test]
    fn inc_treats_missing_field_as_zero() -> Result<(), ServiceError> {
        let mut doc = json!({"id": 1});
        Mutation::inc("likes", 1).apply(&mut doc)?;
        Mutation::inc("likes", 1).apply(&mut doc)?;
        assert_eq!(doc["likes"], json!(2));
        Ok(())
    }

    #[test]
    fn inc_crosses_the_signed_range() -> Result<(), ServiceError> {
        let mut doc = json!({"likes": i64::MAX});
        Mutation::inc("likes", 1).apply(&mut doc)?;
        assert_eq!(doc["likes"], json!(i64::MAX as u64 + 1));
        Mutation::inc("likes", 1).apply(&mut doc)?;
        assert_eq!(doc["likes"], json!(i64::MAX as u64 + 2));
        Ok(())
    }

    #[test]
    fn inc_past_u64_max_is_a_conflict_without_change() {
        let mut doc = json!({"likes": u64::MAX});
        assert!(matches!(Mutation::inc("likes", 1).apply(&mut doc), Err(ServiceError::Conflict(_))));
        assert_eq!(doc["likes"], json!(u64::MAX));
    }

    #[test]
    fn inc_on_non_numeric_field_fails_without_change() {
        let mut doc = json!({"likes": "many"});
        assert!(matches!(Mutation::inc("likes", 1).apply(&mut doc), Err(ServiceError::StoreUnavailable(_))));
        assert_eq!(doc["likes"], json!("many"));
    }

    #[test]
    fn push_appends_in_order_and_creates_array() -> Result<(), ServiceError> {
        let mut doc = json!({"id": 1, "comments": null});
        Mutation::push("comments", &json!({"author": "a"}))?.apply(&mut doc)?;
        Mutation::push("comments", &json!({"author": "b"}))?.apply(&mut doc)?;
        assert_eq!(doc["comments"], json!([{"author": "a"}, {"author": "b"}]));
        Ok(())
    }

    #[test]
    fn push_on_scalar_field_fails() -> Result<(), ServiceError> {
        let mut doc = json!({"comments": 3});
        let res = Mutation::push("comments", &json!("x"))?.apply(&mut doc);
        assert!(res.is_err());
        Ok(())
    }
}
