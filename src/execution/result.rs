//! Result values returned by the execution engine
//!
//! The engine reports its answer as JSON. Only the shapes that a
//! verification script can check are accepted; everything else is an
//! `UnrecognizedResult` error.

use serde_json::Value;

use crate::error::{Result, TaskError};

/// Closed set of result kinds a verification script can check
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    /// A single number or boolean
    Scalar(Value),
    /// A flat vector of scalar elements
    Vector(Vec<Value>),
    /// A list whose elements include nested vectors
    List(Vec<Value>),
    /// A table, as a column map or as an array of row objects
    Table(Value),
}

impl ResultValue {
    /// Classify an engine result
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Bool(_) | Value::Number(_) => Ok(ResultValue::Scalar(value)),
            Value::Object(_) => Ok(ResultValue::Table(value)),
            Value::Array(items) => Self::classify_array(items),
            Value::String(_) => Err(TaskError::UnrecognizedResult {
                kind: "string".to_string(),
            }),
            Value::Null => Err(TaskError::UnrecognizedResult {
                kind: "null".to_string(),
            }),
        }
    }

    fn classify_array(items: Vec<Value>) -> Result<Self> {
        let objects = items.iter().filter(|v| v.is_object()).count();

        if objects > 0 {
            if objects == items.len() {
                return Ok(ResultValue::Table(Value::Array(items)));
            }
            return Err(TaskError::UnrecognizedResult {
                kind: "array mixing rows and values".to_string(),
            });
        }

        if items.iter().any(Value::is_array) {
            Ok(ResultValue::List(items))
        } else {
            Ok(ResultValue::Vector(items))
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ResultValue::Scalar(_) => "scalar",
            ResultValue::Vector(_) => "vector",
            ResultValue::List(_) => "list",
            ResultValue::Table(_) => "table",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_results() {
        assert_eq!(
            ResultValue::from_json(json!(3.25)).unwrap(),
            ResultValue::Scalar(json!(3.25))
        );
        assert_eq!(
            ResultValue::from_json(json!(true)).unwrap().kind_name(),
            "scalar"
        );
    }

    #[test]
    fn test_vector_and_list_results() {
        assert_eq!(
            ResultValue::from_json(json!([1, 2, 3])).unwrap(),
            ResultValue::Vector(vec![json!(1), json!(2), json!(3)])
        );
        assert_eq!(
            ResultValue::from_json(json!(["a", "b"])).unwrap().kind_name(),
            "vector"
        );
        assert_eq!(ResultValue::from_json(json!([])).unwrap().kind_name(), "vector");
        assert_eq!(
            ResultValue::from_json(json!([[1, 2], [3]])).unwrap().kind_name(),
            "list"
        );
        assert_eq!(
            ResultValue::from_json(json!([1, [2, 3]])).unwrap().kind_name(),
            "list"
        );
    }

    #[test]
    fn test_table_results() {
        let columns = json!({"sym": ["A", "B"], "price": [1.5, 2.5]});
        assert_eq!(
            ResultValue::from_json(columns.clone()).unwrap(),
            ResultValue::Table(columns)
        );

        let rows = json!([{"sym": "A"}, {"sym": "B"}]);
        assert_eq!(ResultValue::from_json(rows).unwrap().kind_name(), "table");
    }

    #[test]
    fn test_unrecognized_results() {
        for value in [json!("text"), json!(null), json!([{"a": 1}, 2])] {
            assert!(matches!(
                ResultValue::from_json(value),
                Err(TaskError::UnrecognizedResult { .. })
            ));
        }
    }
}
