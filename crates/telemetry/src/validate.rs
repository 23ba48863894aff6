use serde_json::Value;
use thiserror::Error;

pub const INVALID_FEATURES: &str = "Invalid JSON - paste an array of numbers";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", INVALID_FEATURES)]
    NotJson,
    #[error("{}", INVALID_FEATURES)]
    NotArray,
    #[error("feature {index} is not a finite number")]
    NotNumber { index: usize },
    #[error("feature vector is empty")]
    Empty,
}

/// Parses operator input into a feature vector before anything is sent.
pub fn validate_features(input: &str) -> Result<Vec<f64>, ValidationError> {
    let value: Value = serde_json::from_str(input.trim()).map_err(|_| ValidationError::NotJson)?;
    let Value::Array(items) = value else {
        return Err(ValidationError::NotArray);
    };
    if items.is_empty() {
        return Err(ValidationError::Empty);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_f64()
                .filter(|f| f.is_finite())
                .ok_or(ValidationError::NotNumber { index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_json() {
        let err = validate_features("not json").unwrap_err();
        assert_eq!(err, ValidationError::NotJson);
        assert_eq!(err.to_string(), INVALID_FEATURES);
    }

    #[test]
    fn test_rejects_object() {
        let err = validate_features("{}").unwrap_err();
        assert_eq!(err, ValidationError::NotArray);
        assert_eq!(err.to_string(), INVALID_FEATURES);
    }

    #[test]
    fn test_accepts_array() {
        assert_eq!(validate_features(" [1, 2.5, -3] "), Ok(vec![1.0, 2.5, -3.0]));
    }

    #[test]
    fn test_rejects_mixed_and_empty() {
        assert_eq!(validate_features(r#"[1, "2"]"#), Err(ValidationError::NotNumber { index: 1 }));
        assert_eq!(validate_features("[]"), Err(ValidationError::Empty));
    }
}
