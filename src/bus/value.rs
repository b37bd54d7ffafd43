use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Type-tagged bus value.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Double(f64),
    Integer(i64),
    Text(String),

    /// The path exists but the producer has no valid reading at the moment.
    Invalid,
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Double(value) => Ok(value),
            Value::Integer(value) =>
            {
                #[expect(clippy::cast_precision_loss)]
                Ok(value as Self)
            }
            Value::Text(text) => bail!("expected a number, got text `{text}`"),
            Value::Invalid => bail!("the value is invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_ok() -> Result {
        // language=json
        let value: Value = serde_json::from_str(r#"{"type": "double", "value": 52.31}"#)?;
        assert_eq!(value, Value::Double(52.31));

        // language=json
        let value: Value = serde_json::from_str(r#"{"type": "integer", "value": -3}"#)?;
        assert_eq!(value, Value::Integer(-3));

        // language=json
        let value: Value = serde_json::from_str(r#"{"type": "invalid"}"#)?;
        assert_eq!(value, Value::Invalid);
        Ok(())
    }

    #[test]
    fn serialize_ok() -> Result {
        assert_eq!(serde_json::to_string(&Value::from(1.5))?, r#"{"type":"double","value":1.5}"#);
        Ok(())
    }

    #[test]
    fn to_f64() -> Result {
        assert_eq!(f64::try_from(Value::Double(-12.5))?, -12.5);
        assert_eq!(f64::try_from(Value::Integer(48))?, 48.0);
        assert!(f64::try_from(Value::Invalid).is_err());
        assert!(f64::try_from(Value::Text("48".to_string())).is_err());
        Ok(())
    }
}
