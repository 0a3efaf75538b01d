//! Lenient deserializers for values that may arrive coerced from the environment.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringLike {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<StringLike> for String {
    fn from(value: StringLike) -> Self {
        match value {
            StringLike::Str(s) => s,
            StringLike::Int(n) => n.to_string(),
            StringLike::Float(f) => f.to_string(),
            StringLike::Bool(b) => b.to_string(),
        }
    }
}

/// Accept a string, or a number/boolean rendered back into a string.
///
/// Use with `#[serde(deserialize_with = "paygate_config::de::string")]` on
/// identifier-like fields (merchant logins, vendor ids) that may be all digits.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringLike::deserialize(deserializer).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Login {
        #[serde(deserialize_with = "string")]
        user: String,
    }

    #[test]
    fn test_number_becomes_string() {
        let login: Login = serde_json::from_value(serde_json::json!({ "user": 12345 })).unwrap();
        assert_eq!(login.user, "12345");
    }

    #[test]
    fn test_string_passes_through() {
        let login: Login = serde_json::from_value(serde_json::json!({ "user": "merchant" })).unwrap();
        assert_eq!(login.user, "merchant");
    }
}
