//! Lazy records over raw GitHub API JSON.
//!
//! The API returns far more fields than are worth modelling by hand. A
//! [`RawRecord`] keeps the decoded object as-is and exposes each key through
//! [`RawRecord::get`]; resource types add typed accessors for the fields they
//! care about and advertise them through [`Resource::additional_attributes`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::error::{Error, Result};

/// A JSON object as returned by the API.
pub type JsonObject = Map<String, Value>;

/// Keys that resource types expose through dedicated accessors.
const RESERVED_KEYS: [&str; 2] = ["id", "type"];

/// A decoded API object plus the [`Connection`] used for follow-on requests.
#[derive(Debug, Clone)]
pub struct RawRecord {
    raw: Option<JsonObject>,
    connection: Connection,
}

impl RawRecord {
    /// Wrap `raw`, which may be absent when only partial data is known.
    #[must_use]
    pub fn new(raw: Option<JsonObject>, connection: Connection) -> Self {
        Self { raw, connection }
    }

    /// Wrap a decoded response body.
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedPayload`] if `value` is neither an object
    /// nor `null`.
    pub fn from_value(value: Value, connection: Connection, end_point: &str) -> Result<Self> {
        let raw = match value {
            Value::Null => None,
            other => Some(into_object(other, end_point)?),
        };
        Ok(Self::new(raw, connection))
    }

    /// The decoded object, if any.
    #[must_use]
    pub const fn raw(&self) -> Option<&JsonObject> {
        self.raw.as_ref()
    }

    /// The connection follow-on requests are made with.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Look up a field without failing.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.raw.as_ref()?.get(name)
    }

    /// Look up a field returned by the API.
    ///
    /// # Errors
    /// Returns [`Error::UnknownAttribute`] if the record has no such key.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.lookup(name)
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    /// Look up a string field.
    ///
    /// # Errors
    /// Returns an error if the field is missing or not a string.
    pub fn str_field(&self, name: &str) -> Result<&str> {
        as_str(self.get(name)?, name)
    }

    /// Look up an unsigned integer field.
    ///
    /// # Errors
    /// Returns an error if the field is missing or not an unsigned integer.
    pub fn u64_field(&self, name: &str) -> Result<u64> {
        as_u64(self.get(name)?, name)
    }

    /// Look up a nested object; `null`, a missing key, or an absent raw
    /// object yield `None`.
    ///
    /// # Errors
    /// Returns [`Error::AttributeType`] if the value is not an object.
    pub fn object_field(&self, name: &str) -> Result<Option<&JsonObject>> {
        match &self.raw {
            Some(raw) => object_field(raw, name),
            None => Ok(None),
        }
    }

    /// Keys present in the raw object.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.raw.iter().flat_map(|raw| raw.keys().map(String::as_str))
    }
}

/// Shared behavior of every resource type.
pub trait Resource {
    /// The primary record backing this resource.
    fn record(&self) -> &RawRecord;

    /// Names of derived accessors the resource adds on top of the raw fields.
    fn additional_attributes(&self) -> Vec<String> {
        Vec::new()
    }

    /// The connection follow-on requests are made with.
    fn connection(&self) -> &Connection {
        self.record().connection()
    }

    /// Every attribute available on this resource.
    ///
    /// Raw keys come first (minus `id` and `type`, which have typed
    /// accessors), followed by [`Resource::additional_attributes`], without
    /// duplicates.
    fn available_attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> = self
            .record()
            .keys()
            .filter(|key| !RESERVED_KEYS.contains(key))
            .map(str::to_string)
            .collect();

        for attribute in self.additional_attributes() {
            if !attributes.contains(&attribute) {
                attributes.push(attribute);
            }
        }

        attributes
    }
}

/// Convert a decoded body into an object.
///
/// # Errors
/// Returns [`Error::UnexpectedPayload`] for anything but a JSON object.
pub fn into_object(value: Value, end_point: &str) -> Result<JsonObject> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::UnexpectedPayload {
            end_point: end_point.to_string(),
            expected: "a JSON object",
        }),
    }
}

/// Look up `name` in `object`.
///
/// # Errors
/// Returns [`Error::UnknownAttribute`] if the key is absent.
pub fn field<'a>(object: &'a JsonObject, name: &str) -> Result<&'a Value> {
    object
        .get(name)
        .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
}

/// Look up a string in `object`.
///
/// # Errors
/// Returns an error if the key is absent or not a string.
pub fn str_field<'a>(object: &'a JsonObject, name: &str) -> Result<&'a str> {
    as_str(field(object, name)?, name)
}

/// Look up an unsigned integer in `object`.
///
/// # Errors
/// Returns an error if the key is absent or not an unsigned integer.
pub fn u64_field(object: &JsonObject, name: &str) -> Result<u64> {
    as_u64(field(object, name)?, name)
}

/// Look up a nested object in `object`; `null` or a missing key yield `None`.
///
/// # Errors
/// Returns [`Error::AttributeType`] if the value is present but not an object.
pub fn object_field<'a>(object: &'a JsonObject, name: &str) -> Result<Option<&'a JsonObject>> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(nested)) => Ok(Some(nested)),
        Some(_) => Err(Error::AttributeType {
            name: name.to_string(),
            expected: "an object",
        }),
    }
}

/// Look up an optional string in `object`; `null` or a missing key yield `None`.
///
/// # Errors
/// Returns [`Error::AttributeType`] if the value is present but not a string.
pub fn optional_str_field<'a>(object: &'a JsonObject, name: &str) -> Result<Option<&'a str>> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_str(value, name).map(Some),
    }
}

fn as_str<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| Error::AttributeType {
        name: name.to_string(),
        expected: "a string",
    })
}

fn as_u64(value: &Value, name: &str) -> Result<u64> {
    value.as_u64().ok_or_else(|| Error::AttributeType {
        name: name.to_string(),
        expected: "an unsigned integer",
    })
}

/// Parse an API timestamp.
///
/// Accepts RFC 3339 (`2011-01-26T19:01:12Z`), the older
/// `2011/01/26 19:01:12 -0800` form, and offset-less ISO 8601 (taken as UTC).
///
/// # Errors
/// Returns [`Error::InvalidTimestamp`] if none of the formats match.
pub fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let parsed = DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y/%m/%d %H:%M:%S %z"))
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.and_utc())
        })
        .map_err(|source| Error::InvalidTimestamp {
            value: value.to_string(),
            source,
        })?;

    Ok(Some(parsed))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::from_value(value, Connection::anonymous().unwrap(), "/test").unwrap()
    }

    struct Plain(RawRecord);

    impl Resource for Plain {
        fn record(&self) -> &RawRecord {
            &self.0
        }
    }

    struct WithExtras(RawRecord);

    impl Resource for WithExtras {
        fn record(&self) -> &RawRecord {
            &self.0
        }

        fn additional_attributes(&self) -> Vec<String> {
            vec!["owner_login".into(), "name".into()]
        }
    }

    #[test]
    fn test_get_present_field() {
        let record = record(json!({"login": "bob", "public_repos": 3}));
        assert_eq!(record.get("login").unwrap(), "bob");
        assert_eq!(record.str_field("login").unwrap(), "bob");
        assert_eq!(record.u64_field("public_repos").unwrap(), 3);
    }

    #[test]
    fn test_get_missing_field() {
        let record = record(json!({"login": "bob"}));
        assert!(matches!(
            record.get("email"),
            Err(Error::UnknownAttribute(ref name)) if name == "email"
        ));
    }

    #[test]
    fn test_get_on_absent_raw() {
        let record = record(Value::Null);
        assert!(record.raw().is_none());
        assert!(matches!(record.get("login"), Err(Error::UnknownAttribute(_))));
        assert_eq!(record.keys().count(), 0);
    }

    #[test]
    fn test_wrong_type() {
        let record = record(json!({"login": 7}));
        assert!(matches!(
            record.str_field("login"),
            Err(Error::AttributeType { expected: "a string", .. })
        ));
    }

    #[test]
    fn test_from_value_rejects_arrays() {
        let result = RawRecord::from_value(json!([1, 2]), Connection::anonymous().unwrap(), "/x");
        assert!(matches!(result, Err(Error::UnexpectedPayload { .. })));
    }

    #[test]
    fn test_available_attributes_skip_reserved_keys() {
        let plain = Plain(record(json!({"id": 1, "type": "User", "login": "bob"})));
        assert_eq!(plain.available_attributes(), vec!["login"]);
    }

    #[test]
    fn test_available_attributes_include_additional() {
        let resource = WithExtras(record(json!({"name": "repo", "id": 9})));
        assert_eq!(resource.available_attributes(), vec!["name", "owner_login"]);
    }

    #[test]
    fn test_object_field() {
        let object = into_object(json!({"merged_by": null, "user": {"login": "bob"}, "x": 1}), "/t")
            .unwrap();
        assert!(object_field(&object, "merged_by").unwrap().is_none());
        assert!(object_field(&object, "absent").unwrap().is_none());
        let user = object_field(&object, "user").unwrap().unwrap();
        assert_eq!(str_field(user, "login").unwrap(), "bob");
        assert!(object_field(&object, "x").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2011, 1, 26, 19, 1, 12).unwrap();
        assert_eq!(
            parse_timestamp(Some("2011-01-26T19:01:12Z")).unwrap(),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(Some("2011/01/26 11:01:12 -0800")).unwrap(),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(Some("2011-01-26T19:01:12")).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_timestamp_absent() {
        assert_eq!(parse_timestamp(None).unwrap(), None);
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(matches!(
            parse_timestamp(Some("yesterday")),
            Err(Error::InvalidTimestamp { .. })
        ));
    }
}
