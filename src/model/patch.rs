//! Presence-tracking field wrapper for partial updates.
//!
//! A `Field<T>` is `Absent` when the key is missing from the payload and `Present` when it is
//! there, even if its value is `null` (use `Field<Option<T>>` for nullable columns). Patch
//! structs mark every field `#[serde(default, skip_serializing_if = "Field::is_absent")]`, so
//! serializing a patch yields exactly the keys the client sent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    /// Overwrite `target` when present; leave it untouched when absent.
    pub fn apply_to(&self, target: &mut T)
    where
        T: Clone,
    {
        if let Field::Present(v) = self {
            *target = v.clone();
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Present)
    }
}

impl<T> Serialize for Field<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Present(v) => v.serialize(serializer),
            Field::Absent => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(default)]
    struct Sparse {
        #[serde(skip_serializing_if = "Field::is_absent")]
        name: Field<String>,
        #[serde(skip_serializing_if = "Field::is_absent")]
        note: Field<Option<String>>,
    }

    #[test]
    fn missing_key_is_absent() {
        let s: Sparse = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
        assert_eq!(s.name, Field::Present("a".to_string()));
        assert!(s.note.is_absent());
    }

    #[test]
    fn explicit_null_is_present() {
        let s: Sparse = serde_json::from_str(r#"{"note":null}"#).unwrap();
        assert_eq!(s.note, Field::Present(None));
        assert!(s.name.is_absent());
    }

    #[test]
    fn explicit_empty_string_is_present() {
        let s: Sparse = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert_eq!(s.name, Field::Present(String::new()));
    }

    #[test]
    fn null_for_non_nullable_field_is_rejected() {
        assert!(serde_json::from_str::<Sparse>(r#"{"name":null}"#).is_err());
    }

    #[test]
    fn serializes_only_present_keys() {
        let s = Sparse {
            name: Field::Absent,
            note: Field::Present(None),
        };
        assert_eq!(serde_json::to_value(&s).unwrap(), serde_json::json!({ "note": null }));
    }

    #[test]
    fn apply_to_skips_absent() {
        let mut target = "old".to_string();
        Field::<String>::Absent.apply_to(&mut target);
        assert_eq!(target, "old");
        Field::Present(String::new()).apply_to(&mut target);
        assert_eq!(target, "");
    }
}
