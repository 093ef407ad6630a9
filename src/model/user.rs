//! User entity, its patch and filter shapes, and its descriptor.

use super::descriptor::{EntityDescriptor, FieldDescriptor, Format, SqlType, ValidationRule};
use super::patch::Field;
use super::Model;
use crate::error::ConfigError;
use crate::search::{Criterion, Paging, SearchFilter};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const USER_TABLE: &str = "users";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: String,
    /// `A` active, `I` inactive, `D` disabled.
    pub status: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub email: Field<Option<String>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub phone: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub status: Field<Option<String>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub date_of_birth: Field<Option<NaiveDate>>,
}

impl UserPatch {
    /// Merge present fields into `user`; absent fields keep their stored value.
    pub fn apply_to(&self, user: &mut User) {
        self.username.apply_to(&mut user.username);
        self.email.apply_to(&mut user.email);
        self.phone.apply_to(&mut user.phone);
        self.status.apply_to(&mut user.status);
        self.date_of_birth.apply_to(&mut user.date_of_birth);
    }
}

/// Search shape: every field optional; decoded from query parameters or a JSON body.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilter {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub date_of_birth_min: Option<NaiveDate>,
    pub date_of_birth_max: Option<NaiveDate>,
    /// Free text matched against every searchable column.
    pub q: Option<String>,
    #[serde(alias = "pageSize")]
    pub limit: Option<u32>,
    #[serde(alias = "pageIndex")]
    pub page: Option<u32>,
    pub sort: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SearchFilter for UserFilter {
    fn paging(&self) -> Paging {
        Paging {
            limit: self.limit,
            page: self.page,
            sort: non_blank(&self.sort).map(str::to_string),
        }
    }

    fn criteria(&self) -> Vec<Criterion> {
        let mut out = Vec::new();
        if let Some(id) = non_blank(&self.id) {
            out.push(Criterion::Eq("id", Value::String(id.to_string())));
        }
        if let Some(s) = non_blank(&self.username) {
            out.push(Criterion::Prefix("username", s.to_string()));
        }
        if let Some(s) = non_blank(&self.email) {
            out.push(Criterion::Prefix("email", s.to_string()));
        }
        if let Some(s) = non_blank(&self.phone) {
            out.push(Criterion::Prefix("phone", s.to_string()));
        }
        if let Some(s) = non_blank(&self.status) {
            out.push(Criterion::Eq("status", Value::String(s.to_string())));
        }
        if let Some(d) = self.date_of_birth_min {
            out.push(Criterion::Gte("dateOfBirth", Value::String(d.to_string())));
        }
        if let Some(d) = self.date_of_birth_max {
            out.push(Criterion::Lte("dateOfBirth", Value::String(d.to_string())));
        }
        if let Some(q) = non_blank(&self.q) {
            out.push(Criterion::Keyword(q.to_string()));
        }
        out
    }
}

impl Model for User {
    type Patch = UserPatch;

    fn descriptor() -> Result<EntityDescriptor, ConfigError> {
        let fields = vec![
            FieldDescriptor::new("id", "id", SqlType::Varchar(40))
                .key()
                .rule(ValidationRule::required().max_length(40)),
            FieldDescriptor::new("username", "username", SqlType::Varchar(100))
                .searchable()
                .rule(ValidationRule::required().max_length(100).pattern(r"^[A-Za-z0-9._-]+$")?),
            FieldDescriptor::new("email", "email", SqlType::Varchar(100))
                .nullable()
                .unique()
                .searchable()
                .rule(ValidationRule::optional().max_length(100).format(Format::Email)),
            FieldDescriptor::new("phone", "phone", SqlType::Varchar(18))
                .searchable()
                .rule(
                    ValidationRule::required()
                        .min_length(6)
                        .max_length(18)
                        .format(Format::Phone),
                ),
            FieldDescriptor::new("status", "status", SqlType::Varchar(1))
                .nullable()
                .rule(ValidationRule::optional().allowed(&["A", "I", "D"])),
            FieldDescriptor::new("date_of_birth", "dateOfBirth", SqlType::Date).nullable(),
            FieldDescriptor::new("created_at", "createdAt", SqlType::Timestamptz).managed("NOW()"),
            FieldDescriptor::new("updated_at", "updatedAt", SqlType::Timestamptz).managed("NOW()"),
        ];
        EntityDescriptor::new(USER_TABLE, fields, Some("updated_at"))
    }

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn patch_key(patch: &UserPatch) -> Option<&str> {
        patch.id.as_present().map(String::as_str).filter(|s| !s.is_empty())
    }

    fn set_patch_key(patch: &mut UserPatch, key: String) {
        patch.id = Field::Present(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_uses_camel_case() {
        let user = User {
            id: "u1".into(),
            username: "ann".into(),
            phone: "0123456789".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            ..Default::default()
        };
        let v = serde_json::to_value(&user).unwrap();
        assert_eq!(v["dateOfBirth"], "1990-05-17");
        assert!(v.get("createdAt").is_none());
        assert_eq!(v["email"], Value::Null);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: UserPatch = serde_json::from_str(r#"{"email":null,"username":"bob"}"#).unwrap();
        assert_eq!(patch.email, Field::Present(None));
        assert!(patch.phone.is_absent());

        let mut user = User {
            id: "u1".into(),
            username: "ann".into(),
            email: Some("ann@example.com".into()),
            phone: "0123456789".into(),
            ..Default::default()
        };
        patch.apply_to(&mut user);
        assert_eq!(user.username, "bob");
        assert_eq!(user.email, None);
        assert_eq!(user.phone, "0123456789");
    }

    #[test]
    fn blank_patch_key_is_treated_as_missing() {
        let patch: UserPatch = serde_json::from_str(r#"{"id":""}"#).unwrap();
        assert_eq!(User::patch_key(&patch), None);
    }

    #[test]
    fn filter_skips_blank_values() {
        let filter = UserFilter {
            username: Some("  ".into()),
            status: Some("A".into()),
            ..Default::default()
        };
        let criteria = filter.criteria();
        assert_eq!(criteria, vec![Criterion::Eq("status", Value::String("A".into()))]);
    }

    #[test]
    fn filter_accepts_page_aliases() {
        let filter: UserFilter = serde_json::from_str(r#"{"pageSize":10,"pageIndex":2}"#).unwrap();
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.page, Some(2));
    }

    #[test]
    fn descriptor_builds() {
        let d = User::descriptor().unwrap();
        assert_eq!(d.key().json, "id");
        assert_eq!(d.touch_column, Some("updated_at"));
        assert!(d.writable().all(|f| f.column != "created_at"));
    }
}
