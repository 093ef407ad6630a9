//! Masking of sensitive values before they reach the logs.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MaskRule {
    pub keep_start: usize,
    pub keep_end: usize,
    pub with: char,
}

impl Default for MaskRule {
    fn default() -> Self {
        MaskRule {
            keep_start: 1,
            keep_end: 6,
            with: 'x',
        }
    }
}

/// Keep the first `keep_start` and last `keep_end` characters; replace the rest.
/// Values no longer than `keep_start + keep_end` are masked entirely.
pub fn mask(value: &str, rule: &MaskRule) -> String {
    let chars: Vec<char> = value.chars().collect();
    let n = chars.len();
    if n <= rule.keep_start + rule.keep_end {
        return std::iter::repeat(rule.with).take(n).collect();
    }
    let mut out = String::with_capacity(value.len());
    out.extend(&chars[..rule.keep_start]);
    out.extend(std::iter::repeat(rule.with).take(n - rule.keep_start - rule.keep_end));
    out.extend(&chars[n - rule.keep_end..]);
    out
}

/// Masks configured field names in JSON payloads and query strings.
#[derive(Clone, Debug, Default)]
pub struct Masker {
    fields: HashSet<String>,
    rule: MaskRule,
}

impl Masker {
    pub fn new(fields: &[String], rule: MaskRule) -> Self {
        Masker {
            fields: fields.iter().cloned().collect(),
            rule,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Masks matching keys at any depth. Non-string scalars are masked by their text form.
    pub fn mask_value(&self, value: &mut Value) {
        if self.is_empty() {
            return;
        }
        match value {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    if self.fields.contains(k) {
                        match v {
                            Value::String(s) => *s = mask(s, &self.rule),
                            Value::Number(n) => *v = Value::String(mask(&n.to_string(), &self.rule)),
                            other => self.mask_value(other),
                        }
                    } else {
                        self.mask_value(v);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.mask_value(v)),
            _ => {}
        }
    }

    pub fn mask_query(&self, query: &str) -> String {
        if self.is_empty() {
            return query.to_string();
        }
        query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) if self.fields.contains(k) => format!("{}={}", k, mask(v, &self.rule)),
                _ => pair.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_head_and_tail() {
        assert_eq!(mask("secretvalue123", &MaskRule::default()), "sxxxxxxxlue123");
    }

    #[test]
    fn short_values_fully_masked() {
        assert_eq!(mask("1234567", &MaskRule::default()), "xxxxxxx");
        assert_eq!(mask("", &MaskRule::default()), "");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let rule = MaskRule {
            keep_start: 1,
            keep_end: 1,
            with: '*',
        };
        assert_eq!(mask("héllo", &rule), "h***o");
    }

    #[test]
    fn masks_nested_fields() {
        let masker = Masker::new(&["phone".to_string()], MaskRule::default());
        let mut v = json!({ "id": "u1", "phone": "0987654321", "items": [{ "phone": 1234567890123u64 }] });
        masker.mask_value(&mut v);
        assert_eq!(v["id"], "u1");
        assert_eq!(v["phone"], "0xxx654321");
        assert_eq!(v["items"][0]["phone"], "1xxxxxx890123");
    }

    #[test]
    fn masks_query_parameters() {
        let masker = Masker::new(&["email".to_string()], MaskRule::default());
        assert_eq!(
            masker.mask_query("username=ann&email=ann@example.com"),
            "username=ann&email=axxxxxxxxle.com"
        );
        assert_eq!(masker.mask_query("page=2"), "page=2");
    }
}
