use serde_json::Value;

use crate::models::role::RoleRow;
use crate::models::signup::SignupRow;
use crate::roster::status::{CheckinStatus, derive_status};

/// One point-of-contact descriptor after normalization. Missing fields come
/// through empty, never as an error — this is presentation logic over data
/// the roster does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PocContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn contact_from_value(v: &Value) -> Option<PocContact> {
    let obj = v.as_object()?;
    let get = |key: &str| {
        obj.get(key)
            .and_then(|f| f.as_str())
            .unwrap_or("")
            .to_string()
    };
    let contact = PocContact {
        name: get("name"),
        email: get("email"),
        phone: get("phone"),
    };
    if contact.name.is_empty() && contact.email.is_empty() && contact.phone.is_empty() {
        return None;
    }
    Some(contact)
}

/// Flatten the three historical point-of-contact shapes into one list:
/// `poc_contacts` (array of objects), legacy singular `poc_contact`, and
/// legacy `suggested_poc` (string or string array, name only). Malformed
/// fragments are skipped; the shapes never fan out past this function.
pub fn normalize_poc_contacts(poc_json: &str) -> Vec<PocContact> {
    let Ok(value) = serde_json::from_str::<Value>(poc_json) else {
        return Vec::new();
    };
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };

    let mut contacts = Vec::new();

    if let Some(list) = obj.get("poc_contacts").and_then(|v| v.as_array()) {
        contacts.extend(list.iter().filter_map(contact_from_value));
    }

    if let Some(single) = obj.get("poc_contact") {
        contacts.extend(contact_from_value(single));
    }

    match obj.get("suggested_poc") {
        Some(Value::String(name)) if !name.trim().is_empty() => {
            contacts.push(PocContact {
                name: name.trim().to_string(),
                email: String::new(),
                phone: String::new(),
            });
        }
        Some(Value::Array(names)) => {
            contacts.extend(names.iter().filter_map(|n| {
                let name = n.as_str()?.trim();
                if name.is_empty() {
                    return None;
                }
                Some(PocContact {
                    name: name.to_string(),
                    email: String::new(),
                    phone: String::new(),
                })
            }));
        }
        _ => {}
    }

    contacts
}

/// Build the searchable blob for one signup: name, phone (raw and digits),
/// role label, and every point-of-contact's name/email/phone (raw and
/// digits), lower-cased and whitespace-collapsed.
pub fn build_search_text(signup: &SignupRow, role: Option<&RoleRow>) -> String {
    let mut fragments: Vec<String> = vec![
        signup.name.clone(),
        signup.phone.clone(),
        digits_only(&signup.phone),
        signup.role_label.clone(),
    ];

    if let Some(poc_json) = role.and_then(|r| r.poc_json.as_deref()) {
        for poc in normalize_poc_contacts(poc_json) {
            let phone_digits = digits_only(&poc.phone);
            fragments.push(poc.name);
            fragments.push(poc.email);
            fragments.push(poc.phone);
            fragments.push(phone_digits);
        }
    }

    fragments
        .join(" ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Substring match against the blob, with a digits-only fallback so a phone
/// query matches regardless of punctuation. An empty query matches all.
pub fn matches(search_text: &str, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    if search_text.contains(&q) {
        return true;
    }
    let q_digits = digits_only(&q);
    !q_digits.is_empty() && digits_only(search_text).contains(&q_digits)
}

/// Second, independent filter facet over the derived status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFacet {
    #[default]
    All,
    /// Currently in the checked-in display state.
    In,
    /// Everything else — not-checked-in and running-late.
    NotIn,
}

impl StatusFacet {
    pub fn parse(s: &str) -> Self {
        match s {
            "in" => StatusFacet::In,
            "not-in" => StatusFacet::NotIn,
            _ => StatusFacet::All,
        }
    }

    pub fn matches(&self, signup: &SignupRow) -> bool {
        let checked_in = derive_status(signup).status == CheckinStatus::CheckedIn;
        match self {
            StatusFacet::All => true,
            StatusFacet::In => checked_in,
            StatusFacet::NotIn => !checked_in,
        }
    }
}
