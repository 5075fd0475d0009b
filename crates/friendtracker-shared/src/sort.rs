//! Presentation order for contact lists.
//!
//! Birthday order is by days until the next occurrence, not by the stored
//! date, so the list reads as "who is celebrating next".  Contacts without a
//! birthday sit at infinity: last when ascending, first when descending.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::ContactError;
use crate::types::Contact;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Birthday,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The active sort column and direction of a contact list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header click: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

/// Total order over contacts.  `Desc` is the exact reverse of `Asc`.
pub fn compare(a: &Contact, b: &Contact, order: SortOrder, today: NaiveDate) -> Ordering {
    let ordering = match order.field {
        SortField::Name => compare_names(&a.name, &b.name),
        SortField::Birthday => birthday_distance(a, today)
            .cmp(&birthday_distance(b, today))
            .then_with(|| compare_names(&a.name, &b.name)),
    }
    .then_with(|| a.id.cmp(&b.id));

    match order.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// The derived projection handed to list views.
pub fn sorted(
    contacts: impl IntoIterator<Item = Contact>,
    order: SortOrder,
    today: NaiveDate,
) -> Vec<Contact> {
    let mut contacts: Vec<Contact> = contacts.into_iter().collect();
    contacts.sort_by(|a, b| compare(a, b, order, today));
    contacts
}

/// Case-insensitive collation: base letters first, accents only break ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    fold(a, true)
        .cmp(&fold(b, true))
        .then_with(|| fold(a, false).cmp(&fold(b, false)))
}

// Lowercased canonical decomposition, optionally without combining marks.
fn fold(name: &str, strip_marks: bool) -> String {
    name.nfd()
        .filter(|c| !(strip_marks && is_combining_mark(*c)))
        .flat_map(char::to_lowercase)
        .collect()
}

// unknown birthday = infinitely far away
fn birthday_distance(contact: &Contact, today: NaiveDate) -> i64 {
    contact.days_until_birthday(today).unwrap_or(i64::MAX)
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Birthday => write!(f, "birthday"),
            Self::Name => write!(f, "name"),
        }
    }
}

impl FromStr for SortField {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "birthday" => Ok(Self::Birthday),
            "name" => Ok(Self::Name),
            other => Err(ContactError::UnknownSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ContactError::UnknownSortDirection(other.to_string())),
        }
    }
}
