use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::birthday::days_until_next_birthday;
use crate::error::ContactError;

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A single contact row as held by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    /// Assigned by the service on insert; never changes afterwards.
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "crate::birthday::date_only")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub archived: bool,
}

impl Contact {
    /// Days until this contact's next birthday, `None` when it is unknown.
    pub fn days_until_birthday(&self, today: NaiveDate) -> Option<i64> {
        self.birthday
            .map(|birthday| days_until_next_birthday(birthday, today))
    }

    /// Merge a partial update into this record.  `id` is never touched.
    pub fn apply(&mut self, patch: &ContactPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(birthday) = patch.birthday {
            self.birthday = birthday;
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
    }
}

// ---------------------------------------------------------------------------
// NewContact
// ---------------------------------------------------------------------------

/// Insert payload.  The service assigns `id` and defaults `archived` to false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "crate::birthday::date_only")]
    pub birthday: Option<NaiveDate>,
}

impl NewContact {
    pub fn new(name: impl Into<String>) -> Result<Self, ContactError> {
        Ok(Self {
            name: required_name(name.into())?,
            email: None,
            phone: None,
            birthday: None,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = optional_text(Some(email.into()));
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = optional_text(Some(phone.into()));
        self
    }

    pub fn with_birthday(mut self, birthday: Option<NaiveDate>) -> Self {
        self.birthday = birthday;
        self
    }

    /// Trim every text field, turning blank optionals into absent values.
    ///
    /// Payloads arriving over the wire go through this before they are stored.
    pub fn normalized(self) -> Result<Self, ContactError> {
        Ok(Self {
            name: required_name(self.name)?,
            email: optional_text(self.email),
            phone: optional_text(self.phone),
            birthday: self.birthday,
        })
    }
}

// ---------------------------------------------------------------------------
// ContactPatch
// ---------------------------------------------------------------------------

/// Partial update.  Outer `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub phone: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::birthday::date_only_patch"
    )]
    pub birthday: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ContactPatch {
    pub fn archive() -> Self {
        Self {
            archived: Some(true),
            ..Self::default()
        }
    }

    pub fn unarchive() -> Self {
        Self {
            archived: Some(false),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = Some(optional_text(email));
        self
    }

    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = Some(optional_text(phone));
        self
    }

    pub fn birthday(mut self, birthday: Option<NaiveDate>) -> Self {
        self.birthday = Some(birthday);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.birthday.is_none()
            && self.archived.is_none()
    }

    /// Trim text fields and reject a name that would end up blank.
    pub fn normalized(self) -> Result<Self, ContactError> {
        Ok(Self {
            name: self.name.map(required_name).transpose()?,
            email: self.email.map(optional_text),
            phone: self.phone.map(optional_text),
            birthday: self.birthday,
            archived: self.archived,
        })
    }
}

/// Replace every editable detail of a contact, leaving `archived` alone.
impl From<NewContact> for ContactPatch {
    fn from(details: NewContact) -> Self {
        Self {
            name: Some(details.name),
            email: Some(details.email),
            phone: Some(details.phone),
            birthday: Some(details.birthday),
            archived: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ContactFilter
// ---------------------------------------------------------------------------

/// Server-side filter for `select`.  `archived: None` matches every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ContactFilter {
    pub fn all() -> Self {
        Self { archived: None }
    }

    /// The filter behind a contact list that does or does not show archived rows.
    pub fn working_set(show_archived: bool) -> Self {
        if show_archived {
            Self::all()
        } else {
            Self {
                archived: Some(false),
            }
        }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        self.archived.map_or(true, |archived| contact.archived == archived)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required_name(name: String) -> Result<String, ContactError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ContactError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
