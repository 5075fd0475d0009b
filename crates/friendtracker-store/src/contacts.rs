//! CRUD operations for [`Contact`] records.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use friendtracker_shared::birthday::{format_date, parse_date_only};
use friendtracker_shared::{Contact, ContactFilter, ContactPatch, NewContact};

use crate::database::Database;
use crate::error::{Result, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, name, email, phone, birthday, archived FROM contact";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new contact and return it with its assigned id.
    pub fn insert_contact(&self, contact: &NewContact) -> Result<Contact> {
        let contact = contact.clone().normalized()?;

        self.conn().execute(
            "INSERT INTO contact (name, email, phone, birthday, archived, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                contact.name,
                contact.email,
                contact.phone,
                contact.birthday.map(format_date),
                Utc::now().to_rfc3339(),
            ],
        )?;

        let id = self.conn().last_insert_rowid();
        tracing::debug!(id, "contact inserted");
        self.get_contact(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single contact by id.
    pub fn get_contact(&self, id: i64) -> Result<Contact> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_contact,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    /// List the contacts matching `filter`, ordered by id.
    pub fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let contacts = match filter.archived {
            Some(archived) => {
                let mut stmt = self
                    .conn()
                    .prepare(&format!("{SELECT_COLUMNS} WHERE archived = ?1 ORDER BY id ASC"))?;
                let rows = stmt.query_map(params![archived], row_to_contact)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self
                    .conn()
                    .prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
                let rows = stmt.query_map([], row_to_contact)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(contacts)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Merge `patch` into the contact with this id and return the result.
    pub fn update_contact(&self, id: i64, patch: &ContactPatch) -> Result<Contact> {
        let patch = patch.clone().normalized()?;

        let tx = self.conn().unchecked_transaction()?;
        let mut contact = self.get_contact(id)?;
        if patch.is_empty() {
            return Ok(contact);
        }
        contact.apply(&patch);

        let affected = tx.execute(
            "UPDATE contact
             SET name = ?1, email = ?2, phone = ?3, birthday = ?4, archived = ?5
             WHERE id = ?6",
            params![
                contact.name,
                contact.email,
                contact.phone,
                contact.birthday.map(format_date),
                contact.archived,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit()?;

        tracing::debug!(id, archived = contact.archived, "contact updated");
        Ok(contact)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Permanently delete a contact.
    pub fn delete_contact(&self, id: i64) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM contact WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(id, "contact deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Contact`].
fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    let birthday_str: Option<String> = row.get(4)?;
    let birthday = match birthday_str {
        Some(raw) => parse_date_only(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        None => None,
    };

    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        birthday,
        archived: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use friendtracker_shared::ContactError;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn insert_assigns_id_and_defaults_archived() {
        let db = db();
        let ada = db.insert_contact(&NewContact::new("Ada").unwrap()).unwrap();

        assert!(ada.id > 0);
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.birthday, None);
        assert!(!ada.archived);

        let bob = db.insert_contact(&NewContact::new("Bob").unwrap()).unwrap();
        assert_ne!(ada.id, bob.id);
    }

    #[test]
    fn insert_trims_and_rejects_blank_names() {
        let db = db();
        let raw = NewContact {
            name: "  Grace  ".into(),
            email: Some(" ".into()),
            phone: None,
            birthday: Some(date(1906, 12, 9)),
        };
        let grace = db.insert_contact(&raw).unwrap();
        assert_eq!(grace.name, "Grace");
        assert_eq!(grace.email, None);
        assert_eq!(grace.birthday, Some(date(1906, 12, 9)));

        let blank = NewContact {
            name: "   ".into(),
            email: None,
            phone: None,
            birthday: None,
        };
        assert!(matches!(
            db.insert_contact(&blank),
            Err(StoreError::Invalid(ContactError::EmptyName))
        ));
    }

    #[test]
    fn list_filters_on_archived() {
        let db = db();
        let ada = db.insert_contact(&NewContact::new("Ada").unwrap()).unwrap();
        let bob = db.insert_contact(&NewContact::new("Bob").unwrap()).unwrap();
        db.update_contact(bob.id, &ContactPatch::archive()).unwrap();

        let active = db.list_contacts(&ContactFilter::working_set(false)).unwrap();
        assert_eq!(active.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ada.id]);

        let archived = db
            .list_contacts(&ContactFilter {
                archived: Some(true),
            })
            .unwrap();
        assert_eq!(archived.iter().map(|c| c.id).collect::<Vec<_>>(), vec![bob.id]);

        let all = db.list_contacts(&ContactFilter::all()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn update_merges_partial_fields() {
        let db = db();
        let ada = db
            .insert_contact(
                &NewContact::new("Ada")
                    .unwrap()
                    .with_email("ada@example.com")
                    .with_phone("555-0100"),
            )
            .unwrap();

        let updated = db
            .update_contact(
                ada.id,
                &ContactPatch::default()
                    .phone(None)
                    .birthday(Some(date(1815, 12, 10))),
            )
            .unwrap();

        assert_eq!(updated.email.as_deref(), Some("ada@example.com"));
        assert_eq!(updated.phone, None);
        assert_eq!(updated.birthday, Some(date(1815, 12, 10)));
        assert_eq!(db.get_contact(ada.id).unwrap(), updated);
    }

    #[test]
    fn update_missing_contact_is_not_found() {
        let db = db();
        assert!(matches!(
            db.update_contact(999, &ContactPatch::archive()),
            Err(StoreError::NotFound(999))
        ));
    }

    #[test]
    fn empty_patch_is_a_read() {
        let db = db();
        let ada = db.insert_contact(&NewContact::new("Ada").unwrap()).unwrap();
        assert_eq!(db.update_contact(ada.id, &ContactPatch::default()).unwrap(), ada);
    }

    #[test]
    fn update_rejects_blank_name() {
        let db = db();
        let ada = db.insert_contact(&NewContact::new("Ada").unwrap()).unwrap();
        assert!(matches!(
            db.update_contact(ada.id, &ContactPatch::default().name(" ")),
            Err(StoreError::Invalid(ContactError::EmptyName))
        ));
        assert_eq!(db.get_contact(ada.id).unwrap().name, "Ada");
    }

    #[test]
    fn delete_removes_row_and_ids_are_not_reused() {
        let db = db();
        let ada = db.insert_contact(&NewContact::new("Ada").unwrap()).unwrap();

        db.delete_contact(ada.id).unwrap();
        assert!(matches!(db.get_contact(ada.id), Err(StoreError::NotFound(_))));
        assert!(matches!(db.delete_contact(ada.id), Err(StoreError::NotFound(_))));

        let bob = db.insert_contact(&NewContact::new("Bob").unwrap()).unwrap();
        assert!(bob.id > ada.id);
    }

    #[test]
    fn legacy_timestamp_birthdays_are_read_as_dates() {
        let db = db();
        db.conn()
            .execute(
                "INSERT INTO contact (name, birthday, created_at) VALUES ('Old', ?1, ?2)",
                params!["1990-05-17T00:00:00+00:00", Utc::now().to_rfc3339()],
            )
            .unwrap();

        let all = db.list_contacts(&ContactFilter::all()).unwrap();
        assert_eq!(all[0].birthday, Some(date(1990, 5, 17)));
    }
}
