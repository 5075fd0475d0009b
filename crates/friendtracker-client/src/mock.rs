//! In-memory [`ContactService`] doubles for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::oneshot;

use friendtracker_shared::{Contact, ContactFilter, ContactPatch, NewContact};

use crate::error::ServiceError;
use crate::service::ContactService;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn contact(id: i64, name: &str, birthday: Option<NaiveDate>, archived: bool) -> Contact {
    Contact {
        id,
        name: name.to_string(),
        email: None,
        phone: None,
        birthday,
        archived,
    }
}

fn unavailable() -> ServiceError {
    ServiceError::Rejected {
        status: 503,
        message: "service unavailable".into(),
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::Rejected {
        status: 404,
        message: format!("Contact not found: {id}"),
    }
}

/// Behaves like the real service: assigns ids, filters on `archived`, merges
/// patches.  Every `select` filter is recorded.
#[derive(Default)]
pub struct MockService {
    rows: RefCell<BTreeMap<i64, Contact>>,
    selects: RefCell<Vec<ContactFilter>>,
    fail_select: Cell<bool>,
    fail_mutations: Cell<bool>,
}

impl MockService {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        let service = Self::default();
        service
            .rows
            .borrow_mut()
            .extend(contacts.into_iter().map(|c| (c.id, c)));
        service
    }

    pub fn filters(&self) -> Vec<ContactFilter> {
        self.selects.borrow().clone()
    }

    pub fn stored(&self, id: i64) -> Option<Contact> {
        self.rows.borrow().get(&id).cloned()
    }

    pub fn fail_select(&self, fail: bool) {
        self.fail_select.set(fail);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.set(fail);
    }

    fn check_mutation(&self) -> Result<(), ServiceError> {
        if self.fail_mutations.get() {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ContactService for MockService {
    async fn select(&self, filter: &ContactFilter) -> Result<Vec<Contact>, ServiceError> {
        self.selects.borrow_mut().push(*filter);
        if self.fail_select.get() {
            return Err(unavailable());
        }
        Ok(self
            .rows
            .borrow()
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn insert(&self, contact: &NewContact) -> Result<Contact, ServiceError> {
        self.check_mutation()?;
        let mut rows = self.rows.borrow_mut();
        let id = rows.keys().next_back().map_or(1, |last| last + 1);
        let created = Contact {
            id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            birthday: contact.birthday,
            archived: false,
        };
        rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact, ServiceError> {
        self.check_mutation()?;
        let mut rows = self.rows.borrow_mut();
        let row = rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        row.apply(patch);
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.check_mutation()?;
        self.rows
            .borrow_mut()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

/// A service whose `select` calls each wait on a test-controlled channel, in
/// the order they were pushed.  Mutations are not supported.
#[derive(Default)]
pub struct GatedService {
    gates: RefCell<VecDeque<oneshot::Receiver<Result<Vec<Contact>, ServiceError>>>>,
}

impl GatedService {
    pub fn push(&self, gate: oneshot::Receiver<Result<Vec<Contact>, ServiceError>>) {
        self.gates.borrow_mut().push_back(gate);
    }
}

#[async_trait(?Send)]
impl ContactService for GatedService {
    async fn select(&self, _filter: &ContactFilter) -> Result<Vec<Contact>, ServiceError> {
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(gate) => gate.await.unwrap_or_else(|_| Err(unavailable())),
            None => Err(unavailable()),
        }
    }

    async fn insert(&self, _contact: &NewContact) -> Result<Contact, ServiceError> {
        Err(unavailable())
    }

    async fn update(&self, id: i64, _patch: &ContactPatch) -> Result<Contact, ServiceError> {
        Err(not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        Err(not_found(id))
    }
}
