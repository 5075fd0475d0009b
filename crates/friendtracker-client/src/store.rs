//! The contact store: the session's single source of contact state.
//!
//! [`ContactStore`] holds the working set fetched from a [`ContactService`],
//! routes every mutation through the service, and derives the sorted list
//! views render.  It never patches its collection locally: each confirmed
//! mutation is followed by a full refetch, so the collection is always the
//! last successful fetch.
//!
//! The store lives on a single event-loop task.  State sits in `Cell`s and a
//! `RefCell` that are never borrowed across an `.await`, so overlapping
//! operations (a refresh started while another is in flight) are fine.
//!
//! Overlapping refreshes resolve as *latest-issued wins*: each refresh takes a
//! ticket, and a successful response replaces the collection only if no
//! later-issued refresh has been applied yet.  A slow response to an older
//! refresh is dropped once a newer one has landed; if the newer one fails,
//! the older success still counts as the last successful fetch.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::Future;

use chrono::{Local, NaiveDate};
use tracing::{debug, error, info};

use friendtracker_shared::sort::{self, SortDirection, SortField, SortOrder};
use friendtracker_shared::{Contact, ContactFilter, ContactPatch, NewContact};

use crate::error::ServiceError;
use crate::service::ContactService;

pub struct ContactStore<S> {
    service: S,
    contacts: RefCell<BTreeMap<i64, Contact>>,
    sort_order: Cell<SortOrder>,
    show_archived: Cell<bool>,
    /// Refreshes currently awaiting the service.
    in_flight: Cell<usize>,
    /// Ticket of the most recently issued refresh.
    latest_ticket: Cell<u64>,
    /// Ticket of the refresh whose response the collection holds.
    applied_ticket: Cell<u64>,
}

/// Keeps `in_flight` honest even if a refresh future is dropped mid-await.
struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl<S: ContactService> ContactStore<S> {
    /// A store with an empty collection.  No I/O happens until [`refresh`].
    ///
    /// [`refresh`]: ContactStore::refresh
    pub fn new(service: S) -> Self {
        Self {
            service,
            contacts: RefCell::new(BTreeMap::new()),
            sort_order: Cell::new(SortOrder::default()),
            show_archived: Cell::new(false),
            in_flight: Cell::new(0),
            latest_ticket: Cell::new(0),
            applied_ticket: Cell::new(0),
        }
    }

    /// Construct the store and load the initial working set.
    pub async fn open(service: S) -> Self {
        let store = Self::new(service);
        store.refresh().await;
        store
    }

    /// Choose the initial archive visibility before the first fetch.
    pub fn with_show_archived(self, show: bool) -> Self {
        self.show_archived.set(show);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    // ------------------------------------------------------------------
    // Read-only view state
    // ------------------------------------------------------------------

    /// The sorted projection as of today's local date.
    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts_as_of(Local::now().date_naive())
    }

    /// The sorted projection with birthday distances measured from `today`.
    pub fn contacts_as_of(&self, today: NaiveDate) -> Vec<Contact> {
        let contacts = self.contacts.borrow();
        sort::sorted(contacts.values().cloned(), self.sort_order.get(), today)
    }

    /// Lookup in the current collection.  Unknown ids are `None`, not errors.
    pub fn get(&self, id: i64) -> Option<Contact> {
        self.contacts.borrow().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.contacts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.borrow().is_empty()
    }

    pub fn loading(&self) -> bool {
        self.in_flight.get() > 0
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.get()
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_order.get().field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_order.get().direction
    }

    pub fn show_archived(&self) -> bool {
        self.show_archived.get()
    }

    // ------------------------------------------------------------------
    // Synchronous transitions
    // ------------------------------------------------------------------

    pub fn set_sorting(&self, field: SortField, direction: SortDirection) {
        self.sort_order.set(SortOrder::new(field, direction));
    }

    /// Column-header behaviour: flip the active column, or switch to `field`
    /// ascending.
    pub fn toggle_sort(&self, field: SortField) {
        self.sort_order.set(self.sort_order.get().toggle(field));
    }

    /// Change archive visibility.  The server-side filter changes with it, so
    /// a real change triggers a refresh.
    pub async fn set_show_archived(&self, show: bool) {
        if self.show_archived.replace(show) == show {
            return;
        }
        debug!(show_archived = show, "Archive visibility changed");
        self.refresh().await;
    }

    // ------------------------------------------------------------------
    // Remote operations
    // ------------------------------------------------------------------

    /// Refetch the working set.
    ///
    /// Failures are logged and leave the previous collection in place.
    pub async fn refresh(&self) {
        let ticket = self.latest_ticket.get() + 1;
        self.latest_ticket.set(ticket);
        let filter = ContactFilter::working_set(self.show_archived.get());

        let result = {
            let _in_flight = InFlight::enter(&self.in_flight);
            self.service.select(&filter).await
        };

        match result {
            Ok(contacts) if ticket > self.applied_ticket.get() => {
                debug!(count = contacts.len(), archived = ?filter.archived, "Fetched contacts");
                self.applied_ticket.set(ticket);
                *self.contacts.borrow_mut() = contacts.into_iter().map(|c| (c.id, c)).collect();
            }
            Ok(_) => {
                debug!(ticket, applied = self.applied_ticket.get(), "Dropping superseded fetch");
            }
            Err(e) => {
                error!(error = %e, "Error fetching contacts");
            }
        }
    }

    /// Insert a contact.  It enters the collection with the refresh that
    /// follows a successful insert.
    pub async fn create(&self, contact: NewContact) -> Result<Contact, ServiceError> {
        let created = self
            .mutate("creating", self.service.insert(&contact))
            .await?;
        info!(id = created.id, "Contact created");
        Ok(created)
    }

    /// Merge `patch` into contact `id`.
    pub async fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, ServiceError> {
        let updated = self
            .mutate("updating", self.service.update(id, &patch))
            .await?;
        info!(id, "Contact updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.mutate("deleting", self.service.delete(id)).await?;
        info!(id, "Contact deleted");
        Ok(())
    }

    pub async fn archive(&self, id: i64) -> Result<Contact, ServiceError> {
        let archived = self
            .mutate("archiving", self.service.update(id, &ContactPatch::archive()))
            .await?;
        info!(id, "Contact archived");
        Ok(archived)
    }

    pub async fn unarchive(&self, id: i64) -> Result<Contact, ServiceError> {
        let restored = self
            .mutate("unarchiving", self.service.update(id, &ContactPatch::unarchive()))
            .await?;
        info!(id, "Contact unarchived");
        Ok(restored)
    }

    /// Await a service mutation; refresh on success, log and propagate on
    /// failure.  The collection is untouched when the mutation fails.
    async fn mutate<T>(
        &self,
        action: &'static str,
        call: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match call.await {
            Ok(value) => {
                self.refresh().await;
                Ok(value)
            }
            Err(e) => {
                error!(action, error = %e, "Error {action} contact");
                Err(e)
            }
        }
    }
}
