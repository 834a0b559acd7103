//! # Mock Stores
//!
//! Utilities for testing coordinators against scripted stores.
//!
//! [`MockStore`] hands out a real [`StoreClient`] whose requests are answered, in order,
//! from a queue of expectations. Failures that are hard to provoke in a real store
//! (an unreachable document store, a cache that refuses writes) become one line of setup.

use crate::framework::{StoreClient, StoreEntity, StoreError, StoreRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response the mock will send back.
enum Expectation<T: StoreEntity> {
    Insert(Result<T::Id, StoreError>),
    InsertMany(Result<Vec<T::Id>, StoreError>),
    Put(Result<(), StoreError>),
    Get(Result<Option<T>, StoreError>),
    Update(Result<T, StoreError>),
    Find(Result<Vec<T>, StoreError>),
    Count(Result<usize, StoreError>),
}

impl<T: StoreEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Insert(_) => "insert",
            Expectation::InsertMany(_) => "insert_many",
            Expectation::Put(_) => "put",
            Expectation::Get(_) => "get",
            Expectation::Update(_) => "update",
            Expectation::Find(_) => "find",
            Expectation::Count(_) => "count",
        }
    }
}

fn request_name<T: StoreEntity>(request: &StoreRequest<T>) -> &'static str {
    match request {
        StoreRequest::Insert { .. } => "insert",
        StoreRequest::InsertMany { .. } => "insert_many",
        StoreRequest::Put { .. } => "put",
        StoreRequest::Get { .. } => "get",
        StoreRequest::Update { .. } => "update",
        StoreRequest::Find { .. } => "find",
        StoreRequest::Count { .. } => "count",
        StoreRequest::Clear { .. } => "clear",
    }
}

/// Runs on the responder task just before a reply is sent.
type Hook = Box<dyn FnOnce() + Send>;

/// Shared state between the mock handle and its responder task.
struct Script<T: StoreEntity> {
    expectations: VecDeque<(Expectation<T>, Option<Hook>)>,
    /// Requests that arrived with no matching expectation.
    unexpected: Vec<&'static str>,
    /// Every request received, in order.
    received: Vec<&'static str>,
}

type SharedScript<T> = Arc<Mutex<Script<T>>>;

fn lock<T: StoreEntity>(script: &SharedScript<T>) -> MutexGuard<'_, Script<T>> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted store with expectation tracking.
///
/// # Example
/// ```ignore
/// let mut items = MockStore::<OrderItem>::new();
/// items.expect_insert_many().return_err(StoreError::Unavailable("down".into()));
///
/// let client = ItemStoreClient::new(items.client());
/// // drive the coordinator...
/// items.verify(); // all expectations consumed, nothing unexpected received
/// ```
///
/// A request with no matching expectation is recorded and its reply channel is dropped,
/// so the caller sees [`StoreError::Dropped`] and [`MockStore::verify`] fails.
pub struct MockStore<T: StoreEntity> {
    client: StoreClient<T>,
    script: SharedScript<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: StoreEntity> MockStore<T> {
    /// Creates a new mock store with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let script = Arc::new(Mutex::new(Script {
            expectations: VecDeque::new(),
            unexpected: Vec::new(),
            received: Vec::new(),
        }));
        let responder_script = script.clone();

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let (expectation, hook) = {
                    let mut script = lock(&responder_script);
                    script.received.push(request_name(&request));
                    match script.expectations.pop_front() {
                        Some((expectation, hook)) => (Some(expectation), hook),
                        None => (None, None),
                    }
                };
                let matched = matches!(
                    (&request, &expectation),
                    (StoreRequest::Insert { .. }, Some(Expectation::Insert(_)))
                        | (StoreRequest::InsertMany { .. }, Some(Expectation::InsertMany(_)))
                        | (StoreRequest::Put { .. }, Some(Expectation::Put(_)))
                        | (StoreRequest::Get { .. }, Some(Expectation::Get(_)))
                        | (StoreRequest::Update { .. }, Some(Expectation::Update(_)))
                        | (StoreRequest::Find { .. }, Some(Expectation::Find(_)))
                        | (StoreRequest::Count { .. }, Some(Expectation::Count(_)))
                );
                let hook = match hook {
                    Some(hook) if matched => {
                        hook();
                        None
                    }
                    hook => hook,
                };

                match (request, expectation) {
                    (StoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::InsertMany { respond_to, .. }, Some(Expectation::InsertMany(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Put { respond_to, .. }, Some(Expectation::Put(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Get { respond_to, .. }, Some(Expectation::Get(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Update { respond_to, .. }, Some(Expectation::Update(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Find { respond_to, .. }, Some(Expectation::Find(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Count { respond_to, .. }, Some(Expectation::Count(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (request, expectation) => {
                        let mut script = lock(&responder_script);
                        script.unexpected.push(request_name(&request));
                        // Put a mismatched expectation back so verify() reports it too.
                        if let Some(expectation) = expectation {
                            script.expectations.push_front((expectation, hook));
                        }
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            script,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    fn push(&self, expectation: Expectation<T>, hook: Option<Hook>) {
        lock(&self.script).expectations.push_back((expectation, hook));
    }

    /// Expects an `insert` operation.
    pub fn expect_insert(&mut self) -> ExpectationBuilder<'_, T, T::Id> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::Insert }
    }

    /// Expects an `insert_many` operation.
    pub fn expect_insert_many(&mut self) -> ExpectationBuilder<'_, T, Vec<T::Id>> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::InsertMany }
    }

    /// Expects a `put` operation.
    pub fn expect_put(&mut self) -> ExpectationBuilder<'_, T, ()> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::Put }
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self) -> ExpectationBuilder<'_, T, Option<T>> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::Get }
    }

    /// Expects an `update` operation.
    pub fn expect_update(&mut self) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::Update }
    }

    /// Expects a `find` operation.
    pub fn expect_find(&mut self) -> ExpectationBuilder<'_, T, Vec<T>> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::Find }
    }

    /// Expects a `count` operation.
    pub fn expect_count(&mut self) -> ExpectationBuilder<'_, T, usize> {
        ExpectationBuilder { mock: self, hook: None, wrap: Expectation::Count }
    }

    /// Names of all requests received so far, in arrival order.
    pub fn received(&self) -> Vec<&'static str> {
        lock(&self.script).received.clone()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    ///
    /// # Panics
    /// Panics with a description of the leftover or unexpected requests.
    pub fn verify(&self) {
        let script = lock(&self.script);
        if !script.unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", script.unexpected);
        }
        if !script.expectations.is_empty() {
            let remaining: Vec<_> = script.expectations.iter().map(|(e, _)| e.name()).collect();
            panic!("Not all expectations were met. Remaining: {remaining:?}");
        }
    }
}

impl<T: StoreEntity> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<'a, T: StoreEntity, R> {
    mock: &'a mut MockStore<T>,
    hook: Option<Hook>,
    wrap: fn(Result<R, StoreError>) -> Expectation<T>,
}

impl<T: StoreEntity, R> ExpectationBuilder<'_, T, R> {
    /// Runs `hook` once the request arrives, before the caller gets its reply.
    /// Useful for changing the world between two steps, e.g. cancelling a token.
    pub fn before_reply(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.mock.push((self.wrap)(Ok(value)), self.hook);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.mock.push((self.wrap)(Err(error)), self.hook);
    }
}
