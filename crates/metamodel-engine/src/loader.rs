//! Specification loader and cache
//!
//! The cache maps each type key to a [`SpecHandle`]. The first caller to
//! ask for a key atomically inserts a `Building` handle and builds the
//! specification outside the map lock; everyone else gets the same handle.
//! A build requested again while it is running (a cyclic type graph on the
//! building thread, or a concurrent caller) returns the placeholder at once.
//! Callers that need the finished specification call [`SpecHandle::wait`].
//!
//! Types referenced during a build are claimed and queued on the building
//! thread instead of being built in place. The outermost request drains that
//! queue, so the stack depth stays flat however long a reference chain is.
//!
//! Each key is built at most once for the lifetime of the loader.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metamodel_types::TypeKey;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::diagnostic::FailureSet;
use crate::error::{IntrospectError, LoadError};
use crate::introspect::Introspector;
use crate::model::ProgrammingModel;
use crate::pipeline::{panic_message, Pipeline};
use crate::rule::{RuleEnv, SpecResolver};
use crate::source::TypeSource;
use crate::spec::Specification;
use crate::validate::{self, SpecGraph};

const DEADLINE_EXCEEDED: &str = "build deadline exceeded";

/// Build state of a cached specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecState {
    /// Placeholder; construction in progress
    Building,
    /// Finished and immutable
    Built,
    /// Finished but unsound: a fatal build error or a failed validation
    Invalid,
}

struct Slot {
    state: SpecState,
    spec: Option<Arc<Specification>>,
}

/// Cache entry for one type key
pub struct SpecHandle {
    key: TypeKey,
    builder: ThreadId,
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl SpecHandle {
    fn building(key: TypeKey) -> Self {
        Self {
            key,
            builder: thread::current().id(),
            slot: Mutex::new(Slot {
                state: SpecState::Building,
                spec: None,
            }),
            ready: Condvar::new(),
        }
    }

    /// Type identity; available even while building
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Current state
    pub fn state(&self) -> SpecState {
        self.slot.lock().state
    }

    /// Whether construction has finished
    pub fn is_ready(&self) -> bool {
        self.state() != SpecState::Building
    }

    /// The specification, once construction has finished
    pub fn specification(&self) -> Option<Arc<Specification>> {
        self.slot.lock().spec.clone()
    }

    /// Block until construction finishes.
    ///
    /// Fails with [`LoadError::Reentrant`] instead of deadlocking when the
    /// calling thread is the one building this specification.
    pub fn wait(&self) -> Result<Arc<Specification>, LoadError> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(spec) = &slot.spec {
                return Ok(Arc::clone(spec));
            }
            self.check_reentrant()?;
            self.ready.wait(&mut slot);
        }
    }

    /// [`wait`](Self::wait) with an upper bound
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Arc<Specification>, LoadError> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            if let Some(spec) = &slot.spec {
                return Ok(Arc::clone(spec));
            }
            self.check_reentrant()?;
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.spec.clone().ok_or_else(|| LoadError::Timeout {
                    key: self.key.clone(),
                });
            }
        }
    }

    fn check_reentrant(&self) -> Result<(), LoadError> {
        if thread::current().id() == self.builder {
            return Err(LoadError::Reentrant {
                key: self.key.clone(),
            });
        }
        Ok(())
    }

    /// Publish a finished specification. Only the first publish wins.
    fn publish(&self, spec: Specification, state: SpecState) -> bool {
        let mut slot = self.slot.lock();
        if slot.state != SpecState::Building {
            return false;
        }
        slot.state = state;
        slot.spec = Some(Arc::new(spec));
        drop(slot);
        self.ready.notify_all();
        true
    }

    fn mark_invalid(&self) -> bool {
        let mut slot = self.slot.lock();
        if slot.state != SpecState::Built {
            return false;
        }
        slot.state = SpecState::Invalid;
        true
    }
}

impl std::fmt::Debug for SpecHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecHandle")
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

/// Builds and caches specifications
pub struct SpecificationLoader {
    source: Arc<dyn TypeSource>,
    model: ProgrammingModel,
    cache: DashMap<TypeKey, Arc<SpecHandle>>,
    // Per-thread queue of claimed keys; present while the thread drains it
    queues: DashMap<ThreadId, VecDeque<Arc<SpecHandle>>>,
    builds: AtomicUsize,
    halted: AtomicBool,
    validation: Mutex<FailureSet>,
}

impl SpecificationLoader {
    /// Create a loader over `source` using `model`
    pub fn new(source: Arc<dyn TypeSource>, model: ProgrammingModel) -> Self {
        Self {
            source,
            model,
            cache: DashMap::new(),
            queues: DashMap::new(),
            builds: AtomicUsize::new(0),
            halted: AtomicBool::new(false),
            validation: Mutex::new(FailureSet::new()),
        }
    }

    /// The programming model in use
    pub fn model(&self) -> &ProgrammingModel {
        &self.model
    }

    /// The type source in use
    pub fn source(&self) -> &dyn TypeSource {
        self.source.as_ref()
    }

    /// Handle for `key`, building the specification on first request.
    ///
    /// Never fails: a type that cannot be built, or whose source or rules
    /// panic, is published as an `Invalid` stub. If the specification is
    /// already being built, by this thread or another, the in-progress
    /// handle is returned immediately. Called while this thread is building
    /// another type, a new key is only claimed and queued; it is built
    /// before the outermost request returns.
    pub fn specification_for(&self, key: &TypeKey) -> Arc<SpecHandle> {
        let handle = match self.cache.entry(key.clone()) {
            Entry::Occupied(entry) => return Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let handle = Arc::new(SpecHandle::building(key.clone()));
                entry.insert(Arc::clone(&handle));
                handle
            }
        };

        let thread = thread::current().id();
        match self.queues.entry(thread) {
            Entry::Occupied(mut queue) => {
                queue.get_mut().push_back(Arc::clone(&handle));
                return handle;
            }
            Entry::Vacant(queue) => {
                queue.insert(VecDeque::new());
            }
        }
        self.drain(thread, &handle);
        handle
    }

    /// Build (if needed) and wait for the specification of `key`
    pub fn load(&self, key: &TypeKey) -> Result<Arc<Specification>, LoadError> {
        self.specification_for(key).wait()
    }

    /// Cached handle for `key`, without building anything
    pub fn handle(&self, key: &TypeKey) -> Option<Arc<SpecHandle>> {
        self.cache.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Build `first`, then every key this thread claims meanwhile
    fn drain(&self, thread: ThreadId, first: &SpecHandle) {
        self.build(first);
        loop {
            let queued = self
                .queues
                .get_mut(&thread)
                .and_then(|mut queue| queue.pop_front());
            let Some(handle) = queued else {
                break;
            };
            if self.halted.load(Ordering::Acquire) {
                self.abandon(&handle, DEADLINE_EXCEEDED);
            } else {
                self.build(&handle);
            }
        }
        self.queues.remove(&thread);
    }

    fn build(&self, handle: &SpecHandle) {
        let key = handle.key();
        if handle.is_ready() {
            tracing::debug!(%key, "skipping build of an abandoned specification");
            return;
        }
        let started = Instant::now();
        self.builds.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%key, "building specification");

        let env = RuleEnv::new(self.model.config(), self.source.as_ref(), self);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let introspection = Introspector::new(self.source.as_ref()).introspect(key)?;
            for supertype in &introspection.supertypes {
                self.specification_for(supertype);
            }
            let pipeline = Pipeline::new(self.model.rules(), &env);
            Ok::<_, IntrospectError>(pipeline.run(introspection))
        }));
        let mut spec = match outcome {
            Ok(Ok(spec)) => spec,
            Ok(Err(err)) => Specification::stub(key.clone(), err.to_string()),
            Err(payload) => Specification::stub(
                key.clone(),
                format!("build panicked: {}", panic_message(payload.as_ref())),
            ),
        };

        let state = if spec.is_stub() {
            tracing::warn!(%key, "specification could not be built");
            SpecState::Invalid
        } else {
            SpecState::Built
        };
        spec.freeze();

        if handle.publish(spec, state) {
            tracing::debug!(%key, ?state, elapsed = ?started.elapsed(), "specification published");
        } else {
            tracing::debug!(%key, "late build discarded");
        }
    }

    fn abandon(&self, handle: &SpecHandle, reason: &str) -> bool {
        let stub = Specification::stub(handle.key().clone(), reason);
        let abandoned = handle.publish(stub, SpecState::Invalid);
        if abandoned {
            tracing::warn!(key = %handle.key(), reason, "specification abandoned");
        }
        abandoned
    }

    /// Snapshot of every finished specification, sorted by key
    pub fn all_built_specifications(&self) -> Vec<Arc<Specification>> {
        let mut specs: Vec<Arc<Specification>> = self
            .cache
            .iter()
            .filter_map(|entry| entry.value().specification())
            .collect();
        specs.sort_by(|a, b| a.key().cmp(b.key()));
        specs
    }

    /// Number of full constructions performed so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Number of cached keys, finished or not
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing has been requested yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Publish every still-building specification as an `Invalid` stub.
    ///
    /// The builders keep running, but whatever they publish later is
    /// discarded. Returns the number of abandoned handles.
    pub fn abandon_pending(&self, reason: &str) -> usize {
        let pending: Vec<Arc<SpecHandle>> = self
            .cache
            .iter()
            .filter(|entry| entry.value().state() == SpecState::Building)
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        pending
            .iter()
            .filter(|handle| self.abandon(handle, reason))
            .count()
    }

    /// Pre-warm `keys` on one worker per CPU
    pub fn load_all(&self, keys: &[TypeKey]) -> Vec<Arc<SpecHandle>> {
        self.load_parallel(keys, num_cpus::get())
    }

    /// Pre-warm `keys` on `workers` threads.
    ///
    /// With a configured build deadline, every specification still building
    /// when it elapses is abandoned and no further keys are started. Until
    /// the in-flight builders have drained, the types they reference are no
    /// longer claimed, and keys they had already queued are abandoned too.
    /// Returns the handles of the requested keys that were started.
    pub fn load_parallel(&self, keys: &[TypeKey], workers: usize) -> Vec<Arc<SpecHandle>> {
        let deadline = self
            .model
            .config()
            .build_deadline()
            .map(|budget| Instant::now() + budget);
        let (queue_tx, queue_rx) = crossbeam::channel::unbounded::<TypeKey>();
        let (done_tx, done_rx) = crossbeam::channel::unbounded::<()>();
        for key in keys {
            let _ = queue_tx.send(key.clone());
        }
        drop(queue_tx);

        let cancelled = AtomicBool::new(false);
        thread::scope(|scope| {
            for _ in 0..workers.max(1) {
                let queue = queue_rx.clone();
                let done = done_tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move || {
                    while let Ok(key) = queue.recv() {
                        if cancelled.load(Ordering::Acquire) {
                            break;
                        }
                        if let Err(err) = self.specification_for(&key).wait() {
                            tracing::warn!(%key, error = %err, "pre-warm wait failed");
                        }
                        let _ = done.send(());
                    }
                });
            }
            drop(done_tx);

            for _ in 0..keys.len() {
                let received = match deadline {
                    Some(deadline) => done_rx.recv_deadline(deadline).is_ok(),
                    None => done_rx.recv().is_ok(),
                };
                if !received {
                    cancelled.store(true, Ordering::Release);
                    self.halted.store(true, Ordering::Release);
                    let abandoned = self.abandon_pending(DEADLINE_EXCEEDED);
                    tracing::warn!(abandoned, "build deadline exceeded");
                    break;
                }
            }
        });
        self.halted.store(false, Ordering::Release);

        keys.iter().filter_map(|key| self.handle(key)).collect()
    }

    /// Run the model's validators over every finished specification.
    ///
    /// Specifications with a failure of `Error` or worse move to `Invalid`.
    /// The failures are kept for [`report`](Self::report).
    pub fn validate(&self) -> FailureSet {
        let graph = SpecGraph::new(self.all_built_specifications());
        let failures = validate::validate(self.model.validators(), &graph);

        for failure in failures.disqualifying() {
            if let Some(handle) = self.handle(&failure.location.type_key) {
                if handle.mark_invalid() {
                    tracing::debug!(key = %handle.key(), "specification invalidated");
                }
            }
        }
        *self.validation.lock() = failures.clone();
        failures
    }

    /// Build diagnostics of every finished specification plus the failures
    /// of the last validation pass
    pub fn report(&self) -> FailureSet {
        let mut report: FailureSet = self
            .all_built_specifications()
            .iter()
            .flat_map(|spec| spec.diagnostics().iter().cloned())
            .collect();
        report.append(self.validation.lock().clone());
        report
    }
}

impl SpecResolver for SpecificationLoader {
    fn request(&self, key: &TypeKey) {
        if self.halted.load(Ordering::Acquire) {
            tracing::debug!(%key, "build deadline passed, reference not followed");
            return;
        }
        self.specification_for(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TypeRegistry;
    use metamodel_types::ReflectedType;

    fn loader() -> SpecificationLoader {
        let registry = TypeRegistry::with_builtin_values().with(ReflectedType::new("Customer"));
        SpecificationLoader::new(Arc::new(registry), ProgrammingModel::default_model())
    }

    #[test]
    fn test_wait_on_own_placeholder_is_reentrant_error() {
        let handle = SpecHandle::building(TypeKey::new("Node"));
        assert_eq!(handle.state(), SpecState::Building);
        assert_eq!(
            handle.wait(),
            Err(LoadError::Reentrant {
                key: TypeKey::new("Node")
            })
        );
    }

    #[test]
    fn test_wait_timeout_from_other_thread() {
        let handle = Arc::new(SpecHandle::building(TypeKey::new("Slow")));
        let waiter = Arc::clone(&handle);
        let result = thread::spawn(move || waiter.wait_timeout(Duration::from_millis(20)))
            .join()
            .unwrap();
        assert_eq!(
            result,
            Err(LoadError::Timeout {
                key: TypeKey::new("Slow")
            })
        );
    }

    #[test]
    fn test_first_publish_wins() {
        let handle = SpecHandle::building(TypeKey::new("A"));
        assert!(handle.publish(Specification::stub(TypeKey::new("A"), "first"), SpecState::Invalid));
        assert!(!handle.publish(Specification::stub(TypeKey::new("A"), "second"), SpecState::Built));
        assert_eq!(handle.state(), SpecState::Invalid);
        assert_eq!(
            handle.specification().unwrap().diagnostics()[0].message,
            "first"
        );
    }

    #[test]
    fn test_cached_after_first_build() {
        let loader = loader();
        let key = TypeKey::new("Customer");

        let first = loader.load(&key).unwrap();
        let second = loader.load(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.build_count(), 1);
        assert_eq!(loader.handle(&key).unwrap().state(), SpecState::Built);
    }

    #[test]
    fn test_unknown_type_becomes_invalid_stub() {
        let loader = loader();
        let handle = loader.specification_for(&TypeKey::new("Ghost"));

        assert_eq!(handle.state(), SpecState::Invalid);
        let spec = handle.specification().unwrap();
        assert!(spec.is_stub());
        assert!(spec.members().is_empty());
        assert!(!loader.report().is_sound());
    }

    #[test]
    fn test_abandon_pending() {
        let loader = loader();
        let key = TypeKey::new("Pending");
        loader
            .cache
            .insert(key.clone(), Arc::new(SpecHandle::building(key.clone())));

        assert_eq!(loader.abandon_pending("deadline"), 1);
        let handle = loader.handle(&key).unwrap();
        assert_eq!(handle.state(), SpecState::Invalid);
        assert!(handle.specification().unwrap().is_stub());
        assert_eq!(loader.abandon_pending("again"), 0);
    }

    #[test]
    fn test_halted_loader_abandons_queued_builds() {
        let loader = loader();
        let thread = thread::current().id();
        let first = Arc::new(SpecHandle::building(TypeKey::new("Customer")));
        let queued = Arc::new(SpecHandle::building(TypeKey::new("string")));
        loader.cache.insert(first.key().clone(), Arc::clone(&first));
        loader.cache.insert(queued.key().clone(), Arc::clone(&queued));
        loader.queues.insert(thread, VecDeque::from([Arc::clone(&queued)]));
        loader.halted.store(true, Ordering::Release);

        loader.drain(thread, &first);
        assert_eq!(first.state(), SpecState::Built);
        assert_eq!(queued.state(), SpecState::Invalid);
        assert!(queued.specification().unwrap().diagnostics()[0]
            .message
            .contains("deadline"));
        assert!(loader.queues.is_empty());
        assert_eq!(loader.build_count(), 1);

        loader.request(&TypeKey::new("int"));
        assert!(loader.handle(&TypeKey::new("int")).is_none());
    }
}
