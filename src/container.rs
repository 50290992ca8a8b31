use crate::any_value::AnyValue;
use crate::error::{HandleError, Result};
use crate::handle::Handle;
use crate::hooks::{AuditHooks, Operation};
use crate::identity::{Identity, StoreKey};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct Inner {
    identity: Identity,
    removed_id: Identity,
    data: RwLock<HashMap<StoreKey, AnyValue>>,
    hooks: AuditHooks,
}

/// A thread-safe heterogeneous container addressed by typed handles.
///
/// Every call to [`store`](Container::store) returns a [`Handle<T>`] that only
/// this container accepts. Cloning a `Container` is cheap and yields another
/// view of the same store: clones share identities, entries and hooks.
///
/// # Examples
///
/// ```
/// use sovran_handlemap::{Container, HandleError};
///
/// let container = Container::default();
///
/// let mut answer = container.store(42)?;
/// let name = container.store("Ada".to_string())?;
///
/// assert_eq!(container.fetch(answer)?, 42);
/// container.update(answer, 43)?;
/// assert_eq!(container.fetch(answer)?, 43);
///
/// container.remove(&mut answer)?;
/// assert_eq!(container.fetch(answer), Err(HandleError::DeletedValue));
///
/// assert_eq!(container.fetch(name)?, "Ada");
/// assert_eq!(container.to_string(), "Length: 1");
/// # Ok::<(), HandleError>(())
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    /// Creates an empty container with fresh owner and tombstone identities
    pub fn new(hooks: AuditHooks) -> Self {
        let identity = Identity::generate();
        let mut removed_id = Identity::generate();
        while removed_id == identity {
            removed_id = Identity::generate();
        }

        Self {
            inner: Arc::new(Inner {
                identity,
                removed_id,
                data: RwLock::new(HashMap::new()),
                hooks,
            }),
        }
    }

    /// The identity stamped on every handle this container issues
    pub fn identity(&self) -> Identity {
        self.inner.identity
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    /// True if the container holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.data.read().is_empty()
    }

    /// True if `value` is this container (or a clone of it) in disguise
    fn is_self(&self, value: &dyn Any) -> bool {
        if let Some(container) = value.downcast_ref::<Container>() {
            return container.inner.identity == self.inner.identity;
        }
        if let Some(container) = value.downcast_ref::<Arc<Container>>() {
            return container.inner.identity == self.inner.identity;
        }
        false
    }

    fn reject(&self, op: Operation, key: StoreKey, err: HandleError) -> HandleError {
        tracing::debug!(
            container = %self.inner.identity,
            %key,
            operation = %op,
            error = %err,
            "operation rejected"
        );
        err
    }

    fn reject_self(&self, op: Operation) -> HandleError {
        tracing::debug!(
            container = %self.inner.identity,
            operation = %op,
            "refused to store container inside itself"
        );
        HandleError::SelfStorage
    }

    /// Tombstone first, then owner. A removed handle always reports
    /// `DeletedValue`, whatever else is true about it.
    fn check<T>(&self, handle: &Handle<T>) -> Result<()> {
        if handle.owner == self.inner.removed_id {
            tracing::debug!(key = %handle.key, "rejected removed handle");
            return Err(HandleError::DeletedValue);
        }
        if handle.owner != self.inner.identity {
            tracing::debug!(
                container = %self.inner.identity,
                owner = %handle.owner,
                "rejected foreign handle"
            );
            return Err(HandleError::IdentityMismatch);
        }
        Ok(())
    }

    /// Stores a value and returns the handle for it
    ///
    /// # Errors
    ///
    /// Returns `HandleError::SelfStorage` if `value` is this very container.
    pub fn store<T>(&self, value: T) -> Result<Handle<T>>
    where
        T: Any + Send + Sync,
    {
        if self.is_self(&value) {
            return Err(self.reject_self(Operation::Store));
        }

        let key = StoreKey::generate();
        self.inner.data.write().insert(key, AnyValue::new(value));

        tracing::trace!(container = %self.inner.identity, %key, "stored value");
        self.inner.hooks.fire(Operation::Store);

        Ok(Handle::new(self.inner.identity, key))
    }

    /// Returns a clone of the value behind `handle`
    ///
    /// The clone is taken under the read lock, so `T::clone` must not touch
    /// this container.
    ///
    /// # Errors
    ///
    /// - `HandleError::DeletedValue` if the handle was removed
    /// - `HandleError::IdentityMismatch` if another container issued it
    /// - `HandleError::ValueNotFound` if the entry no longer exists
    /// - `HandleError::TypeCast` if the entry is not a `T`
    pub fn fetch<T>(&self, handle: Handle<T>) -> Result<T>
    where
        T: Any + Clone,
    {
        self.with(handle, T::clone)
    }

    /// Runs `f` against the value behind `handle` under the read lock
    ///
    /// Fails exactly like [`fetch`](Container::fetch), without requiring `T: Clone`.
    ///
    /// `f` runs while the read lock is held. It must not call back into the
    /// same container, or a queued writer can deadlock both.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_handlemap::{Container, HandleError};
    ///
    /// let container = Container::default();
    /// let numbers = container.store(vec![1, 2, 3])?;
    ///
    /// let total: i32 = container.with(numbers, |v: &Vec<i32>| v.iter().sum())?;
    /// assert_eq!(total, 6);
    /// # Ok::<(), HandleError>(())
    /// ```
    pub fn with<T, F, R>(&self, handle: Handle<T>, f: F) -> Result<R>
    where
        T: Any,
        F: FnOnce(&T) -> R,
    {
        self.check(&handle)?;

        let result = {
            let data = self.inner.data.read();
            let value = data
                .get(&handle.key)
                .ok_or_else(|| self.reject(Operation::Fetch, handle.key, HandleError::ValueNotFound))?;
            let value = value
                .downcast_ref::<T>()
                .map_err(|e| self.reject(Operation::Fetch, handle.key, e))?;
            f(value)
        };

        tracing::trace!(container = %self.inner.identity, key = %handle.key, "fetched value");
        self.inner.hooks.fire(Operation::Fetch);
        Ok(result)
    }

    /// Replaces the value behind `handle`
    ///
    /// # Errors
    ///
    /// - `HandleError::SelfStorage` if `value` is this very container
    /// - `HandleError::DeletedValue` / `HandleError::IdentityMismatch` as for fetch
    /// - `HandleError::MissingValue` if the entry was removed through another copy
    /// - `HandleError::TypeCast` if the entry is not a `T`
    pub fn update<T>(&self, handle: Handle<T>, value: T) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        if self.is_self(&value) {
            return Err(self.reject_self(Operation::Update));
        }
        self.check(&handle)?;

        {
            let mut data = self.inner.data.write();
            let slot = data
                .get_mut(&handle.key)
                .ok_or_else(|| self.reject(Operation::Update, handle.key, HandleError::MissingValue))?;
            if !slot.is_type::<T>() {
                return Err(self.reject(Operation::Update, handle.key, slot.mismatch::<T>()));
            }
            *slot = AnyValue::new(value);
        }

        tracing::trace!(container = %self.inner.identity, key = %handle.key, "updated value");
        self.inner.hooks.fire(Operation::Update);
        Ok(())
    }

    /// Runs `f` against the value behind `handle` under the write lock
    ///
    /// Checks run in the same order as [`update`](Container::update); the
    /// `Update` hook fires once `f` has returned and the lock is released.
    /// `f` runs under the write lock and must not call back into the same
    /// container; doing so deadlocks.
    pub fn with_mut<T, F, R>(&self, handle: Handle<T>, f: F) -> Result<R>
    where
        T: Any,
        F: FnOnce(&mut T) -> R,
    {
        self.check(&handle)?;

        let result = {
            let mut data = self.inner.data.write();
            let value = data
                .get_mut(&handle.key)
                .ok_or_else(|| self.reject(Operation::Update, handle.key, HandleError::MissingValue))?;
            let value = value
                .downcast_mut::<T>()
                .map_err(|e| self.reject(Operation::Update, handle.key, e))?;
            f(value)
        };

        tracing::trace!(container = %self.inner.identity, key = %handle.key, "modified value");
        self.inner.hooks.fire(Operation::Update);
        Ok(result)
    }

    /// Removes the value behind `handle` and invalidates the handle
    ///
    /// Only the handle passed in is invalidated. Copies taken earlier are
    /// refused afterwards with `ValueNotFound` / `MissingValue` rather than
    /// `DeletedValue`.
    ///
    /// # Errors
    ///
    /// - `HandleError::DeletedValue` / `HandleError::IdentityMismatch` as for fetch
    /// - `HandleError::MissingValue` if the entry is already gone
    pub fn remove<T>(&self, handle: &mut Handle<T>) -> Result<()> {
        self.check(handle)?;

        if self.inner.data.write().remove(&handle.key).is_none() {
            return Err(self.reject(Operation::Remove, handle.key, HandleError::MissingValue));
        }
        handle.owner = self.inner.removed_id;

        tracing::trace!(container = %self.inner.identity, key = %handle.key, "removed value");
        self.inner.hooks.fire(Operation::Remove);
        Ok(())
    }

    /// True if `handle` is live for this container and its entry exists
    pub fn contains<T>(&self, handle: &Handle<T>) -> bool {
        self.check(handle).is_ok() && self.inner.data.read().contains_key(&handle.key)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(AuditHooks::default())
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Length: {}", self.len())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("identity", &self.inner.identity)
            .field("len", &self.len())
            .field("hooks", &self.inner.hooks)
            .finish()
    }
}
