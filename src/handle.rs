use crate::identity::{Identity, StoreKey};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A typed ticket for one value inside one `Container`.
///
/// Handles are minted by [`Container::store`](crate::Container::store) and are
/// cheap to copy. `T` exists only at compile time; the handle itself carries
/// nothing but the issuing container's identity and the entry key.
///
/// Removing through a handle rewrites *that* handle's identity to the
/// container's tombstone. Copies made before the remove keep the old
/// identity and are rejected through the missing-key path instead.
pub struct Handle<T> {
    pub(crate) owner: Identity,
    pub(crate) key: StoreKey,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(owner: Identity, key: StoreKey) -> Self {
        Self {
            owner,
            key,
            marker: PhantomData,
        }
    }

    /// Re-tags this handle with a different value type.
    ///
    /// Nothing is checked here. Presenting the result to the container
    /// fails with `HandleError::TypeCast` unless the stored value really is a `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_handlemap::{Container, HandleError};
    ///
    /// let container = Container::default();
    /// let handle = container.store(42i32)?;
    ///
    /// let wrong = handle.cast::<String>();
    /// assert!(matches!(container.fetch(wrong), Err(HandleError::TypeCast { .. })));
    /// assert_eq!(container.fetch(handle)?, 42);
    /// # Ok::<(), HandleError>(())
    /// ```
    pub fn cast<U>(self) -> Handle<U> {
        Handle::new(self.owner, self.key)
    }
}

// Manual impls: deriving would demand `T: Clone` and friends.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.key == other.key
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type", &std::any::type_name::<T>())
            .field("owner", &self.owner)
            .field("key", &self.key)
            .finish()
    }
}
