use crate::error::HandleError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The container operations that can trigger an audit hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A value was stored and a handle issued
    Store,
    /// A value was read through `fetch` or `with`
    Fetch,
    /// A value was replaced or modified through `update` or `with_mut`
    Update,
    /// A value was removed and its handle tombstoned
    Remove,
}

impl Operation {
    /// All operations, in declaration order
    pub const ALL: [Operation; 4] = [
        Operation::Store,
        Operation::Fetch,
        Operation::Update,
        Operation::Remove,
    ];

    /// The name a hook is registered under
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Store => "Store",
            Operation::Fetch => "Fetch",
            Operation::Update => "Update",
            Operation::Remove => "Remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| HandleError::UnknownOperation(s.to_string()))
    }
}

type Hook = Arc<dyn Fn() + Send + Sync>;

/// Side-channel callbacks fired after a successful operation.
///
/// Hooks take no arguments and see nothing of the value, key or outcome.
/// They run on the caller's thread once the container lock has been
/// released, so a hook may call back into the same container.
///
/// # Examples
///
/// ```
/// use sovran_handlemap::{AuditHooks, Container, Operation};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let stores = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&stores);
///
/// let hooks = AuditHooks::new().on(Operation::Store, move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// let container = Container::new(hooks);
/// container.store(1u8).unwrap();
/// container.store("two").unwrap();
/// assert_eq!(stores.load(Ordering::SeqCst), 2);
/// ```
#[derive(Clone, Default)]
pub struct AuditHooks {
    hooks: HashMap<Operation, Hook>,
}

impl AuditHooks {
    /// Creates an empty hook set
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for `op`, replacing any previous hook for it
    pub fn on<F>(mut self, op: Operation, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.insert(op, Arc::new(hook));
        self
    }

    /// Registers a hook by operation name ("Store", "Fetch", "Update" or "Remove")
    ///
    /// # Errors
    ///
    /// Returns `HandleError::UnknownOperation` if `name` is not one of the four.
    pub fn on_named<F>(self, name: &str, hook: F) -> Result<Self, HandleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let op = name.parse::<Operation>()?;
        Ok(self.on(op, hook))
    }

    /// True if a hook is registered for `op`
    pub fn contains(&self, op: Operation) -> bool {
        self.hooks.contains_key(&op)
    }

    /// Number of operations with a registered hook
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// True if no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs the hook registered for `op`, if any
    pub(crate) fn fire(&self, op: Operation) {
        if let Some(hook) = self.hooks.get(&op) {
            hook();
        }
    }
}

impl fmt::Debug for AuditHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ops: Vec<&'static str> = self.hooks.keys().map(Operation::as_str).collect();
        ops.sort_unstable();
        f.debug_struct("AuditHooks").field("operations", &ops).finish()
    }
}
