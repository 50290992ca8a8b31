//! # sovran-handlemap
//!
//! A thread-safe heterogeneous container that hands out typed handles.
//!
//! `sovran-handlemap` stores values of any type in a single container and gives
//! the caller back a [`Handle<T>`] for each one. The handle is the only way to
//! reach the value again, and it only works against the container that issued it.
//!
//! ## Key Features
//!
//! - **Owner-checked**: a handle from one container is refused by every other
//! - **Invalidating remove**: removing through a handle tombstones that handle
//! - **Type-safe**: values are downcast on the way out, mismatches are errors
//! - **Thread-safe**: one `parking_lot::RwLock` guards the store; reads run in parallel
//! - **Audit hooks**: optional zero-argument callbacks after each successful operation
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_handlemap::{Container, HandleError};
//!
//! fn main() -> Result<(), HandleError> {
//!     let container = Container::default();
//!
//!     // Store values of different types
//!     let number = container.store(42i32)?;
//!     let text = container.store("Hello, world!".to_string())?;
//!
//!     // Handles remember the type, so no annotations are needed
//!     let n = container.fetch(number)?;
//!     let t = container.fetch(text)?;
//!     println!("{} {}", n, t);
//!
//!     container.update(number, n + 1)?;
//!     assert_eq!(container.fetch(number)?, 43);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Handle Lifecycle
//!
//! ```rust
//! use sovran_handlemap::{Container, HandleError};
//!
//! let first = Container::default();
//! let second = Container::default();
//!
//! let mut handle = first.store("x").unwrap();
//! let stale_copy = handle;
//!
//! // Handles are bound to their container
//! assert_eq!(second.fetch(handle), Err(HandleError::IdentityMismatch));
//!
//! // Removing tombstones the handle that was passed in...
//! first.remove(&mut handle).unwrap();
//! assert_eq!(first.fetch(handle), Err(HandleError::DeletedValue));
//!
//! // ...while earlier copies fail because the entry is gone
//! assert_eq!(first.fetch(stale_copy), Err(HandleError::ValueNotFound));
//! assert_eq!(first.len(), 0);
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_handlemap::{Container, HandleError};
//!
//! let container = Container::default();
//! let handle = container.store(vec!["setting1", "setting2"]).unwrap();
//!
//! match container.fetch(handle.cast::<String>()) {
//!     Ok(value) => println!("Config: {}", value),
//!     Err(HandleError::TypeCast { expected, found }) => {
//!         println!("wanted {}, container holds {}", expected, found)
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

mod any_value;
mod container;
mod error;
mod handle;
mod hooks;
mod identity;

pub use container::Container;
pub use error::{HandleError, Result};
pub use handle::Handle;
pub use hooks::{AuditHooks, Operation};
pub use identity::Identity;
