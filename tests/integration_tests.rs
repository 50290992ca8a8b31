use sovran_handlemap::{AuditHooks, Container, HandleError, Operation};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_basic_lifecycle() -> Result<(), HandleError> {
    let container = Container::new(AuditHooks::default());

    let mut handle = container.store(42)?;
    assert_eq!(container.fetch(handle)?, 42);

    container.update(handle, 43)?;
    assert_eq!(container.fetch(handle)?, 43);

    container.remove(&mut handle)?;
    assert_eq!(container.fetch(handle), Err(HandleError::DeletedValue));
    assert_eq!(container.len(), 0);
    assert!(container.is_empty());

    Ok(())
}

#[test]
fn test_removed_handle_fails_everything() -> Result<(), HandleError> {
    let container = Container::default();
    let mut handle = container.store("gone".to_string())?;
    container.store("kept".to_string())?;

    container.remove(&mut handle)?;

    assert_eq!(container.fetch(handle), Err(HandleError::DeletedValue));
    assert_eq!(
        container.update(handle, "back".to_string()),
        Err(HandleError::DeletedValue)
    );
    assert_eq!(container.remove(&mut handle), Err(HandleError::DeletedValue));
    assert_eq!(
        container.with(handle, |s: &String| s.len()),
        Err(HandleError::DeletedValue)
    );
    assert_eq!(
        container.with_mut(handle, |s: &mut String| s.push('!')),
        Err(HandleError::DeletedValue)
    );

    // Failed calls never touch the store
    assert_eq!(container.len(), 1);
    Ok(())
}

#[test]
fn test_foreign_handle_is_mismatch() -> Result<(), HandleError> {
    let c1 = Container::default();
    let c2 = Container::default();
    c2.store("occupant")?;

    let mut handle = c1.store("x")?;

    assert_eq!(c2.fetch(handle), Err(HandleError::IdentityMismatch));
    assert_eq!(c2.update(handle, "y"), Err(HandleError::IdentityMismatch));
    assert_eq!(c2.remove(&mut handle), Err(HandleError::IdentityMismatch));
    assert_eq!(c2.with(handle, |s| s.len()), Err(HandleError::IdentityMismatch));
    assert_eq!(
        c2.with_mut(handle, |s| *s = "z"),
        Err(HandleError::IdentityMismatch)
    );
    assert!(!c2.contains(&handle));

    // The failed remove leaves the handle usable at home
    assert_eq!(c1.fetch(handle)?, "x");
    assert_eq!(c2.len(), 1);
    Ok(())
}

#[test]
fn test_tombstone_checked_before_owner() -> Result<(), HandleError> {
    let c1 = Container::default();
    let c2 = Container::default();

    let mut handle = c1.store(5u64)?;
    c1.remove(&mut handle)?;

    // To any other container a tombstoned handle is just foreign
    assert_eq!(c2.fetch(handle), Err(HandleError::IdentityMismatch));
    assert_eq!(c1.fetch(handle), Err(HandleError::DeletedValue));
    Ok(())
}

#[test]
fn test_type_cast_leaves_value_alone() -> Result<(), HandleError> {
    let container = Container::default();
    let handle = container.store(String::from("text"))?;
    let wrong = handle.cast::<i32>();

    assert!(matches!(
        container.fetch(wrong),
        Err(HandleError::TypeCast { expected: "i32", .. })
    ));
    assert!(matches!(
        container.update(wrong, 7),
        Err(HandleError::TypeCast { .. })
    ));
    assert!(matches!(
        container.with_mut(wrong, |n| *n += 1),
        Err(HandleError::TypeCast { .. })
    ));

    assert_eq!(container.fetch(handle)?, "text");
    assert_eq!(container.len(), 1);
    Ok(())
}

#[test]
fn test_stale_copy_fails_through_missing_key() -> Result<(), HandleError> {
    let container = Container::default();
    let mut handle = container.store(vec![1u8, 2, 3])?;
    let mut copy = handle;

    container.remove(&mut handle)?;

    // The mutated handle reports the tombstone...
    assert_eq!(container.fetch(handle), Err(HandleError::DeletedValue));

    // ...the untouched copy finds no entry instead
    assert_eq!(container.fetch(copy), Err(HandleError::ValueNotFound));
    assert_eq!(container.remove(&mut copy), Err(HandleError::MissingValue));
    assert_eq!(container.update(copy, vec![9]), Err(HandleError::MissingValue));
    assert_eq!(container.with(copy, |v| v.len()), Err(HandleError::ValueNotFound));
    assert_eq!(
        container.with_mut(copy, |v| v.push(4)),
        Err(HandleError::MissingValue)
    );

    // A failed remove does not tombstone the copy
    assert_ne!(copy, handle);
    assert!(container.is_empty());
    Ok(())
}

#[test]
fn test_self_storage() -> Result<(), HandleError> {
    let container = Container::default();
    container.store(1i8)?;

    assert_eq!(
        container.store(container.clone()).err(),
        Some(HandleError::SelfStorage)
    );
    assert_eq!(container.len(), 1);

    // Containers nest fine as long as they are different instances
    let inner = Container::default();
    let nested = container.store(inner.clone())?;
    let leaf = inner.store("leaf")?;
    assert_eq!(container.fetch(nested)?.fetch(leaf)?, "leaf");
    assert_eq!(container.len(), 2);
    Ok(())
}

#[test]
fn test_audit_hooks_fire_on_success_only() -> Result<(), HandleError> {
    let counts: Arc<HashMap<Operation, AtomicUsize>> = Arc::new(
        Operation::ALL
            .into_iter()
            .map(|op| (op, AtomicUsize::new(0)))
            .collect(),
    );

    let mut hooks = AuditHooks::new();
    for op in Operation::ALL {
        let counts = Arc::clone(&counts);
        hooks = hooks.on(op, move || {
            counts[&op].fetch_add(1, Ordering::SeqCst);
        });
    }
    let count = |op: Operation| counts[&op].load(Ordering::SeqCst);

    let container = Container::new(hooks);
    let other = Container::default();

    let mut handle = container.store(1)?;
    container.fetch(handle)?;
    container.update(handle, 2)?;

    assert_eq!(count(Operation::Update), 1);
    container.with_mut(handle, |n| *n += 1)?;
    assert_eq!(count(Operation::Update), 2);
    assert_eq!(count(Operation::Fetch), 1);

    let stale = handle;
    container.remove(&mut handle)?;

    assert_eq!(count(Operation::Store), 1);
    assert_eq!(count(Operation::Fetch), 1);
    assert_eq!(count(Operation::Update), 2);
    assert_eq!(count(Operation::Remove), 1);

    // Failures are silent
    let _ = container.fetch(handle);
    let _ = container.update(handle, 3);
    let _ = container.with_mut(handle, |n| *n += 1);
    let _ = container.with_mut(stale, |n| *n += 1);
    let _ = container.with(stale, |n| *n);
    let _ = container.remove(&mut handle);
    let _ = container.store(container.clone());
    let foreign = other.store(0)?;
    let _ = container.fetch(foreign);
    let _ = container.with_mut(foreign, |n| *n += 1);

    assert_eq!(count(Operation::Store), 1);
    assert_eq!(count(Operation::Fetch), 1);
    assert_eq!(count(Operation::Update), 2);
    assert_eq!(count(Operation::Remove), 1);
    Ok(())
}

#[test]
fn test_named_hooks_and_missing_entries() -> Result<(), HandleError> {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);

    let hooks = AuditHooks::new().on_named("Fetch", move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })?;
    let container = Container::new(hooks);

    // No Store hook registered, nothing happens
    let handle = container.store(3.5f32)?;
    assert_eq!(fetches.load(Ordering::SeqCst), 0);

    container.fetch(handle)?;
    container.with(handle, |v| *v * 2.0)?;
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_display_and_debug() -> Result<(), HandleError> {
    let container = Container::default();
    assert_eq!(container.to_string(), "Length: 0");

    container.store(())?;
    container.store(())?;
    assert_eq!(format!("{}", container), "Length: 2");
    assert!(format!("{:?}", container).contains("len: 2"));
    Ok(())
}

#[test]
fn test_error_display() {
    assert_eq!(
        HandleError::DeletedValue.to_string(),
        "value behind this handle was removed"
    );
    assert_eq!(
        HandleError::IdentityMismatch.to_string(),
        "handle was issued by a different container"
    );
    assert_eq!(
        HandleError::TypeCast {
            expected: "i32",
            found: "alloc::string::String"
        }
        .to_string(),
        "type mismatch: expected i32, found alloc::string::String"
    );
    assert!(format!("{:?}", HandleError::SelfStorage).contains("SelfStorage"));
}
