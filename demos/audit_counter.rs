//! Demonstrates handing out typed handles from a shared Container and
//! counting operations through audit hooks.
//!
//! Run with: cargo run --example audit_counter

use sovran_handlemap::{AuditHooks, Container, Handle, HandleError, Operation};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn main() -> Result<(), HandleError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let audit = Arc::new(AuditLog::default());
    let container = Container::new(audit.hooks());

    // Sessions are owned by whoever holds the handle
    let sessions = SessionService::new(container.clone());
    let mut alice = sessions.open("alice")?;
    let bob = sessions.open("bob")?;

    sessions.touch(alice)?;
    sessions.touch(alice)?;
    sessions.touch(bob)?;

    // Workers share the container, each with its own handle
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let container = container.clone();
            thread::spawn(move || -> Result<u64, HandleError> {
                let handle = container.store(i as u64)?;
                container.with_mut(handle, |n| *n *= 10)?;
                container.fetch(handle)
            })
        })
        .collect();
    for worker in workers {
        let value = worker.join().expect("worker panicked")?;
        println!("worker stored {}", value);
    }

    println!("alice: {:?}", container.fetch(alice)?);
    sessions.close(&mut alice)?;

    // The closed handle is dead, the other session lives on
    match container.fetch(alice) {
        Err(HandleError::DeletedValue) => println!("alice's session is closed"),
        other => println!("unexpected: {:?}", other),
    }

    // A handle means nothing to another container
    let elsewhere = Container::default();
    if let Err(e) = elsewhere.fetch(bob) {
        println!("other container says: {}", e);
    }

    println!("\n{}", container);
    audit.report();
    Ok(())
}

// ============================================================================
// Audit counters - wired in through hooks
// ============================================================================

#[derive(Default)]
struct AuditLog {
    stores: AtomicUsize,
    fetches: AtomicUsize,
    updates: AtomicUsize,
    removes: AtomicUsize,
}

impl AuditLog {
    fn counter(&self, op: Operation) -> &AtomicUsize {
        match op {
            Operation::Store => &self.stores,
            Operation::Fetch => &self.fetches,
            Operation::Update => &self.updates,
            Operation::Remove => &self.removes,
        }
    }

    fn hooks(self: &Arc<Self>) -> AuditHooks {
        Operation::ALL.into_iter().fold(AuditHooks::new(), |hooks, op| {
            let log = Arc::clone(self);
            hooks.on(op, move || {
                log.counter(op).fetch_add(1, Ordering::Relaxed);
            })
        })
    }

    fn report(&self) {
        println!("Audit:");
        for op in Operation::ALL {
            println!("  {:<6} {}", op, self.counter(op).load(Ordering::Relaxed));
        }
    }
}

// ============================================================================
// A component that keeps its state in the container
// ============================================================================

#[derive(Clone, Debug)]
struct Session {
    user: String,
    hits: u32,
}

struct SessionService {
    container: Container,
}

impl SessionService {
    fn new(container: Container) -> Self {
        Self { container }
    }

    fn open(&self, user: &str) -> Result<Handle<Session>, HandleError> {
        self.container.store(Session {
            user: user.to_string(),
            hits: 0,
        })
    }

    fn touch(&self, handle: Handle<Session>) -> Result<(), HandleError> {
        let mut session = self.container.fetch(handle)?;
        session.hits += 1;
        self.container.update(handle, session)
    }

    fn close(&self, handle: &mut Handle<Session>) -> Result<(), HandleError> {
        let user = self.container.with(*handle, |s| s.user.clone())?;
        self.container.remove(handle)?;
        println!("closed session for {}", user);
        Ok(())
    }
}
