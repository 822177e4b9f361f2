mod storage_fake;

pub use storage_fake::*;

use scheduling_core::Engine;
use std::sync::Arc;

/// An engine wired to a fresh in-memory storage fake. The fake is returned
/// alongside so tests can seed tournaments and inspect persisted matches.
pub fn make_engine_with_fake() -> (Engine, Arc<FakeStoragePort>) {
    let fake = Arc::new(FakeStoragePort::new());
    let engine = Engine::builder().set_storage(fake.clone()).build();
    (engine, fake)
}
