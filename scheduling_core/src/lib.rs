// contains core functionality

mod allocator;
mod errors;
mod generator;
mod group;
mod labels;
mod match_;
mod pitch;
mod ports;
mod propagator;
mod results;
mod schedule;
mod seeding;
mod stage;
mod stage_config;
mod standings;
mod stats;
mod team;
mod timing;
mod validator;
pub mod utils;

pub use allocator::*;
pub use errors::*;
pub use generator::*;
pub use group::*;
pub use labels::*;
pub use match_::*;
pub use pitch::*;
pub use ports::*;
pub use propagator::*;
pub use results::*;
pub use schedule::*;
pub use seeding::*;
pub use stage::*;
pub use stage_config::*;
pub use standings::*;
pub use stats::*;
pub use team::*;
pub use timing::*;
pub use validator::*;

use std::sync::Arc;

/// The scheduling engine facade.
///
/// The four engine components (generator, allocator, validator, result
/// propagator) are pure functions over their inputs; `Engine` wires them to
/// the injected storage port and scopes each operation to one logical
/// transaction. It holds no mutable state of its own, so a single instance
/// may serve any number of tournaments concurrently.
pub struct Engine {
    storage: Arc<dyn StoragePort>,
}

impl Engine {
    pub fn builder() -> EngineBuilder<NoStorage> {
        EngineBuilder {
            state: NoStorage {},
        }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn StoragePort> {
        &self.storage
    }
}

pub struct NoStorage {}
pub struct DynStorage(Arc<dyn StoragePort>);

/// Typestate builder: an `Engine` cannot be built without a storage port.
pub struct EngineBuilder<S> {
    state: S,
}

impl EngineBuilder<NoStorage> {
    pub fn set_storage(self, storage: Arc<dyn StoragePort>) -> EngineBuilder<DynStorage> {
        EngineBuilder {
            state: DynStorage(storage),
        }
    }
}

impl EngineBuilder<DynStorage> {
    pub fn build(self) -> Engine {
        Engine {
            storage: self.state.0,
        }
    }
}
