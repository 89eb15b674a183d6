//! Recorded fixtures and their on-disk store.
//!
//! A fixture is a replayable substitute for one test's external HTTP
//! interactions plus the synthetic account profile needed to run it.

mod model;
mod store;

pub use model::{
    BodyMatcher, Fixture, FixtureFile, PathMatcher, Profile, RecordedExchange, RecordedResponse,
    FIXTURE_VERSION,
};
pub use store::{fixture_key, FixtureEntry, FixtureStore};
