//! Forces dynamic linking for the `relic-rs` workspace.
//!
//! Enabling the `dynamic_linking` feature on the root package links this
//! crate as a dylib so that incremental rebuilds of the demo binaries do
//! not relink the whole decoder library.

#[allow(unused_imports)]
use relic_internal::*;
