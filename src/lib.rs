#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `relic-rs` is a toolkit for reverse-engineering classic Macintosh and
//! early Windows software artifacts: resource forks, Mohawk archives,
//! Dark Castle data files, and PE32 executables, plus the many sprite,
//! sound, and text formats stored inside them.
//!
pub use relic_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use relic_dylib;
