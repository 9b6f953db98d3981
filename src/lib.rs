//! # gcdb - Embedded JSON Document Store
//!
// Copyright 2026 The gcdb Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! gcdb persists JSON documents keyed by an integer `_id` in a single
//! memory-mapped, append-only data file, and serves them over a
//! line-oriented TCP protocol.
//!
//! ## Features
//!
//! - **Append-only storage**: records are never rewritten except to flip a
//!   tombstone; deleted space is not reclaimed
//! - **Snapshot scans**: full-collection reads see the collection as it was
//!   when the scan started, even under concurrent deletes
//! - **Primary-key index**: lock-free ordered `_id` index maintained in
//!   lock-step with every write, with a runtime toggle between indexed and
//!   scan-based point lookups
//! - **Server-held cursors**: paginated full-collection reads resume where
//!   the previous page stopped
//! - **Single-writer concurrency**: one global write lock serializes
//!   mutations while readers stay lock-free
//!
//! ## Quick Start
//!
//! ```no_run
//! use gcdb::Engine;
//!
//! # fn main() -> gcdb::Result<()> {
//! let engine = Engine::builder().data_dir("./gcdb_data").open()?;
//!
//! engine.insert(br#"{"_id":1,"name":"frand"}"#)?;
//! let payload = engine.find_by_id(1)?;
//! assert_eq!(&payload[..], br#"{"_id":1,"name":"frand"}"#);
//!
//! engine.delete(1)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 TCP Server                   │
//! │          (one thread per client)             │
//! └───────────────────┬──────────────────────────┘
//!                     │ verb + body
//! ┌───────────────────▼──────────────────────────┐
//! │                   Engine                     │
//! │   write lock ── insert / delete / update     │
//! │   cursor lock ─ findall / getmore            │
//! └──────┬──────────────────┬────────────────────┘
//!        │                  │
//! ┌──────▼───────┐   ┌──────▼───────┐
//! │ PrimaryIndex │   │   Scanner    │
//! │ (id→offset)  │   │ (snapshots)  │
//! └──────┬───────┘   └──────┬───────┘
//!        │                  │
//! ┌──────▼──────────────────▼────────────────────┐
//! │              MappedDataFile                  │
//! │        (mmap, append-only records)           │
//! └──────────────────────────────────────────────┘
//! ```

pub mod constants;
pub mod core;
pub mod error;
pub mod locks;
pub mod network;
pub mod protocol;
pub mod stats;
pub mod storage;

pub use crate::core::engine::{Engine, EngineBuilder, EngineConfig};
pub use crate::error::{GcdbError, Result};
pub use crate::stats::Statistics;

#[cfg(test)]
mod tests;
