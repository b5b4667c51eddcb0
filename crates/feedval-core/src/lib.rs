//! # feedval-core — Foundational Types for feedval
//!
//! This crate is the leaf of the feedval crate graph. It defines the two
//! representations a feed configuration takes on its way through the
//! validator:
//!
//! 1. **The document model** ([`Document`]). A generic, dynamically-typed
//!    tree (object / array / string / number / bool / null) produced by an
//!    external loader. Both validation layers see the configuration through
//!    this type, so neither is tied to YAML or JSON.
//!
//! 2. **The typed feed model** ([`FeedConfig`] and friends). Strongly-typed
//!    records decoded from the document once, after the schema layer has
//!    accepted it. Business rules are written against these types, never
//!    against raw tree lookups.
//!
//! ## Locations
//!
//! Every finding carries a [`DocumentPath`]: a sequence of object keys and
//! array indices rendered as a JSON Pointer (`/0/inbound-datasets/2/compression`).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `feedval-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests. Malformed user data is
//!   always reported as a value ([`DecodeError`]), never as a panic.
//! - Documents and decoded feeds are read-only after construction.

pub mod document;
pub mod error;
pub mod feed;

pub use document::{Document, DocumentPath, NodeKind, PathSegment};
pub use error::{DecodeError, ShapeError, SourceError};
pub use feed::{
    decode_document, decode_feed, Commit, Compression, ConfigScalar, DoneFile, FeedConfig,
    FileWatcher, Hive, InboundDataset, IngestionSource, KafkaFileReplay, KafkaTopic, Output,
    Rollback, SourceKind, TextHeader, TextTrailer, Transaction,
};
