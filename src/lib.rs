//! hlsrec - progressive HLS recording
//!
//! This library crate exposes the event log ingest used by the CLI for
//! integration testing.

pub mod ingest;
