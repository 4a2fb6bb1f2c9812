//! quarry: faceted search against a Solr-style engine.
//!
//! The `quarry` binary exposes the workspace's libraries on the command line. `check`
//! loads a catalog file and lists what it declares, `compile` turns a search into the
//! engine's request parameters, and `decode` turns an engine response back into typed
//! facet counts, highlighted items and spelling suggestions.

#![warn(missing_docs)]

pub mod cli;
