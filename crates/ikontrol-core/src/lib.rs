//! iKontrol ingress adapter.
//!
//! Pulls projects, schemes, tasks and documents from the iKontrol API and
//! hands one payload per project to a downstream ingestion endpoint.

pub mod adapter;
pub mod bundle;
pub mod config;
pub mod ikontrol;
pub mod ingress;
pub mod logging;
pub mod run;

mod http;

#[cfg(test)]
mod testing;
