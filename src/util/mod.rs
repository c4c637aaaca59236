//! Embedded reference datasets and their lookup APIs.

pub mod datasets;
