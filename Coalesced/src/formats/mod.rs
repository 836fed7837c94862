//! File format handlers
//!
//! The Coalesced binary archive and the INI text form its entries are
//! unpacked to.

pub mod coalesced;

// Re-export main types
pub use coalesced::{
    CoalescedArchive, Entry, PathConvention, Record, Section, parse_coalesced_bytes,
    read_coalesced, write_coalesced,
};
