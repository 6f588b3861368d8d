//! Configuration reconciliation.
//!
//! The Spot API's partial updates treat a missing field as "leave as-is", so
//! a field the caller removed from its template must be sent as an explicit
//! `null` to be honored as a deletion. Diffing the old configuration against
//! the new one is the only way to tell "never set" apart from "explicitly
//! removed": [`diff`] computes the structural differences between the two
//! trees, and [`patch`] folds the deletions back into the new tree as nulls.

pub mod diff;
pub mod patch;
