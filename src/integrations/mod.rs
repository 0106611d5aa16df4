//! Third-party service clients.

pub mod calcom;
