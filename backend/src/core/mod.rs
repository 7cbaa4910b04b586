//! Core campaign bookkeeping

pub mod time;
