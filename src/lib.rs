// src/lib.rs — Library root for cleanrec

pub mod cli;
pub mod infra;
pub mod recommend;
pub mod store;
