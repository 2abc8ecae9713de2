//! Decoding of the category BLOBs of a legacy practice management database,
//! and the pieces around it needed to browse a patient's archive by category.

pub mod blob;
pub mod cache;
pub mod category;
pub mod config;
pub mod document;
pub mod dump;
pub mod gdt;
pub mod preset;
pub mod reconcile;
pub mod reload;
pub mod text;
