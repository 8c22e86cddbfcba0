//! Core types and trait definitions for SalesBuddy.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the domain model (users, company profiles, leads, BANT scores, chat
//! threads), every derived value the application computes, and the traits
//! that storage backends and external collaborators implement.

pub mod account;
pub mod analytics;
pub mod catalog;
pub mod chat;
pub mod collaborators;
pub mod delivery;
pub mod enrichment;
pub mod error;
pub mod lead;
pub mod navigation;
pub mod phone;
pub mod profile;
pub mod quotation;
pub mod scoring;
pub mod store;

pub use error::{Error, Result};
