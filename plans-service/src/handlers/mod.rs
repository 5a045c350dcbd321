//! HTTP handlers for the plans service.
//!
//! JSON routes live under `/api`; `/` renders the price table page.

pub mod carriers;
pub mod chat;
pub mod health;
pub mod metrics;
pub mod pages;
pub mod plans;
