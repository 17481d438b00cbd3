//! Care Leads: lead capture, notifications and chat for an eldercare site.

pub mod api;
pub mod chat;
pub mod config;
pub mod diet;
pub mod email;
pub mod error;
pub mod leads;
pub mod locale;
pub mod report;
pub mod store;
