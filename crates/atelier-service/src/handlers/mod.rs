//! API handlers.

pub mod accounts;
pub mod catalog;
pub mod characters;
pub mod generate;
pub mod health;
pub mod notifications;
pub mod payments;
