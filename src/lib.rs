//! Boxoffice - Ticket purchase, payment and issuance pipeline
//!
//! This crate takes a buyer from "I want N tickets" to issued, scannable
//! tickets: inventory checks, payment through an external gateway, signed
//! payment callbacks and atomic ticket issuance, with every state change
//! announced through a transactional outbox.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
