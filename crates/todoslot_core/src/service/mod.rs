//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate list lookup, engine operations and persistence.
//! - Keep CLI and other hosts decoupled from storage details.

pub mod todo_service;
