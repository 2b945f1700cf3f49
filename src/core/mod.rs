//! Core domain: the book record, the Gemini call sites, and logging.

pub mod book;
pub mod chat;
pub mod gemini;
pub mod logging;
