//! # Rulebook Harness
//!
//! Session-scoped rulebook grounding for AI game masters.
//!
//! Players upload rulebooks (plain text or PDF) into a game session. Each
//! upload is split into paragraphs and every paragraph is tagged with a
//! keyword set. During narration the game master calls the
//! `rulebookLookup` tool with the player's action; the tool returns the
//! first few paragraphs sharing a keyword with it, or a fallback message
//! telling the model to use general knowledge.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │  Upload      │──▶│  Ingest          │──▶│  RuleStore  │
//! │ CLI / HTTP   │   │ extract+chunk+kw │   │ SQLite/mem  │
//! └──────────────┘   └──────────────────┘   └──────┬──────┘
//!                                                  │
//!                    ┌──────────────────┐          │
//!                    │  Retrieve        │◀─────────┘
//!                    │ keywords → rules │
//!                    └────────┬─────────┘
//!                             ▼
//!                 ┌──────────────────────┐
//!                 │ rulebookLookup tool  │
//!                 │  (HTTP / CLI)        │
//!                 └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rulebook init
//! rulebook upload campaign-42 ./books/core-rules.txt
//! rulebook lookup campaign-42 "How does a grapple check work?"
//! rulebook serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`keywords`] | Keyword extraction |
//! | [`chunk`] | Paragraph chunking |
//! | [`extract`] | Text extraction from uploads |
//! | [`store`] | Rule store trait and backends |
//! | [`ingest`] | Rulebook ingestion |
//! | [`retrieve`] | Rule lookup |
//! | [`tools`] | Callable tools for AI agents |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chunk;
pub mod config;
pub mod db;
pub mod extract;
pub mod ingest;
pub mod keywords;
pub mod migrate;
pub mod models;
pub mod retrieve;
pub mod server;
pub mod store;
pub mod tools;
