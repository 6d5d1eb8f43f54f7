//! Universe API Library
//!
//! HTTP gateway that turns validated health profiles into prompts, asks a
//! hosted language model for a JSON plan and checks the plan's shape before
//! returning it.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Profile models, prompt building and response checks.
//! - `integrations`: Model provider client.
//! - `auth`: Shared-secret gate for generation routes.
//! - `body_metrics`: BMI, BMR, TDEE and macro targets.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `llm_client`: Chat-completions client with JSON retries.
//! - `metadata`: Option catalogs.
//! - `models`: Profile types and their validation rules.
//! - `prompts`: Prompt builders.
//! - `response_schema`: Per-domain response descriptors.
//! - `response_validator`: Top-level shape check of model replies.
//! - `server`: Router assembly and OpenAPI document.
//! - `validation`: Validation primitives and the validating JSON extractor.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and the binary
pub mod auth;
pub mod body_metrics;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod llm_client;
pub mod metadata;
pub mod models;
pub mod prompts;
pub mod response_schema;
pub mod response_validator;
pub mod server;
pub mod validation;
