//! Integration Tests Module
//!
//! Drives the full axum router with `tower::ServiceExt::oneshot`, with
//! provider HTTP traffic served by wiremock.

// Shared harness: router construction and request helpers
mod support;

// Meta-prompt generation through the HTTP surface
mod generation_test;

// Raw provider routes, key status and connectivity test
mod llm_routes_test;

// Prompt library, folders and profile
mod library_test;
