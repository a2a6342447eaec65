//! Integration Tests Module
//!
//! End-to-end tests for branch policy resolution, environment resolution,
//! pipeline orchestration and release sessions.

// Branch classification and policy table tests
mod branch_policy_test;

// Environment resolution and configuration file tests
mod environment_test;

// Orchestrator and build ledger tests
mod pipeline_test;

// Release session and report persistence tests
mod release_session_test;
