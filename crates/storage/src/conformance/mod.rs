//! Conformance test suite for `ProfileStore` implementations.
//!
//! A backend-agnostic suite that any `ProfileStore` implementation can run
//! to verify the behavior access resolution depends on:
//!
//! - **Profiles**: missing rows read as `None`, round-trip of stored role tags
//!   (including tags the classifier does not recognize), duplicate detection
//! - **Businesses**: per-owner counting and listing, owner isolation,
//!   owner-must-exist checks
//! - **Errors**: correct error variants and fields
//!
//! # Usage
//!
//! ```ignore
//! use salonbook_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn postgres_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_postgres_store().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod business;
mod error;
mod profile;

use std::fmt;
use std::future::Future;

use crate::record::{BusinessRecord, ProfileRecord};
use crate::ProfileStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "profile", "business").
    pub category: String,
    /// Test name (e.g. "missing_profile_reads_as_none").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a store backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(profile::run_profile_tests(&factory).await);
    results.extend(business::run_business_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_profile(user_id: &str, user_type: &str) -> ProfileRecord {
    ProfileRecord {
        user_id: user_id.to_string(),
        user_type: user_type.to_string(),
        created_at: Some("2025-01-01T00:00:00Z".to_string()),
        updated_at: None,
    }
}

fn make_business(id: &str, owner_id: &str) -> BusinessRecord {
    BusinessRecord {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: format!("Salon {}", id),
        booking_slug: None,
    }
}
