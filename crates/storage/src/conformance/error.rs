use std::future::Future;

use super::{make_business, make_profile, TestResult};
use crate::{ProfileStore, StorageError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "error",
            "duplicate_profile_returns_already_exists",
            duplicate_profile_returns_already_exists(factory).await,
        ),
        TestResult::from_result(
            "error",
            "duplicate_business_returns_already_exists",
            duplicate_business_returns_already_exists(factory).await,
        ),
        TestResult::from_result(
            "error",
            "business_without_owner_profile_is_rejected",
            business_without_owner_profile_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "error",
            "non_rfc3339_timestamp_is_rejected",
            non_rfc3339_timestamp_is_rejected(factory).await,
        ),
    ]
}

async fn duplicate_profile_returns_already_exists<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("u-1", "customer"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_profile(make_profile("u-1", "owner")).await {
        Err(StorageError::AlreadyExists { kind: "profile", id }) if id == "u-1" => {}
        other => return Err(format!("expected AlreadyExists(profile, u-1), got {:?}", other)),
    }
    // The original row survives.
    let read = s.get_profile("u-1").await.map_err(|e| e.to_string())?;
    match read {
        Some(p) if p.user_type == "customer" => Ok(()),
        other => Err(format!("original profile was overwritten: {:?}", other)),
    }
}

async fn duplicate_business_returns_already_exists<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("u-1", "owner"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_business(make_business("b-1", "u-1"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_business(make_business("b-1", "u-1")).await {
        Err(StorageError::AlreadyExists { kind: "business", .. }) => Ok(()),
        other => Err(format!("expected AlreadyExists(business), got {:?}", other)),
    }
}

async fn business_without_owner_profile_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.insert_business(make_business("b-1", "ghost")).await {
        Err(StorageError::ProfileNotFound { user_id }) if user_id == "ghost" => Ok(()),
        other => Err(format!("expected ProfileNotFound(ghost), got {:?}", other)),
    }
}

async fn non_rfc3339_timestamp_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut record = make_profile("u-1", "owner");
    record.created_at = Some("01/02/2025".to_string());
    match s.insert_profile(record).await {
        Err(StorageError::InvalidTimestamp {
            field: "created_at",
            ..
        }) => {}
        other => return Err(format!("expected InvalidTimestamp(created_at), got {:?}", other)),
    }
    match s.get_profile("u-1").await.map_err(|e| e.to_string())? {
        None => Ok(()),
        Some(p) => Err(format!("rejected profile was stored: {:?}", p)),
    }
}
