use std::future::Future;

use super::{make_profile, TestResult};
use crate::ProfileStore;

pub(super) async fn run_profile_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "profile",
            "missing_profile_reads_as_none",
            missing_profile_reads_as_none(factory).await,
        ),
        TestResult::from_result(
            "profile",
            "inserted_profile_is_readable",
            inserted_profile_is_readable(factory).await,
        ),
        TestResult::from_result(
            "profile",
            "unrecognized_role_tag_round_trips",
            unrecognized_role_tag_round_trips(factory).await,
        ),
        TestResult::from_result(
            "profile",
            "profiles_are_independent",
            profiles_are_independent(factory).await,
        ),
    ]
}

async fn missing_profile_reads_as_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_profile("nobody").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected Ok(None), got {:?}", other)),
    }
}

async fn inserted_profile_is_readable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let record = make_profile("u-1", "both");
    s.insert_profile(record.clone())
        .await
        .map_err(|e| e.to_string())?;
    let read = s.get_profile("u-1").await.map_err(|e| e.to_string())?;
    if read.as_ref() != Some(&record) {
        return Err(format!("expected {:?}, got {:?}", record, read));
    }
    Ok(())
}

// The classifier depends on seeing unknown tags verbatim to fail closed.
async fn unrecognized_role_tag_round_trips<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("u-2", "franchise_partner"))
        .await
        .map_err(|e| e.to_string())?;
    let read = s
        .get_profile("u-2")
        .await
        .map_err(|e| e.to_string())?
        .ok_or("profile missing after insert")?;
    if read.user_type != "franchise_partner" {
        return Err(format!(
            "expected user_type \"franchise_partner\", got \"{}\"",
            read.user_type
        ));
    }
    Ok(())
}

async fn profiles_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("a", "owner"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_profile(make_profile("b", "customer"))
        .await
        .map_err(|e| e.to_string())?;
    let a = s.get_profile("a").await.map_err(|e| e.to_string())?;
    let b = s.get_profile("b").await.map_err(|e| e.to_string())?;
    match (a, b) {
        (Some(a), Some(b)) if a.user_type == "owner" && b.user_type == "customer" => Ok(()),
        other => Err(format!("profiles interfered: {:?}", other)),
    }
}
