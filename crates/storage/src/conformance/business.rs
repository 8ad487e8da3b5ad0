use std::future::Future;

use super::{make_business, make_profile, TestResult};
use crate::ProfileStore;

pub(super) async fn run_business_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "business",
            "count_is_zero_without_businesses",
            count_is_zero_without_businesses(factory).await,
        ),
        TestResult::from_result(
            "business",
            "count_tracks_inserts",
            count_tracks_inserts(factory).await,
        ),
        TestResult::from_result(
            "business",
            "count_is_per_owner",
            count_is_per_owner(factory).await,
        ),
        TestResult::from_result(
            "business",
            "list_matches_count",
            list_matches_count(factory).await,
        ),
    ]
}

async fn count_is_zero_without_businesses<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("owner-1", "owner"))
        .await
        .map_err(|e| e.to_string())?;
    let count = s
        .count_businesses_by_owner("owner-1")
        .await
        .map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("expected 0 businesses, got {}", count));
    }
    // Unknown owners count as zero rather than erroring.
    let unknown = s
        .count_businesses_by_owner("ghost")
        .await
        .map_err(|e| e.to_string())?;
    if unknown != 0 {
        return Err(format!("expected 0 for unknown owner, got {}", unknown));
    }
    Ok(())
}

async fn count_tracks_inserts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("owner-1", "owner"))
        .await
        .map_err(|e| e.to_string())?;
    for (i, id) in ["b-1", "b-2", "b-3"].iter().enumerate() {
        s.insert_business(make_business(id, "owner-1"))
            .await
            .map_err(|e| e.to_string())?;
        let count = s
            .count_businesses_by_owner("owner-1")
            .await
            .map_err(|e| e.to_string())?;
        if count as usize != i + 1 {
            return Err(format!("expected {} businesses, got {}", i + 1, count));
        }
    }
    Ok(())
}

async fn count_is_per_owner<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("a", "owner"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_profile(make_profile("b", "both"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_business(make_business("b-1", "a"))
        .await
        .map_err(|e| e.to_string())?;
    let b_count = s
        .count_businesses_by_owner("b")
        .await
        .map_err(|e| e.to_string())?;
    if b_count != 0 {
        return Err(format!("owner b should own 0 businesses, got {}", b_count));
    }
    Ok(())
}

async fn list_matches_count<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProfileStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_profile(make_profile("a", "both"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_business(make_business("b-2", "a"))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_business(make_business("b-1", "a"))
        .await
        .map_err(|e| e.to_string())?;
    let listed = s
        .list_businesses_by_owner("a")
        .await
        .map_err(|e| e.to_string())?;
    let count = s
        .count_businesses_by_owner("a")
        .await
        .map_err(|e| e.to_string())?;
    if listed.len() != count as usize {
        return Err(format!("list has {} rows, count is {}", listed.len(), count));
    }
    let ids: Vec<&str> = listed.iter().map(|b| b.id.as_str()).collect();
    if ids != ["b-1", "b-2"] {
        return Err(format!("expected businesses ordered by id, got {:?}", ids));
    }
    Ok(())
}
