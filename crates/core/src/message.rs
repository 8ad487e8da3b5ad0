//! Banner text for redirect reasons.

/// Shown for any reason code not in the table.
pub const DEFAULT_REDIRECT_MESSAGE: &str = "Redirecting...";

/// Map a reason code to a human-readable status line. Total: unknown codes
/// get [`DEFAULT_REDIRECT_MESSAGE`].
pub fn redirect_message(reason: &str) -> &'static str {
    match reason {
        "unauthenticated" => "Please sign in to continue",
        "admin" => "Redirecting to the admin dashboard...",
        "no_profile" => "Please complete your profile to continue",
        "customer_only" => "Redirecting to your dashboard...",
        "owner_no_business" | "both_no_business" => "Let's set up your business...",
        "owner_with_business" | "both_with_business" => {
            "Redirecting to your business dashboard..."
        }
        "unknown_user_type" => "We couldn't determine your account type",
        "error" => "Something went wrong. Please sign in again.",
        _ => DEFAULT_REDIRECT_MESSAGE,
    }
}
