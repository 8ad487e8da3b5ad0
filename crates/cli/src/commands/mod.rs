//! Subcommand implementations and their shared output helpers.

pub(crate) mod classify;
pub(crate) mod message;
pub(crate) mod resolve;

use salonbook_core::{redirect_message, GuardDecision, UserStateResult};

use crate::OutputFormat;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Print a classification, optionally with a guard decision for one route.
pub(crate) fn print_result(
    result: &UserStateResult,
    guard: Option<(&str, &GuardDecision)>,
    output: OutputFormat,
    quiet: bool,
) {
    let message = redirect_message(result.reason().as_str());
    match output {
        OutputFormat::Json => {
            let mut json = result.to_json_value();
            if let Some(obj) = json.as_object_mut() {
                obj.insert("message".to_string(), serde_json::json!(message));
                if let Some((path, decision)) = guard {
                    obj.insert(
                        "guard".to_string(),
                        serde_json::json!({ "path": path, "decision": decision }),
                    );
                }
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_else(|e| format!(
                    "{{\"error\": \"serialization error: {}\"}}",
                    e
                ))
            );
        }
        OutputFormat::Text => {
            println!("{}", result.state());
            if quiet {
                return;
            }
            println!("  reason:   {}", result.reason());
            println!("  message:  {}", message);
            println!("  redirect: {}", result.redirect_url().unwrap_or("-"));
            if let Some(role) = result.user_type() {
                println!("  role:     {}", role.as_str());
            }
            println!("  businesses: {}", result.business_count());
            println!(
                "  owner dashboard: {}, customer dashboard: {}, setup: {}, admin dashboard: {}",
                yes_no(result.can_access_owner_dashboard()),
                yes_no(result.can_access_customer_dashboard()),
                yes_no(result.can_access_setup()),
                yes_no(result.can_access_admin_dashboard()),
            );
            if let Some((path, decision)) = guard {
                let line = match decision {
                    GuardDecision::Allow => "allow".to_string(),
                    GuardDecision::Redirect { url, reason } => {
                        format!("redirect to {} ({})", url, reason)
                    }
                    GuardDecision::Deny { reason } => format!("deny ({})", reason),
                };
                println!("  guard {}: {}", path, line);
            }
        }
    }
}
