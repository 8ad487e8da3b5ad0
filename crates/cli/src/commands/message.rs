use salonbook_core::redirect_message;

use crate::OutputFormat;

pub(crate) fn cmd_message(reason: &str, output: OutputFormat, _quiet: bool) {
    let message = redirect_message(reason);
    match output {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "reason": reason, "message": message })
        ),
    }
}
