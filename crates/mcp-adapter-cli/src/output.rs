//! Envelope rendering for the terminal

use mcp_adapter_core::ResponseEnvelope;

/// Print an envelope, either as raw JSON or human-readable text
pub fn print(envelope: &ResponseEnvelope, json: bool) {
    if json {
        match serde_json::to_string_pretty(envelope) {
            Ok(text) => println!("{}", text),
            Err(err) => eprintln!("error: failed to render envelope: {}", err),
        }
        return;
    }

    if envelope.success {
        println!("{}", envelope.message);
        if !envelope.data.is_null() {
            match serde_json::to_string_pretty(&envelope.data) {
                Ok(text) => println!("{}", text),
                Err(err) => eprintln!("error: failed to render data: {}", err),
            }
        }
    } else {
        eprintln!("error: {}", envelope.message);
        if let Some(detail) = &envelope.error {
            eprintln!("  {}", detail);
        }
    }
}
