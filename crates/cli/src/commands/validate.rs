use std::path::Path;
use std::process;

use formrule_core::validate_values;

use crate::{read_form, read_values, OutputFormat};

/// Print constraint violations of a submission; exit 1 when there are any.
pub(crate) fn cmd_validate(form_path: &Path, values_path: &Path, output: OutputFormat, quiet: bool) {
    let form = read_form(form_path, output, quiet);
    let values = read_values(values_path, output, quiet);
    let violations = validate_values(&form, &values);

    if !quiet {
        match output {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": violations.is_empty(),
                    "violations": violations,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json)
                        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
                );
            }
            OutputFormat::Text => {
                if violations.is_empty() {
                    println!("Valid.");
                } else {
                    println!("{} violation(s):", violations.len());
                    for v in &violations {
                        println!("  - {}", v);
                    }
                }
            }
        }
    }

    if !violations.is_empty() {
        process::exit(1);
    }
}
