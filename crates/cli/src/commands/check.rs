use std::path::Path;
use std::process;

use formrule_core::check_definition;

use crate::{read_form, OutputFormat};

/// Print definition issues; exit 1 when there are any.
pub(crate) fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let form = read_form(file, output, quiet);
    let issues = check_definition(&form);

    if !quiet {
        match output {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "form": form.id,
                    "issues": issues,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json)
                        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
                );
            }
            OutputFormat::Text => {
                if issues.is_empty() {
                    println!("No definition issues in '{}'.", form.name);
                } else {
                    println!("Definition issues in '{}' ({}):", form.name, issues.len());
                    for issue in &issues {
                        println!("  - {}", issue);
                    }
                }
            }
        }
    }

    if !issues.is_empty() {
        process::exit(1);
    }
}
