use std::path::Path;
use std::process;

use formrule_core::{FormDefinition, FormValues};
use formrule_eval::EvaluationResult;

use crate::config::CliConfig;
use crate::{read_form, read_values, report_error, OutputFormat};

pub(crate) fn cmd_eval(
    form_path: &Path,
    values_path: Option<&Path>,
    changed: Option<&str>,
    config: &CliConfig,
    output: OutputFormat,
    quiet: bool,
) {
    let mut form = read_form(form_path, output, quiet);

    // Defaults first, then whatever the caller supplied.
    let mut values = form.default_values();
    if let Some(path) = values_path {
        for (name, value) in read_values(path, output, quiet).iter() {
            values.set(name.clone(), value.clone());
        }
    }

    let engine = match config.build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("error: failed to create runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let results = rt.block_on(engine.evaluate_form(&mut form, &mut values, changed));

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&form, &values, &results),
        OutputFormat::Text => print_text(&form, &values, &results),
    }
}

fn print_json(form: &FormDefinition, values: &FormValues, results: &[EvaluationResult]) {
    let fields: Vec<serde_json::Value> = form
        .fields
        .iter()
        .map(|f| {
            serde_json::json!({
                "id": f.id,
                "name": f.name,
                "hidden": f.hidden,
                "readonly": f.readonly,
                "required": f.required,
                "systemControlled": f.system_controlled,
                "systemSetReason": f.system_set_reason,
                "options": f.options,
                "customValidations": f.custom_validations,
            })
        })
        .collect();
    let json = serde_json::json!({
        "form": form.id,
        "results": results,
        "fields": fields,
        "values": values,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&json)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
    );
}

fn print_text(form: &FormDefinition, values: &FormValues, results: &[EvaluationResult]) {
    println!("Form: {} ({})", form.name, form.id);
    println!();

    if results.is_empty() {
        println!("Results: none");
    } else {
        println!("Results:");
        for r in results {
            println!("  [{}] {}", r.field_id, r.message);
        }
    }
    println!();

    println!("Fields:");
    for f in &form.fields {
        let mut flags = Vec::new();
        if f.hidden {
            flags.push("hidden");
        }
        if f.readonly {
            flags.push("readonly");
        }
        if f.required {
            flags.push("required");
        }
        let value = values
            .present(&f.name)
            .map(|v| v.to_text())
            .unwrap_or_else(|| "-".to_string());
        print!("  {} = {}", f.name, value);
        if !flags.is_empty() {
            print!("  [{}]", flags.join(", "));
        }
        if f.field_type.has_options() {
            print!("  ({} options)", f.options.len());
        }
        if let Some(reason) = f.system_set_reason.as_deref().filter(|_| f.system_controlled) {
            print!("  set by rule: {}", reason);
        }
        println!();
    }
}
