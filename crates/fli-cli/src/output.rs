use atty::Stream;
use color_eyre::Result;
use fli_core::{diag_commands, CommandGroup, CommandInfo, CommandStatus, ExecutionOutcome};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn exit_code(status: &CommandStatus) -> i32 {
    match status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    }
}

pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = exit_code(&outcome.status);

    if opts.json {
        let payload = fli_core::to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    match outcome.status {
        CommandStatus::Ok => {
            if opts.quiet {
                return Ok(code);
            }
            let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
            let message = fli_core::format_status_message(info, &outcome.message);
            println!("{}", style.status(&outcome.status, &message));
            if let Some(hint) = hint_from_details(&outcome.details) {
                println!("{}", style.info(&format!("Tip: {hint}")));
            }
        }
        CommandStatus::UserError | CommandStatus::Failure => {
            let style = Style::new(opts.no_color, atty::is(Stream::Stderr));
            let header = format!(
                "{}  {}",
                error_code(info, &outcome.details),
                outcome.message
            );
            eprintln!("{}", style.error_header(&header));
            eprintln!();
            eprintln!("Why:");
            for reason in collect_why_bullets(&outcome.details, &outcome.message) {
                eprintln!("  • {reason}");
            }
            let fixes = collect_fix_bullets(&outcome.details);
            eprintln!();
            eprintln!("Fix:");
            for fix in fixes {
                eprintln!("{}", style.fix_bullet(&format!("  • {fix}")));
            }
            if let Some(output) = output_from_details(&outcome.details) {
                eprintln!();
                eprintln!("fli output:");
                eprintln!("{}", style.dimmed(output.trim_end()));
            }
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn output_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("output"))
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

pub(crate) fn error_code(info: CommandInfo, details: &Value) -> String {
    if let Some(code) = details
        .as_object()
        .and_then(|map| map.get("code"))
        .and_then(Value::as_str)
        .filter(|code| code.starts_with("FLI"))
    {
        return code.to_string();
    }
    default_error_code(info).to_string()
}

fn default_error_code(info: CommandInfo) -> &'static str {
    match info.group {
        CommandGroup::Provision => diag_commands::PROVISION,
        CommandGroup::Snapshot => diag_commands::SNAPSHOT,
        CommandGroup::Config => diag_commands::CONFIG,
        CommandGroup::Info => diag_commands::INFO,
        CommandGroup::Volumes => diag_commands::VOLUMES,
    }
}

pub(crate) fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(
            &mut bullets,
            reason_display(reason).unwrap_or(reason).to_string(),
        );
    }
    if let Some(command) = details.get("command").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("Command: `{command}`"));
    }
    if let Some(volume) = details.get("volume").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("Manifest volume: {volume}"));
    }
    if let Some(orphaned) = details.get("orphaned_volumes").and_then(Value::as_array) {
        let names: Vec<&str> = orphaned
            .iter()
            .filter_map(|entry| entry.get("volume_name").and_then(Value::as_str))
            .collect();
        if !names.is_empty() {
            push_unique(
                &mut bullets,
                format!(
                    "Clones left behind and not recorded: {}",
                    names.join(", ")
                ),
            );
        }
    }
    if let Some(issues) = details.get("issues").and_then(Value::as_array) {
        for issue in issues.iter().filter_map(Value::as_str) {
            push_unique(&mut bullets, issue);
        }
    }
    if bullets.is_empty() {
        push_unique(&mut bullets, fallback);
    }
    bullets
}

pub(crate) fn collect_fix_bullets(details: &Value) -> Vec<String> {
    let mut fixes = Vec::new();
    if let Some(hint) = hint_from_details(details) {
        push_unique(&mut fixes, hint);
    }
    if details.get("orphaned_volumes").is_some() {
        push_unique(
            &mut fixes,
            "Remove the orphaned clones with fli once the cause is fixed.",
        );
    }
    if fixes.is_empty() {
        fixes.push("Re-run with --help for usage or inspect the output above.".to_string());
    }
    fixes
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "ambiguous_reference" => Some("The reference matched more than one object in the store."),
        "store_command_failed" => Some("The fli command exited with an error."),
        "store_unavailable" => Some("The fli executable could not be started."),
        "missing_tool" => Some("The fli executable is not on PATH."),
        "empty_volume_path" => Some("fli reported a clone without a mount path."),
        "registry_missing" => Some("No working volumes have been provisioned here yet."),
        "unspecified_reference" => Some("A manifest volume names neither a snapshot nor a branch."),
        _ => None,
    }
}
