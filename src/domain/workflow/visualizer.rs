//! Read-only renderings of a finished workflow outcome
//!
//! Everything here projects the trace into a human-facing format and never
//! feeds back into execution. All renderers tolerate an empty trace.

use std::fmt::Write;

use serde_json::{json, Value};

use super::runner::{StepStatus, TraceEntry, WorkflowOutcome};

fn status_glyph(status: StepStatus) -> char {
    match status {
        StepStatus::Completed => '✓',
        StepStatus::Failed => '✗',
    }
}

/// Render a detail value without JSON string quoting.
fn detail_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn total_duration_ms(trace: &[TraceEntry]) -> f64 {
    trace.iter().map(|e| e.duration_ms).sum()
}

/// ASCII execution tree with per-step status, duration and detail bullets.
pub fn text_tree(outcome: &WorkflowOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Workflow Execution Tree: {}", outcome.workflow_id);
    let _ = writeln!(
        out,
        "Duration: {:.2}ms",
        total_duration_ms(&outcome.trace)
    );
    let _ = writeln!(out, "{}", "=".repeat(60));
    out.push('\n');

    let count = outcome.trace.len();
    for (i, entry) in outcome.trace.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let _ = write!(
            out,
            "{connector}{} Step {}: {}",
            status_glyph(entry.status),
            entry.step_number,
            entry.step_name
        );
        if entry.duration_ms > 0.0 {
            let _ = write!(out, " ({:.2}ms)", entry.duration_ms);
        }
        out.push('\n');

        let detail_indent = if is_last { "    " } else { "│   " };
        for (key, value) in &entry.details {
            let _ = writeln!(out, "{detail_indent}  • {key}: {}", detail_display(value));
        }
    }

    out.trim_end().to_string()
}

/// Minimal indented view, one line per step, each step nested one level
/// deeper than the previous.
pub fn simple_tree(outcome: &WorkflowOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Workflow: {}", outcome.workflow_id);

    for entry in &outcome.trace {
        let indent = "  ".repeat(entry.step_number.saturating_sub(1));
        let _ = writeln!(
            out,
            "{indent}{} {}",
            status_glyph(entry.status),
            entry.step_name
        );
        for (key, value) in &entry.details {
            let _ = writeln!(out, "{indent}  └─ {key}: {}", detail_display(value));
        }
    }

    out.trim_end().to_string()
}

/// Mermaid `flowchart TD` source connecting Start through every executed
/// stage to End, with success/failure class styling and a dotted branch
/// annotation on the routing stage.
pub fn mermaid_diagram(outcome: &WorkflowOutcome) -> String {
    let mut lines = vec![
        "flowchart TD".to_string(),
        format!("    Start([Workflow: {}])", outcome.workflow_id),
    ];

    let mut prev_node = "Start".to_string();
    for entry in &outcome.trace {
        let node_id = format!("Step{}", entry.step_number);
        lines.push(format!(
            "    {node_id}[Step {}: {}]",
            entry.step_number, entry.step_name
        ));
        let class = match entry.status {
            StepStatus::Completed => "success",
            StepStatus::Failed => "failure",
        };
        lines.push(format!("    {node_id}:::{class}"));
        lines.push(format!("    {prev_node} --> {node_id}"));

        if let Some(branch) = entry.details.get("branch") {
            lines.push(format!(
                "    {node_id} -.-> BranchInfo{}{{{{Branch: {}}}}}",
                entry.step_number,
                detail_display(branch)
            ));
        }

        prev_node = node_id;
    }

    lines.push(format!("    {prev_node} --> End([Complete])"));
    lines.push(String::new());
    lines.push("    classDef success fill:#90EE90,stroke:#006400,stroke-width:2px".to_string());
    lines.push("    classDef failure fill:#FFB6C1,stroke:#8B0000,stroke-width:2px".to_string());

    lines.join("\n")
}

/// The outcome as JSON plus trace aggregates.
pub fn json_export(outcome: &WorkflowOutcome) -> Value {
    let successful = outcome
        .trace
        .iter()
        .filter(|e| e.status == StepStatus::Completed)
        .count();
    let failed = outcome.trace.len() - successful;

    // The outcome serializes infallibly; its fields are plain data.
    let mut export = match serde_json::to_value(outcome) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    export.insert("total_steps".to_string(), json!(outcome.trace.len()));
    export.insert("successful_steps".to_string(), json!(successful));
    export.insert("failed_steps".to_string(), json!(failed));
    export.insert(
        "total_duration_ms".to_string(),
        json!(total_duration_ms(&outcome.trace)),
    );

    Value::Object(export)
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Standalone HTML page listing every executed step with status styling and
/// a summary footer.
pub fn html_report(outcome: &WorkflowOutcome) -> String {
    let mut out = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Workflow Execution: {id}</title>
    <style>
        body {{ font-family: 'Courier New', monospace; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 900px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; }}
        .header {{ border-bottom: 2px solid #333; padding-bottom: 10px; margin-bottom: 20px; }}
        .step {{ margin: 10px 0; padding: 10px; border-left: 3px solid #ccc; }}
        .step.success {{ border-left-color: #4CAF50; background: #f1f8f4; }}
        .step.failed {{ border-left-color: #f44336; background: #fef1f1; }}
        .step-name {{ font-weight: bold; font-size: 14px; }}
        .step-details {{ margin-left: 20px; color: #666; font-size: 12px; }}
        .duration {{ color: #999; font-size: 11px; float: right; }}
        .summary {{ background: #e3f2fd; padding: 10px; border-radius: 4px; margin-top: 20px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h2>Workflow Execution Visualization</h2>
            <p><strong>Workflow ID:</strong> {id}</p>
        </div>
"#,
        id = escape_html(&outcome.workflow_id)
    );

    for entry in &outcome.trace {
        let status_class = match entry.status {
            StepStatus::Completed => "success",
            StepStatus::Failed => "failed",
        };
        let _ = write!(
            out,
            r#"        <div class="step {status_class}">
            <div class="step-name">
                Step {}: {}
                <span class="duration">{:.2}ms</span>
            </div>
"#,
            entry.step_number,
            escape_html(&entry.step_name),
            entry.duration_ms
        );

        if !entry.details.is_empty() {
            out.push_str("            <div class=\"step-details\">\n");
            for (key, value) in &entry.details {
                let _ = writeln!(
                    out,
                    "                <div>• {}: {}</div>",
                    escape_html(key),
                    escape_html(&detail_display(value))
                );
            }
            out.push_str("            </div>\n");
        }
        out.push_str("        </div>\n");
    }

    let successful = outcome
        .trace
        .iter()
        .filter(|e| e.status == StepStatus::Completed)
        .count();
    let _ = write!(
        out,
        r#"        <div class="summary">
            <strong>Summary:</strong> {successful}/{total} steps completed in {duration:.2}ms
        </div>
    </div>
</body>
</html>
"#,
        total = outcome.trace.len(),
        duration = total_duration_ms(&outcome.trace)
    );

    out
}
