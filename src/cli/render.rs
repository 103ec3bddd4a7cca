use crate::domain::{ContainerMap, DependencyKind};
use crate::services::ExecutionReport;
use std::fmt::Write;

/// Human-readable view of a resolved target and the order an action walks it.
pub fn render_plan(containers: &ContainerMap, target: &[String], order: &[String]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Alvo: {}", target.join(", "));
    let _ = writeln!(out, "Ordem:");
    for (position, name) in order.iter().enumerate() {
        let _ = write!(out, "  {}. {}", position + 1, name);

        if let Some(container) = containers.get(name) {
            let deps = container.dependencies();
            let edges: Vec<String> = DependencyKind::ALL
                .iter()
                .flat_map(|kind| deps.for_kind(*kind).iter().map(move |dep| format!("{kind}:{dep}")))
                .collect();
            if !edges.is_empty() {
                let _ = write!(out, " <- {}", edges.join(", "));
            }
        }
        out.push('\n');
    }

    out
}

/// One-line summary, plus one line per failed container.
pub fn render_report(report: &ExecutionReport) -> String {
    let mut out = format!(
        "{} concluído(s), {} falha(s)\n",
        report.completed.len(),
        report.failed.len()
    );
    for (name, reason) in &report.failed {
        let _ = writeln!(out, "  {name}: {reason}");
    }
    out
}
