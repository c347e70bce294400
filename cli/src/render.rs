//! Plain-text presentation of states, safety reports and evaluations.

use std::fmt::Write;

use banker_core::{
    AllocationState, Evaluation, Preset, SafetyReport, SafetyStep, StepReason, Units,
};

fn units(values: &[Units]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn flags(finished: &[bool]) -> String {
    finished.iter().map(|&done| if done { 'T' } else { 'F' }).collect()
}

/// `P1 -> P3 -> P0`, or `(none)` for an empty sequence.
pub fn sequence(order: &[usize]) -> String {
    if order.is_empty() {
        return "(none)".to_string();
    }
    order
        .iter()
        .map(|p| format!("P{p}"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub fn state_table(state: &AllocationState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} processes x {} resources",
        state.process_count(),
        state.resource_count()
    );
    let _ = writeln!(out, "Available: {}", units(state.available()));

    if state.process_count() == 0 {
        return out.trim_end().to_string();
    }

    let rows: Vec<[String; 4]> = (0..state.process_count())
        .map(|i| {
            [
                format!("P{i}"),
                units(&state.max()[i]),
                units(&state.allocation()[i]),
                units(&state.need()[i]),
            ]
        })
        .collect();

    let header = ["Process", "Max", "Allocation", "Need"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    out.push('\n');
    push_row(&mut out, &header, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.trim_end().to_string()
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

pub fn describe_step(step: &SafetyStep) -> String {
    let what = match (step.reason, step.admitted) {
        (StepReason::Initialized, _) => "Work = Available, Finish = all false".to_string(),
        (StepReason::NeedWithinWork, Some(p)) => {
            format!("P{p} can finish (Need[{p}] <= Work), releases its allocation")
        }
        (StepReason::NeedWithinWork, None) => "process admitted".to_string(),
        (StepReason::Safe, _) => "all processes finished: SAFE".to_string(),
        (StepReason::Unsafe, _) => "no remaining process fits in Work: UNSAFE".to_string(),
    };
    format!(
        "step {}: {what}\n    work {}  finished {}  sequence {}",
        step.iteration,
        units(&step.work),
        flags(&step.finished),
        sequence(&step.safe_sequence)
    )
}

pub fn report(report: &SafetyReport) -> String {
    let mut out = String::new();
    for step in &report.steps {
        let _ = writeln!(out, "{}", describe_step(step));
    }
    if report.safe {
        let _ = write!(out, "SAFE: {}", sequence(&report.safe_sequence));
    } else {
        out.push_str("UNSAFE: no safe sequence exists");
    }
    out
}

pub fn evaluation(result: &Evaluation) -> String {
    match result {
        Evaluation::Approved(approved) => format!(
            "APPROVED (safe): P{} may take {}\nsafe sequence: {}",
            approved.process(),
            units(approved.request()),
            sequence(approved.safe_sequence())
        ),
        Evaluation::Denied(denial) => format!(
            "DENIED ({}): P{} requesting {}",
            denial.reason.as_str(),
            denial.process,
            units(&denial.request)
        ),
    }
}

pub fn preset_list(presets: &[Preset]) -> String {
    let width = presets.iter().map(|p| p.slug.len()).max().unwrap_or(0);
    presets
        .iter()
        .map(|p| format!("{:<width$}  {} ({})", p.slug, p.name, p.dimensions()))
        .collect::<Vec<_>>()
        .join("\n")
}
