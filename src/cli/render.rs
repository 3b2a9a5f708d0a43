use crate::application::cycle::CycleOutcome;

fn rule(width: usize) -> String {
    "=".repeat(width)
}

/// Panel printed instead of a decision when the pre-check halts a cycle.
pub fn halt_panel(outcome: &CycleOutcome) -> String {
    let mut lines = vec![
        rule(60),
        format!("CYCLE HALTED for {}", outcome.instrument),
        rule(60),
        format!(
            "Regime: {} (confidence {}/10)",
            outcome.regime.regime, outcome.regime.confidence
        ),
        "Reasons:".to_string(),
    ];
    for reason in &outcome.pre_check.reasons {
        lines.push(format!("  - {reason}"));
    }
    lines.push(format!(
        "Portfolio: cash ${:.2}, net worth ${:.2}",
        outcome.portfolio.cash, outcome.portfolio.net_worth
    ));
    lines.join("\n")
}

pub fn cycle_summary(outcome: &CycleOutcome) -> String {
    let d = &outcome.decision;
    let mut lines = vec![
        rule(60),
        format!("CYCLE {} for {}", outcome.cycle_id, outcome.instrument),
        rule(60),
        format!(
            "Regime:    {} (confidence {}/10)",
            outcome.regime.regime, outcome.regime.confidence
        ),
        format!(
            "Decision:  {} {:.2}% (confidence {}/10, regime {})",
            d.action, d.size_pct, d.confidence, d.regime
        ),
        format!("Rationale: {}", d.rationale),
    ];
    let risk = outcome.risk_verdict();
    lines.push(format!("Risk:      {} at {:.2}%", risk.verdict, risk.modified_size_pct));
    for reason in &risk.reasons {
        lines.push(format!("           - {reason}"));
    }
    match (&outcome.trade, &outcome.not_executed_reason) {
        (Some(t), _) => lines.push(format!(
            "Trade:     {} {:.4} {} @ ${:.2} (fee ${:.2})",
            t.action, t.quantity, t.instrument, t.price, t.fee
        )),
        (None, Some(reason)) => lines.push(format!("Trade:     not executed ({reason})")),
        (None, None) => lines.push("Trade:     not executed".to_string()),
    }
    lines.push(format!(
        "Portfolio: cash ${:.2}, net worth ${:.2}",
        outcome.portfolio.cash, outcome.portfolio.net_worth
    ));
    lines.push(format!(
        "Signals:   {} logged, {} outcomes evaluated",
        outcome.signals_logged, outcome.outcomes_evaluated
    ));
    if !outcome.degraded.is_empty() {
        lines.push(format!("Degraded:  {}", outcome.degraded.join("; ")));
    }
    if let Some(l1) = &outcome.level1 {
        lines.push(format!("Lesson:    {l1}"));
    }
    if let Some(l2) = &outcome.level2 {
        lines.push(String::new());
        lines.push("Strategic review:".to_string());
        lines.push(l2.clone());
    }
    lines.join("\n")
}
