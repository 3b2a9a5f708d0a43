//! System prompts and user-prompt builders for the chat collaborators.

use crate::domain::entities::reflection::ReflectionLevel;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::decision::Decision;

pub const RESEARCH_SYSTEM: &str = "You are a senior crypto/financial research analyst. Produce a concise, \
actionable research summary from raw market data, on-chain metrics and macro indicators.\n\
Rules:\n\
1. Label each finding as [FACT] (data-driven, verifiable) or [INFERENCE] (your interpretation).\n\
2. Use the sections Price Action, Technical Signals, On-Chain Health, Macro Environment.\n\
3. End with a \"Key Signals\" section listing the 3-5 most important signals for a trading decision.\n\
4. Be specific with numbers.\n\
5. Keep it under 500 words.";

pub const SENTIMENT_SYSTEM: &str = "You are a crypto/financial sentiment analyst. Analyze crowd \
sentiment data and produce a sentiment report.\n\
Rules:\n\
1. Separate [FACTUAL] observations from [SUBJECTIVE] interpretations.\n\
2. Assess overall direction: Strong Bearish / Bearish / Neutral / Bullish / Strong Bullish.\n\
3. Rate intensity from 1 (very weak) to 10 (very strong).\n\
4. Note divergences between sources.\n\
5. Keep it under 300 words.";

pub const DECISION_SYSTEM: &str = "You are an expert trading strategist and risk manager. You receive a \
research report and a sentiment report and must make a trading decision.\n\
1. Identify the market regime (bull, bear, sideways) from the technical data.\n\
2. In bearish or uncertain regimes weight [FACT] signals 70-80%; in bullish regimes 50-60%.\n\
3. Consider portfolio exposure, volatility (ATR) and your confidence.\n\
4. If a signal accuracy report is present, discount signals with poor hit rates.\n\
Respond with a JSON object with exactly these fields: \"action\" (BUY, SELL or HOLD), \"asset\", \
\"size_pct\" (0-100, percent of available capital), \"stop_loss_pct\", \"take_profit_pct\", \
\"confidence\" (1-10), \"regime\" (bull, bear or sideways), \"rationale\" (2-3 sentences). \
For HOLD decisions set size_pct to 0.";

pub const VALIDATION_SYSTEM: &str = "You are a trade execution specialist. You receive a trading decision \
and must validate whether it should be executed.\n\
1. Check the trade against the current portfolio and market conditions.\n\
2. Flag execution concerns such as insufficient balance or excessive size.\n\
3. Decide whether to execute as-is, modify the size, or reject.\n\
Respond with a JSON object: \"execute\" (true or false), \"modified_size_pct\", \
\"order_type\" (market or limit), \"reason\".";

pub const LEVEL1_SYSTEM: &str = "You are a trading reflection assistant. Summarize the decision, outcome, \
and lesson learned from this trading cycle in 2-3 sentences. Be specific about what worked or \
didn't work and why. Focus on actionable insights.";

pub const LEVEL2_SYSTEM: &str = "You are a strategic trading advisor. Review the recent per-cycle \
reflections below and produce a cross-trial strategic review. Identify patterns across decisions, \
recurring mistakes, and recommend specific adjustments to the trading strategy. \
Keep it under 200 words. Be direct and actionable.";

pub const JSON_ONLY: &str = "\n\nYou MUST respond with valid JSON only. No markdown, no explanation.";

pub fn reflection_system(level: ReflectionLevel) -> &'static str {
    match level {
        ReflectionLevel::Cycle => LEVEL1_SYSTEM,
        ReflectionLevel::CrossTrial => LEVEL2_SYSTEM,
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".into())
}

pub fn research_prompt(ctx: &CycleContext) -> String {
    format!(
        "Analyze the following data for {} and produce your research report.\n\n\
         ## Market Data\n{}\n\n## On-Chain Data\n{}\n\n## Macro Environment\n{}\n\n## Regime\n{}\n",
        ctx.instrument,
        pretty(&ctx.market),
        pretty(&ctx.onchain),
        pretty(&ctx.macro_data),
        pretty(&ctx.regime),
    )
}

pub fn sentiment_prompt(ctx: &CycleContext) -> String {
    format!(
        "Analyze the following sentiment data for {} and produce your sentiment report.\n\n\
         ## Sentiment Data\n{}\n\n\
         Produce a concise sentiment report with direction, intensity, and key observations.\n",
        ctx.instrument,
        pretty(&ctx.sentiment),
    )
}

pub fn decision_prompt(ctx: &CycleContext) -> String {
    let memory = if ctx.reflection_memory.is_empty() {
        "No prior decisions.".to_string()
    } else {
        let skip = ctx.reflection_memory.len().saturating_sub(5);
        ctx.reflection_memory[skip..].join("\n")
    };
    let mut prompt = format!(
        "## Target Asset: {}\nCurrent price: ${}\n24h change: {}%\n\n\
         ## Research Report\n{}\n\n## Sentiment Report\n{}\n\n\
         ## Current Portfolio\n{}\n\n## Market Regime\n{} (confidence {}/10)\n\n\
         ## Recent Decision History\n{}\n",
        ctx.instrument,
        ctx.market.current_price,
        ctx.market
            .price_change_24h_pct
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "N/A".into()),
        ctx.research_report.as_deref().unwrap_or("No research report available."),
        ctx.sentiment_report.as_deref().unwrap_or("No sentiment report available."),
        pretty(&ctx.portfolio),
        ctx.regime.regime,
        ctx.regime.confidence,
        memory,
    );
    if !ctx.cross_trial_reflections.is_empty() {
        prompt.push_str("\n## Strategic Reviews\n");
        for r in &ctx.cross_trial_reflections {
            prompt.push_str(&format!("- {r}\n"));
        }
    }
    if let Some(report) = &ctx.signal_accuracy_report {
        prompt.push_str(&format!("\n## Signal Accuracy\n{report}\n"));
    }
    prompt.push_str("\nBased on all the above evidence, make your trading decision.\n");
    prompt
}

pub fn validation_prompt(decision: &Decision, ctx: &CycleContext) -> String {
    format!(
        "## Trading Decision\n{}\n\n## Current Portfolio\n{}\n\n## Current Market\nPrice: ${}\n24h Volume: {}\n\n\
         Validate and decide on execution.\n",
        pretty(decision),
        pretty(&ctx.portfolio),
        ctx.market.current_price,
        ctx.market
            .volume_24h
            .map(|v| format!("{v:.0}"))
            .unwrap_or_else(|| "N/A".into()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::portfolio::PortfolioSnapshot;
    use crate::domain::values::regime::RegimeResult;

    #[test]
    fn test_decision_prompt_optional_sections() {
        let mut ctx = CycleContext::new("sol", PortfolioSnapshot::new(10_000.0), RegimeResult::unavailable("x"));
        let plain = decision_prompt(&ctx);
        assert!(plain.contains("No research report available."));
        assert!(plain.contains("No prior decisions."));
        assert!(!plain.contains("## Signal Accuracy"));

        ctx.cross_trial_reflections = vec!["Cut size in chop".into()];
        ctx.signal_accuracy_report = Some("table".into());
        let full = decision_prompt(&ctx);
        assert!(full.contains("- Cut size in chop"));
        assert!(full.contains("## Signal Accuracy\ntable"));
    }
}
