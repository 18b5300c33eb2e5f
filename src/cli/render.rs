//! Terminal rendering of session state

use crate::core::languages::find_language;
use crate::core::models::{Plan, Translation, Usage};
use crate::core::session::SessionState;

/// Format a fraction as a percentage with at most two decimals, e.g. `12.5%`
pub fn format_percentage(fraction: f64) -> String {
    let formatted = format!("{:.2}", fraction * 100.0);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", trimmed)
}

/// `count/limit characters used (pct)`, or empty without usage
pub fn usage_subtitle(usage: Option<&Usage>) -> String {
    let Some(usage) = usage else {
        return String::new();
    };

    match usage.fraction_used() {
        Some(fraction) => format!(
            "{}/{} characters used ({})",
            usage.character_count,
            usage.character_limit,
            format_percentage(fraction)
        ),
        None => format!(
            "{}/{} characters used",
            usage.character_count, usage.character_limit
        ),
    }
}

/// Section title naming the detected source language when it is known
pub fn result_title(translation: Option<&Translation>) -> String {
    translation
        .and_then(|t| find_language(&t.detected_source_language))
        .map(|language| format!("Translated from {}:", language.name))
        .unwrap_or_else(|| "Translation:".to_string())
}

/// Usage lines for the `usage` command
pub fn usage_report(plan: Plan, usage: &Usage) -> String {
    let mut lines = Vec::new();
    if let Some(fraction) = usage.fraction_used() {
        lines.push(format!(
            "{} usage this period: {}",
            plan.label(),
            format_percentage(fraction)
        ));
    }
    lines.push(format!(
        "Characters used: {} / {}",
        usage.character_count, usage.character_limit
    ));
    lines.join("\n")
}

/// Full view of a settled session, `None` while there is nothing to show
pub fn render_state(state: &SessionState) -> Option<String> {
    let translation = state.translation.as_ref()?;

    let mut out = format!("{}\n  {}", result_title(Some(translation)), translation.text);
    let subtitle = usage_subtitle(state.usage.as_ref());
    if !subtitle.is_empty() {
        out.push_str(&format!("\n  ({})", subtitle));
    }
    Some(out)
}
