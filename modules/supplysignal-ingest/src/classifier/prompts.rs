use schemars::schema_for;
use supplysignal_common::RawSignal;

use super::ai::Extraction;

fn focus(signal: &RawSignal) -> &'static str {
    match signal {
        RawSignal::News(_) => {
            "Decide whether this news item reports a concrete supply-chain disruption \
(labour action, port or route closure, congestion, conflict, system outage). \
General market commentary is not a disruption."
        }
        RawSignal::Weather(_) => {
            "Decide whether this weather reading threatens operations at the named hub. \
Use the riskLevel (1-5) and conditions to judge severity."
        }
        RawSignal::Shipping(_) => {
            "Decide whether this vessel status indicates congestion or disruption at its \
location. Longer delays mean higher severity."
        }
    }
}

fn extraction_schema() -> String {
    let schema = schema_for!(Extraction);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Build the extraction prompt for one signal.
pub(crate) fn classification_prompt(signal: &RawSignal) -> String {
    let payload = serde_json::to_string_pretty(signal).unwrap_or_else(|_| signal.label());
    format!(
        "{focus}\n\n\
If it does, answer with one JSON object matching this schema:\n{schema}\n\n\
If it does not, answer with null.\n\n\
Signal:\n{payload}",
        focus = focus(signal),
        schema = extraction_schema(),
    )
}
