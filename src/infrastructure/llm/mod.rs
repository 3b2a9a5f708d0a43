pub mod offline;
pub mod openai;
pub mod prompts;

/// Pull a JSON object out of a model reply: the whole reply, then a fenced
/// code block, then the outermost `{ ... }` span.
pub fn extract_json(raw: &str) -> Option<serde_json::Value> {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(raw.trim()) {
        return Some(v);
    }

    if let Some(fence) = raw.find("```") {
        let body_start = raw[fence..].find('\n').map(|i| fence + i + 1);
        if let Some(start) = body_start {
            if let Some(len) = raw[start..].find("```") {
                if let Ok(v) = serde_json::from_str(raw[start..start + len].trim()) {
                    return Some(v);
                }
            }
        }
    }

    let open = raw.find('{')?;
    let close = raw.rfind('}')?;
    if close <= open {
        return None;
    }
    serde_json::from_str(&raw[open..=close]).ok()
}
