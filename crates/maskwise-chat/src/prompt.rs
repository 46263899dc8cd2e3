//! Instructions sent alongside the anonymized prompt.

use crate::types::ChatMessage;

/// System message constraining the generator to the allowed placeholders.
pub fn system_prompt(allowed: &[String]) -> String {
    let placeholders = if allowed.is_empty() {
        "none".to_string()
    } else {
        allowed.join(", ")
    };
    format!(
        "You are an intelligent assistant. Follow these rules:\n\
         1. Use ONLY these placeholders: {}\n\
         2. Never create new placeholders\n\
         3. Maintain original placeholder format\n\
         4. Respond in clean plain text without markdown",
        placeholders
    )
}

/// System + user messages for one generation call.
pub fn build_messages(anonymized: &str, allowed: &[String]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(allowed)),
        ChatMessage::user(anonymized),
    ]
}
