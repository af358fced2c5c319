use chrono::NaiveTime;

/// Canned reply used when no AI provider is configured.
///
/// Matching is a lowercase substring test and the first rule wins.
pub fn fallback_reply(message: &str, now: NaiveTime) -> String {
    let lower = message.to_lowercase();

    if lower.contains("hello") || lower.contains("hi") {
        "Hello! How can I assist you today?".to_string()
    } else if lower.contains("how are you") {
        "I am functioning well. Thank you for asking!".to_string()
    } else if lower.contains("weather") {
        "I would need API access to check current weather conditions.".to_string()
    } else if lower.contains("time") {
        format!("The current time is {}.", now.format("%H:%M:%S"))
    } else {
        format!(
            "I understand you said: \"{}\". Please configure an AI API to get more detailed responses.",
            message
        )
    }
}
