//! System prompt blocks prepended to every classification request.

use crate::classifier::ChatMessage;

/// Wrap a character's persona text in the role-play instructions.
pub fn persona_block(persona: &str) -> String {
    format!(
        "You are an NPC character in a role-playing game. Your behavior and responses must strictly adhere to the following persona: \n\n{}\n\nStay in character at all times and provide immersive, engaging, and contextually appropriate responses.",
        persona
    )
}

pub fn summary_block(chat_summary: &str) -> String {
    format!(
        "Here is the summary of the conversation so far: \n\n{}\n\nUse this context to provide a more relevant and engaging response.",
        chat_summary
    )
}

/// Persona first, then the running summary.
pub fn system_messages(persona: &str, chat_summary: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(persona_block(persona)),
        ChatMessage::system(summary_block(chat_summary)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_order() {
        let messages = system_messages("A gruff blacksmith.", "Player asked about swords.");
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.role == "system"));
        assert!(messages[0].content.contains("A gruff blacksmith."));
        assert!(messages[0].content.starts_with("You are an NPC character"));
        assert!(messages[1].content.contains("Player asked about swords."));
    }

    #[test]
    fn test_empty_summary_still_sent() {
        let block = summary_block("");
        assert!(block.starts_with("Here is the summary of the conversation so far"));
    }
}
