//! Flattening a conversation into a single prompt string.

use super::history::Turn;

/// Speaker label for user lines
pub const USER_LABEL: &str = "User";
/// Speaker label for assistant lines
pub const ASSISTANT_LABEL: &str = "Assistant";

/// Serialize prior turns and a new message into one prompt.
///
/// Each prior turn becomes `User: ..\nAssistant: ..\n`; the result ends with
/// the new user line and an open `Assistant:` line for the model to
/// continue. No escaping or truncation is applied.
pub fn format_prompt(prior: &[Turn], new_message: &str) -> String {
    let mut prompt = String::new();
    for turn in prior {
        prompt.push_str(&format!(
            "{USER_LABEL}: {}\n{ASSISTANT_LABEL}: {}\n",
            turn.user, turn.assistant
        ));
    }
    prompt.push_str(&format!("{USER_LABEL}: {new_message}\n{ASSISTANT_LABEL}:"));
    prompt
}
