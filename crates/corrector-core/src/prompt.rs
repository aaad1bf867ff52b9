use crate::domain::CorrectionMode;

/// System/user instruction pair for one completion request.
#[derive(Clone, Debug)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the instruction pair for `(mode, tone, text)`.
///
/// `tone` is free-form text supplied by the user (a preset expansion or an
/// arbitrary phrase); it is interpolated verbatim and never interpreted.
pub fn build(mode: CorrectionMode, tone: &str, text: &str) -> Prompt {
    let system = match mode {
        CorrectionMode::Full => full_instruction(tone),
        CorrectionMode::GrammarOnly => GRAMMAR_ONLY_INSTRUCTION.to_string(),
        CorrectionMode::StyleOnly => style_only_instruction(tone),
    };

    Prompt {
        system,
        user: text.to_string(),
    }
}

fn full_instruction(tone: &str) -> String {
    format!(
        "You are an expert language assistant.\n\
         Your task is to meticulously correct the grammar and spelling errors in the user's message.\n\
         Additionally, refine the style for clarity and conciseness.\n\
         Adjust the tone of the message to be {tone}.\n\
         Detect the language of the message automatically and respond in the same language.\n\
         Output ONLY the corrected message, without any preambles, explanations, or conversational filler.\n\
         Do not add any quotation marks around your response unless they were part of the original message and should be preserved.\n\
         Never include dashes or bullet points in your response.\n\
         Do not end your response with a full stop unless the tone is professional and the original message already ended with one.\n\
         If the message is already perfect, return it as is."
    )
}

const GRAMMAR_ONLY_INSTRUCTION: &str = "You are an expert proofreader.\n\
    Correct only the grammar, spelling, and punctuation errors in the user's message.\n\
    Preserve the original style and word choice exactly.\n\
    Output ONLY the corrected message, without any preambles, explanations, or formatting.\n\
    Do not end your response with a full stop unless the desired register is professional and the original message already ended with one.\n\
    If the message contains no errors, return it unchanged.";

fn style_only_instruction(tone: &str) -> String {
    format!(
        "You are an expert writing assistant.\n\
         Rewrite the user's message so its tone and style match: {tone}.\n\
         Leave spelling and punctuation exactly as written; change only what the new tone requires.\n\
         Output ONLY the rewritten message, without any preambles, explanations, or formatting.\n\
         If the message already matches that tone, return it unchanged."
    )
}
