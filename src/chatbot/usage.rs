//! `/help` text.

use std::fmt::Write;

use crate::config::{ConversationConfig, LlmConfig};

/// Builds the usage text shown for `/help`.
#[must_use]
pub fn usage_text(config: &ConversationConfig, llm: Option<&LlmConfig>) -> String {
    let mut usage = String::from("使い方:\n");

    if config.ambient_chance > 0 {
        let _ = writeln!(
            usage,
            "    @darazbot <prompt>  (または1/{}の確率で)応答",
            config.ambient_chance
        );
    } else {
        usage.push_str("    @darazbot <prompt>  応答\n");
    }
    usage.push_str("    @darazbot /bye      すべて忘れる\n");
    usage.push_str("    @darazbot /help     このテキストを表示\n");

    let _ = write!(usage, "\n使用する会話: 最新{}件", config.history_window);
    if let Some(llm) = llm {
        let _ = write!(
            usage,
            "\nモデル: {}\n画像モデル: {}",
            llm.text_model, llm.vision_model
        );
    }
    let _ = write!(usage, "\nシステムプロンプト:\n\n{}", config.system_prompt);

    usage
}
