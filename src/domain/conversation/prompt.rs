//! Conditioning instruction for in-character replies.
//!
//! Assembly is a pure function of the selected period and persona, so the
//! same selection always produces the same instruction.

use crate::domain::catalog::{Period, Persona};

/// Soft target for reply length, in characters.
pub const REPLY_TARGET_CHARS: usize = 150;

/// Hard ceiling for reply length, in characters.
pub const REPLY_MAX_CHARS: usize = 300;

/// Shown when the model answers with no text.
pub const SILENCE_FALLBACK: &str = "时空静默...";

/// Shown when the model call itself fails.
pub const TRANSMISSION_FAILED_FALLBACK: &str = "星象紊乱，传音未达。";

/// Builds the system-level directive for a conversation turn.
///
/// Carries the persona's name and title, the period name, the persona's
/// role-play fragment, the period background and prices, and four fixed
/// rules: no modern vocabulary, strong persona voice, a length cap, and
/// bewilderment at anachronisms.
pub fn conditioning_instruction(period: &Period, persona: &Persona) -> String {
    format!(
        "你是{title}{name}，当前处于唐朝的{period_name}时期。\n\
         \n\
         {fragment}\n\
         \n\
         当前历史背景：{context}\n\
         当前物价参考：{prices}\n\
         \n\
         核心戒律：\n\
         1. 绝对严禁使用任何现代词汇（如：系统、UI、AI、回复、指令、功能、选项）。\n\
         2. 回复必须带有浓厚的身份色彩。\n\
         3. 字数控制在{target}字以内（绝不超过{max}字）。\n\
         4. 如果用户提到现代事物，请表达出完全的困惑或将其理解为某种神迹或疯言。",
        title = persona.display_title,
        name = persona.display_name,
        period_name = period.display_name,
        fragment = persona.conditioning_prompt,
        context = period.historical_context,
        prices = period.price_text,
        target = REPLY_TARGET_CHARS,
        max = REPLY_MAX_CHARS,
    )
}
