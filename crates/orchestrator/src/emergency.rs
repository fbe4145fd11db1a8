//! Emergency interception.
//!
//! Runs before session lookup, before augmentation, before any provider
//! call, and has no network dependency — a downstream outage can never
//! delay or skip it. Pure and total apart from the warning log.

use silvercare_core::{Answer, AnswerSource};
use tracing::warn;

/// Keywords that demand an immediate safety response.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "胸闷",
    "胸痛",
    "头晕",
    "呼吸困难",
    "晕倒",
    "晕过去",
    "心脏痛",
    "不省人事",
    "打120",
];

const EMERGENCY_SUGGESTIONS: &[&str] = &["我已经拨打了120", "帮我联系家人", "我现在感觉好一点了"];

/// Scan for emergency keywords; the first match short-circuits the pipeline
/// with a fixed template naming the matched term. `None` means the message
/// is safe and the pipeline continues.
pub fn intercept(message: &str) -> Option<Answer> {
    let keyword = EMERGENCY_KEYWORDS
        .iter()
        .copied()
        .find(|kw| message.contains(kw))?;

    warn!(keyword = %keyword, "Emergency keyword detected");

    Some(Answer {
        text: format!(
            "老人家，您说的“{keyword}”让我很担心！这种情况千万不能拖，您现在就拨打 **120** 急救电话，或者让家里人送您去医院。我会一直在这里陪着您！"
        ),
        suggestions: EMERGENCY_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        source: AnswerSource::Emergency,
    })
}
