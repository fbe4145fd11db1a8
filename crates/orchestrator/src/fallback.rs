//! Static fallback responder — the deterministic last resort.
//!
//! Used only when every provider route has failed or none is configured.
//! Ordered keyword groups map to canned answers; the first matching group
//! wins, and no match yields a generic "not yet connected" reply. Pure,
//! no I/O, always succeeds, never touches the session store.

use silvercare_core::{Answer, AnswerSource};
use tracing::info;

struct CannedGroup {
    keywords: &'static [&'static str],
    response: &'static str,
    suggestions: &'static [&'static str],
}

const GROUPS: &[CannedGroup] = &[
    CannedGroup {
        keywords: &["长护险"],
        response: "王阿姨，长护险可是个好政策！根据上海最新规定，60岁以上参保人员都能申请。您可以带上身份证和社保卡，去咱们街道的社区事务受理中心（就在居委会旁边）办理评估。评下来如果需要照护，每天有护理员上门，政府还给报销大头呢！",
        suggestions: &["需要准备什么材料？", "评估通过难不难？", "我有退休工资能办吗？"],
    },
    CannedGroup {
        keywords: &["助餐", "吃饭"],
        response: "吃饭确实是头等大事！咱们静安区的社区食堂每天中午10:30开饭。如果您办了敬老卡，每顿还能补贴1-2块钱。今天的菜单有红烧肉和清蒸鱼，就在小区北门出去左转那家，味道很清淡，适合咱们老年人。",
        suggestions: &["能送餐上门吗？", "周末开门吗？", "今天的菜谱是什么？"],
    },
    CannedGroup {
        keywords: &["健康", "高血压", "不舒服"],
        response: "老人家，天冷了要注意保暖。如果有高血压，记得按时吃药，饮食上少吃咸的。如果现在觉得胸闷或者头晕，千万别硬撑，赶紧按一下手边的紧急呼叫器，或者我帮您联系子女？",
        suggestions: &["我不舒服，帮我打120", "高血压能吃红烧肉吗？", "最近天气怎么样？"],
    },
];

const DEFAULT_RESPONSE: &str = "老人家，我收到您的消息啦！不过现在我的‘大脑’（API Key）还没连接好，等陈组长帮我接上线，我就能根据上海最新政策帮您解答更多问题了。您刚刚问的这个问题，我记在小本子上了。";

const DEFAULT_SUGGESTIONS: &[&str] = &["如何申请长护险", "附近哪里有助餐点", "我不舒服怎么办"];

fn to_answer(response: &str, suggestions: &[&str]) -> Answer {
    Answer {
        text: response.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        source: AnswerSource::Fallback,
    }
}

/// Map a message to its canned answer. First matching group wins.
pub fn respond(message: &str) -> Answer {
    for group in GROUPS {
        if group.keywords.iter().any(|kw| message.contains(kw)) {
            info!(keyword_group = group.keywords[0], "Static fallback matched");
            return to_answer(group.response, group.suggestions);
        }
    }
    info!("Static fallback: no keyword match, generic response");
    to_answer(DEFAULT_RESPONSE, DEFAULT_SUGGESTIONS)
}
