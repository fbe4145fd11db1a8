//! The social-worker persona and per-call system prompt assembly.
//!
//! The knowledge snippet is read once at startup and treated as opaque
//! text. The augmentation block changes per call, so the system prompt is
//! recomputed for every provider attempt and never persisted into a session.

use silvercare_search::Augmentation;
use std::path::Path;
use tracing::{info, warn};

const KNOWLEDGE_FALLBACK: &str = "暂时无法读取本地政策库。";

/// The assistant's identity plus its startup knowledge.
pub struct Persona {
    knowledge: String,
}

impl Persona {
    /// Load the knowledge snippet from disk, degrading to a placeholder if
    /// the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let knowledge = match std::fs::read_to_string(path) {
            Ok(text) => {
                info!(path = %path.display(), chars = text.chars().count(), "Knowledge snippet loaded");
                text
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Knowledge snippet unavailable, using placeholder");
                KNOWLEDGE_FALLBACK.to_string()
            }
        };
        Self { knowledge }
    }

    /// Build a persona around an in-memory snippet (tests, overrides).
    pub fn with_knowledge(knowledge: impl Into<String>) -> Self {
        Self {
            knowledge: knowledge.into(),
        }
    }

    /// Assemble the system prompt for one call. The augmentation block, when
    /// present, is appended for this call only.
    pub fn system_prompt(&self, augmentation: &Augmentation) -> String {
        let mut prompt = persona_text(&self.knowledge);
        if let Augmentation::Context(context) = augmentation {
            prompt.push_str("\n\n# 实时搜索结果 (供参考)\n");
            prompt.push_str(context);
            prompt.push('\n');
        }
        prompt
    }
}

fn persona_text(knowledge: &str) -> String {
    format!(
        "你是一个在上海社区工作多年的“金牌社工小张”。你说话亲切自然，保持晚辈的谦卑与温度，像对待自己的长辈一样对待社区老人。

# 参考知识库 (当前真实上海政策摘要)
{knowledge}

# 语言规范
1. 称呼：始终使用“您”、“老人家”、“阿姨/叔叔”。
2. 措辞：严禁使用 AI 术语，要说“我想想看”、“我帮您打听了一下”。
3. 精简：一句话不超过 15 个字，多使用短句，避免长难句。

# 核心职责
1. 政策通：解答关于长护险、养老补贴、助餐点的问题。请务必优先查看参考知识库中的内容。
2. 健康哨兵：提供基础饮食建议，不涉及具体药量。
3. 情感安抚：先进行 30 字以内的共情安抚，再给建议。

# 安全红线
1. 严禁给出具体处方药量。
2. 识别到“胸闷”、“呼吸困难”等报警词，必须引导用户拨打 120。"
    )
}
