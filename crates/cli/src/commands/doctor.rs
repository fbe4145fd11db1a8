//! `silvercare doctor` — configuration audit and connectivity probe.
//!
//! Three stages: check which keys are configured, probe the provider
//! backends directly, then exercise the running service end to end with a
//! test message.

use silvercare_config::AppConfig;
use silvercare_providers::build_chain;
use std::time::Duration;

pub async fn run() -> anyhow::Result<()> {
    println!("🩺 SilverCare Doctor — 连通性自检");
    println!("================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ 配置有效");
            config
        }
        Err(e) => {
            println!("  ❌ 配置无效: {e}");
            anyhow::bail!("configuration invalid");
        }
    };

    // Key configuration
    if config.providers.dashscope.api_key.is_some() {
        println!("  ✅ 阿里云 Key (Route A) 已配置");
    } else {
        println!("  ⬜ 阿里云 Key (Route A) 未配置 (将降级)");
    }
    if config.providers.openrouter.api_key.is_some() {
        println!("  ✅ OpenRouter Key (Route B) 已配置");
    } else {
        println!("  ❌ OpenRouter Key (Route B) 未配置");
        issues += 1;
    }
    if config.search.api_key.is_some() {
        println!("  ✅ Tavily Key (实时搜索) 已配置");
    } else {
        println!("  ⬜ Tavily Key (实时搜索) 未配置 (跳过联网搜索)");
    }

    // Direct provider probes
    let chain = build_chain(&config);
    for provider in chain.providers() {
        match provider.health_check().await {
            Ok(true) => println!("  ✅ {} 可达", provider.name()),
            Ok(false) => {
                println!("  ⚠️  {} 探测失败", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ⚠️  {} 不可达: {e}", provider.name());
                issues += 1;
            }
        }
    }

    // Running service probe
    let host = if config.gateway.host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        &config.gateway.host
    };
    let base = format!("http://{host}:{}", config.gateway.port);
    println!("\n  正在连接后端服务 {base} ...");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()?;

    match client.get(&base).send().await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            println!("  ✅ 服务在线! 激活路由: {}", body["active_routes"]);

            // End-to-end round trip
            println!("  正在发送测试指令: '你好' ...");
            let chat = client
                .post(format!("{base}/chat"))
                .json(&serde_json::json!({"message": "你好", "user_id": "doctor"}))
                .timeout(Duration::from_secs(30))
                .send()
                .await;
            match chat {
                Ok(response) if response.status().is_success() => {
                    let body: serde_json::Value = response.json().await.unwrap_or_default();
                    let reply = body["response"].as_str().unwrap_or_default();
                    let preview: String = reply.chars().take(50).collect();
                    println!("  ✅ AI 回复: {preview}...");
                }
                Ok(response) => {
                    println!("  ❌ 对话测试失败 (状态码: {})", response.status());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ 对话测试失败: {e}");
                    issues += 1;
                }
            }
        }
        Ok(response) => {
            println!("  ❌ 服务异常 (状态码: {})", response.status());
            issues += 1;
        }
        Err(_) => {
            println!("  ⬜ 服务未启动 — 运行 `silvercare serve` 后重试");
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 全部检查通过!");
    } else {
        println!("  ⚠️  发现 {issues} 个问题，详见上方输出。");
    }

    Ok(())
}
