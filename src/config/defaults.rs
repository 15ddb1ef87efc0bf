use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_input() -> PathBuf {
    PathBuf::from("input.json")
}

pub fn default_output() -> PathBuf {
    PathBuf::from("output.json")
}

pub fn default_reduce_dir() -> PathBuf {
    PathBuf::from("final_output")
}

pub fn default_timeout_sec() -> u64 {
    300
}

pub fn default_temperature() -> f32 {
    0.6
}

pub fn default_parse_retry_temperature() -> f32 {
    0.2
}

pub fn default_repair_temperature() -> f32 {
    0.3
}

pub fn default_delay_after_ms() -> u64 {
    2000
}

pub fn default_repair_delay_after_ms() -> u64 {
    1500
}

pub fn default_http_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_http_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_api_key_env() -> String {
    "PRISM_API_KEY".to_string()
}

pub fn default_max_tokens() -> u32 {
    8192
}

pub fn default_top_p() -> f32 {
    0.9
}

pub fn default_claude_binary() -> PathBuf {
    // Check common install location first
    if let Some(home) = std::env::var_os("HOME") {
        let local_path = PathBuf::from(home).join(".claude/local/claude");
        if local_path.exists() {
            return local_path;
        }
    }
    // Fall back to PATH lookup
    PathBuf::from("claude")
}

pub fn default_claude_model() -> String {
    "sonnet".to_string()
}

pub fn default_max_attempts() -> u32 {
    5
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}

pub fn default_repair_batch_size() -> usize {
    3
}

pub fn default_avoid_limit() -> usize {
    100
}

pub fn default_recent_texts() -> usize {
    10
}

pub fn default_existing_cap() -> usize {
    120
}
