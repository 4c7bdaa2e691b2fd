/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 保留的最大字符数（不含省略号）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 把文本限制在 `max_len` 个字符以内（含省略号）
///
/// 超出时保留前 `max_len - 3` 个字符并追加 `...`。
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    text.chars().take(keep).collect::<String>() + "..."
}
