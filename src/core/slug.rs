use deunicode::deunicode;

/// 由地址與城市產生網址安全的識別字串
///
/// 變音符號轉為 ASCII，標點移除，連續分隔符合併為單一 `-`。
/// 不做唯一性檢查：相同地址與城市會覆寫同一個網站。
pub fn build_slug(address: &str, city: &str) -> String {
    let ascii = deunicode(&format!("{} {}", address, city));

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' || ch == '/' {
            pending_separator = true;
        }
        // 其他標點直接丟棄，不產生分隔符（例如 "O'Brien" -> "obrien"）
    }

    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
