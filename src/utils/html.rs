/// 將 HTML 頁面轉為可供正規表達式比對的純文字
/// - 移除整個 <script> / <style> 區塊（不分大小寫）
/// - 其餘標籤以空白取代，避免相鄰文字黏在一起
/// - 解碼常見實體並壓縮空白
pub fn html_to_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut buf = input.to_string();
    for tag in ["script", "style"] {
        let open = format!("<{}", tag);
        let close = format!("</{}>", tag);
        loop {
            let lower = buf.to_ascii_lowercase();
            let Some(start) = lower.find(&open) else {
                break;
            };
            match lower[start..].find(&close) {
                Some(end_rel) => {
                    let end = start + end_rel + close.len();
                    buf.replace_range(start..end, " ");
                }
                None => {
                    buf.truncate(start);
                    break;
                }
            }
        }
    }

    let mut out = String::with_capacity(buf.len());
    let mut in_tag = false;
    for ch in buf.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    collapse_whitespace(&decode_entities(&out))
}

fn decode_entities(input: &str) -> String {
    const ENTITIES: [(&str, &str); 12] = [
        ("&pound;", "£"),
        ("&#163;", "£"),
        ("&#xa3;", "£"),
        ("&#xA3;", "£"),
        ("&nbsp;", " "),
        ("&#160;", " "),
        ("&ndash;", "–"),
        ("&#8211;", "–"),
        ("&mdash;", "—"),
        ("&rsquo;", "'"),
        ("&#39;", "'"),
        ("&quot;", "\""),
    ];

    let mut text = input.to_string();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    // &amp; 最後處理，避免 "&amp;pound;" 被解成 "£"
    text.replace("&amp;", "&")
}

fn collapse_whitespace(input: &str) -> String {
    let mut collapsed = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                collapsed.push(' ');
                last_space = true;
            }
        } else {
            collapsed.push(ch);
            last_space = false;
        }
    }
    collapsed.trim().to_string()
}
