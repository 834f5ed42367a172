use rand::seq::IndexedRandom;

/// Desktop user agents; one is picked at random per session.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// Registered on every new document before page scripts run.
pub const STEALTH_SCRIPT: &str = r"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
window.chrome = { runtime: {} };
";

#[must_use]
pub fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Quotes `value` as a JavaScript string literal.
pub(super) fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Expression that is `true` when `selector` matches a rendered element.
pub(super) fn visibility_script(selector: &str) -> String {
    format!(
        r"(() => {{
            const el = document.querySelector({sel});
            if (!el) return false;
            const rect = el.getBoundingClientRect();
            return rect.width > 0 && rect.height > 0;
        }})()",
        sel = js_string(selector)
    )
}

pub(super) fn count_script(selector: &str) -> String {
    format!(
        "document.querySelectorAll({sel}).length",
        sel = js_string(selector)
    )
}

/// Expression scrolling the container to its bottom; `false` when absent.
pub(super) fn scroll_to_end_script(selector: &str) -> String {
    format!(
        r"(() => {{
            const el = document.querySelector({sel});
            if (!el) return false;
            el.scrollTo(0, el.scrollHeight);
            return true;
        }})()",
        sel = js_string(selector)
    )
}

pub(super) fn clear_input_script(selector: &str) -> String {
    format!(
        r"(() => {{
            const el = document.querySelector({sel});
            if (!el) return false;
            el.value = '';
            return true;
        }})()",
        sel = js_string(selector)
    )
}

/// Resolves once the resource count has been stable for 500ms, or reports
/// `false` after `timeout_ms`.
pub(super) fn network_idle_script(timeout_ms: u64) -> String {
    format!(
        r"(async () => {{
            const timeoutMs = {timeout_ms};
            const idleMs = 500;
            const interval = 100;
            const start = Date.now();
            let last = performance.getEntriesByType('resource').length;
            let stable = 0;
            while (Date.now() - start < timeoutMs) {{
                await new Promise(r => setTimeout(r, interval));
                const current = performance.getEntriesByType('resource').length;
                if (current === last && document.readyState === 'complete') {{
                    stable += interval;
                    if (stable >= idleMs) return true;
                }} else {{
                    stable = 0;
                }}
                last = current;
            }}
            return false;
        }})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_user_agent_comes_from_the_list() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&pick_user_agent()));
        }
    }

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string("div[role='feed']"), r#""div[role='feed']""#);
        assert_eq!(js_string(r#"a[title="x"]"#), r#""a[title=\"x\"]""#);
    }

    #[test]
    fn count_script_embeds_quoted_selector() {
        assert_eq!(
            count_script("div[role='article']"),
            r#"document.querySelectorAll("div[role='article']").length"#
        );
    }
}
