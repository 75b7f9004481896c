//! User-Agent screening for crawlers and automation frameworks.
//!
//! Off by default; enabled with `gate.screen_user_agents`.

/// Lowercase substrings that mark a crawler, scraper, link-preview bot or
/// automation driver.
const AUTOMATED_AGENT_PATTERNS: &[&str] = &[
    "scrapy", "requests", "urllib", "curl", "wget", "python-requests",
    "bot", "crawler", "spider", "scraper", "crawling", "python",
    "mechanize", "beautifulsoup", "selenium", "headless", "phantom",
    "webdriver", "automation",
    "googlebot", "bingbot", "baiduspider", "yandexbot", "slurp",
    "duckduckbot", "facebookexternalhit", "twitterbot", "rogerbot",
    "linkedinbot", "embedly", "quora", "pinterest", "slackbot",
    "redditbot", "applebot", "flipboard", "tumblr", "bitlybot",
    "skypeuripreview", "nuzzel", "discordbot", "qwantify", "pinterestbot",
    "bitrix link preview", "xing-contenttabreceiver", "chrome-lighthouse",
    "telegrambot", "apple-preview", "viberpreview", "whatsapp",
    "flipboardproxy", "developers.google.com/+/web/snippet", "vkshare",
    "w3c_validator", "facebot", "ia_archiver",
];

/// Whether `user_agent` looks like an automated client. An empty agent
/// counts as automated: every mainstream browser sends one.
pub fn is_automated(user_agent: &str) -> bool {
    let ua = user_agent.trim().to_ascii_lowercase();
    if ua.is_empty() {
        return true;
    }
    AUTOMATED_AGENT_PATTERNS.iter().any(|p| ua.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browsers_pass() {
        assert!(!is_automated(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        ));
        assert!(!is_automated(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15"
        ));
    }

    #[test]
    fn test_tools_and_bots_are_flagged() {
        assert!(is_automated("curl/8.4.0"));
        assert!(is_automated("python-requests/2.31.0"));
        assert!(is_automated("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"));
        assert!(is_automated("Mozilla/5.0 HeadlessChrome/120.0"));
        assert!(is_automated("W3C_Validator/1.3"));
    }

    #[test]
    fn test_empty_agent_is_flagged() {
        assert!(is_automated(""));
        assert!(is_automated("   "));
    }
}
