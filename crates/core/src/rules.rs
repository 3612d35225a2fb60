//! Static extraction rules: selector priorities, exclusion keyword lists,
//! boilerplate patterns, host exclusion lists, and per-site overrides.
//!
//! The lists cover both English and Japanese pages. Pattern sets are compiled
//! once at first use and shared across the process.

use regex::Regex;
use std::sync::LazyLock;

/// Generic content container selectors, tried in priority order.
///
/// Ordered from broad semantic containers to site-convention class names,
/// with Japanese blog and tech-blog conventions at the tail.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    r#"[role="main"]"#,
    ".article",
    ".post",
    ".entry",
    ".article-body",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".main-content",
    ".content",
    ".page-content",
    ".blog-content",
    ".entry-body",
    ".post-body",
    ".content-area",
    ".article-detail",
    ".post-entry",
    ".markdown-body",
    ".post-detail",
    ".post-text",
    ".post__content",
    ".story-body",
    ".story-content",
    ".news-detail",
    ".news-content",
];

/// Minimum stripped-text length for a generic selector match to count.
pub const MIN_SELECTOR_TEXT_CHARS: usize = 200;

/// Tags removed outright before content location.
pub const EXCLUDE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "nav", "header", "footer", "aside", "button",
    "svg", "template", "meta", "link",
];

/// Class/id keywords whose elements are removed (substring match,
/// case-insensitive), unless the tag is in [`SAFE_TAGS`].
pub const EXCLUDE_KEYWORDS: &[&str] = &[
    "ad",
    "ads",
    "advertisement",
    "banner",
    "share",
    "sidebar",
    "widget",
    "footer",
    "header",
    "menu",
    "nav",
    "related",
    "recommend",
    "promotion",
    "social",
    "comment",
    "meta",
    "tag",
    "cookie",
    "popup",
    "subscribe",
    "breadcrumb",
    "pager",
    "pagination",
    "author-info",
    "author-bio",
    "サイドバー",
    "ヘッダー",
    "フッター",
    "広告",
    "シェア",
    "関連記事",
    "おすすめ",
    "メニュー",
    "ナビ",
    "コメント",
];

/// Structural tags never removed by keyword match, whatever their class/id.
pub const SAFE_TAGS: &[&str] = &[
    "html",
    "body",
    "div",
    "span",
    "section",
    "article",
    "main",
    "p",
    "br",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "table",
    "tr",
    "td",
    "th",
    "thead",
    "tbody",
    "a",
    "img",
    "figure",
    "figcaption",
    "blockquote",
    "pre",
    "code",
    "em",
    "strong",
    "mark",
    "time",
];

/// Class/id terms that signal a content container during scoring.
pub const CONTENT_TERMS: &[&str] =
    &["content", "article", "post", "entry", "main", "body", "text"];

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap_or_else(|e| panic!("bad pattern {p}: {e}")))
        .collect()
}

/// Text patterns that rarely belong to body content (copyright lines, SNS
/// chrome, pagination labels, publish-date prefixes). Applied both as a
/// scoring penalty and as a cleaning pass.
pub static BOILERPLATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"copyright|©|\(c\)|\d{4}[-\d{4}]?\s+all\s+rights\s+reserved",
        r"プライバシーポリシー|利用規約|サイトマップ",
        r"privacy policy|terms of (use|service)|site map",
        r"share|tweet|facebook|twitter|pocket|hatena|line",
        r"シェア|ツイート|いいね",
        r"previous|next|home|top|back to top",
        r"前へ|次へ|ホーム|トップ|ページトップへ",
        r"\[PR\]|\[広告\]|\[Advertisement\]|\[Sponsored\]",
        r"投稿日|公開日|更新日|作成日",
        r"published (on|at)|posted (on|at)|updated (on|at)",
    ])
});

/// Advertisement and promotion labels removed when `remove_ads` is set.
pub static AD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"\[PR\]|\[広告\]|\[Advertisement\]|\[Sponsored\]",
        r"広告|スポンサー|PR|プロモーション",
        r"Sponsored|Advertisement|Promotion",
        r"Advertisements?(\s+by\s+\w+)?",
        r"Sponsored\s+Content",
        r"Promoted\s+(Stories|Content)",
        r"Recommended\s+For\s+You",
    ])
});

/// Navigation and account-chrome labels removed when `remove_navigation` is set.
pub static NAVIGATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"サイトマップ|プライバシーポリシー|利用規約|お問い合わせ",
        r"ログイン|新規登録|パスワードを忘れた",
        r"検索|Search",
        r"メニュー|ナビゲーション",
        r"ホーム|TOP",
        r"Sign\s+(in|up)",
        r"Log\s+(in|out)",
        r"Create\s+an\s+account",
        r"Forgot\s+password",
        r"Navigation|Menu|Sitemap",
        r"Skip\s+to\s+(content|main)",
    ])
});

/// Footer and legal-boilerplate labels removed when `remove_footer` is set.
pub static FOOTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"copyright|©|all\s+rights\s+reserved",
        r"\d{4}-\d{4}\s+\w+\.\s+all\s+rights\s+reserved\.",
        r"powered\s+by\s+\w+",
        r"Copyright\s+©\s+\d{4}[-\d{4}]?",
        r"All\s+Rights\s+Reserved",
        r"Terms\s+of\s+(Use|Service)",
        r"Privacy\s+Policy",
        r"Contact\s+Us",
    ])
});

/// Related-content teaser labels removed when `remove_related` is set.
pub static RELATED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"関連記事|関連情報|こちらもおすすめ|あわせて読みたい",
        r"関連|おすすめ|人気の記事",
        r"Related\s+Articles|Related\s+Posts|You\s+might\s+also\s+like",
        r"Recommended\s+Articles",
        r"More\s+in\s+[A-Za-z\s]+",
        r"Popular\s+in\s+[A-Za-z\s]+",
        r"Trending\s+Now",
        r"Most\s+Read",
        r"From\s+Our\s+Network",
    ])
});

/// Host substrings that mark storefront and marketplace pages.
pub const ECOMMERCE_HOST_PATTERNS: &[&str] = &[
    "amazon",
    "rakuten",
    "yahoo.co.jp/shopping",
    "shopping.yahoo",
    "ebay",
    "aliexpress",
    "mercari",
    "paypay.ne.jp",
    "zozo",
    "qoo10",
    "ponpare",
    "auction",
    "store",
    "shop.",
    "cart",
    "checkout",
    "payment",
    "order",
    "shop",
    "mall",
    "market",
];

/// Host and path substrings that mark adult sites.
pub const ADULT_PATTERNS: &[&str] = &[
    "porn",
    "xxx",
    "adult",
    "sex",
    "hentai",
    "xvideos",
    "pornhub",
    "xhamster",
    "youporn",
    "redtube",
    "tube8",
    "dmm.co.jp/adult",
    "r18",
    "javhd",
    "fc2.com/adult",
    "dlsite.com/maniax",
];

/// Per-site extraction override.
///
/// `content_selectors` are tried in order; the first match wins, then has
/// every `strip_selectors` match removed from it, then every `purge_texts`
/// literal erased from what remains, before formatting.
#[derive(Debug, Clone, Copy)]
pub struct SiteRule {
    pub domain: &'static str,
    pub content_selectors: &'static [&'static str],
    pub strip_selectors: &'static [&'static str],
    pub purge_texts: &'static [&'static str],
}

/// Site overrides for hosts where generic heuristics pick the wrong element.
pub const SITE_RULES: &[SiteRule] = &[
    SiteRule {
        domain: "wikipedia.org",
        content_selectors: &["#mw-content-text"],
        strip_selectors: &[".mw-editsection", ".reference", ".noprint"],
        purge_texts: &["Jump to navigation", "Jump to search"],
    },
    SiteRule {
        domain: "news.yahoo.co.jp",
        content_selectors: &[".article_body", ".highLightSearchTarget"],
        strip_selectors: &[".promotion_module", ".sns_module", ".recommend_module"],
        purge_texts: &["関連記事", "あなたにおすすめの記事"],
    },
    SiteRule {
        domain: "qiita.com",
        content_selectors: &[".it-MdContent"],
        strip_selectors: &[".it-Footer", ".toc-container", ".socialButtons"],
        purge_texts: &["この記事は最終更新日から", "あとで読む"],
    },
    SiteRule {
        domain: "note.com",
        content_selectors: &[".note-common-styles__textnote-body"],
        strip_selectors: &[".o-noteContentText__footer", ".o-noteStatusLabelGroup"],
        purge_texts: &["この記事が気に入ったら、サポートをしてみませんか"],
    },
    SiteRule {
        domain: "hatena.ne.jp",
        content_selectors: &[".entry-content"],
        strip_selectors: &[".share-buttons", ".entry-footer-section"],
        purge_texts: &["この記事に", "ブックマークしている"],
    },
    SiteRule {
        domain: "github.com",
        content_selectors: &[".markdown-body"],
        strip_selectors: &[".anchor", ".user-mention", ".gist"],
        purge_texts: &[],
    },
    SiteRule {
        domain: "zenn.dev",
        content_selectors: &[".znc"],
        strip_selectors: &[".commentContainer", ".articleActions"],
        purge_texts: &["この記事は", "前へ"],
    },
];

/// Looks up the site rule for a host.
///
/// Matches on domain-label boundaries only, so `news.yahoo.co.jp` matches the
/// `news.yahoo.co.jp` rule but `notnews.yahoo.co.jp.evil.example` does not.
/// When several rules match, the longest (most specific) domain wins.
pub fn site_rule_for(host: &str) -> Option<&'static SiteRule> {
    let host = host.to_ascii_lowercase();
    SITE_RULES
        .iter()
        .filter(|rule| host == rule.domain || host.ends_with(&format!(".{}", rule.domain)))
        .max_by_key(|rule| rule.domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_rule_suffix_match() {
        let rule = site_rule_for("en.wikipedia.org").unwrap();
        assert_eq!(rule.domain, "wikipedia.org");

        let rule = site_rule_for("news.yahoo.co.jp").unwrap();
        assert_eq!(rule.content_selectors, &[".article_body", ".highLightSearchTarget"]);
    }

    #[test]
    fn test_site_rule_requires_label_boundary() {
        assert!(site_rule_for("fakegithub.com").is_none());
        assert!(site_rule_for("github.com.evil.example").is_none());
        assert!(site_rule_for("gist.github.com").is_some());
    }

    #[test]
    fn test_site_rule_unknown_host() {
        assert!(site_rule_for("example.com").is_none());
    }

    #[test]
    fn test_pattern_tables_compile() {
        assert!(!BOILERPLATE_PATTERNS.is_empty());
        assert!(!AD_PATTERNS.is_empty());
        assert!(!NAVIGATION_PATTERNS.is_empty());
        assert!(!FOOTER_PATTERNS.is_empty());
        assert!(!RELATED_PATTERNS.is_empty());
    }

    #[test]
    fn test_boilerplate_matches_copyright_line() {
        let line = "Copyright © 2024 All Rights Reserved";
        assert!(BOILERPLATE_PATTERNS.iter().any(|re| re.is_match(line)));
    }

    #[test]
    fn test_ad_patterns_match_japanese_marker() {
        assert!(AD_PATTERNS.iter().any(|re| re.is_match("[広告] 新商品のご案内")));
    }
}
