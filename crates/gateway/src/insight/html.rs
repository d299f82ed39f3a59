//! Page analysis over a parsed HTML document.

use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};
use ts_domain::insight::{HeadingCounts, ImageStats, LinkStats, SeoFlags, WebsiteInsight};

macro_rules! selector {
    ($css:expr) => {{
        static SEL: std::sync::OnceLock<Selector> = std::sync::OnceLock::new();
        SEL.get_or_init(|| Selector::parse($css).expect("invalid static selector"))
    }};
}

/// Build a [`WebsiteInsight`] for a fetched page.
pub fn analyze_html(page_url: &Url, status: u16, html: &str, excerpt_chars: usize) -> WebsiteInsight {
    let document = Html::parse_document(html);

    let title = document
        .select(selector!("title"))
        .next()
        .map(|t| collapse_ws(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let meta_named = |name: &str| {
        document
            .select(selector!("meta[name]"))
            .find(|m| m.value().attr("name").is_some_and(|n| n.trim().eq_ignore_ascii_case(name)))
            .and_then(|m| m.value().attr("content"))
            .map(collapse_ws)
    };
    let meta_description = meta_named("description").filter(|d| !d.is_empty());
    let has_viewport = meta_named("viewport").is_some();

    let has_canonical = document.select(selector!("link[rel]")).any(|link| {
        link.value()
            .attr("rel")
            .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
    });
    let has_lang = document
        .select(selector!("html[lang]"))
        .any(|el| el.value().attr("lang").is_some_and(|l| !l.trim().is_empty()));

    let headings = HeadingCounts {
        h1: document.select(selector!("h1")).count(),
        h2: document.select(selector!("h2")).count(),
        h3: document.select(selector!("h3")).count(),
    };

    let mut images = ImageStats::default();
    for img in document.select(selector!("img")) {
        images.total += 1;
        if img.value().attr("alt").map_or(true, |a| a.trim().is_empty()) {
            images.missing_alt += 1;
        }
    }

    let mut links = LinkStats::default();
    for a in document.select(selector!("a[href]")) {
        match a.value().attr("href").map(|h| classify_link(page_url, h)) {
            Some(LinkKind::Internal) => links.internal += 1,
            Some(LinkKind::External) => links.external += 1,
            _ => {}
        }
    }

    let text = page_text(&document);
    let word_count = text.split_whitespace().count();
    let text_excerpt = truncate_chars(&collapse_ws(&text), excerpt_chars);

    let seo = SeoFlags {
        has_title: title.is_some(),
        title_length_ok: title
            .as_ref()
            .is_some_and(|t| (10..=60).contains(&t.chars().count())),
        has_meta_description: meta_description.is_some(),
        single_h1: headings.h1 == 1,
        has_viewport,
        has_canonical,
        has_lang,
        https: page_url.scheme() == "https",
    };

    WebsiteInsight {
        url: page_url.to_string(),
        status,
        title,
        meta_description,
        headings,
        images,
        links,
        word_count,
        text_excerpt,
        seo,
    }
}

/// Accept `example.com` as well as full URLs; only http(s) is allowed.
pub fn normalize_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let with_scheme = if regex!(r"(?i)^[a-z][a-z0-9+.-]*://").is_match(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&with_scheme).ok()?;
    (matches!(url.scheme(), "http" | "https") && url.host_str().is_some()).then_some(url)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Links
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, PartialEq, Eq)]
enum LinkKind {
    Internal,
    External,
    Ignored,
}

fn classify_link(page_url: &Url, href: &str) -> LinkKind {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || ["mailto:", "tel:", "javascript:", "data:"].iter().any(|p| lower.starts_with(p))
    {
        return LinkKind::Ignored;
    }
    match page_url.join(href) {
        Ok(target) if !matches!(target.scheme(), "http" | "https") => LinkKind::Ignored,
        Ok(target) if same_site(target.host_str(), page_url.host_str()) => LinkKind::Internal,
        Ok(_) => LinkKind::External,
        Err(_) => LinkKind::Ignored,
    }
}

fn same_site(a: Option<&str>, b: Option<&str>) -> bool {
    let strip = |h: &str| h.trim_start_matches("www.").to_ascii_lowercase();
    match (a, b) {
        (Some(a), Some(b)) => strip(a) == strip(b),
        _ => false,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Text extraction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Visible text of the page body, one line per block element.
fn page_text(document: &Html) -> String {
    let root = document
        .select(selector!("body"))
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    for node in root.descendants() {
        match node.value() {
            Node::Text(text) if !is_hidden(node.ancestors().filter_map(ElementRef::wrap)) => {
                out.push_str(text);
            }
            Node::Element(el) if is_block(el.name()) => out.push('\n'),
            _ => {}
        }
    }

    let mut result = String::new();
    let mut prev_blank = false;
    for line in out.lines() {
        let trimmed = collapse_ws(line);
        if trimmed.is_empty() {
            if !prev_blank {
                result.push('\n');
                prev_blank = true;
            }
        } else {
            result.push_str(&trimmed);
            result.push('\n');
            prev_blank = false;
        }
    }
    result.trim().to_string()
}

fn is_hidden<'a>(mut ancestors: impl Iterator<Item = ElementRef<'a>>) -> bool {
    ancestors.any(|el| matches!(el.value().name(), "script" | "style" | "noscript" | "template"))
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "tr" | "br"
            | "article" | "section" | "header" | "footer" | "blockquote"
    )
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <title>Sweet Buns Bakery &amp; Cafe</title>
  <meta name="description" content="Fresh bread every morning.">
  <meta name="viewport" content="width=device-width">
  <link rel="canonical" href="https://sweetbuns.example/">
  <style>body { color: red; }</style>
</head>
<body>
  <h1>Welcome</h1>
  <h2>Menu</h2><h2>Hours</h2>
  <img src="a.jpg" alt="Sourdough loaf"><img src="b.jpg"><img src="c.jpg" alt="">
  <a href="/menu">Menu</a>
  <a href="https://www.sweetbuns.example/about">About</a>
  <a href="https://instagram.com/sweetbuns">Instagram</a>
  <a href="mailto:hi@sweetbuns.example">Mail</a>
  <p>We bake bread daily.</p>
  <script>var tracking = 1;</script>
</body>
</html>"#;

    fn url() -> Url {
        Url::parse("https://sweetbuns.example/").unwrap()
    }

    #[test]
    fn extracts_metadata_and_counts() {
        let insight = analyze_html(&url(), 200, PAGE, 200);
        assert_eq!(insight.title.as_deref(), Some("Sweet Buns Bakery & Cafe"));
        assert_eq!(insight.meta_description.as_deref(), Some("Fresh bread every morning."));
        assert_eq!(insight.headings, HeadingCounts { h1: 1, h2: 2, h3: 0 });
        assert_eq!(insight.images, ImageStats { total: 3, missing_alt: 2 });
        assert_eq!(insight.links, LinkStats { internal: 2, external: 1 });
        assert!(insight.text_excerpt.contains("We bake bread daily."));
        assert!(!insight.text_excerpt.contains("tracking"));
        assert!(!insight.text_excerpt.contains("color: red"));
    }

    #[test]
    fn seo_flags_for_clean_page() {
        let insight = analyze_html(&url(), 200, PAGE, 200);
        assert!(insight.seo.issues().is_empty(), "{:?}", insight.seo.issues());
    }

    #[test]
    fn seo_flags_for_bare_page() {
        let url = Url::parse("http://bare.example/").unwrap();
        let insight = analyze_html(&url, 200, "<html><body><p>hi</p></body></html>", 100);
        assert!(!insight.seo.has_title);
        assert!(!insight.seo.single_h1);
        assert!(!insight.seo.https);
        assert!(!insight.seo.has_lang);
        assert_eq!(insight.word_count, 1);
    }

    #[test]
    fn normalizes_scheme_less_urls() {
        assert_eq!(
            normalize_url("example.com/shop").unwrap().as_str(),
            "https://example.com/shop"
        );
        assert_eq!(
            normalize_url("http://example.com").unwrap().scheme(),
            "http"
        );
        assert!(normalize_url("ftp://example.com").is_none());
        assert!(normalize_url("  ").is_none());
    }

    #[test]
    fn page_text_keeps_blocks_and_skips_scripts() {
        let doc = Html::parse_document(
            "<html><body><h1>Hello</h1><p>World <b>wide</b></p><script>var x=1;</script></body></html>",
        );
        assert_eq!(page_text(&doc), "Hello\nWorld wide");
    }

    #[test]
    fn page_text_decodes_entities() {
        let doc = Html::parse_document("<p>A &amp; B &lt; C</p>");
        assert_eq!(page_text(&doc), "A & B < C");
    }

    #[test]
    fn angle_brackets_inside_attributes_are_kept() {
        let html = r#"<html><head>
            <meta name="description" content="Cakes > bread, every day">
            <meta name="viewport" content="width=device-width">
        </head><body>
            <img src="cake.jpg" alt="3 > 2 layers"><a href="/menu" title="a > b">Menu</a>
        </body></html>"#;
        let insight = analyze_html(&url(), 200, html, 200);
        assert_eq!(insight.meta_description.as_deref(), Some("Cakes > bread, every day"));
        assert!(insight.seo.has_meta_description);
        assert!(insight.seo.has_viewport);
        assert_eq!(insight.images, ImageStats { total: 1, missing_alt: 0 });
        assert_eq!(insight.links, LinkStats { internal: 1, external: 0 });
    }

    #[test]
    fn markup_in_comments_and_scripts_is_not_counted() {
        let html = r#"<html><body>
            <!-- <img src="old.jpg"><a href="https://old.example/">old</a><h1>Old</h1> -->
            <script>document.write('<img src="x.jpg"><a href="https://ads.example/">ad</a>');</script>
            <h1>Today</h1>
        </body></html>"#;
        let insight = analyze_html(&url(), 200, html, 200);
        assert_eq!(insight.images.total, 0);
        assert_eq!(insight.links, LinkStats::default());
        assert_eq!(insight.headings.h1, 1);
        assert_eq!(insight.text_excerpt, "Today");
    }

    #[test]
    fn excerpt_is_truncated() {
        let long = format!("<p>{}</p>", "word ".repeat(500));
        let insight = analyze_html(&url(), 200, &long, 20);
        assert_eq!(insight.text_excerpt.chars().count(), 21);
        assert_eq!(insight.word_count, 500);
    }
}
