use serde::{Deserialize, Serialize};

/// Structured summary of a fetched web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteInsight {
    pub url: String,
    pub status: u16,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub headings: HeadingCounts,
    pub images: ImageStats,
    pub links: LinkStats,
    pub word_count: usize,
    /// Leading slice of the readable page text.
    pub text_excerpt: String,
    pub seo: SeoFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: usize,
    pub missing_alt: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub internal: usize,
    pub external: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoFlags {
    pub has_title: bool,
    pub title_length_ok: bool,
    pub has_meta_description: bool,
    pub single_h1: bool,
    pub has_viewport: bool,
    pub has_canonical: bool,
    pub has_lang: bool,
    pub https: bool,
}

impl SeoFlags {
    /// Human-readable list of the checks that failed.
    pub fn issues(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.has_title {
            out.push("missing <title>");
        } else if !self.title_length_ok {
            out.push("title length outside 10-60 characters");
        }
        if !self.has_meta_description {
            out.push("missing meta description");
        }
        if !self.single_h1 {
            out.push("page should have exactly one <h1>");
        }
        if !self.has_viewport {
            out.push("missing viewport meta tag");
        }
        if !self.has_canonical {
            out.push("missing canonical link");
        }
        if !self.has_lang {
            out.push("missing lang attribute on <html>");
        }
        if !self.https {
            out.push("not served over HTTPS");
        }
        out
    }
}

impl WebsiteInsight {
    /// Compact plain-text summary fed to the model inside prompts and tool
    /// results.
    pub fn summary(&self) -> String {
        let mut s = format!("URL: {} (HTTP {})\n", self.url, self.status);
        s.push_str(&format!(
            "Title: {}\n",
            self.title.as_deref().unwrap_or("(none)")
        ));
        s.push_str(&format!(
            "Meta description: {}\n",
            self.meta_description.as_deref().unwrap_or("(none)")
        ));
        s.push_str(&format!(
            "Headings: {} h1, {} h2, {} h3\n",
            self.headings.h1, self.headings.h2, self.headings.h3
        ));
        s.push_str(&format!(
            "Images: {} ({} without alt text)\n",
            self.images.total, self.images.missing_alt
        ));
        s.push_str(&format!(
            "Links: {} internal, {} external\n",
            self.links.internal, self.links.external
        ));
        s.push_str(&format!("Word count: {}\n", self.word_count));
        let issues = self.seo.issues();
        if issues.is_empty() {
            s.push_str("SEO issues: none detected\n");
        } else {
            s.push_str(&format!("SEO issues: {}\n", issues.join("; ")));
        }
        if !self.text_excerpt.is_empty() {
            s.push_str(&format!("Content excerpt: {}\n", self.text_excerpt));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_issues() {
        let insight = WebsiteInsight {
            url: "https://example.com".into(),
            status: 200,
            title: Some("Example".into()),
            ..Default::default()
        };
        let summary = insight.summary();
        assert!(summary.contains("Title: Example"));
        assert!(summary.contains("missing meta description"));
    }

    #[test]
    fn clean_page_reports_no_issues() {
        let seo = SeoFlags {
            has_title: true,
            title_length_ok: true,
            has_meta_description: true,
            single_h1: true,
            has_viewport: true,
            has_canonical: true,
            has_lang: true,
            https: true,
        };
        assert!(seo.issues().is_empty());
    }
}
