//! Recover tasks written as prose or markdown.
//!
//! Three pattern families are tried in order and the first that yields
//! anything wins:
//!
//! 1. `Task N:` / `### Task N` section headers
//! 2. a single `**Title:**` / `**Description:**` pair
//! 3. a generic numbered list (`1. ...`, `2: ...`, `3) ...`)
//!
//! Extracted titles that come out empty or longer than
//! [`TaskLimits::max_title_chars`] are replaced by `Task {n}`: a long
//! "title" is description text captured in the wrong place.

use std::ops::Range;

use regex::{Captures, Regex};
use ts_domain::task::Task;

use crate::normalize::TaskLimits;

/// Parse tasks out of free text. `None` when no family matches.
pub fn parse_tasks_from_text(text: &str, limits: TaskLimits) -> Option<Vec<Task>> {
    let text = text.replace("\r\n", "\n");
    let tasks = extract_task_sections(&text, limits)
        .or_else(|| extract_labeled_pair(&text, limits))
        .or_else(|| extract_numbered_list(&text, limits))?;
    (!tasks.is_empty()).then_some(tasks)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Shared patterns
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn task_header_re() -> &'static Regex {
    regex!(r"(?mi)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?Task[ \t]+(\d+)[ \t]*(?:\*\*)?[ \t]*[:.)–-]?[ \t]*(?:\*\*)?")
}

/// `Time Estimate: 2 hours`, `**Estimated Time:** 3 days`, `Duration: 1 week`.
fn labeled_time_re() -> &'static Regex {
    regex!(r"(?i)(?:\*\*)?(?:time estimate|estimated time|duration)[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:|:)[ \t]*([^\n*()]+)")
}

fn takes_about_re() -> &'static Regex {
    regex!(r"(?i)[^.\n]*\btakes about[ \t]+([^.\n,;()]+)\.?")
}

/// A line that is nothing but a time estimate, optionally labelled.
fn bare_time_line_re() -> &'static Regex {
    regex!(r"(?i)^[ \t]*(?:[-*•][ \t]*)?(?:\*\*)?(?:(?:time estimate|estimated time|duration|time)[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:|:)?[ \t]*)?(?:\*\*)?[ \t]*((?:about|around|approx\.?|approximately|~)?[ \t]*\d+(?:\.\d+)?(?:[ \t]*(?:-|–|to)[ \t]*\d+(?:\.\d+)?)?[ \t]*(?:minutes?|mins?|hours?|hrs?|days?|weeks?|months?))[ \t]*\.?[ \t]*$")
}

fn description_label_re() -> &'static Regex {
    regex!(r"(?mi)^[ \t]*(?:[-*][ \t]+)?(?:\*\*)?Description[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:|:)[ \t]*")
}

fn collapse_newlines_re() -> &'static Regex {
    regex!(r"\n{3,}")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Cleanup helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '*' | '#' | '_' | '`'))
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// `Task {n}` for empty or overlong titles.
fn title_or_placeholder(title: String, n: usize, limits: TaskLimits) -> String {
    if title.is_empty() || title.chars().count() > limits.max_title_chars {
        format!("Task {n}")
    } else {
        title
    }
}

fn clean_estimate(raw: &str) -> String {
    raw.trim().trim_end_matches('.').trim().to_string()
}

fn clean_description(raw: &str) -> String {
    let without_labels = description_label_re().replace_all(raw, "");
    let kept: Vec<&str> = without_labels
        .lines()
        .filter(|line| !matches!(line.trim(), "-" | "*" | "•" | "()" | "( )"))
        .collect();
    let joined = kept.join("\n");
    collapse_newlines_re()
        .replace_all(&joined, "\n\n")
        .trim()
        .trim_start_matches(&[':', '-', '–'][..])
        .trim()
        .to_string()
}

fn remove_range(text: &str, range: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..range.start]);
    out.push_str(&text[range.end..]);
    out
}

/// Pull a time estimate out of `text`, returning it with the remaining text.
fn take_time_estimate(text: &str) -> (Option<String>, String) {
    for re in [labeled_time_re(), takes_about_re()] {
        if let Some(caps) = re.captures(text) {
            let estimate = clean_estimate(&caps[1]);
            if let Some(whole) = caps.get(0) {
                return (Some(estimate), remove_range(text, whole.range()));
            }
        }
    }
    (None, text.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Family 1: Task N headers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn extract_task_sections(text: &str, limits: TaskLimits) -> Option<Vec<Task>> {
    let headers: Vec<Range<usize>> = task_header_re()
        .find_iter(text)
        .map(|m| m.range())
        .collect();
    if headers.is_empty() {
        return None;
    }

    let tasks = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let end = headers.get(i + 1).map_or(text.len(), |next| next.start);
            parse_section(&text[header.end..end], i + 1, limits)
        })
        .collect();
    Some(tasks)
}

fn parse_section(section: &str, n: usize, limits: TaskLimits) -> Task {
    let (title, rest) = take_section_title(section);
    let (estimate, rest) = take_time_estimate(&rest);

    Task {
        id: None,
        title: title_or_placeholder(title, n, limits),
        description: clean_description(&rest),
        time_estimate: estimate.unwrap_or_default(),
    }
}

/// Title by `Title:`/`Task:` label, then bold text on the first line, then
/// the first sentence of the first line.
fn take_section_title(section: &str) -> (String, String) {
    let label_re = regex!(
        r"(?mi)^[ \t]*(?:[-*][ \t]+)?(?:\*\*)?(?:Title|Task)[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:|:)[ \t]*(.+?)[ \t]*$"
    );
    if let Some(caps) = label_re.captures(section) {
        return take_capture(section, &caps);
    }

    let Some((line_start, line)) = first_non_empty_line(section) else {
        return (String::new(), section.to_string());
    };

    let bold_re = regex!(r"\*\*([^*\n]+?)\*\*");
    if let Some(caps) = bold_re.captures(line) {
        if !caps[1].trim_end().ends_with(':') {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let range = line_start + whole.start..line_start + whole.end;
            return (clean_title(&caps[1]), remove_range(section, range));
        }
    }

    let sentence_re = regex!(r"^(.+?[.!?])(?:\s|$)");
    let sentence = sentence_re
        .captures(line.trim_start())
        .and_then(|c| c.get(1))
        .map_or(line.trim(), |m| m.as_str());
    let offset = line_start + line.find(sentence).unwrap_or(0);
    let range = offset..offset + sentence.len();
    (clean_title(sentence), remove_range(section, range))
}

fn take_capture(text: &str, caps: &Captures<'_>) -> (String, String) {
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    (clean_title(&caps[1]), remove_range(text, whole))
}

fn first_non_empty_line(text: &str) -> Option<(usize, &str)> {
    let mut offset = 0;
    for line in text.split('\n') {
        if !line.trim().is_empty() {
            return Some((offset, line));
        }
        offset += line.len() + 1;
    }
    None
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Family 2: **Title:** / **Description:** pair
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn extract_labeled_pair(text: &str, limits: TaskLimits) -> Option<Vec<Task>> {
    let title_re =
        regex!(r"(?mi)^[ \t]*\*\*Title[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:)[ \t]*(.*?)[ \t]*$");
    let desc_re = regex!(r"(?mi)^[ \t]*\*\*Description[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:)[ \t]*");
    let next_label_re = regex!(r"(?m)^[ \t]*\*\*[A-Za-z][A-Za-z ]*[ \t]*(?::[ \t]*\*\*|\*\*[ \t]*:)");

    let title = title_re.captures(text)?;
    let desc = desc_re.find(text)?;

    let body = &text[desc.end()..];
    let body = next_label_re
        .find(body)
        .map_or(body, |next| &body[..next.start()]);
    let (estimate, _) = take_time_estimate(text);

    Some(vec![Task {
        id: None,
        title: title_or_placeholder(clean_title(&title[1]), 1, limits),
        description: clean_description(body),
        time_estimate: estimate.unwrap_or_default(),
    }])
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Family 3: numbered list
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn numbered_item_re() -> &'static Regex {
    regex!(r"^[ \t]*\d{1,2}[ \t]*[.:)][ \t]+(.+?)[ \t]*$")
}

struct ListItem {
    title: String,
    description: Vec<String>,
    estimate: Option<String>,
}

fn extract_numbered_list(text: &str, limits: TaskLimits) -> Option<Vec<Task>> {
    let lines = list_body_lines(text)?;
    let mut items: Vec<ListItem> = Vec::new();

    for line in lines {
        if let Some(caps) = numbered_item_re().captures(line) {
            let n = items.len() + 1;
            items.push(split_item_line(&caps[1], n, limits));
            continue;
        }
        let Some(current) = items.last_mut() else {
            continue;
        };
        if let Some(caps) = bare_time_line_re().captures(line) {
            current.estimate = Some(clean_estimate(&caps[1]));
        } else if let Some(caps) = labeled_time_re().captures(line) {
            current.estimate = Some(clean_estimate(&caps[1]));
        } else {
            current.description.push(line.trim().to_string());
        }
    }

    if items.is_empty() {
        return None;
    }
    Some(
        items
            .into_iter()
            .map(|item| Task {
                id: None,
                title: item.title,
                description: clean_description(&item.description.join("\n")),
                time_estimate: item.estimate.unwrap_or_default(),
            })
            .collect(),
    )
}

/// Lines up to the end of the list. An unindented paragraph after a blank
/// line that follows the last item is the message's closing remark.
fn list_body_lines(text: &str) -> Option<Vec<&str>> {
    let lines: Vec<&str> = text.lines().collect();
    let last_item = lines.iter().rposition(|l| numbered_item_re().is_match(l))?;

    let mut end = lines.len();
    let mut saw_blank = false;
    for (i, line) in lines.iter().enumerate().skip(last_item + 1) {
        if line.trim().is_empty() {
            saw_blank = true;
        } else if saw_blank && !line.starts_with(&[' ', '\t'][..]) {
            end = i;
            break;
        }
    }
    Some(lines[..end].to_vec())
}

/// Split `**Title** - rest`, `Title: rest` or a plain line into title and
/// description start.
fn split_item_line(line: &str, n: usize, limits: TaskLimits) -> ListItem {
    let bold_re = regex!(r"^\*\*(.+?)\*\*[ \t]*[:–—-]?[ \t]*(.*)$");
    let sep_re = regex!(r"^(.+?)(?::|[ \t][–—-])[ \t]+(.+)$");

    let (title, rest) = if let Some(caps) = bold_re.captures(line) {
        (clean_title(&caps[1]), caps[2].trim().to_string())
    } else if let Some(caps) = sep_re
        .captures(line)
        .filter(|c| c[1].chars().count() <= limits.max_title_chars)
    {
        (clean_title(&caps[1]), caps[2].trim().to_string())
    } else {
        let whole = clean_title(line);
        if whole.chars().count() > limits.max_title_chars {
            // Mis-captured description: keep the text, synthesize the title.
            (String::new(), whole)
        } else {
            (whole, String::new())
        }
    };

    let (estimate, rest) = match bare_time_line_re().captures(&rest) {
        Some(caps) => (Some(clean_estimate(&caps[1])), String::new()),
        None => (None, rest),
    };

    ListItem {
        title: title_or_placeholder(title, n, limits),
        description: if rest.is_empty() { Vec::new() } else { vec![rest] },
        estimate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Task> {
        parse_tasks_from_text(text, TaskLimits::default()).expect("tasks")
    }

    #[test]
    fn task_headers_with_time_estimate() {
        let text = "Here is your plan.\n\nTask 1: Do X\nTime Estimate: 2 hours\nSome details about X.\n\n\n\nTask 2: Do Y\nTime Estimate: 1 day\nDetails for Y.\n\nTask 3: Do Z\nDetails for Z.";
        let tasks = parse(text);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].title, "Do X");
        assert_eq!(tasks[0].time_estimate, "2 hours");
        assert_eq!(tasks[0].description, "Some details about X.");
        assert_eq!(tasks[1].time_estimate, "1 day");
        assert_eq!(tasks[2].title, "Do Z");
        assert_eq!(tasks[2].time_estimate, "");
    }

    #[test]
    fn markdown_headers_with_bold_titles() {
        let text = "### Task 1\n**Set up analytics**\nInstall a tracking snippet on every page.\n**Estimated Time:** 3 hours\n\n### Task 2\n**Fix broken links**\nRun a crawler and repair 404s.\nThis takes about 2 days.";
        let tasks = parse(text);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Set up analytics");
        assert_eq!(tasks[0].time_estimate, "3 hours");
        assert_eq!(tasks[0].description, "Install a tracking snippet on every page.");
        assert_eq!(tasks[1].title, "Fix broken links");
        assert_eq!(tasks[1].time_estimate, "2 days");
        assert!(tasks[1].description.starts_with("Run a crawler"));
    }

    #[test]
    fn title_label_inside_section() {
        let text = "**Task 1:**\nTitle: Write landing copy\nDescription: Draft the hero text.\nDuration: 4 hours";
        let tasks = parse(text);
        assert_eq!(tasks[0].title, "Write landing copy");
        assert_eq!(tasks[0].description, "Draft the hero text.");
        assert_eq!(tasks[0].time_estimate, "4 hours");
    }

    #[test]
    fn first_sentence_becomes_title() {
        let text = "Task 1: Compress images. Use a lossless tool on the hero banner.";
        let tasks = parse(text);
        assert_eq!(tasks[0].title, "Compress images.");
        assert_eq!(tasks[0].description, "Use a lossless tool on the hero banner.");
    }

    #[test]
    fn overlong_section_title_is_synthesized() {
        let text = "Task 1: This is a very long sentence that clearly is not a title at all and keeps going";
        let tasks = parse(text);
        assert_eq!(tasks[0].title, "Task 1");
    }

    #[test]
    fn labeled_pair() {
        let text = "Sure!\n**Title:** Launch a newsletter\n**Description:** Pick a platform and send the first issue.\n**Time Estimate:** 5 hours";
        let tasks = parse(text);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Launch a newsletter");
        assert_eq!(tasks[0].description, "Pick a platform and send the first issue.");
        assert_eq!(tasks[0].time_estimate, "5 hours");
    }

    #[test]
    fn numbered_list_with_time_lines() {
        let text = "Plan:\n1. Audit the homepage\nCheck headings and copy.\n2 hours\n2: **Add alt text** - cover every product image\n3) Improve navigation: group pages by topic\nTime Estimate: 1 day";
        let tasks = parse(text);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].title, "Audit the homepage");
        assert_eq!(tasks[0].description, "Check headings and copy.");
        assert_eq!(tasks[0].time_estimate, "2 hours");
        assert_eq!(tasks[1].title, "Add alt text");
        assert_eq!(tasks[1].description, "cover every product image");
        assert_eq!(tasks[2].title, "Improve navigation");
        assert_eq!(tasks[2].time_estimate, "1 day");
    }

    #[test]
    fn long_numbered_line_becomes_description() {
        let text = "1. Spend some time going through every page and writing down what feels outdated or confusing";
        let tasks = parse(text);
        assert_eq!(tasks[0].title, "Task 1");
        assert!(tasks[0].description.starts_with("Spend some time"));
    }

    #[test]
    fn closing_remark_after_list_is_dropped() {
        let text = "1. What is your budget?\n2. Who is your audience?\n\nOnce I know, I can help.";
        let tasks = parse(text);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].title, "Who is your audience?");
        assert!(tasks[1].description.is_empty());
    }

    #[test]
    fn plain_prose_has_no_tasks() {
        assert!(parse_tasks_from_text("What is the URL of your site?", TaskLimits::default()).is_none());
        assert!(parse_tasks_from_text("", TaskLimits::default()).is_none());
    }

    #[test]
    fn collapses_excess_blank_lines() {
        let text = "Task 1: Plan\nFirst part.\n\n\n\n\nSecond part.";
        let tasks = parse(text);
        assert_eq!(tasks[0].description, "First part.\n\nSecond part.");
    }
}
