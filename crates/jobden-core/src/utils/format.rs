use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Node};

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43_200;

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` (taken as UTC), and
/// bare dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// "Jan 05, 2024". Unparseable input is returned unchanged.
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => value.to_string(),
    }
}

/// "Jan 05, 2024 14:30". Unparseable input is returned unchanged.
pub fn format_date_time(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => value.to_string(),
    }
}

/// "3 days ago", "in about 2 hours", or "Unknown" if the value can't be read.
pub fn format_relative_time(value: &str) -> String {
    relative_to(value, Utc::now())
}

fn relative_to(value: &str, now: DateTime<Utc>) -> String {
    if value.trim().is_empty() {
        return "Unknown".to_string();
    }
    let Some(then) = parse_timestamp(value) else {
        return "Unknown".to_string();
    };

    let seconds = (now - then).num_seconds();
    let distance = describe_distance(seconds.abs());
    if seconds >= 0 {
        format!("{} ago", distance)
    } else {
        format!("in {}", distance)
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Human distance for a non-negative number of seconds.
fn describe_distance(seconds: i64) -> String {
    let minutes = (seconds + 30) / 60;

    if minutes == 0 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_IN_DAY {
        let hours = (minutes + MINUTES_IN_HOUR / 2) / MINUTES_IN_HOUR;
        format!("about {}", plural(hours, "hour"))
    } else if minutes < 2520 {
        "1 day".to_string()
    } else if minutes < MINUTES_IN_MONTH {
        let days = (minutes + MINUTES_IN_DAY / 2) / MINUTES_IN_DAY;
        plural(days, "day")
    } else if minutes < 2 * MINUTES_IN_MONTH {
        let months = (minutes + MINUTES_IN_MONTH / 2) / MINUTES_IN_MONTH;
        format!("about {}", plural(months, "month"))
    } else {
        let months = minutes / MINUTES_IN_MONTH;
        if months < 12 {
            return plural(months, "month");
        }
        let years = months / 12;
        match months % 12 {
            0..=2 => format!("about {}", plural(years, "year")),
            3..=8 => format!("over {}", plural(years, "year")),
            _ => format!("almost {}", plural(years + 1, "year")),
        }
    }
}

/// Format an amount as US dollars: "$1,234.50".
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Elements whose end starts a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "tr", "section",
];

/// Elements whose content is never displayed.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "head", "noscript"];

/// Plain text from rich-text HTML. Block-level elements and `<br>` become
/// line breaks, entities are decoded, comments and scripts are dropped.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    collect_text(fragment.root_element(), &mut text);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(inner) = ElementRef::wrap(child) {
                    collect_text(inner, out);
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-05T14:30:00.123456"), "Jan 05, 2024");
        assert_eq!(format_date("2024-01-05T14:30:00Z"), "Jan 05, 2024");
        assert_eq!(format_date("2024-01-05"), "Jan 05, 2024");
        assert_eq!(format_date("soon"), "soon");
        assert_eq!(format_date_time("2024-01-05T14:30:59"), "Jan 05, 2024 14:30");
    }

    #[test]
    fn test_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(relative_to("2024-06-15T11:59:50", now), "less than a minute ago");
        assert_eq!(relative_to("2024-06-15T11:55:00.654321", now), "5 minutes ago");
        assert_eq!(relative_to("2024-06-15T09:00:00", now), "about 3 hours ago");
        assert_eq!(relative_to("2024-06-14T12:00:00", now), "1 day ago");
        assert_eq!(relative_to("2024-06-05T12:00:00", now), "10 days ago");
        assert_eq!(relative_to("2024-06-15T13:00:00", now), "in about 1 hour");
        assert_eq!(relative_to("2022-06-01T12:00:00", now), "about 2 years ago");
        assert_eq!(relative_to("", now), "Unknown");
        assert_eq!(relative_to("garbage", now), "Unknown");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_250_000.0), "$1,250,000.00");
        assert_eq!(format_currency(-42.0), "-$42.00");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>We build <strong>fast</strong> APIs.</p><ul><li>Rust</li><li>SQL &amp; more</li></ul>"),
            "We build fast APIs.\nRust\nSQL & more"
        );
        assert_eq!(strip_html("line one<br/>line  two"), "line one\nline two");
        assert_eq!(strip_html("no markup"), "no markup");
    }

    #[test]
    fn test_strip_html_keeps_bare_angle_brackets() {
        assert_eq!(
            strip_html("<p>Pay: base < 100k plus equity, bonus > 10%</p>"),
            "Pay: base < 100k plus equity, bonus > 10%"
        );
        assert_eq!(strip_html("needs < 2 years > 0 days"), "needs < 2 years > 0 days");
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(strip_html("<p>Caf&eacute; team&#8217;s lead</p>"), "Caf\u{e9} team\u{2019}s lead");
        assert_eq!(strip_html("a&nbsp;b &lt;tag&gt; &#x41;"), "a b <tag> A");
    }

    #[test]
    fn test_strip_html_drops_comments_and_scripts() {
        assert_eq!(
            strip_html("<p>ok</p><!-- <b>hidden</b> --><script>var x = 1;</script><style>p {}</style>"),
            "ok"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Zürich office", 6), "Zür...");
    }
}
