//! Deterministic playlist titles and descriptions.
//!
//! Templates come from the config file and support a fixed placeholder set.
//! An unknown placeholder is an error rather than a silent drop: a typo in
//! a template must fail the run, not publish a wrongly-named playlist.

use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::config::ChannelConfig;

/// Renders the playlist title. Recognized placeholders: `{category}`,
/// `{date}` (YYYYMMDD), `{channels}`.
pub fn playlist_title(
    category: &str,
    channels: &[ChannelConfig],
    target_date: NaiveDate,
    template: &str,
) -> Result<String> {
    let date_str = target_date.format("%Y%m%d").to_string();
    render(template, category, channels, &date_str, None)
}

/// Renders the playlist description. Recognized placeholders: `{category}`,
/// `{date}` (YYYY-MM-DD), `{channels}`, `{count}`.
///
/// Two audit lines (total count and generation date) are always appended so
/// the playlist records what produced it even when the template omits
/// `{count}`.
pub fn playlist_description(
    category: &str,
    channels: &[ChannelConfig],
    target_date: NaiveDate,
    video_count: usize,
    today: NaiveDate,
    template: &str,
) -> Result<String> {
    let date_str = target_date.format("%Y-%m-%d").to_string();
    let mut description = render(template, category, channels, &date_str, Some(video_count))?;

    description.push_str(&format!("\n\nTotal videos: {}", video_count));
    description.push_str(&format!(
        "\nGenerated automatically on {}",
        today.format("%Y-%m-%d")
    ));

    Ok(description)
}

fn joined_names(channels: &[ChannelConfig]) -> String {
    channels
        .iter()
        .map(|channel| channel.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Substitutes placeholders into `template`. `count` is only available for
/// descriptions; titles reject `{count}` like any other unknown key.
fn render(
    template: &str,
    category: &str,
    channels: &[ChannelConfig],
    date_str: &str,
    count: Option<usize>,
) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            if ch == '}' {
                bail!("unbalanced '}}' in template {template:?}");
            }
            output.push(ch);
            continue;
        }

        let mut key = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(inner) => key.push(inner),
                None => bail!("unclosed '{{' in template {template:?}"),
            }
        }

        match key.as_str() {
            "category" => output.push_str(category),
            "date" => output.push_str(date_str),
            "channels" => output.push_str(&joined_names(channels)),
            "count" => match count {
                Some(count) => output.push_str(&count.to_string()),
                None => bail!("placeholder {{count}} is not valid in a title template"),
            },
            other => bail!("unknown placeholder {{{other}}} in template {template:?}"),
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str) -> ChannelConfig {
        ChannelConfig {
            name: name.to_string(),
            channel_id: Some(format!("UC-{name}")),
            handle: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn title_uses_compact_date() {
        let title = playlist_title(
            "news",
            &[channel("CNBC")],
            date(2024, 5, 18),
            "{category}_{date}",
        )
        .unwrap();
        assert_eq!(title, "news_20240518");
    }

    #[test]
    fn title_rejects_count_placeholder() {
        let err = playlist_title("news", &[], date(2024, 5, 18), "{category}_{count}");
        assert!(err.is_err());
    }

    #[test]
    fn description_joins_channels_and_appends_audit_lines() {
        let description = playlist_description(
            "news",
            &[channel("CNBC"), channel("Bloomberg")],
            date(2024, 5, 18),
            4,
            date(2024, 5, 19),
            "{category} videos from {channels} uploaded on {date}",
        )
        .unwrap();

        assert_eq!(
            description,
            "news videos from CNBC, Bloomberg uploaded on 2024-05-18\n\n\
             Total videos: 4\nGenerated automatically on 2024-05-19"
        );
    }

    #[test]
    fn description_supports_count_placeholder() {
        let description = playlist_description(
            "dev",
            &[channel("A")],
            date(2024, 1, 2),
            7,
            date(2024, 1, 2),
            "{count} videos",
        )
        .unwrap();
        assert!(description.starts_with("7 videos"));
        assert!(description.contains("Total videos: 7"));
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let err = playlist_title("news", &[], date(2024, 5, 18), "{cattegory}_{date}");
        assert!(err.unwrap_err().to_string().contains("cattegory"));
    }

    #[test]
    fn unbalanced_braces_are_errors() {
        assert!(playlist_title("news", &[], date(2024, 5, 18), "oops}").is_err());
        assert!(playlist_title("news", &[], date(2024, 5, 18), "{date").is_err());
    }
}
