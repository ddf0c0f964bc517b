use serde_json::Value;

use super::{joined_runs, node_text, str_at};

const TABS: &str = "/contents/twoColumnBrowseResultsRenderer/tabs";
const FIRST_SECTION_ITEM: &str =
    "/content/sectionListRenderer/contents/0/itemSectionRenderer/contents/0";

/// Channel fields read from `ytInitialData`. Count fields hold the raw
/// display text ("1.2M subscribers"); parsing happens in the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub subscriber_text: Option<String>,
    pub view_count_text: Option<String>,
    pub video_count_text: Option<String>,
}

#[must_use]
pub fn resolve_channel_fields(data: &Value) -> ChannelFields {
    let header = channel_header(data);
    let metadata = data.pointer("/metadata/channelMetadataRenderer");
    let about = channel_about(data);

    let title = metadata
        .and_then(|m| str_at(m, "/title"))
        .or_else(|| header.and_then(|h| str_at(h, "/title")))
        .or_else(|| header.and_then(|h| h.get("title")).and_then(node_text))
        .or_else(|| about.and_then(|a| str_at(a, "/title/simpleText")))
        .map(str::to_string);

    let description = metadata
        .and_then(|m| str_at(m, "/description"))
        .or_else(|| about.and_then(|a| str_at(a, "/description/simpleText")))
        .map(str::to_string)
        .or_else(|| about.and_then(|a| a.get("description")).and_then(joined_runs));

    let avatar_url = metadata
        .and_then(|m| str_at(m, "/avatar/thumbnails/0/url"))
        .or_else(|| header.and_then(|h| str_at(h, "/avatar/thumbnails/0/url")))
        .map(str::to_string);

    let subscriber_text = header
        .and_then(|h| h.get("subscriberCountText"))
        .and_then(node_text)
        .or_else(|| {
            about
                .and_then(|a| a.get("subscriberCountText"))
                .and_then(node_text)
        })
        .map(str::to_string);

    let view_count_text = about
        .and_then(|a| a.get("viewCountText"))
        .and_then(node_text)
        .map(str::to_string);

    let video_count_text = about
        .and_then(|a| a.get("videoCountText"))
        .and_then(node_text)
        .map(str::to_string);

    ChannelFields {
        title,
        description,
        avatar_url,
        subscriber_text,
        view_count_text,
        video_count_text,
    }
}

fn channel_header(data: &Value) -> Option<&Value> {
    let nested = format!("{TABS}/0/tabRenderer{FIRST_SECTION_ITEM}/channelHeaderRenderer");
    data.pointer("/header/c4TabbedHeaderRenderer")
        .or_else(|| data.pointer(&nested))
        .or_else(|| data.pointer("/header/channelHeaderRenderer"))
        .filter(|v| v.is_object())
}

fn channel_about(data: &Value) -> Option<&Value> {
    let tabs = data.pointer(TABS)?.as_array()?;
    let about_tab = tabs.iter().find(|tab| {
        tab.pointer("/tabRenderer/title").and_then(Value::as_str) == Some("About")
            || tab
                .pointer("/tabRenderer/endpoint/commandMetadata/webCommandMetadata/url")
                .and_then(Value::as_str)
                .is_some_and(|url| url.contains("/about"))
    })?;
    let path = format!("/tabRenderer{FIRST_SECTION_ITEM}/channelAboutFullMetadataRenderer");
    about_tab.pointer(&path)
}
