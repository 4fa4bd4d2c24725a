use chrono::{SecondsFormat, Utc};
use percent_encoding::percent_decode_str;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version tag written into every generated playlist
pub const DP_VERSION: &str = "1.0.0";

const SLUG_MAX_LEN: usize = 64;

/// Display settings for a playlist or item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<String>,
    /// CSS-like margin, either a string or a number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_play: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#loop: Option<bool>,
}

/// Values applied to every item unless overridden
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// One artwork in a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub source: String,
    /// Display duration in seconds
    pub duration: u64,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#override: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayConfig>,
}

fn default_license() -> String {
    "open".to_string()
}

fn default_dp_version() -> String {
    DP_VERSION.to_string()
}

/// A DP1 playlist document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(default = "default_dp_version")]
    pub dp_version: String,
    pub id: String,
    pub slug: String,
    pub title: String,
    /// RFC 3339 creation timestamp
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<PlaylistDefaults>,
    pub items: Vec<PlaylistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Playlist {
    /// Serialize to the JSON value sent to the device
    pub fn to_value(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Knobs for [`build_playlist`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOptions {
    pub title: String,
    /// Seconds per item
    pub duration: u64,
    /// One of `fit`, `fill`, `stretch`, `auto`
    pub scaling: String,
    pub background: String,
    pub license: String,
}

impl Default for PlaylistOptions {
    fn default() -> Self {
        Self {
            title: "Untitled Playlist".to_string(),
            duration: 300,
            scaling: "fit".to_string(),
            background: "#000000".to_string(),
            license: default_license(),
        }
    }
}

impl PlaylistOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }
}

/// Build a DP1 playlist showing each source URL in order
pub fn build_playlist<S: AsRef<str>>(sources: &[S], options: &PlaylistOptions) -> Playlist {
    let items = sources
        .iter()
        .map(|source| {
            let source = source.as_ref();
            PlaylistItem {
                id: Uuid::new_v4().to_string(),
                title: item_title(source),
                source: source.to_string(),
                duration: options.duration,
                license: options.license.clone(),
                r#ref: None,
                r#override: None,
                display: None,
            }
        })
        .collect();

    Playlist {
        dp_version: DP_VERSION.to_string(),
        id: Uuid::new_v4().to_string(),
        slug: slugify(&options.title),
        title: options.title.clone(),
        created: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        defaults: Some(PlaylistDefaults {
            display: Some(DisplayConfig {
                scaling: Some(options.scaling.clone()),
                background: Some(options.background.clone()),
                ..DisplayConfig::default()
            }),
            license: Some(options.license.clone()),
            duration: Some(options.duration),
        }),
        items,
        signature: None,
    }
}

/// URL-safe slug: lower-cased, every character outside `[a-z0-9_-]`
/// becomes `-`, dashes collapsed and trimmed, at most 64 characters.
/// Titles with no usable characters give an empty slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().to_lowercase().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let trimmed = slug.trim_matches('-');
    trimmed.chars().take(SLUG_MAX_LEN).collect()
}

/// Last path segment of the URL, or `Untitled`
fn item_title(source: &str) -> String {
    let path = match Url::parse(source) {
        Ok(url) => url.path().to_string(),
        Err(_) => source
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    match path.rsplit('/').next() {
        // `Url::path` is percent-encoded
        Some(segment) if !segment.is_empty() => {
            percent_decode_str(segment).decode_utf8_lossy().into_owned()
        }
        _ => "Untitled".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_single_item() {
        let playlist = build_playlist(&["https://example.com/art.html"], &PlaylistOptions::default());

        assert_eq!(playlist.dp_version, "1.0.0");
        assert_eq!(playlist.title, "Untitled Playlist");
        assert_eq!(playlist.slug, "untitled-playlist");
        assert_eq!(playlist.items.len(), 1);
        assert_eq!(playlist.items[0].source, "https://example.com/art.html");
        assert_eq!(playlist.items[0].duration, 300);
        assert_eq!(playlist.items[0].license, "open");
        assert!(Uuid::parse_str(&playlist.id).is_ok());
        assert!(Uuid::parse_str(&playlist.items[0].id).is_ok());
        assert_ne!(playlist.id, playlist.items[0].id);
        assert!(chrono::DateTime::parse_from_rfc3339(&playlist.created).is_ok());
    }

    #[test]
    fn test_build_multiple_items_keeps_order() {
        let urls = [
            "https://example.com/a.html",
            "https://example.com/b.html",
            "https://example.com/c.html",
        ];
        let options = PlaylistOptions::default()
            .with_title("My Show")
            .with_duration(60);
        let playlist = build_playlist(&urls, &options);

        assert_eq!(playlist.slug, "my-show");
        let titles: Vec<&str> = playlist.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["a.html", "b.html", "c.html"]);
        assert!(playlist.items.iter().all(|i| i.duration == 60));
    }

    #[test]
    fn test_build_custom_options() {
        let options = PlaylistOptions {
            title: "Custom".to_string(),
            duration: 120,
            scaling: "fill".to_string(),
            background: "#ffffff".to_string(),
            license: "token".to_string(),
        };
        let playlist = build_playlist(&["https://example.com/art.html"], &options);

        let defaults = playlist.defaults.unwrap();
        let display = defaults.display.unwrap();
        assert_eq!(display.scaling.as_deref(), Some("fill"));
        assert_eq!(display.background.as_deref(), Some("#ffffff"));
        assert_eq!(defaults.license.as_deref(), Some("token"));
        assert_eq!(defaults.duration, Some(120));
        assert_eq!(playlist.items[0].license, "token");
    }

    #[test]
    fn test_item_title_from_url() {
        assert_eq!(
            item_title("https://cdn.example.com/works/generative-piece.html?v=2"),
            "generative-piece.html"
        );
        assert_eq!(item_title("https://example.com/works/作品.html"), "作品.html");
        assert_eq!(item_title("https://example.com/works/my art.html"), "my art.html");
        assert_eq!(item_title("https://example.com/works/my%20art.html"), "my art.html");
        assert_eq!(item_title("https://example.com/"), "Untitled");
        assert_eq!(item_title("https://example.com"), "Untitled");
        assert_eq!(item_title("https://example.com/dir/"), "Untitled");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World! @#$"), "hello-world");
        assert_eq!(slugify("  Already-slugged_name  "), "already-slugged_name");
        assert_eq!(slugify("Ünïcode Title"), "n-code-title");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("@#$%"), "");
        assert_eq!(slugify(&"a".repeat(100)).len(), 64);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let playlist = build_playlist(&["https://example.com/art.html"], &PlaylistOptions::default());
        let value = playlist.to_value().unwrap();

        assert_eq!(value["dpVersion"], "1.0.0");
        assert!(value.get("signature").is_none());
        assert!(value["items"][0].get("ref").is_none());
        assert!(value["items"][0].get("display").is_none());
        assert_eq!(value["defaults"]["display"]["scaling"], "fit");
        assert!(value["defaults"]["display"].get("autoPlay").is_none());
    }

    #[test]
    fn test_parse_external_document() {
        let playlist: Playlist = serde_json::from_value(serde_json::json!({
            "id": "p",
            "slug": "s",
            "title": "T",
            "created": "2024-01-01T00:00:00Z",
            "items": [{"id": "i", "source": "https://example.com/x", "duration": 5}]
        }))
        .unwrap();

        assert_eq!(playlist.dp_version, "1.0.0");
        assert_eq!(playlist.items[0].license, "open");
        assert_eq!(playlist.items[0].title, "");
    }
}
