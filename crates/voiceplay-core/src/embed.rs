//! Embed frame rendering
//!
//! Describes the `<iframe>` a host mounts for the active source. The
//! attributes come from the catalog's [`FramePolicy`]: voice-over players run
//! sandboxed with an origin-only referrer, multi-source players do not.

use serde::{Deserialize, Serialize};

use crate::filter::AvailableSource;

/// Permissions granted to multi-source players
pub const MULTI_SOURCE_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

/// Permissions granted to voice-over players
pub const VOICE_OVER_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; fullscreen";

/// Sandbox flags applied to voice-over players
pub const VOICE_OVER_SANDBOX: &str =
    "allow-same-origin allow-scripts allow-forms allow-popups allow-popups-to-escape-sandbox";

/// Frame attributes shared by every source of a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePolicy {
    pub allow: String,
    pub sandbox: Option<String>,
    pub referrer_policy: Option<String>,
}

impl FramePolicy {
    /// Unsandboxed, no referrer policy.
    pub fn multi_source() -> Self {
        Self {
            allow: MULTI_SOURCE_ALLOW.to_string(),
            sandbox: None,
            referrer_policy: None,
        }
    }

    /// Sandboxed, `origin` referrer policy.
    pub fn voice_over() -> Self {
        Self {
            allow: VOICE_OVER_ALLOW.to_string(),
            sandbox: Some(VOICE_OVER_SANDBOX.to_string()),
            referrer_policy: Some("origin".to_string()),
        }
    }
}

impl Default for FramePolicy {
    fn default() -> Self {
        Self::multi_source()
    }
}

/// An iframe for one embed source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFrame {
    /// Provider embed URL
    pub src: String,
    /// Identity of the frame; changes whenever the selection or URL changes,
    /// so hosts remount instead of reusing a stale frame
    pub key: String,
    pub allow: String,
    pub sandbox: Option<String>,
    pub referrer_policy: Option<String>,
    pub allow_fullscreen: bool,
}

impl EmbedFrame {
    /// Frame for the source at `index` of the available list.
    pub fn for_source(index: usize, source: &AvailableSource, policy: &FramePolicy) -> Self {
        Self {
            src: source.url.clone(),
            key: format!("{}-{}", index, source.url),
            allow: policy.allow.clone(),
            sandbox: policy.sandbox.clone(),
            referrer_policy: policy.referrer_policy.clone(),
            allow_fullscreen: true,
        }
    }

    /// Render as an HTML `<iframe>` element.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<iframe src="{}" data-key="{}" allow="{}""#,
            escape_attr(&self.src),
            escape_attr(&self.key),
            escape_attr(&self.allow),
        );
        if let Some(policy) = &self.referrer_policy {
            html.push_str(&format!(r#" referrerpolicy="{}""#, escape_attr(policy)));
        }
        if let Some(sandbox) = &self.sandbox {
            html.push_str(&format!(r#" sandbox="{}""#, escape_attr(sandbox)));
        }
        if self.allow_fullscreen {
            html.push_str(" allowfullscreen");
        }
        html.push_str(r#" frameborder="0"></iframe>"#);
        html
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
