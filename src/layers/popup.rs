//! Popup body shown when a marker is tapped.

use crate::layers::marker::Marker;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopupBody {
    pub title: Option<String>,
    /// Host-supplied markup, passed through untouched.
    pub content: Option<String>,
    pub directions_url: Option<String>,
}

impl PopupBody {
    pub fn from_marker(marker: &Marker) -> Self {
        Self {
            title: marker.title.clone(),
            content: marker.popup_content.clone(),
            directions_url: marker.directions_url.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.directions_url.is_none()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(title) = &self.title {
            html.push_str("<strong>");
            html.push_str(&escape_html(title));
            html.push_str("</strong>");
        }
        if let Some(content) = &self.content {
            if !html.is_empty() {
                html.push_str("<br/>");
            }
            html.push_str(content);
        }
        if let Some(url) = &self.directions_url {
            if !html.is_empty() {
                html.push_str("<br/>");
            }
            html.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Directions</a>",
                escape_html(url)
            ));
        }
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
