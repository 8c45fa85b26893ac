//! Head-link markup primitive.
//!
//! [`HeadLink`] is the single source of truth for an asset's HTML
//! representation: the structured form serializes as an attribute map, and
//! [`HeadLink::render`] produces the literal `<link>` string from the same
//! fields. Attribute values go through [`maud::Escaper`], the same escaping
//! the rest of the ecosystem's maud templates use, so the two forms cannot
//! disagree.

use maud::{Markup, PreEscaped};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Rendering mode for link strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupStyle {
    /// `<link ...>` — HTML void element.
    #[default]
    Html,
    /// `<link ... />` — XHTML self-closing.
    Xhtml,
}

/// Structured representation of one `<link>` element.
///
/// Attribute order in the rendered string matches field order here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadLink {
    pub rel: &'static str,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'static str>,
}

impl HeadLink {
    /// Attribute name/value pairs in rendering order, absent values skipped.
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attrs: Vec<(&'static str, &str)> = vec![("rel", self.rel), ("href", &self.href)];
        if let Some(id) = &self.id {
            attrs.push(("id", id));
        }
        if let Some(media) = &self.media {
            attrs.push(("media", media));
        }
        if let Some(sizes) = &self.sizes {
            attrs.push(("sizes", sizes));
        }
        if let Some(mime_type) = self.mime_type {
            attrs.push(("type", mime_type));
        }
        attrs
    }

    /// Render the literal `<link>` string.
    pub fn render(&self, style: MarkupStyle) -> String {
        let mut out = String::from("<link");
        for (name, value) in self.attributes() {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            // Escaper only errors if the underlying writer does; String never does.
            let _ = maud::Escaper::new(&mut out).write_str(value);
            out.push('"');
        }
        match style {
            MarkupStyle::Html => out.push('>'),
            MarkupStyle::Xhtml => out.push_str(" />"),
        }
        out
    }

    /// The rendered link as [`maud::Markup`], for embedding in maud templates.
    pub fn to_markup(&self, style: MarkupStyle) -> Markup {
        PreEscaped(self.render(style))
    }
}
