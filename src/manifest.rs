//! Web-manifest icon rendering.
//!
//! Converts an instruction set's icon-bearing categories (transparent and
//! maskable) into the manifest `icons` array. The structured form and the
//! serialized form derive from the same entries so they never disagree.

use crate::entry::AssetKind;
use crate::instructions::InstructionSet;
use serde::{Deserialize, Serialize};

/// One element of the manifest `icons` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    /// `"WxH"`.
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// `"maskable"` for maskable-category entries, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// The structured `icons` array, categories in declared order.
pub fn manifest_icons(set: &InstructionSet) -> Vec<ManifestIcon> {
    AssetKind::ALL
        .iter()
        .filter(|kind| kind.in_manifest())
        .flat_map(|&kind| {
            set.entries(kind).iter().map(move |entry| ManifestIcon {
                src: entry.url.clone(),
                sizes: format!("{}x{}", entry.width, entry.height),
                mime_type: entry.mime_type.to_string(),
                purpose: (kind == AssetKind::Maskable).then(|| "maskable".to_string()),
            })
        })
        .collect()
}

/// The serialized `icons` array, ready for inclusion in a manifest file.
pub fn manifest_icons_json(set: &InstructionSet) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&manifest_icons(set))
}
