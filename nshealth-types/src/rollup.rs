//! Rollup registry entries.

/// A registry entry for a project that posts to a namespace.
///
/// Reference data only: rollups are shown alongside a health report but
/// never contribute to the score.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RollupInfo {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub explorer: Option<String>,
    pub logo: Option<String>,
    pub l2_beat: Option<String>,
    pub defi_lama: Option<String>,
    pub stack: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub vm: Option<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub tags: Vec<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::null_as_default"))]
    pub links: Vec<String>,
}

impl RollupInfo {
    /// All known links for this rollup, website first, without duplicates.
    pub fn all_links(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let named = [
            &self.website,
            &self.github,
            &self.explorer,
            &self.twitter,
            &self.l2_beat,
            &self.defi_lama,
        ];
        let candidates = named
            .into_iter()
            .filter_map(|l| l.as_deref())
            .chain(self.links.iter().map(String::as_str));

        for link in candidates {
            if !link.is_empty() && !out.contains(&link) {
                out.push(link);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_links_deduplicates_in_order() {
        let rollup = RollupInfo {
            name: "Example".to_string(),
            website: Some("https://example.org".to_string()),
            github: Some("https://github.com/example".to_string()),
            twitter: Some(String::new()),
            links: vec![
                "https://example.org".to_string(),
                "https://docs.example.org".to_string(),
            ],
            ..Default::default()
        };

        assert_eq!(
            rollup.all_links(),
            vec![
                "https://example.org",
                "https://github.com/example",
                "https://docs.example.org"
            ]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_sparse_registry_entry() {
        let json = r#"{"id": 3, "name": "Eclipse", "type": "settled", "category": "nft"}"#;
        let rollup: RollupInfo = serde_json::from_str(json).unwrap();
        assert_eq!(rollup.name, "Eclipse");
        assert_eq!(rollup.kind.as_deref(), Some("settled"));
        assert!(rollup.links.is_empty());
    }
}
