use crate::core::geo::TileCoord;

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Leaflet-style URL template source, e.g.
/// `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplateSource {
    template: String,
    subdomains: Vec<String>,
}

impl UrlTemplateSource {
    pub fn new(template: String, subdomains: Vec<String>) -> Self {
        Self {
            template,
            subdomains,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let idx = ((coord.x as u64 + coord.y as u64) % self.subdomains.len() as u64) as usize;
            self.subdomains[idx].as_str()
        };

        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osm() -> UrlTemplateSource {
        UrlTemplateSource::new(
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            vec!["a".into(), "b".into(), "c".into()],
        )
    }

    #[test]
    fn test_template_expansion() {
        assert_eq!(
            osm().url(TileCoord::new(6009, 3933, 13)),
            "https://a.tile.openstreetmap.org/13/6009/3933.png"
        );
    }

    #[test]
    fn test_subdomains_round_robin() {
        let source = osm();
        assert!(source.url(TileCoord::new(0, 0, 1)).starts_with("https://a."));
        assert!(source.url(TileCoord::new(1, 0, 1)).starts_with("https://b."));
        assert!(source.url(TileCoord::new(1, 1, 1)).starts_with("https://c."));
    }
}
