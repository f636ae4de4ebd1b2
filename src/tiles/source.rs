use crate::core::geo::TileKey;
use rand::Rng;

/// Trait representing anything that can produce tile URLs for a given key.
pub trait TileSource: Send + Sync {
    /// Number of equivalent hosts the source can be fetched from
    fn subdomain_count(&self) -> usize;

    /// Build a URL for `key` on the host at `subdomain`
    fn url(&self, subdomain: usize, key: TileKey) -> String;
}

/// Uniformly random host index out of `count`, spreading load across hosts
pub fn pick_subdomain(count: usize) -> usize {
    match count {
        0 | 1 => 0,
        n => rand::rng().random_range(0..n),
    }
}

/// `{s}/{z}/{x}/{y}` URL template source, OpenStreetMap style
#[derive(Debug, Clone)]
pub struct UrlTemplateSource {
    template: String,
    subdomains: Vec<String>,
}

impl UrlTemplateSource {
    pub fn new(template: impl Into<String>, subdomains: Vec<String>) -> Self {
        Self {
            template: template.into(),
            subdomains,
        }
    }

    pub fn openstreetmap() -> Self {
        Self::new(
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            vec!["a".into(), "b".into(), "c".into()],
        )
    }
}

impl Default for UrlTemplateSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

impl TileSource for UrlTemplateSource {
    fn subdomain_count(&self) -> usize {
        self.subdomains.len()
    }

    fn url(&self, subdomain: usize, key: TileKey) -> String {
        let host = self
            .subdomains
            .get(subdomain % self.subdomains.len().max(1))
            .map(String::as_str)
            .unwrap_or("");
        self.template
            .replace("{s}", host)
            .replace("{z}", &key.z.to_string())
            .replace("{x}", &key.x.to_string())
            .replace("{y}", &key.y.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_expansion() {
        let source = UrlTemplateSource::openstreetmap();
        assert_eq!(
            source.url(1, TileKey::new(13, 1429, 3307)),
            "https://b.tile.openstreetmap.org/13/1429/3307.png"
        );
    }

    #[test]
    fn test_subdomain_choice_in_range() {
        let source = UrlTemplateSource::openstreetmap();
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[pick_subdomain(source.subdomain_count())] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_template_without_subdomains() {
        let source = UrlTemplateSource::new("http://localhost/{z}/{x}/{y}.png", Vec::new());
        assert_eq!(pick_subdomain(source.subdomain_count()), 0);
        assert_eq!(
            source.url(0, TileKey::new(1, 0, 1)),
            "http://localhost/1/0/1.png"
        );
    }
}
