//! HTML asset packer
//!
//! Finds images and stylesheets referenced by an article, downloads each one
//! and either stores it next to the article or inlines it as a `data:` URI.

use super::AssetPacker;
use crate::adapters::http_client;
use crate::config::{EmbedMode, PackerConfig};
use crate::core::export::archive::ContainerFolder;
use crate::domain::{ArchiverError, PackError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

/// Attribute selectors for embeddable references, in document order per selector
const ASSET_SELECTORS: [(&str, &str); 3] = [
    ("img[src]", "src"),
    ("img[data-src]", "data-src"),
    ("link[rel=stylesheet][href]", "href"),
];

const HASH_PREFIX_LEN: usize = 16;

/// A downloaded asset
struct Asset {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// Packs HTML articles together with their images and stylesheets
pub struct HtmlAssetPacker {
    client: Client,
    embed_mode: EmbedMode,
    asset_dir: String,
    max_asset_bytes: usize,
    base_url: Option<Url>,
}

impl HtmlAssetPacker {
    /// Create a packer from configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the HTTP client cannot be built or
    /// `base_url` does not parse
    pub fn new(config: &PackerConfig, user_agent: &str) -> Result<Self> {
        let client = http_client(config.timeout_seconds, user_agent)?;
        let base_url = config
            .base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ArchiverError::InvalidConfiguration(format!(
                        "invalid packer.base_url '{raw}': {e}"
                    ))
                })
            })
            .transpose()?;
        Ok(Self {
            client,
            embed_mode: config.embed_mode,
            asset_dir: config.asset_dir.trim_matches('/').to_string(),
            max_asset_bytes: config.max_asset_bytes,
            base_url,
        })
    }

    /// Resolve relative references against `base_url`
    ///
    /// Without a base URL, relative references are left untouched.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    async fn download(&self, url: &Url) -> std::result::Result<Asset, PackError> {
        let failed = |reason: String| PackError::AssetFetchFailed {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(failed(format!("status {}", resp.status())));
        }

        if let Some(len) = resp.content_length() {
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            if len > self.max_asset_bytes {
                return Err(PackError::AssetTooLarge {
                    url: url.to_string(),
                    size: len,
                    limit: self.max_asset_bytes,
                });
            }
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| failed(e.to_string()))?
            .to_vec();

        if bytes.len() > self.max_asset_bytes {
            return Err(PackError::AssetTooLarge {
                url: url.to_string(),
                size: bytes.len(),
                limit: self.max_asset_bytes,
            });
        }

        Ok(Asset {
            bytes,
            content_type,
        })
    }

    fn resolve(&self, reference: &str) -> Option<Url> {
        let url = match Url::parse(reference) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.base_url.as_ref()?.join(reference).ok()?
            }
            Err(_) => return None,
        };
        matches!(url.scheme(), "http" | "https").then_some(url)
    }
}

#[async_trait]
impl AssetPacker for HtmlAssetPacker {
    async fn pack(
        &self,
        content: &str,
        base_name: &str,
        folder: &mut ContainerFolder,
    ) -> Result<()> {
        let references = collect_asset_references(content).map_err(|reason| {
            ArchiverError::from(PackError::InvalidContent {
                article: base_name.to_string(),
                reason,
            })
        })?;

        let mut replacements = Vec::new();
        for reference in references {
            let Some(url) = self.resolve(&reference) else {
                continue;
            };

            let asset = self.download(&url).await?;
            let replacement = match self.embed_mode {
                EmbedMode::Alongside => {
                    let path = format!(
                        "{}/{}",
                        self.asset_dir,
                        asset_file_name(&url, &asset.bytes, asset.content_type.as_deref())
                    );
                    if !folder.contains(&path) {
                        folder.add_file(path.clone(), asset.bytes)?;
                    }
                    path
                }
                EmbedMode::Inline => data_uri(&asset),
            };

            replacements.push((reference, replacement));
        }

        tracing::debug!(
            article = %base_name,
            assets = replacements.len(),
            "Packed article assets"
        );

        let html = rewrite_references(content, &replacements);
        folder.add_file(format!("{base_name}.html"), html.into_bytes())
    }
}

/// Unique asset references in the order they were found
///
/// Returned values are attribute values as written, with entities decoded.
pub fn collect_asset_references(content: &str) -> std::result::Result<Vec<String>, String> {
    let document = Html::parse_document(content);
    let mut references: Vec<String> = Vec::new();

    for (css, attr) in ASSET_SELECTORS {
        let selector = Selector::parse(css).map_err(|e| format!("selector {css}: {e:?}"))?;
        for element in document.select(&selector) {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() || value.starts_with("data:") {
                continue;
            }
            if !references.iter().any(|r| r == value) {
                references.push(value.to_string());
            }
        }
    }

    Ok(references)
}

/// Replaces quoted attribute values in `content`
///
/// Both the decoded form and the `&amp;`-escaped form of each reference are
/// matched, inside either quote style.
fn rewrite_references(content: &str, replacements: &[(String, String)]) -> String {
    let mut html = content.to_string();
    for (from, to) in replacements {
        let escaped = from.replace('&', "&amp;");
        for candidate in [from.as_str(), escaped.as_str()] {
            html = html
                .replace(&format!("\"{candidate}\""), &format!("\"{to}\""))
                .replace(&format!("'{candidate}'"), &format!("'{to}'"));
        }
    }
    html
}

/// Stable name for an asset: content hash prefix plus an extension
fn asset_file_name(url: &Url, bytes: &[u8], content_type: Option<&str>) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    let ext = extension_from_url(url)
        .or_else(|| content_type.and_then(extension_from_mime))
        .unwrap_or_else(|| "bin".to_string());
    format!("{}.{ext}", &digest[..HASH_PREFIX_LEN])
}

fn extension_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let valid =
        !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

fn extension_from_mime(mime: &str) -> Option<String> {
    let ext = match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        "text/css" => "css",
        _ => return None,
    };
    Some(ext.to_string())
}

fn data_uri(asset: &Asset) -> String {
    let mime = asset
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    format!(
        "data:{mime};base64,{}",
        general_purpose::STANDARD.encode(&asset.bytes)
    )
}
