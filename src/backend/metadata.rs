use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Off-chain proposal document pinned on IPFS.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMetadata {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vote_options: Vec<String>,
}

impl ProposalMetadata {
    pub fn option_label(&self, index: usize) -> Option<&str> {
        self.vote_options
            .get(index)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Gateway URL for a content hash, accepting `ipfs://<cid>` or a bare cid.
pub fn gateway_url(gateway: &str, content_hash: &str) -> Option<String> {
    let cid = content_hash.strip_prefix("ipfs://").unwrap_or(content_hash).trim();
    if cid.is_empty() {
        return None;
    }
    Some(format!("{}/ipfs/{}", gateway.trim_end_matches('/'), cid))
}

pub async fn fetch_metadata(
    http: &reqwest::Client,
    gateway: &str,
    content_hash: &str,
) -> Result<Option<ProposalMetadata>> {
    let Some(url) = gateway_url(gateway, content_hash) else {
        return Ok(None);
    };
    let body = http.get(&url).send().await?.error_for_status()?.text().await?;
    Ok(Some(serde_json::from_str(&body)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_url() {
        assert_eq!(
            gateway_url("https://ipfs.io/", "ipfs://QmHash").as_deref(),
            Some("https://ipfs.io/ipfs/QmHash")
        );
        assert_eq!(
            gateway_url("https://ipfs.io", "QmHash").as_deref(),
            Some("https://ipfs.io/ipfs/QmHash")
        );
        assert!(gateway_url("https://ipfs.io", "").is_none());
    }

    #[test]
    fn test_metadata_document() {
        let meta: ProposalMetadata = serde_json::from_str(
            r#"{"description": "Grants", "voteOptions": ["Against", "For", ""]}"#,
        )
        .expect("parse");
        assert_eq!(meta.option_label(1), Some("For"));
        assert_eq!(meta.option_label(2), None);
        assert_eq!(meta.option_label(7), None);
    }
}
