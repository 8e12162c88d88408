//! Release metadata retrieval from the GitHub release feed.
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{client, json};

/// Name suffix identifying the firmware image among a release's assets.
const FIRMWARE_ASSET_SUFFIX: &str = ".bin";
/// Asset name assumed when constructing the fallback download URL.
const FALLBACK_ASSET_NAME: &str = "firmware.bin";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed initializing client to query the release feed")]
    InitClient(#[from] client::Error),
    #[error("failed sending release feed request")]
    Request(#[source] reqwest::Error),
    #[error("release feed responded with status `{status_code}`, expected 200-299")]
    Status { status_code: StatusCode },
    #[error("failed decoding release feed response body")]
    ParseResponse(#[source] json::Error),
    #[error("release metadata does not carry a tag name")]
    MissingTag,
}

/// The release feed as the orchestrator sees it.
pub trait ReleaseFeed {
    /// Tag of the latest published release.
    fn fetch_latest(&self) -> Result<String, Error>;

    /// Direct download location of the firmware binary attached to
    /// `version`.
    fn download_url(&self, version: &str) -> Result<String, Error>;
}

/// Shape of the release feed response; only the fields the agent consumes.
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    #[serde(default)]
    name: String,
    #[serde(default)]
    browser_download_url: String,
}

/// Queries the `releases/latest` endpoint of a fixed owner/repository pair.
pub struct GithubFeed {
    base: Url,
    owner: String,
    repo: String,
}

impl GithubFeed {
    pub fn new(base: Url, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            base,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn latest_release_url(&self) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!(
            "/repos/{}/{}/releases/latest",
            self.owner, self.repo
        ));
        url
    }

    fn fetch_release(&self) -> Result<Release, Error> {
        let url = self.latest_release_url();
        debug!("querying release feed at {url}");

        let client = client::metadata()?;
        let resp = client.get(url).send().map_err(Error::Request)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status_code: status,
            });
        }
        json::deserialize(resp).map_err(Error::ParseResponse)
    }

    fn fallback_url(&self, version: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/download/{version}/{FALLBACK_ASSET_NAME}",
            self.owner, self.repo,
        )
    }
}

impl ReleaseFeed for GithubFeed {
    fn fetch_latest(&self) -> Result<String, Error> {
        let tag = extract_tag(self.fetch_release()?)?;
        info!("latest published release: {tag}");
        Ok(tag)
    }

    fn download_url(&self, version: &str) -> Result<String, Error> {
        let release = self.fetch_release()?;
        match select_firmware_asset(&release) {
            Some(url) => {
                info!("found firmware asset at {url}");
                Ok(url.to_owned())
            }
            None => {
                // Best-effort guess following the standard release-asset
                // naming convention; the transfer reports the miss if the
                // guess is wrong.
                let url = self.fallback_url(version);
                info!("no firmware asset listed; using constructed URL {url}");
                Ok(url)
            }
        }
    }
}

fn extract_tag(release: Release) -> Result<String, Error> {
    release
        .tag_name
        .filter(|tag| !tag.is_empty())
        .ok_or(Error::MissingTag)
}

fn select_firmware_asset(release: &Release) -> Option<&str> {
    release
        .assets
        .iter()
        .find(|asset| {
            asset.name.ends_with(FIRMWARE_ASSET_SUFFIX)
                && !asset.browser_download_url.is_empty()
        })
        .map(|asset| asset.browser_download_url.as_str())
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::{extract_tag, select_firmware_asset, Error, GithubFeed, Release};

    const RELEASE_BODY: &str = r#"{
        "tag_name": "v1.0.2",
        "name": "Firmware v1.0.2",
        "prerelease": false,
        "assets": [
            {
                "name": "release-notes.txt",
                "browser_download_url": "https://github.com/Dreadmond/TRMNL-Weather-Display/releases/download/v1.0.2/release-notes.txt"
            },
            {
                "name": "firmware.bin",
                "browser_download_url": "https://github.com/Dreadmond/TRMNL-Weather-Display/releases/download/v1.0.2/firmware.bin"
            }
        ]
    }"#;

    fn parse(body: &str) -> Release {
        crate::json::deserialize(body.as_bytes()).expect("release body should decode")
    }

    fn feed() -> GithubFeed {
        GithubFeed::new(
            Url::parse("https://api.github.com").unwrap(),
            "Dreadmond",
            "TRMNL-Weather-Display",
        )
    }

    #[test]
    fn release_body_decodes_and_carries_tag() {
        let release = parse(RELEASE_BODY);
        assert_eq!("v1.0.2", extract_tag(release).unwrap());
    }

    #[test]
    fn missing_tag_is_an_error() {
        let release = parse(r#"{"assets": []}"#);
        assert!(matches!(extract_tag(release), Err(Error::MissingTag)));
    }

    #[test]
    fn empty_tag_is_an_error() {
        let release = parse(r#"{"tag_name": "", "assets": []}"#);
        assert!(matches!(extract_tag(release), Err(Error::MissingTag)));
    }

    #[test]
    fn bin_asset_is_selected_over_other_assets() {
        let release = parse(RELEASE_BODY);
        assert_eq!(
            Some(
                "https://github.com/Dreadmond/TRMNL-Weather-Display/releases/download/v1.0.2/firmware.bin"
            ),
            select_firmware_asset(&release),
        );
    }

    #[test]
    fn release_without_bin_asset_selects_nothing() {
        let release = parse(
            r#"{
                "tag_name": "v1.0.2",
                "assets": [
                    {"name": "release-notes.txt", "browser_download_url": "https://example.org/notes"}
                ]
            }"#,
        );
        assert_eq!(None, select_firmware_asset(&release));
    }

    #[test]
    fn fallback_url_follows_release_asset_convention() {
        assert_eq!(
            "https://github.com/Dreadmond/TRMNL-Weather-Display/releases/download/v1.0.2/firmware.bin",
            feed().fallback_url("v1.0.2"),
        );
    }

    #[test]
    fn latest_release_endpoint_is_derived_from_owner_and_repo() {
        assert_eq!(
            "https://api.github.com/repos/Dreadmond/TRMNL-Weather-Display/releases/latest",
            feed().latest_release_url().to_string(),
        );
    }
}
