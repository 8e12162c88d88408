/// Version tag and binary download location advertised by the release feed.
///
/// Produced once per check pass and consumed immediately by the execution
/// step; never persisted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReleaseInfo {
    pub version: String,
    pub download_url: String,
}
