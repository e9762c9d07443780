use crate::errors::{Error, Result};
use tracing::info;

/// Fetches the raw Public Suffix List text from `url`.
pub(crate) fn get(url: &str) -> Result<String> {
    info!(url, "fetching public suffix list");
    let agent = ureq::agent();
    agent
        .get(url)
        .call()
        .map_err(|e| Error::UnableToLoadPublicSuffixList(Box::new(e)))?
        .into_string()
        .map_err(|e| Error::UnableToLoadPublicSuffixList(Box::new(e)))
}
