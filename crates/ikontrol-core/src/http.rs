//! Blocking request execution shared by the upstream transport and the ingress uploader.

use anyhow::{Context, Result};

/// Runs the transfer configured on `easy`, collecting the response body.
/// Non-2xx responses are errors; `what` names the request in messages (e.g. `GET <url>`).
pub(crate) fn perform(easy: &mut curl::easy::Easy, what: &str) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("{} failed", what))?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("{} returned HTTP {}", what, code);
    }
    Ok(body)
}
