use super::GlobalOptions;
use crate::auth::{Credential, CredentialResolver, Resolution, TokenCache};
use crate::config::Config;
use crate::error::Result;
use tracing::info;

pub async fn execute(options: &GlobalOptions) -> Result<()> {
    let config = Config::load(options.config.as_deref())?;
    let resolver = CredentialResolver::new(&config.google)?;

    if resolve(&resolver, options).await?.is_some() {
        info!("Authentication verified");
    }

    Ok(())
}

/// Resolve a credential, printing the consent URL when a human has to act.
/// `None` means the run should stop without error.
pub(super) async fn resolve(
    resolver: &CredentialResolver,
    options: &GlobalOptions,
) -> Result<Option<Credential>> {
    if options.reset {
        TokenCache::new(&options.cache).clear()?;
    }

    match resolver.resolve(&options.cache, &options.code).await? {
        Resolution::Credential(credential) => Ok(Some(credential)),
        Resolution::ConsentRequired(url) => {
            println!("Visit URL to get a code then run again with --code=YOUR_CODE\n{}", url);
            Ok(None)
        }
    }
}
