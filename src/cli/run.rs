use super::GlobalOptions;
use crate::auth::{Credential, CredentialResolver};
use crate::config::{Config, StorageConfig};
use crate::error::Result;
use crate::storage::{StorageClient, StorageOperations};
use crate::transfer::TransferEngine;
use tracing::info;

pub async fn execute(options: &GlobalOptions) -> Result<()> {
    let config = Config::load(options.config.as_deref())?;
    let resolver = CredentialResolver::new(&config.google)?;
    let http_client = resolver.http_client();

    let contents = transfer(&resolver, options, config.storage, |storage, credential| {
        StorageClient::new(storage, http_client, credential.access_token)
    })
    .await?;

    if let Some(contents) = contents {
        info!(bytes = contents.len(), "Object contents");
        println!("{}", String::from_utf8_lossy(&contents));
    }

    Ok(())
}

/// Resolve a credential, then round-trip the object through storage.
///
/// `connect` only runs once a credential exists; `None` means consent is
/// still required and no storage call was made.
async fn transfer<SC, F>(
    resolver: &CredentialResolver,
    options: &GlobalOptions,
    storage: StorageConfig,
    connect: F,
) -> Result<Option<Vec<u8>>>
where
    SC: StorageOperations + Sync,
    F: FnOnce(&StorageConfig, Credential) -> SC,
{
    let Some(credential) = super::auth::resolve(resolver, options).await? else {
        return Ok(None);
    };

    let storage_client = connect(&storage, credential);
    let engine = TransferEngine::new(storage, storage_client);

    Ok(Some(engine.run().await?))
}
