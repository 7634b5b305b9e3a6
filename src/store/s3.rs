//! S3-backed conversation store.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{Client, operation::get_object::GetObjectError, primitives::ByteStream};
use log::{debug, info};

use crate::{
    config::S3Config,
    error::{BotError, Result},
    types::Message,
};

use super::{ConversationStore, StoreKey};

/// Conversation store keeping one JSON object per channel.
#[derive(Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    /// Build a new S3 store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the AWS config or credentials cannot be loaded.
    pub async fn from_config(config: &S3Config) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let shared_config = loader.load().await;

        info!(
            "Using S3 conversation store at s3://{}/{}",
            config.bucket, config.prefix
        );

        Ok(Self {
            client: Client::new(&shared_config),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        })
    }

    fn object_key(&self, channel_id: &str) -> String {
        object_key(&self.prefix, channel_id)
    }
}

fn object_key(prefix: &str, channel_id: &str) -> String {
    format!("{prefix}{}.json", StoreKey::channel(channel_id))
}

impl ConversationStore for S3Store {
    async fn get(&self, channel_id: &str) -> Result<Option<Vec<Message>>> {
        let key = self.object_key(channel_id);
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(GetObjectError::is_no_such_key) =>
            {
                debug!("No stored conversation at {key}");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| BotError::Store(format!("Failed to read {key}: {e}")))?
            .into_bytes();

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn set(&self, channel_id: &str, messages: &[Message]) -> Result<()> {
        let key = self.object_key(channel_id);
        let body = serde_json::to_vec(messages)?;
        debug!("Writing {} messages to {key}", messages.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await?;

        Ok(())
    }

    async fn delete(&self, channel_id: &str) -> Result<()> {
        let key = self.object_key(channel_id);
        debug!("Deleting {key}");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await?;

        Ok(())
    }
}
