//! Shared AWS client construction

use crate::config::AwsConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use secrecy::ExposeSecret;

/// One client per AWS service, all built from the same `SdkConfig`
#[derive(Debug, Clone)]
pub struct AwsClients {
    pub sqs: aws_sdk_sqs::Client,
    pub s3: aws_sdk_s3::Client,
    pub dynamodb: aws_sdk_dynamodb::Client,
    pub logs: aws_sdk_cloudwatchlogs::Client,
    pub sns: aws_sdk_sns::Client,
    region: String,
}

impl AwsClients {
    /// Build the service clients
    ///
    /// Uses the configured endpoint override and static credentials when
    /// present, otherwise the default AWS endpoint and credential chain.
    /// S3 uses path-style addressing so bucket names need no DNS entries
    /// on emulated endpoints.
    pub async fn connect(config: &AwsConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::info!(
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            static_credentials = config.has_static_credentials(),
            "AWS clients configured"
        );

        Self {
            sqs: aws_sdk_sqs::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            dynamodb: aws_sdk_dynamodb::Client::new(&sdk_config),
            logs: aws_sdk_cloudwatchlogs::Client::new(&sdk_config),
            sns: aws_sdk_sns::Client::new(&sdk_config),
            region: config.region.clone(),
        }
    }

    /// Region the clients were built for
    pub fn region(&self) -> &str {
        &self.region
    }
}

async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let Some(ref endpoint) = config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    if let (Some(access_key_id), Some(secret_access_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        let secret: &str = secret_access_key.expose_secret().as_ref();
        loader = loader.credentials_provider(Credentials::new(
            access_key_id.clone(),
            secret.to_string(),
            None,
            None,
            "orderflow-config",
        ));
    }

    loader.load().await
}
