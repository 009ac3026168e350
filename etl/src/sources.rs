use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Region;
use common::config::Settings;
use common::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub prefix: String,
}

impl S3Location {
    /// Parses `s3://bucket/prefix`. The prefix may be empty.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri)?;
        if url.scheme() != "s3" {
            return Err(Error::InvalidUri(format!("expected an s3:// location, got {}", uri)));
        }

        let bucket = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::InvalidUri(format!("missing bucket in {}", uri)))?
            .to_string();

        Ok(Self {
            bucket,
            prefix: url.path().trim_start_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCheck {
    pub name: &'static str,
    pub uri: String,
    pub objects: usize,
}

impl SourceCheck {
    pub fn is_empty(&self) -> bool {
        self.objects == 0
    }
}

/// The storage locations the COPY statements read from.
pub fn configured_sources(settings: &Settings) -> Vec<(&'static str, &str)> {
    vec![
        ("log_data", settings.s3.log_data.as_str()),
        ("log_jsonpath", settings.s3.log_jsonpath.as_str()),
        ("song_data", settings.s3.song_data.as_str()),
    ]
}

/// Counts the objects under every configured location. Empty locations are
/// reported, not treated as errors.
pub async fn check_sources(settings: &Settings) -> Result<Vec<SourceCheck>> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.s3.region.clone()))
        .load()
        .await;
    let client = S3Client::new(&sdk_config);

    let mut checks = Vec::new();
    for (name, uri) in configured_sources(settings) {
        let location = S3Location::parse(uri)?;
        let objects = count_objects(&client, &location).await?;

        if objects == 0 {
            warn!(source = name, uri, "No objects found; COPY will load nothing");
        } else {
            info!(source = name, uri, objects, "Source location reachable");
        }

        checks.push(SourceCheck {
            name,
            uri: uri.to_string(),
            objects,
        });
    }

    Ok(checks)
}

async fn count_objects(client: &S3Client, location: &S3Location) -> Result<usize> {
    let mut count = 0;
    let mut continuation_token = None;

    loop {
        let mut request = client
            .list_objects_v2()
            .bucket(&location.bucket)
            .prefix(&location.prefix);

        if let Some(token) = &continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await?;
        count += response.contents().len();

        continuation_token = response.next_continuation_token().map(str::to_string);
        if continuation_token.is_none() {
            break;
        }
    }

    Ok(count)
}
