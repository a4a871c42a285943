use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::entities::Asset;

/// Upload preset per asset kind, mirroring the hosted service's folders and
/// eager transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Avatar,
    BlogImage,
    Video,
}

impl AssetKind {
    fn folder(self) -> &'static str {
        match self {
            Self::Avatar => "avatars",
            Self::BlogImage => "blogs",
            Self::Video => "media",
        }
    }

    fn resource_type(self) -> &'static str {
        match self {
            Self::Avatar | Self::BlogImage => "image",
            Self::Video => "video",
        }
    }

    fn transformation(self) -> Option<&'static str> {
        match self {
            Self::Avatar => Some("w_150,h_150,c_fill"),
            Self::BlogImage => Some("c_fill"),
            Self::Video => Some("q_auto,f_mp4"),
        }
    }
}

#[async_trait]
pub(crate) trait AssetStore {
    /// `file` is what the client sent: a data URI or a fetchable URL.
    async fn upload(&self, file: &str, kind: AssetKind) -> ::anyhow::Result<Asset>;
    async fn destroy(&self, public_id: &str) -> ::anyhow::Result<()>;

    /// Upload-then-destroy. The old asset is orphaned if the destroy fails
    /// after the upload succeeded; there is no rollback.
    async fn replace(
        &self,
        old_public_id: Option<&str>,
        file: &str,
        kind: AssetKind,
    ) -> ::anyhow::Result<Asset> {
        let uploaded = self.upload(file, kind).await?;

        if let Some(id) = old_public_id {
            self.destroy(id).await?;
        }

        Ok(uploaded)
    }
}

/// Signed REST client for the hosted media service.
pub struct CloudinaryStore {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

impl CloudinaryStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            cloud_name,
            api_key,
            api_secret,
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/{}/{}",
            self.cloud_name, resource_type, action
        )
    }

    /// Signature over the alphabetically sorted params plus the secret.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by_key(|(k, _)| *k);

        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        hex::encode(Sha256::digest(format!("{}{}", joined, self.api_secret).as_bytes()))
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(&self, file: &str, kind: AssetKind) -> ::anyhow::Result<Asset> {
        let timestamp = ::chrono::Utc::now().timestamp().to_string();

        let mut to_sign: Vec<(&str, &str)> =
            vec![("folder", kind.folder()), ("timestamp", &timestamp)];
        if let Some(t) = kind.transformation() {
            to_sign.push(("transformation", t));
        }
        let signature = self.sign(&to_sign);

        let mut form = reqwest::multipart::Form::new()
            .text("file", file.to_owned())
            .text("folder", kind.folder())
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);
        if let Some(t) = kind.transformation() {
            form = form.text("transformation", t);
        }

        let res: UploadResponse = self
            .http
            .post(self.endpoint(kind.resource_type(), "upload"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Asset {
            public_id: res.public_id,
            url: res.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> ::anyhow::Result<()> {
        let timestamp = ::chrono::Utc::now().timestamp().to_string();

        let to_sign: Vec<(&str, &str)> = vec![
            ("invalidate", "true"),
            ("public_id", public_id),
            ("timestamp", &timestamp),
        ];
        let signature = self.sign(&to_sign);

        let form = [
            ("public_id", public_id),
            ("invalidate", "true"),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        // Folders decide the resource type at upload; destroy is keyed by the
        // public id prefix instead.
        let resource_type = if public_id.starts_with("media/") {
            "video"
        } else {
            "image"
        };

        self.http
            .post(self.endpoint(resource_type, "destroy"))
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Hands out fake refs without talking to anything. Backs the in-memory
/// wiring used for local runs.
pub struct InMemoryAssetStore;

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn upload(&self, _file: &str, kind: AssetKind) -> ::anyhow::Result<Asset> {
        let id = format!("{}/{}", kind.folder(), ::uuid::Uuid::new_v4());

        Ok(Asset {
            url: format!("memory://{}", id),
            public_id: id,
        })
    }

    async fn destroy(&self, _public_id: &str) -> ::anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Mutex;

    use super::*;

    /// Test double recording every call; `fail_destroy` makes destroys error
    /// after being recorded.
    #[derive(Default)]
    pub(crate) struct RecordingAssetStore {
        pub uploads: Mutex<Vec<(String, AssetKind)>>,
        pub destroyed: Mutex<Vec<String>>,
        pub fail_destroy: AtomicBool,
    }

    impl RecordingAssetStore {
        pub fn failing_destroy() -> Self {
            let store = Self::default();
            store.fail_destroy.store(true, Ordering::SeqCst);
            store
        }
    }

    #[async_trait]
    impl AssetStore for RecordingAssetStore {
        async fn upload(&self, file: &str, kind: AssetKind) -> ::anyhow::Result<Asset> {
            self.uploads.lock().await.push((file.to_owned(), kind));

            let id = format!("{}/{}", kind.folder(), ::uuid::Uuid::new_v4());
            Ok(Asset {
                url: format!("test://{}", id),
                public_id: id,
            })
        }

        async fn destroy(&self, public_id: &str) -> ::anyhow::Result<()> {
            self.destroyed.lock().await.push(public_id.to_owned());

            if self.fail_destroy.load(Ordering::SeqCst) {
                ::anyhow::bail!("asset service rejected the destroy");
            }
            Ok(())
        }
    }
}
