use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::User;
use crate::error::AppError;

/// Signed session payload: the user id as subject plus the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn sign(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized("Invalid token".to_owned()))?;

        Ok(data.claims)
    }
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_owned()))
    }
}

/// 32 random bytes, hex-encoded, then SHA-256'd back to hex. Used for the
/// confirm / destroy / reset one-shot tokens.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);

    let seed = hex::encode(bytes);
    hex::encode(Sha256::digest(seed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Profile, Provider, Role};

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "ada".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password: None,
            role: Role::User,
            blocked: false,
            avatar: None,
            provider: Provider::Local,
            google_id: None,
            github_id: None,
            confirm_token: None,
            confirmed: false,
            destroy_token: None,
            reset_token: None,
            reset_expires: None,
            saved_blogs: Default::default(),
            following_tags: Default::default(),
            hidden_tags: Default::default(),
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sign_then_verify_round_trips_subject() {
        let keys = TokenKeys::new(b"secret", Duration::hours(1));
        let user = user();

        let token = keys.sign(&user).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.email, user.email);
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = TokenKeys::new(b"secret", Duration::hours(1));

        assert!(keys.verify("not-a-token").is_err());
    }

    #[test]
    fn generated_tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();

        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
