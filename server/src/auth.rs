use crate::app::{AppError, AppResult};
use jsonwebtoken::{
    errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use model::{user::UserId, Operation};

/// Longest lifetime a token can be issued with, one leap year.
pub const MAX_TOKEN_TTL_S: i64 = 366 * 24 * 60 * 60;

/// Bring a configured token lifetime into `1..=MAX_TOKEN_TTL_S`.
pub fn clamp_token_ttl(ttl_s: i64) -> i64 {
    ttl_s.clamp(1, MAX_TOKEN_TTL_S)
}

#[derive(Clone)]
pub struct TokenHandler {
    jwt_secret: String,
    encoding_key: EncodingKey,
}

impl TokenHandler {
    pub fn new(jwt_secret: String) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_secret.as_bytes());
        Self {
            jwt_secret,
            encoding_key,
        }
    }

    pub fn parse_token(&self, token: &str) -> Result<Claims, JwtError> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        match jsonwebtoken::decode(token, &key, &Validation::new(Algorithm::HS256)) {
            Ok(token_data) => Ok(token_data.claims),
            Err(e) => {
                error!("failed to validate token with error: '{}'", e);
                Err(e)
            }
        }
    }

    /// Issue a token for `user_id`, valid for `ttl_s` seconds.
    ///
    /// `ttl_s` is limited to `MAX_TOKEN_TTL_S` in either direction.
    pub fn issue_token(&self, user_id: &UserId, ttl_s: i64) -> Result<String, JwtError> {
        let ttl = chrono::Duration::seconds(ttl_s.clamp(-MAX_TOKEN_TTL_S, MAX_TOKEN_TTL_S));
        let exp = (chrono::Utc::now() + ttl).timestamp();
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &Claims::new(user_id, exp),
            &self.encoding_key,
        )
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    sub: String,
    exp: i64,
}

impl Claims {
    pub(crate) fn new(user_id: &UserId, exp: i64) -> Self {
        Self {
            sub: user_id.as_str().to_owned(),
            exp,
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId::new(&self.sub)
    }
}

/// Resolve the caller of `operation`.
///
/// `Ok(None)` means an anonymous caller of an operation that allows one.
pub fn authenticate(operation: Operation, claims: &Option<Claims>) -> AppResult<Option<UserId>> {
    match claims.as_ref().map(Claims::user_id) {
        Some(user_id) if !user_id.is_empty() => Ok(Some(user_id)),
        _ if operation.requires_authentication() => Err(AppError::unauthenticated()
            .with_message(&format!("operation '{}' requires a valid token", operation))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_test() {
        let tokens = TokenHandler::new("secret".to_owned());
        let token = tokens.issue_token(&UserId::new("alice"), 60).unwrap();

        let claims = tokens.parse_token(&token).unwrap();
        assert_eq!(claims.user_id(), UserId::new("alice"));
    }

    #[test]
    fn rejects_foreign_and_expired_tokens_test() {
        let tokens = TokenHandler::new("secret".to_owned());
        let other = TokenHandler::new("other secret".to_owned());

        let foreign = other.issue_token(&UserId::new("alice"), 60).unwrap();
        assert!(tokens.parse_token(&foreign).is_err());

        let expired = tokens.issue_token(&UserId::new("alice"), -3600).unwrap();
        assert!(tokens.parse_token(&expired).is_err());
    }

    #[test]
    fn oversized_ttl_is_clamped_test() {
        let tokens = TokenHandler::new("secret".to_owned());
        let latest = chrono::Utc::now().timestamp() + MAX_TOKEN_TTL_S;

        let token = tokens.issue_token(&UserId::new("alice"), i64::MAX).unwrap();
        let claims = tokens.parse_token(&token).unwrap();
        assert!(claims.exp <= latest + 1);
        assert!(claims.exp > latest - 60);

        let ancient = tokens.issue_token(&UserId::new("alice"), i64::MIN).unwrap();
        assert!(tokens.parse_token(&ancient).is_err());
    }

    #[test]
    fn clamp_token_ttl_test() {
        assert_eq!(clamp_token_ttl(3600), 3600);
        assert_eq!(clamp_token_ttl(0), 1);
        assert_eq!(clamp_token_ttl(-5), 1);
        assert_eq!(clamp_token_ttl(i64::MAX), MAX_TOKEN_TTL_S);
    }

    #[test]
    fn authenticate_test() {
        let claims = Some(Claims::new(&UserId::new("alice"), i64::MAX));

        assert_eq!(
            authenticate(Operation::GetList, &claims).unwrap(),
            Some(UserId::new("alice"))
        );
        assert!(authenticate(Operation::GetList, &None).is_err());
        assert_eq!(authenticate(Operation::GetToken, &None).unwrap(), None);

        let blank = Some(Claims::new(&UserId::new(""), i64::MAX));
        assert!(authenticate(Operation::CreateList, &blank).is_err());
    }
}
