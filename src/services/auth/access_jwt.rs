use std::{error::Error as StdError, fmt, sync::Arc};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::Deserialize;

use crate::services::auth::keys::{KeyError, KeyProvider};

// Everything that can go wrong between "Authorization header" and "verified
// claim set + granted permission". All of these render as a plain 401 at the
// HTTP boundary; the variant is for logs only.
#[derive(Debug)]
pub enum AuthError {
    MissingOrMalformedHeader,
    InvalidStructure,
    InvalidSignature,
    UnknownKey(String),
    ClaimInvalid(&'static str),
    KeyResolutionTimeout,
    InsufficientScope(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOrMalformedHeader => {
                write!(f, "missing or malformed Authorization header")
            }
            Self::InvalidStructure => write!(f, "token is not a well-formed JWT"),
            Self::InvalidSignature => write!(f, "signature verification failed"),
            Self::UnknownKey(detail) => write!(f, "cannot resolve signing key: {}", detail),
            Self::ClaimInvalid(claim) => write!(f, "invalid '{}' claim", claim),
            Self::KeyResolutionTimeout => write!(f, "signing key lookup timed out"),
            Self::InsufficientScope(permission) => {
                write!(f, "missing required permission '{}'", permission)
            }
        }
    }
}

impl StdError for AuthError {}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        // Typical: aud is a string
        serde_json::Value::String(s) => !s.trim().is_empty(),
        // Also valid: aud is an array of strings
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Shape check before any cryptography: a compact JWT is exactly three
/// non-empty base64url segments.
fn has_jwt_structure(token: &str) -> bool {
    let mut segments = 0usize;
    for part in token.split('.') {
        segments += 1;
        if part.is_empty() || URL_SAFE_NO_PAD.decode(part).is_err() {
            return false;
        }
    }

    segments == 3
}

/// Access token (JWT) claims.
///
/// NOTE:
/// - `aud` in JWT can be either string or array; jsonwebtoken validates it
///   via `Validation::set_audience`, we only re-check presence.
/// - `permissions` is the flat grant list the authorization server embeds
///   (one `"<verb>:<resource>"` string per grant); absent means "none".
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    // Keep as Value to accept both string and array.
    #[serde(default)]
    pub aud: serde_json::Value,

    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Verified, application-facing view of a credential: the subject plus the
/// permissions it carries. Lives in request extensions for one request.
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub sub: String,
    pub permissions: Vec<String>,
}

/// RS256 access-token verifier.
///
/// Key material is resolved per token through a `KeyProvider` (rotation by
/// `kid`); issuer, audience, expiry and claim presence are checked here.
pub struct AuthService {
    keys: Arc<dyn KeyProvider>,
    validation: Validation,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("keys", &self.keys.name())
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        keys: Arc<dyn KeyProvider>,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Self { keys, validation }
    }

    /// Verify the raw `Authorization` header into a claim set.
    ///
    /// Checks, in order:
    /// 1. header present and of the form `Bearer <token>`
    /// 2. token is structurally a JWT
    /// 3. signing key resolvable from the token's `kid`
    /// 4. signature, `iss`, `aud`, `exp` (via jsonwebtoken)
    /// 5. required claims present and non-empty
    ///
    /// Authorization (permission matching) is deliberately not done here;
    /// see `gate::authorize`.
    pub async fn verify(
        &self,
        raw_header: Option<&str>,
    ) -> Result<VerifiedAccessToken, AuthError> {
        let header = raw_header.ok_or(AuthError::MissingOrMalformedHeader)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingOrMalformedHeader)?;

        if !has_jwt_structure(token) {
            return Err(AuthError::InvalidStructure);
        }

        let jwt_header =
            jsonwebtoken::decode_header(token).map_err(|_| AuthError::InvalidStructure)?;

        let kid = jwt_header
            .kid
            .as_deref()
            .ok_or_else(|| AuthError::UnknownKey("token header carries no kid".to_string()))?;

        let key = match self.keys.resolve(kid).await {
            Ok(key) => key,
            Err(KeyError::Timeout) => return Err(AuthError::KeyResolutionTimeout),
            Err(e) => return Err(AuthError::UnknownKey(e.to_string())),
        };

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::ClaimInvalid("exp"),
                ErrorKind::ImmatureSignature => AuthError::ClaimInvalid("nbf"),
                ErrorKind::InvalidIssuer => AuthError::ClaimInvalid("iss"),
                ErrorKind::InvalidAudience => AuthError::ClaimInvalid("aud"),
                _ => AuthError::InvalidStructure,
            })?;

        let claims = data.claims;

        // Required (non-empty) checks. jsonwebtoken already validated the
        // values it knows about; we still refuse meaningless ones.
        if claims.iss.trim().is_empty() {
            return Err(AuthError::ClaimInvalid("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::ClaimInvalid("sub"));
        }
        if claims.exp == 0 {
            return Err(AuthError::ClaimInvalid("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AuthError::ClaimInvalid("aud"));
        }

        Ok(VerifiedAccessToken {
            sub: claims.sub,
            permissions: claims.permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{EncodingKey, Header};
    use serde::Serialize;

    use super::*;
    use crate::services::auth::keys::StaticJwks;

    const SIGNING_KEY_PEM: &str = include_str!("../../../testdata/signing_key.pem");
    const OTHER_KEY_PEM: &str = include_str!("../../../testdata/other_key.pem");
    const JWKS_JSON: &str = include_str!("../../../testdata/jwks.json");

    const KID: &str = "test-key-1";
    const ISSUER: &str = "https://auth.example.test/";
    const AUDIENCE: &str = "casting-agency";

    #[derive(Serialize)]
    struct TestClaims {
        iss: String,
        aud: String,
        sub: String,
        exp: u64,
        permissions: Vec<String>,
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn claims(permissions: &[&str]) -> TestClaims {
        TestClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            sub: "auth0|roster-tester".to_string(),
            exp: now() + 3600,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn mint(claims: &TestClaims, kid: Option<&str>, pem: &str) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);

        jsonwebtoken::encode(
            &header,
            claims,
            &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    fn service() -> AuthService {
        let keys = Arc::new(StaticJwks::from_json(JWKS_JSON).unwrap());
        AuthService::new(keys, ISSUER, AUDIENCE, 0)
    }

    #[tokio::test]
    async fn roundtrip_extracts_subject_and_permissions() {
        let token = mint(&claims(&["get:actors", "post:actors"]), Some(KID), SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        let verified = service().verify(Some(&header)).await.unwrap();

        assert_eq!(verified.sub, "auth0|roster-tester");
        assert_eq!(verified.permissions, vec!["get:actors", "post:actors"]);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        assert!(matches!(
            service().verify(None).await,
            Err(AuthError::MissingOrMalformedHeader)
        ));
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        assert!(matches!(
            service().verify(Some("Basic dXNlcjpwYXNz")).await,
            Err(AuthError::MissingOrMalformedHeader)
        ));
    }

    #[tokio::test]
    async fn empty_bearer_is_rejected() {
        assert!(matches!(
            service().verify(Some("Bearer ")).await,
            Err(AuthError::MissingOrMalformedHeader)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_structurally_invalid() {
        assert!(matches!(
            service().verify(Some("Bearer not-a-jwt")).await,
            Err(AuthError::InvalidStructure)
        ));
        assert!(matches!(
            service().verify(Some("Bearer a.b")).await,
            Err(AuthError::InvalidStructure)
        ));
    }

    #[tokio::test]
    async fn missing_kid_cannot_resolve_a_key() {
        let token = mint(&claims(&[]), None, SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service().verify(Some(&header)).await,
            Err(AuthError::UnknownKey(_))
        ));
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = mint(&claims(&[]), Some("rotated-away"), SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service().verify(Some(&header)).await,
            Err(AuthError::UnknownKey(_))
        ));
    }

    #[tokio::test]
    async fn wrong_key_signature_is_rejected() {
        // Signed by a key that is not in the JWK set, but claiming its kid.
        let token = mint(&claims(&[]), Some(KID), OTHER_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service().verify(Some(&header)).await,
            Err(AuthError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut expired = claims(&["get:actors"]);
        expired.exp = now() - 3600;
        let token = mint(&expired, Some(KID), SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service().verify(Some(&header)).await,
            Err(AuthError::ClaimInvalid("exp"))
        ));
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let mut bad = claims(&[]);
        bad.iss = "https://somebody-else.example/".to_string();
        let token = mint(&bad, Some(KID), SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service().verify(Some(&header)).await,
            Err(AuthError::ClaimInvalid("iss"))
        ));
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut bad = claims(&[]);
        bad.aud = "some-other-api".to_string();
        let token = mint(&bad, Some(KID), SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service().verify(Some(&header)).await,
            Err(AuthError::ClaimInvalid("aud"))
        ));
    }

    #[tokio::test]
    async fn timeout_from_key_provider_maps_to_its_own_kind() {
        struct TimingOut;

        #[async_trait::async_trait]
        impl KeyProvider for TimingOut {
            fn name(&self) -> &'static str {
                "timing-out"
            }

            async fn resolve(&self, _kid: &str) -> Result<jsonwebtoken::DecodingKey, KeyError> {
                Err(KeyError::Timeout)
            }
        }

        let service = AuthService::new(Arc::new(TimingOut), ISSUER, AUDIENCE, 0);
        let token = mint(&claims(&[]), Some(KID), SIGNING_KEY_PEM);
        let header = format!("Bearer {}", token);

        assert!(matches!(
            service.verify(Some(&header)).await,
            Err(AuthError::KeyResolutionTimeout)
        ));
    }

    #[test]
    fn aud_accepts_string_and_array_shapes() {
        assert!(aud_is_present_and_valid(&serde_json::json!("api")));
        assert!(aud_is_present_and_valid(&serde_json::json!(["a", "b"])));
        assert!(!aud_is_present_and_valid(&serde_json::json!("")));
        assert!(!aud_is_present_and_valid(&serde_json::json!([])));
        assert!(!aud_is_present_and_valid(&serde_json::Value::Null));
    }
}
