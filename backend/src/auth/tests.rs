use super::*;
use axum::http::Request;
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "supersecretjwtsecretforunittesting123";

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    role: String,
    aud: String,
    email: Option<String>,
    exp: usize,
}

fn token(secret: &str, sub: &str, exp: usize) -> String {
    let claims = TestClaims {
        sub: sub.to_string(),
        role: "authenticated".to_string(),
        aud: "authenticated".to_string(),
        email: Some("test@example.com".to_string()),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn extract(authorization: Option<String>) -> Result<AuthUser, (StatusCode, String)> {
    let mut builder = Request::builder().uri("/api/reels");
    if let Some(value) = authorization {
        builder = builder.header(axum::http::header::AUTHORIZATION, value);
    }
    let mut request = builder.body(()).unwrap();
    request
        .extensions_mut()
        .insert(SupabaseJwt::new(SECRET.to_string()));

    let (mut parts, _) = request.into_parts();
    AuthUser::from_request_parts(&mut parts, &()).await
}

#[test]
fn test_validate_supabase_jwt_success() {
    let token = token(SECRET, "123e4567-e89b-12d3-a456-426614174000", 9999999999);

    let claims = validate_supabase_jwt(&token, SECRET).expect("Valid token should pass");
    assert_eq!(claims.sub, "123e4567-e89b-12d3-a456-426614174000");
    assert_eq!(claims.email.as_deref(), Some("test@example.com"));
}

#[test]
fn test_validate_supabase_jwt_expired() {
    let token = token(SECRET, "123e4567-e89b-12d3-a456-426614174000", 1);

    assert!(validate_supabase_jwt(&token, SECRET).is_err());
}

#[test]
fn test_validate_supabase_jwt_invalid_signature() {
    let token = token("wrongsecret", "123e4567-e89b-12d3-a456-426614174000", 9999999999);

    assert!(validate_supabase_jwt(&token, SECRET).is_err());
}

#[tokio::test]
async fn extractor_yields_the_token_subject() {
    let token = token(SECRET, "123e4567-e89b-12d3-a456-426614174000", 9999999999);

    let user = extract(Some(format!("Bearer {token}"))).await.unwrap();

    assert_eq!(
        user.user_id,
        Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap()
    );
}

#[tokio::test]
async fn extractor_rejects_missing_or_malformed_headers() {
    let token = token(SECRET, "not-a-uuid", 9999999999);

    assert_eq!(extract(None).await.unwrap_err().0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        extract(Some(format!("Token {token}"))).await.unwrap_err().0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        extract(Some(format!("Bearer {token}"))).await.unwrap_err().0,
        StatusCode::UNAUTHORIZED
    );
}
