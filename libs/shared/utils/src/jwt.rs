use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use shared_models::auth::{JwtClaims, JwtHeader, User};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every issued session token.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

pub fn issue_token(user_id: i64, jwt_secret: &str) -> Result<String, String> {
    issue_token_at(user_id, jwt_secret, Utc::now(), Duration::seconds(TOKEN_TTL_SECONDS))
}

pub fn issue_token_at(
    user_id: i64,
    jwt_secret: &str,
    issued_at: DateTime<Utc>,
    ttl: Duration,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = JwtClaims {
        sub: user_id.to_string(),
        iat: Some(issued_at.timestamp().max(0) as u64),
        exp: Some((issued_at + ttl).timestamp().max(0) as u64),
    };

    let header_json = serde_json::to_vec(&header).map_err(|e| e.to_string())?;
    let claims_json = serde_json::to_vec(&claims).map_err(|e| e.to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    debug!("Issued token for user: {}", user_id);
    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signature_string = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signature_string.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let header: JwtHeader = URL_SAFE_NO_PAD.decode(header_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or_else(|| "Invalid header format".to_string())?;
    if header.alg != "HS256" {
        return Err("Unsupported token algorithm".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        },
    };

    let Some(exp) = claims.exp else {
        return Err("Token has no expiry".to_string());
    };
    let now = Utc::now().timestamp() as u64;
    if exp < now {
        debug!("Token expired at {} (now: {})", exp, now);
        return Err("Token expired".to_string());
    }

    let to_datetime = |timestamp: u64| Utc.timestamp_opt(timestamp as i64, 0).single();

    let user = User {
        id: claims.sub,
        issued_at: claims.iat.and_then(to_datetime),
        expires_at: to_datetime(exp),
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_issued_token_validates() {
        let token = issue_token(42, SECRET).unwrap();
        let user = validate_token(&token, SECRET).unwrap();

        assert_eq!(user.id, "42");
        let issued = user.issued_at.unwrap();
        let expires = user.expires_at.unwrap();
        assert_eq!((expires - issued).num_seconds(), TOKEN_TTL_SECONDS);
    }

    #[test]
    fn test_claims_carry_no_role() {
        let token = issue_token(1, SECRET).unwrap();
        let claims_b64 = token.split('.').nth(1).unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims_b64).unwrap()).unwrap();

        assert!(claims.get("role").is_none());
        assert_eq!(claims["sub"], "1");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(42, SECRET).unwrap();
        assert_eq!(validate_token(&token, "other").unwrap_err(), "Invalid token signature");
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token = issue_token_at(42, SECRET, issued, Duration::seconds(TOKEN_TTL_SECONDS)).unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert_eq!(validate_token("not-a-token", SECRET).unwrap_err(), "Invalid token format");
    }

    #[test]
    fn test_empty_secret_refused() {
        assert!(issue_token(42, "").is_err());
        assert!(validate_token("a.b.c", "").is_err());
    }
}
