use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::model::user::{Claims, TokenType, User};

/// Identity carried in every token the service issues.
#[derive(Debug, Clone)]
pub struct Subject {
    pub user_id: u64,
    pub username: String,
    pub role: u8,
    pub employee_id: Option<u64>,
}

impl From<&User> for Subject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role_id,
            employee_id: user.employee_id,
        }
    }
}

impl From<&Claims> for Subject {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.sub.clone(),
            role: claims.role,
            employee_id: claims.employee_id,
        }
    }
}

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

/// Signs a fresh token with its own jti; returns the claims for persistence.
pub fn issue(subject: &Subject, token_type: TokenType, secret: &str, ttl: usize) -> Result<(String, Claims), Error> {
    let claims = Claims {
        user_id: subject.user_id,
        sub: subject.username.clone(),
        role: subject.role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id: subject.employee_id,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Subject {
        Subject {
            user_id: 7,
            username: "hr.manager".into(),
            role: 2,
            employee_id: Some(3),
        }
    }

    #[test]
    fn issued_tokens_verify_with_the_same_secret() {
        let (token, claims) = issue(&subject(), TokenType::Access, "secret", 60).unwrap();
        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.token_type, TokenType::Access);
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn every_token_gets_a_distinct_jti() {
        let (_, a) = issue(&subject(), TokenType::Refresh, "secret", 60).unwrap();
        let (_, b) = issue(&subject(), TokenType::Refresh, "secret", 60).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
