// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Debug, Formatter};

use carewire_type::{Result, diagnostic::internal::internal};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use rand::RngCore;
use tracing::debug;

use crate::{AuthError, Claims, Session};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs session tokens as HS256 JWTs.
pub struct SessionIssuer {
	encoding: EncodingKey,
	decoding: DecodingKey,
}

impl SessionIssuer {
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		let secret = secret.as_ref();
		Self {
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
		}
	}

	/// Issuer with a fresh random secret.
	pub fn generate() -> Self {
		let mut secret = [0u8; 32];
		rand::rng().fill_bytes(&mut secret);
		Self::new(secret)
	}

	pub fn verifier(&self) -> SessionVerifier {
		SessionVerifier::from_key(self.decoding.clone())
	}

	pub fn issue(&self, claims: &Claims) -> Result<String> {
		encode(&Header::new(ALGORITHM), claims, &self.encoding)
			.map_err(|err| carewire_type::error!(internal(format!("failed to sign session token: {}", err))))
	}
}

/// Checks session tokens signed with the shared secret.
///
/// Signature, algorithm, required claims and expiry are enforced by
/// [`Validation`]. Expiry has no leeway.
#[derive(Clone)]
pub struct SessionVerifier {
	key: DecodingKey,
	validation: Validation,
}

impl SessionVerifier {
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		Self::from_key(DecodingKey::from_secret(secret.as_ref()))
	}

	fn from_key(key: DecodingKey) -> Self {
		let mut validation = Validation::new(ALGORITHM);
		validation.leeway = 0;
		validation.validate_aud = false;
		validation.set_required_spec_claims(&["exp", "sub"]);
		Self {
			key,
			validation,
		}
	}

	/// Also require the `aud` claim to name `audience`.
	pub fn with_audience(mut self, audience: &str) -> Self {
		self.validation.set_audience(&[audience]);
		self.validation.validate_aud = true;
		self
	}

	pub fn verify(&self, token: &str) -> std::result::Result<Session, AuthError> {
		let token = token.trim();
		match decode::<Claims>(token, &self.key, &self.validation) {
			Ok(data) => Ok(Session::new(data.claims)),
			Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
				let claims = self.decode_ignoring_expiry(token)?;
				debug!(user = %claims.sub, expired_at = claims.exp, "rejected expired session token");
				Err(AuthError::Expired {
					expired_at: claims.exp,
				})
			}
			Err(err) => Err(rejected(err)),
		}
	}

	/// Like [`verify`](Self::verify), with expiry judged against `now`
	/// (unix seconds) instead of the system clock.
	pub fn verify_at(&self, token: &str, now: u64) -> std::result::Result<Session, AuthError> {
		let session = Session::new(self.decode_ignoring_expiry(token.trim())?);
		session.ensure_fresh_at(now)?;
		Ok(session)
	}

	fn decode_ignoring_expiry(&self, token: &str) -> std::result::Result<Claims, AuthError> {
		let mut validation = self.validation.clone();
		validation.validate_exp = false;
		decode::<Claims>(token, &self.key, &validation).map(|data| data.claims).map_err(rejected)
	}
}

impl Debug for SessionVerifier {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionVerifier")
			.field("algorithms", &self.validation.algorithms)
			.field("validate_aud", &self.validation.validate_aud)
			.finish_non_exhaustive()
	}
}

fn rejected(err: jsonwebtoken::errors::Error) -> AuthError {
	match err.kind() {
		ErrorKind::InvalidSignature => {
			debug!("rejected session token with invalid signature");
			AuthError::BadSignature
		}
		_ => AuthError::malformed(err.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::{Role, unix_now};

	fn issuer() -> SessionIssuer {
		SessionIssuer::new(b"ward-7-shared-secret")
	}

	#[test]
	fn test_issue_and_verify() {
		let issuer = issuer();
		let claims = Claims::new("u1", "org1", Role::Employee, Duration::from_secs(600));
		let token = issuer.issue(&claims).unwrap();
		assert_eq!(token.split('.').count(), 3);

		let session = issuer.verifier().verify(&token).unwrap();
		assert_eq!(session.claims(), &claims);
		assert_eq!(session.user_id(), "u1");
		assert_eq!(session.organization(), "org1");
		assert_eq!(session.role(), Role::Employee);
	}

	#[test]
	fn test_expired_token() {
		let issuer = issuer();
		let token = issuer.issue(&Claims::expiring_at("u1", "org1", Role::Admin, 1_000)).unwrap();

		assert_eq!(
			issuer.verifier().verify(&token),
			Err(AuthError::Expired {
				expired_at: 1_000
			})
		);
	}

	#[test]
	fn test_verify_at_uses_given_clock() {
		let issuer = issuer();
		let token = issuer.issue(&Claims::expiring_at("u1", "org1", Role::Admin, 1_000)).unwrap();
		let verifier = issuer.verifier();

		assert!(verifier.verify_at(&token, 999).is_ok());
		assert_eq!(
			verifier.verify_at(&token, 1_000),
			Err(AuthError::Expired {
				expired_at: 1_000
			})
		);
	}

	#[test]
	fn test_tampered_claims_are_rejected() {
		let issuer = issuer();
		let exp = unix_now() + 600;
		let token = issuer.issue(&Claims::expiring_at("u1", "org1", Role::Employee, exp)).unwrap();
		let elevated = issuer.issue(&Claims::expiring_at("u1", "org1", Role::Admin, exp)).unwrap();

		let parts: Vec<&str> = token.split('.').collect();
		let elevated: Vec<&str> = elevated.split('.').collect();
		let forged = format!("{}.{}.{}", parts[0], elevated[1], parts[2]);

		assert_eq!(issuer.verifier().verify(&forged), Err(AuthError::BadSignature));
	}

	#[test]
	fn test_foreign_secret_is_rejected() {
		let token = issuer().issue(&Claims::new("u1", "org1", Role::Admin, Duration::from_secs(600))).unwrap();
		let other = SessionIssuer::new(b"another-secret");

		assert_eq!(other.verifier().verify(&token), Err(AuthError::BadSignature));
	}

	#[test]
	fn test_other_algorithm_is_rejected() {
		let claims = Claims::new("u1", "org1", Role::Admin, Duration::from_secs(600));
		let token =
			encode(&Header::new(Algorithm::HS512), &claims, &EncodingKey::from_secret(b"ward-7-shared-secret"))
				.unwrap();

		assert!(matches!(issuer().verifier().verify(&token), Err(AuthError::MalformedToken { .. })));
	}

	#[test]
	fn test_malformed_tokens() {
		let verifier = issuer().verifier();
		for token in ["", "abc", "abc.abc", "a.b.c"] {
			assert!(
				matches!(verifier.verify(token), Err(AuthError::MalformedToken { .. })),
				"token {:?}",
				token
			);
		}
	}

	#[test]
	fn test_verifier_from_shared_secret() {
		let issuer = issuer();
		let verifier = SessionVerifier::new(b"ward-7-shared-secret");
		let token = issuer.issue(&Claims::new("u1", "org1", Role::Supervisor, Duration::from_secs(600))).unwrap();
		assert!(verifier.verify(&token).is_ok());
	}

	#[test]
	fn test_audience() {
		let issuer = issuer();
		let token = issuer.issue(&Claims::new("u1", "org1", Role::Supervisor, Duration::from_secs(600))).unwrap();

		assert!(matches!(
			issuer.verifier().with_audience("authenticated").verify(&token),
			Err(AuthError::MalformedToken { .. })
		));
	}
}
