// src/utils/keys.rs
use crate::error::InvalidKeyError;
use der::asn1::{ObjectIdentifier, OctetStringRef, UintRef};
use der::{Decode, Encode, SecretDocument, Sequence};
use pkcs1::RsaPrivateKey;
use pkcs8::PrivateKeyInfo;
use sec1::EcPrivateKey;
use tracing::debug;

const PKCS8_LABEL: &str = "PRIVATE KEY";
const PKCS8_ENCRYPTED_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const SEC1_LABEL: &str = "EC PRIVATE KEY";
const PKCS1_LABEL: &str = "RSA PRIVATE KEY";
const DSA_LABEL: &str = "DSA PRIVATE KEY";

// Named curves whose scalar range we check exactly.
const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP256K1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");
const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

// Ошибка, которую отдаём для ключа с плохим скаляром / параметрами
const INVALID_KEY: &str = "Invalid key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyEncoding {
    Pkcs8,
    Sec1,
    Pkcs1,
    Dsa,
}

/// Private key algorithms accepted inside PKCS#8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAlgorithm {
    Ec,
    Rsa,
    Dsa,
    Dh,
    Ed25519,
    X25519,
    Ed448,
    X448,
}

const KEY_ALGORITHMS: &[(ObjectIdentifier, KeyAlgorithm)] = &[
    (ObjectIdentifier::new_unwrap("1.2.840.10045.2.1"), KeyAlgorithm::Ec),
    (ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1"), KeyAlgorithm::Rsa),
    (ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10"), KeyAlgorithm::Rsa),
    (ObjectIdentifier::new_unwrap("1.2.840.10040.4.1"), KeyAlgorithm::Dsa),
    (ObjectIdentifier::new_unwrap("1.2.840.113549.1.3.1"), KeyAlgorithm::Dh),
    (ObjectIdentifier::new_unwrap("1.2.840.10046.2.1"), KeyAlgorithm::Dh),
    (ObjectIdentifier::new_unwrap("1.3.101.112"), KeyAlgorithm::Ed25519),
    (ObjectIdentifier::new_unwrap("1.3.101.110"), KeyAlgorithm::X25519),
    (ObjectIdentifier::new_unwrap("1.3.101.113"), KeyAlgorithm::Ed448),
    (ObjectIdentifier::new_unwrap("1.3.101.111"), KeyAlgorithm::X448),
];

impl KeyAlgorithm {
    fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        KEY_ALGORITHMS
            .iter()
            .find(|(known, _)| *known == oid)
            .map(|(_, algorithm)| *algorithm)
    }

    /// Raw key length for the RFC 8410 curves.
    fn raw_key_len(self) -> Option<usize> {
        match self {
            Self::Ed25519 | Self::X25519 => Some(32),
            Self::Ed448 => Some(57),
            Self::X448 => Some(56),
            _ => None,
        }
    }
}

/// OpenSSL "traditional" DSA private key.
#[derive(Sequence)]
struct DsaPrivateKey<'a> {
    version: u8,
    p: UintRef<'a>,
    q: UintRef<'a>,
    g: UintRef<'a>,
    y: UintRef<'a>,
    x: UintRef<'a>,
}

/// Dss-Parms, the algorithm parameters of a PKCS#8 DSA key.
#[derive(Sequence)]
struct DsaParameters<'a> {
    p: UintRef<'a>,
    q: UintRef<'a>,
    g: UintRef<'a>,
}

/// Checks that `pem` holds an unencrypted private key we can load.
///
/// `Ok(())` means valid. The curve is not checked, and despite the name any
/// supported private key passes: EC, RSA, DSA, DH and the RFC 8410 curves.
/// Whitespace around the PEM block is ignored.
pub fn validate_ec_private_key(pem: &str) -> Result<(), InvalidKeyError> {
    let encoding = parse_private_key(pem.trim())?;
    debug!(?encoding, "Private key parsed");
    Ok(())
}

pub fn is_valid_ec_private_key(pem: &str) -> bool {
    validate_ec_private_key(pem).is_ok()
}

fn parse_private_key(pem: &str) -> Result<KeyEncoding, InvalidKeyError> {
    // Ключ держим в SecretDocument, чтобы байты затирались после проверки
    let (label, document) = SecretDocument::from_pem(pem).map_err(invalid)?;
    let der = document.as_bytes();

    match label {
        PKCS8_LABEL => {
            check_pkcs8(der)?;
            Ok(KeyEncoding::Pkcs8)
        }
        SEC1_LABEL => {
            check_ec(der, None)?;
            Ok(KeyEncoding::Sec1)
        }
        PKCS1_LABEL => {
            RsaPrivateKey::try_from(der).map_err(invalid)?;
            Ok(KeyEncoding::Pkcs1)
        }
        DSA_LABEL => {
            let key = DsaPrivateKey::from_der(der).map_err(invalid)?;
            if key.version != 0 {
                return Err(InvalidKeyError::new(format!(
                    "unsupported DSA key version {}",
                    key.version
                )));
            }
            check_dsa(&key.p, &key.q, &key.g, &key.x)?;
            ensure_nonzero(key.y.as_bytes())?;
            Ok(KeyEncoding::Dsa)
        }
        PKCS8_ENCRYPTED_LABEL => Err(InvalidKeyError::new(
            "password was not given but private key is encrypted",
        )),
        other => Err(InvalidKeyError::new(format!(
            "unsupported PEM label: {}",
            other
        ))),
    }
}

fn check_pkcs8(der: &[u8]) -> Result<(), InvalidKeyError> {
    let info = PrivateKeyInfo::try_from(der).map_err(invalid)?;
    let oid = info.algorithm.oid;
    let algorithm = KeyAlgorithm::from_oid(oid)
        .ok_or_else(|| InvalidKeyError::new(format!("Unknown key type: {}", oid)))?;
    let payload = info.private_key;

    match algorithm {
        KeyAlgorithm::Ec => check_ec(payload, info.algorithm.parameters_oid().ok()),
        KeyAlgorithm::Rsa => RsaPrivateKey::try_from(payload)
            .map(drop)
            .map_err(invalid),
        KeyAlgorithm::Dsa => {
            let encoded = info
                .algorithm
                .parameters
                .ok_or_else(|| InvalidKeyError::new("DSA key has no parameters"))?
                .to_der()
                .map_err(invalid)?;
            let params = DsaParameters::from_der(&encoded).map_err(invalid)?;
            let x = UintRef::from_der(payload).map_err(invalid)?;
            check_dsa(&params.p, &params.q, &params.g, &x)
        }
        KeyAlgorithm::Dh => {
            let x = UintRef::from_der(payload).map_err(invalid)?;
            ensure_nonzero(x.as_bytes())
        }
        KeyAlgorithm::Ed25519 | KeyAlgorithm::X25519 | KeyAlgorithm::Ed448 | KeyAlgorithm::X448 => {
            let expected = algorithm.raw_key_len().unwrap_or_default();
            let raw = OctetStringRef::from_der(payload).map_err(invalid)?;
            if raw.as_bytes().len() == expected {
                Ok(())
            } else {
                Err(InvalidKeyError::new(format!(
                    "{:?} key must be {} bytes, got {}",
                    algorithm,
                    expected,
                    raw.as_bytes().len()
                )))
            }
        }
    }
}

/// SEC1 payload. `curve` comes from the PKCS#8 wrapper when there is one.
fn check_ec(der: &[u8], curve: Option<ObjectIdentifier>) -> Result<(), InvalidKeyError> {
    let key = EcPrivateKey::try_from(der).map_err(invalid)?;
    let curve = curve
        .or_else(|| key.parameters.and_then(|params| params.named_curve()))
        .ok_or_else(|| InvalidKeyError::new("EC key does not name its curve"))?;
    let scalar = key.private_key;

    let in_range = if curve == P256_OID {
        p256::SecretKey::from_slice(scalar).is_ok()
    } else if curve == SECP256K1_OID {
        k256::SecretKey::from_slice(scalar).is_ok()
    } else if curve == P384_OID {
        p384::SecretKey::from_slice(scalar).is_ok()
    } else {
        // other curves: only rule out an empty or zero scalar
        scalar.iter().any(|byte| *byte != 0)
    };

    if in_range {
        Ok(())
    } else {
        Err(InvalidKeyError::new(INVALID_KEY))
    }
}

// 0 < x < q, and the domain parameters are not zero
fn check_dsa(
    p: &UintRef<'_>,
    q: &UintRef<'_>,
    g: &UintRef<'_>,
    x: &UintRef<'_>,
) -> Result<(), InvalidKeyError> {
    ensure_nonzero(p.as_bytes())?;
    ensure_nonzero(q.as_bytes())?;
    ensure_nonzero(g.as_bytes())?;
    ensure_nonzero(x.as_bytes())?;
    if uint_less_than(x.as_bytes(), q.as_bytes()) {
        Ok(())
    } else {
        Err(InvalidKeyError::new(INVALID_KEY))
    }
}

fn ensure_nonzero(value: &[u8]) -> Result<(), InvalidKeyError> {
    if value.iter().any(|byte| *byte != 0) {
        Ok(())
    } else {
        Err(InvalidKeyError::new(INVALID_KEY))
    }
}

// Big-endian magnitudes with leading zeros stripped.
fn uint_less_than(a: &[u8], b: &[u8]) -> bool {
    (a.len(), a) < (b.len(), b)
}

fn invalid(err: impl std::fmt::Display) -> InvalidKeyError {
    InvalidKeyError::new(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EC_SEC1: &str = include_str!("../../tests/fixtures/ec_sec1.pem");
    const EC_PKCS8: &str = include_str!("../../tests/fixtures/ec_pkcs8.pem");
    const RSA_PKCS1: &str = include_str!("../../tests/fixtures/rsa_pkcs1.pem");
    const DSA_TRADITIONAL: &str = include_str!("../../tests/fixtures/dsa_traditional.pem");

    #[test]
    fn test_parse_reports_encoding() {
        assert_eq!(parse_private_key(EC_SEC1.trim()), Ok(KeyEncoding::Sec1));
        assert_eq!(parse_private_key(EC_PKCS8.trim()), Ok(KeyEncoding::Pkcs8));
        assert_eq!(parse_private_key(RSA_PKCS1.trim()), Ok(KeyEncoding::Pkcs1));
        assert_eq!(parse_private_key(DSA_TRADITIONAL.trim()), Ok(KeyEncoding::Dsa));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let padded = format!("\n\n  {}  \n", EC_SEC1.trim());
        assert!(validate_ec_private_key(&padded).is_ok());
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let pem = EC_SEC1.replace("EC PRIVATE KEY", "CERTIFICATE");
        let err = validate_ec_private_key(&pem).unwrap_err();
        assert_eq!(err.reason(), "unsupported PEM label: CERTIFICATE");
    }

    #[test]
    fn test_error_message_prefix() {
        let err = validate_ec_private_key("garbage").unwrap_err();
        assert!(err.to_string().starts_with("Invalid EC Private Key: "));
    }

    #[test]
    fn test_algorithm_lookup() {
        let ed25519 = ObjectIdentifier::new_unwrap("1.3.101.112");
        assert_eq!(KeyAlgorithm::from_oid(ed25519), Some(KeyAlgorithm::Ed25519));
        assert_eq!(KeyAlgorithm::from_oid(ObjectIdentifier::new_unwrap("1.2.3.4")), None);
    }

    #[test]
    fn test_uint_less_than() {
        assert!(uint_less_than(&[0x01], &[0x02]));
        assert!(uint_less_than(&[0xff], &[0x01, 0x00]));
        assert!(!uint_less_than(&[0x01, 0x00], &[0xff]));
        assert!(!uint_less_than(&[0x05], &[0x05]));
    }

    #[test]
    fn test_ec_scalar_on_unlisted_curve() {
        // SEC1 key on P-521 with a zero scalar
        let p521 = ObjectIdentifier::new_unwrap("1.3.132.0.35");
        let zero = EcPrivateKey {
            private_key: &[0u8; 66],
            parameters: Some(sec1::EcParameters::NamedCurve(p521)),
            public_key: None,
        }
        .to_der()
        .unwrap();
        assert_eq!(check_ec(&zero, None).unwrap_err().reason(), INVALID_KEY);
    }
}
