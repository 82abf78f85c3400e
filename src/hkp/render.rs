/// Response Renderer - key sets to HKP output formats
///
/// Three formats: an armored key stream for `get`, and two index formats
/// (machine-readable and JSON) for `index`/`vindex`. Exactly one format is
/// ever written per response; the dispatcher picks it.
use crate::error::{GatewayError, GatewayResult};
use chrono::{DateTime, Utc};
use sequoia_openpgp::armor::{Kind, Writer};
use sequoia_openpgp::serialize::Serialize as _;
use sequoia_openpgp::Cert;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Write the key set as a single armored public-key block holding every
/// key's packets, the form the decoder and ordinary PGP tooling import whole
pub fn write_armored(keys: &[Cert], out: &mut Vec<u8>) -> GatewayResult<()> {
    let mut writer = Writer::new(out, Kind::PublicKey)
        .map_err(|e| GatewayError::Internal(format!("error starting armor block: {}", e)))?;

    for cert in keys {
        cert.serialize(&mut writer)
            .map_err(|e| GatewayError::Internal(format!("error writing armored key: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| GatewayError::Internal(format!("error closing armor block: {}", e)))?;

    Ok(())
}

/// Machine-readable index per the HKP draft: an `info` header line, then a
/// `pub` line per key and a `uid` line per user-ID binding
pub fn machine_readable_index(keys: &[Cert]) -> String {
    let mut out = String::new();
    out.push_str(&format!("info:1:{}\n", keys.len()));

    for cert in keys {
        let key = cert.primary_key().key();
        out.push_str(&format!(
            "pub:{}:{}:{}:{}::\n",
            cert.fingerprint().to_hex(),
            u8::from(key.pk_algo()),
            key.mpis().bits().unwrap_or(0),
            unix_seconds(key.creation_time()),
        ));

        for uid in cert.userids() {
            out.push_str(&format!(
                "uid:{}:::\n",
                escape_uid(&String::from_utf8_lossy(uid.userid().value())),
            ));
        }
    }

    out
}

/// One key's entry in the JSON index
#[derive(Debug, Serialize)]
pub struct KeyIndexEntry {
    pub fingerprint: String,
    pub algorithm: u8,
    pub bit_length: usize,
    pub created_at: DateTime<Utc>,
    pub user_ids: Vec<String>,
    pub subkeys: Vec<String>,
}

impl KeyIndexEntry {
    fn from_cert(cert: &Cert) -> Self {
        let key = cert.primary_key().key();
        KeyIndexEntry {
            fingerprint: cert.fingerprint().to_hex(),
            algorithm: u8::from(key.pk_algo()),
            bit_length: key.mpis().bits().unwrap_or(0),
            created_at: DateTime::<Utc>::from(key.creation_time()),
            user_ids: cert
                .userids()
                .map(|uid| String::from_utf8_lossy(uid.userid().value()).into_owned())
                .collect(),
            subkeys: cert
                .keys()
                .subkeys()
                .map(|sub| sub.fingerprint().to_hex())
                .collect(),
        }
    }
}

/// JSON index: one entry per key
pub fn json_index(keys: &[Cert]) -> GatewayResult<String> {
    let entries: Vec<KeyIndexEntry> = keys.iter().map(KeyIndexEntry::from_cert).collect();
    serde_json::to_string(&entries)
        .map_err(|e| GatewayError::Internal(format!("error encoding JSON index: {}", e)))
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Colons delimit machine-readable fields, so they and the escape character
/// itself are percent-encoded inside user IDs
fn escape_uid(uid: &str) -> String {
    uid.replace('%', "%25").replace(':', "%3A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::{self, tests::test_cert};

    #[test]
    fn test_armored_stream_round_trips() {
        let alice = test_cert("Alice Example <alice@example.com>");
        let bob = test_cert("Bob Example <bob@example.com>");

        let mut body = Vec::new();
        write_armored(&[alice.clone(), bob.clone()], &mut body).unwrap();
        let decoded = keyring::decode_armored(&String::from_utf8(body).unwrap()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].fingerprint(), alice.fingerprint());
        assert_eq!(decoded[1].fingerprint(), bob.fingerprint());
        // Re-encoding introduces no duplicate components
        assert_eq!(decoded[0].userids().count(), alice.userids().count());
        assert_eq!(
            decoded[0].keys().subkeys().count(),
            alice.keys().subkeys().count()
        );
    }

    #[test]
    fn test_armored_stream_is_one_block() {
        let alice = test_cert("Alice Example <alice@example.com>");
        let bob = test_cert("Bob Example <bob@example.com>");

        let mut body = Vec::new();
        write_armored(&[alice, bob], &mut body).unwrap();
        let text = String::from_utf8(body).unwrap();

        assert_eq!(
            text.matches("-----BEGIN PGP PUBLIC KEY BLOCK-----").count(),
            1
        );
        assert_eq!(
            text.matches("-----END PGP PUBLIC KEY BLOCK-----").count(),
            1
        );
    }

    #[test]
    fn test_machine_readable_index_layout() {
        let cert = test_cert("Alice Example <alice@example.com>");
        let index = machine_readable_index(&[cert.clone()]);
        let mut lines = index.lines();

        assert_eq!(lines.next(), Some("info:1:1"));

        let pub_line = lines.next().unwrap();
        assert!(pub_line.starts_with(&format!("pub:{}:", cert.fingerprint().to_hex())));

        let uid_line = lines.next().unwrap();
        assert!(uid_line.starts_with("uid:Alice Example <alice@example.com>"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_machine_readable_index_escapes_colons() {
        let cert = test_cert("Trouble: Maker <trouble@example.com>");
        let index = machine_readable_index(&[cert]);

        let uid_line = index.lines().find(|l| l.starts_with("uid:")).unwrap();
        assert!(uid_line.contains("Trouble%3A Maker"));
        // Exactly the field delimiters remain: uid, creation, expiration, flags
        assert_eq!(uid_line.matches(':').count(), 4);
    }

    #[test]
    fn test_json_index_shape() {
        let cert = test_cert("Alice Example <alice@example.com>");
        let body = json_index(&[cert.clone()]).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&body).unwrap();

        let entry = &entries.as_array().unwrap()[0];
        assert_eq!(
            entry["fingerprint"].as_str().unwrap(),
            cert.fingerprint().to_hex()
        );
        assert_eq!(entry["user_ids"].as_array().unwrap().len(), 1);
        assert_eq!(entry["subkeys"].as_array().unwrap().len(), 1);
        assert!(entry["bit_length"].as_u64().unwrap() > 0);
    }
}
