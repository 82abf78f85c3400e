/// Key Decoder - armored key material to structured certificates
use crate::error::{GatewayError, GatewayResult};
use sequoia_openpgp::armor::{Kind, Reader, ReaderMode};
use sequoia_openpgp::cert::CertParser;
use sequoia_openpgp::parse::Parse;
use sequoia_openpgp::Cert;

const ARMOR_END: &str = "-----END PGP PUBLIC KEY BLOCK-----";

/// Decode one armored blob into zero or more primary keys.
///
/// The armor envelope is mandatory: input without a public-key armor block,
/// or with a damaged one, is an error rather than a binary fallback. A blob
/// may carry several concatenated armor blocks; all of them are decoded, and
/// anything other than whitespace left over after the last block is an
/// error. Parsing fails closed - the first bad certificate aborts the whole
/// blob, no partial key set is returned.
///
/// Directories hand back re-exported and overlapping key material, so
/// certificates sharing a fingerprint are merged into one, across blocks.
/// Within a single certificate, sequoia's canonical form already collapses
/// duplicate subkeys, user-ID bindings, and signatures.
pub fn decode_armored(armored: &str) -> GatewayResult<Vec<Cert>> {
    let mut certs: Vec<Cert> = Vec::new();
    for block in armor_blocks(armored)? {
        decode_block(block, &mut certs)?;
    }
    Ok(certs)
}

/// Split a blob into consecutive armor blocks on the END marker line
fn armor_blocks(input: &str) -> GatewayResult<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut rest = input;
    loop {
        if rest.trim().is_empty() {
            break;
        }
        match rest.find(ARMOR_END) {
            Some(pos) => {
                let end = pos + ARMOR_END.len();
                blocks.push(&rest[..end]);
                rest = &rest[end..];
            }
            None if blocks.is_empty() => {
                // No END marker anywhere; let the armor reader report what
                // is wrong with the envelope
                blocks.push(rest);
                break;
            }
            None => {
                return Err(GatewayError::Decode(
                    "trailing data after armored key block".to_string(),
                ));
            }
        }
    }
    Ok(blocks)
}

/// Parse one armor block, merging its certs into the accumulated key set
fn decode_block(block: &str, certs: &mut Vec<Cert>) -> GatewayResult<()> {
    let reader = Reader::from_bytes(
        block.as_bytes(),
        ReaderMode::Tolerant(Some(Kind::PublicKey)),
    );

    let parser =
        CertParser::from_reader(reader).map_err(|e| GatewayError::Decode(e.to_string()))?;

    for parsed in parser {
        let cert = parsed.map_err(|e| GatewayError::Decode(e.to_string()))?;

        match certs
            .iter()
            .position(|c| c.fingerprint() == cert.fingerprint())
        {
            Some(i) => {
                let merged = certs[i]
                    .clone()
                    .merge_public(cert)
                    .map_err(|e| GatewayError::Decode(e.to_string()))?;
                certs[i] = merged;
            }
            None => certs.push(cert),
        }
    }

    Ok(())
}
