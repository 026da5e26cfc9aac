//! Cosignature aggregation.
//!
//! Cosigners sign the aggregate's *hash*, not its payload. Their
//! `(public key, signature)` pairs go after the inner-transaction block, so
//! neither the initiator's signature nor the hash change as cosignatures
//! are added. The only header field touched is the leading size.

use bytes::BufMut;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builder::Transaction;
use super::error::{TransactionError, ValidationError};
use super::signing::{check_schema, sign_transaction, GenerationHash, SignedTransaction};
use super::types::{Cosignature, TransactionType};
use crate::config::{COSIGNATURE_SIZE, HASH_LENGTH};
use crate::crypto::{DsaSigner, PublicKey, Signature};

/// A cosigner's signature over an announced aggregate, travelling on its
/// own (for example on the `cosignature` listener channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignatureSignedTransaction {
    pub parent_hash: String,
    pub signature: Signature,
    pub signer_public_key: PublicKey,
}

impl From<&CosignatureSignedTransaction> for Cosignature {
    fn from(c: &CosignatureSignedTransaction) -> Self {
        Cosignature {
            signer: c.signer_public_key,
            signature: c.signature,
        }
    }
}

fn require_aggregate(tx: &Transaction) -> Result<(), ValidationError> {
    if !tx.transaction_type().is_aggregate() {
        return Err(ValidationError::NotAggregate(tx.transaction_type().to_string()));
    }
    Ok(())
}

/// Sign an aggregate with `initiator`, then append one cosignature per
/// entry of `cosignatories`, in order.
///
/// Any cosigner failure aborts the whole thing; no partial payload is
/// returned.
pub fn sign_transaction_with_cosigners(
    tx: &Transaction,
    initiator: &dyn DsaSigner,
    cosignatories: &[&dyn DsaSigner],
    generation_hash: &GenerationHash,
) -> Result<SignedTransaction, TransactionError> {
    require_aggregate(tx)?;
    let schema = tx.network_type.sign_schema();
    let signed = sign_transaction(tx, initiator, generation_hash)?;

    let mut appended: Vec<u8> = Vec::with_capacity(cosignatories.len() * COSIGNATURE_SIZE);
    for cosignatory in cosignatories {
        check_schema(*cosignatory, schema)?;
        let signature = cosignatory.sign(signed.hash_bytes())?;
        appended.put_slice(cosignatory.public_key().as_bytes());
        appended.put_slice(signature.as_bytes());
    }

    debug!(
        hash = %signed.hash(),
        cosigners = cosignatories.len(),
        "appended cosignatures"
    );
    Ok(signed.with_appended(&appended)?)
}

/// Sign an aggregate with `initiator` and attach cosignatures that were
/// collected elsewhere (for example off-chain, from
/// [`cosign_aggregate_hash`]). Every cosignature must be over this
/// aggregate's hash.
pub fn sign_transaction_given_signatures(
    tx: &Transaction,
    initiator: &dyn DsaSigner,
    cosignatures: &[CosignatureSignedTransaction],
    generation_hash: &GenerationHash,
) -> Result<SignedTransaction, TransactionError> {
    require_aggregate(tx)?;
    let signed = sign_transaction(tx, initiator, generation_hash)?;
    let hash = signed.hash();

    let mut appended: Vec<u8> = Vec::with_capacity(cosignatures.len() * COSIGNATURE_SIZE);
    for cosignature in cosignatures {
        if !cosignature.parent_hash.eq_ignore_ascii_case(&hash) {
            return Err(ValidationError::Invalid {
                field: "parent_hash",
                reason: format!("{} does not match {hash}", cosignature.parent_hash),
            }
            .into());
        }
        appended.put_slice(cosignature.signer_public_key.as_bytes());
        appended.put_slice(cosignature.signature.as_bytes());
    }
    Ok(signed.with_appended(&appended)?)
}

/// Cosign an already-announced aggregate identified by its hex hash.
pub fn cosign_aggregate_hash<S: DsaSigner + ?Sized>(
    hash: &str,
    signer: &S,
) -> Result<CosignatureSignedTransaction, TransactionError> {
    let invalid = |reason: String| ValidationError::Invalid {
        field: "hash",
        reason,
    };
    let bytes = hex::decode(hash).map_err(|e| invalid(e.to_string()))?;
    if bytes.len() != HASH_LENGTH {
        return Err(invalid(format!("expected 32 bytes, got {}", bytes.len())).into());
    }

    let signature = signer.sign(&bytes)?;
    Ok(CosignatureSignedTransaction {
        parent_hash: hex::encode_upper(&bytes),
        signature,
        signer_public_key: signer.public_key(),
    })
}

/// Cosign a bonded aggregate received from the listener. Its metadata must
/// carry the hash.
pub fn cosign_aggregate<S: DsaSigner + ?Sized>(
    tx: &Transaction,
    signer: &S,
) -> Result<CosignatureSignedTransaction, TransactionError> {
    if tx.transaction_type() != TransactionType::AggregateBonded {
        return Err(ValidationError::NotAggregate(tx.transaction_type().to_string()).into());
    }
    check_schema(signer, tx.network_type.sign_schema())?;
    let hash = tx
        .info
        .as_ref()
        .and_then(|info| info.hash.as_deref())
        .ok_or(ValidationError::MissingField("info.hash"))?;
    cosign_aggregate_hash(hash, signer)
}

impl Transaction {
    /// See [`sign_transaction_with_cosigners`].
    pub fn sign_transaction_with_cosigners(
        &self,
        initiator: &dyn DsaSigner,
        cosignatories: &[&dyn DsaSigner],
        generation_hash: &GenerationHash,
    ) -> Result<SignedTransaction, TransactionError> {
        sign_transaction_with_cosigners(self, initiator, cosignatories, generation_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{SignSchema, SigningError};
    use crate::identity::{Account, NetworkType};
    use crate::transaction::codec::decode;
    use crate::transaction::types::{Deadline, TransactionInfo};
    use crate::transaction::{AggregateTransactionBuilder, TransferTransactionBuilder};

    fn generation_hash() -> GenerationHash {
        GenerationHash::from_bytes([0x57; 32])
    }

    fn aggregate(initiator: &Account, cosigner: &Account) -> Transaction {
        let transfer = |from: &Account, to: &Account| {
            TransferTransactionBuilder::new(NetworkType::MijinTest)
                .recipient(to.address())
                .build()
                .unwrap()
                .to_aggregate(&from.public_account())
        };
        AggregateTransactionBuilder::bonded(NetworkType::MijinTest)
            .inner_transactions(vec![transfer(initiator, cosigner), transfer(cosigner, initiator)])
            .deadline(Deadline::from_raw(10))
            .build()
            .unwrap()
    }

    #[test]
    fn cosignatures_keep_hash_and_fix_size() {
        let alice = Account::generate(NetworkType::MijinTest);
        let bob = Account::generate(NetworkType::MijinTest);
        let carol = Account::generate(NetworkType::MijinTest);
        let tx = aggregate(&alice, &bob);

        let plain = tx.sign_with(&alice, &generation_hash()).unwrap();
        let cosigned = tx
            .sign_transaction_with_cosigners(&alice, &[&bob, &carol], &generation_hash())
            .unwrap();

        assert_eq!(cosigned.hash(), plain.hash());
        let payload = cosigned.payload_bytes();
        assert_eq!(payload.len(), plain.payload_bytes().len() + 2 * COSIGNATURE_SIZE);
        assert_eq!(
            u32::from_le_bytes(payload[..4].try_into().unwrap()) as usize,
            payload.len()
        );
        assert_eq!(&payload[4..plain.payload_bytes().len()], &plain.payload_bytes()[4..]);

        let decoded = decode(payload).unwrap();
        let cosignatures = &decoded.as_aggregate().unwrap().cosignatures;
        assert_eq!(cosignatures.len(), 2);
        assert_eq!(cosignatures[0].signer, bob.public_account().public_key);
        assert_eq!(cosignatures[1].signer, carol.public_account().public_key);
        assert!(bob
            .public_account()
            .verify(cosigned.hash_bytes(), &cosignatures[0].signature));
    }

    #[test]
    fn empty_cosignatory_list_is_plain_signature() {
        let alice = Account::generate(NetworkType::MijinTest);
        let bob = Account::generate(NetworkType::MijinTest);
        let tx = aggregate(&alice, &bob);
        let cosigned = tx
            .sign_transaction_with_cosigners(&alice, &[], &generation_hash())
            .unwrap();
        assert_eq!(cosigned, tx.sign_with(&alice, &generation_hash()).unwrap());
    }

    #[test]
    fn non_aggregate_rejected() {
        let alice = Account::generate(NetworkType::MijinTest);
        let tx = TransferTransactionBuilder::new(NetworkType::MijinTest)
            .recipient(alice.address())
            .build()
            .unwrap();
        let err = tx
            .sign_transaction_with_cosigners(&alice, &[], &generation_hash())
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(ValidationError::NotAggregate(_))
        ));
    }

    #[test]
    fn failing_cosigner_aborts() {
        struct Refuses(Account);
        impl DsaSigner for Refuses {
            fn public_key(&self) -> PublicKey {
                self.0.public_account().public_key
            }
            fn schema(&self) -> SignSchema {
                SignSchema::Sha3
            }
            fn sign(&self, _data: &[u8]) -> Result<Signature, SigningError> {
                Err(SigningError::Backend {
                    signer: self.public_key().to_hex(),
                    reason: "timeout".into(),
                })
            }
        }

        let alice = Account::generate(NetworkType::MijinTest);
        let bob = Account::generate(NetworkType::MijinTest);
        let broken = Refuses(Account::generate(NetworkType::MijinTest));
        let err = aggregate(&alice, &bob)
            .sign_transaction_with_cosigners(&alice, &[&bob, &broken], &generation_hash())
            .unwrap_err();
        assert!(matches!(err, TransactionError::Signing(_)));
    }

    #[test]
    fn offline_cosignatures_match_inline_ones() {
        let alice = Account::generate(NetworkType::MijinTest);
        let bob = Account::generate(NetworkType::MijinTest);
        let tx = aggregate(&alice, &bob);

        let hash = tx.sign_with(&alice, &generation_hash()).unwrap().hash();
        let offline = cosign_aggregate_hash(&hash, &bob).unwrap();
        assert_eq!(offline.parent_hash, hash);

        let given = sign_transaction_given_signatures(&tx, &alice, &[offline], &generation_hash())
            .unwrap();
        let inline = tx
            .sign_transaction_with_cosigners(&alice, &[&bob], &generation_hash())
            .unwrap();
        assert_eq!(given, inline);
    }

    #[test]
    fn given_signatures_must_match_hash() {
        let alice = Account::generate(NetworkType::MijinTest);
        let bob = Account::generate(NetworkType::MijinTest);
        let stray = cosign_aggregate_hash(&"AB".repeat(32), &bob).unwrap();
        let err = sign_transaction_given_signatures(
            &aggregate(&alice, &bob),
            &alice,
            &[stray],
            &generation_hash(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Validation(ValidationError::Invalid { field: "parent_hash", .. })
        ));
    }

    #[test]
    fn cosign_received_aggregate_needs_hash() {
        let alice = Account::generate(NetworkType::MijinTest);
        let bob = Account::generate(NetworkType::MijinTest);
        let tx = aggregate(&alice, &bob);
        assert!(matches!(
            cosign_aggregate(&tx, &bob).unwrap_err(),
            TransactionError::Validation(ValidationError::MissingField("info.hash"))
        ));

        let hash = "CD".repeat(32);
        let announced = tx.with_info(TransactionInfo {
            hash: Some(hash.clone()),
            ..Default::default()
        });
        let cosignature = cosign_aggregate(&announced, &bob).unwrap();
        assert_eq!(cosignature.parent_hash, hash);
        assert_eq!(Cosignature::from(&cosignature).signer, cosignature.signer_public_key);
    }

    #[test]
    fn bad_hash_rejected() {
        let bob = Account::generate(NetworkType::MijinTest);
        assert!(cosign_aggregate_hash("abcd", &bob).is_err());
        assert!(cosign_aggregate_hash("not hex", &bob).is_err());
    }
}
