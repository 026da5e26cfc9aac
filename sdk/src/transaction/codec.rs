//! Binary wire codec.
//!
//! Everything is little-endian at fixed offsets:
//!
//! ```text
//! offset  width  field
//!      0      4  size (whole payload, bytes)
//!      4     64  signature          (zero until signed)
//!     68     32  signer public key  (zero until signed)
//!    100      2  version            (low byte version, high byte network)
//!    102      2  type code
//!    104      8  max fee
//!    112      8  deadline
//!    120      …  body
//! ```
//!
//! Inner transactions of an aggregate use a 40-byte embedded header (size,
//! signer, version, type) and are zero-padded to 8 bytes. Their size field
//! excludes the padding; the aggregate's payload size includes it.
//!
//! Decoding is strict. Size fields must match, padding must be zero, and
//! trailing bytes are an error. Every failure names the field it hit.

use bytes::{Buf, BufMut};
use std::ops::Range;
use tracing::trace;

use super::builder::{
    AccountLinkBody, AggregateBody, MultisigModificationBody, Transaction, TransactionBody,
    TransferBody,
};
use super::error::CodecError;
use super::types::{
    AggregateKind, Cosignature, CosignatoryModification, Deadline, LinkAction, Message,
    ModificationType, Mosaic, MosaicId, TransactionType,
};
use crate::config::{
    ADDRESS_DECODED_LENGTH, AGGREGATE_ALIGNMENT, COSIGNATURE_SIZE, EMBEDDED_HEADER_SIZE,
    MAX_MESSAGE_PAYLOAD, MAX_U8_COUNT, PUBLIC_KEY_LENGTH, SIGNABLE_OFFSET, SIGNATURE_LENGTH,
    TRANSACTION_HEADER_SIZE,
};
use crate::crypto::{PublicKey, Signature};
use crate::identity::{NetworkType, PublicAccount, UnresolvedAddress};

/// Offset of an aggregate's payload-size field.
const AGGREGATE_PAYLOAD_SIZE_OFFSET: usize = TRANSACTION_HEADER_SIZE;

/// First byte after an aggregate's payload-size field.
const AGGREGATE_PAYLOAD_OFFSET: usize = AGGREGATE_PAYLOAD_SIZE_OFFSET + 4;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize a top-level transaction. Missing signer or signature encode as
/// zeros.
pub fn encode(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let body = encode_body(tx)?;
    let size = TRANSACTION_HEADER_SIZE + body.len();
    let size_field = u32::try_from(size).map_err(|_| CodecError::Overflow {
        field: "size",
        len: size,
        max: u32::MAX as usize,
    })?;

    let mut buf = Vec::with_capacity(size);
    buf.put_u32_le(size_field);
    match &tx.signature {
        Some(signature) => buf.put_slice(signature.as_bytes()),
        None => buf.put_bytes(0, SIGNATURE_LENGTH),
    }
    match &tx.signer {
        Some(signer) => buf.put_slice(signer.public_key.as_bytes()),
        None => buf.put_bytes(0, PUBLIC_KEY_LENGTH),
    }
    buf.put_u16_le(version_field(tx));
    buf.put_u16_le(tx.transaction_type().code());
    buf.put_u64_le(tx.max_fee);
    buf.put_u64_le(tx.deadline.raw());
    buf.put_slice(&body);
    Ok(buf)
}

/// Serialize an inner transaction in embedded form. The signer is required.
pub fn encode_embedded(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    if tx.transaction_type().is_aggregate() {
        return Err(CodecError::NestedAggregate { offset: 0 });
    }
    let signer = tx.signer.ok_or(CodecError::MissingEmbeddedSigner)?;
    let body = encode_body(tx)?;
    let size = EMBEDDED_HEADER_SIZE + body.len();

    let mut buf = Vec::with_capacity(size);
    buf.put_u32_le(size as u32);
    buf.put_slice(signer.public_key.as_bytes());
    buf.put_u16_le(version_field(tx));
    buf.put_u16_le(tx.transaction_type().code());
    buf.put_slice(&body);
    Ok(buf)
}

fn version_field(tx: &Transaction) -> u16 {
    (u16::from(tx.network_type.identifier()) << 8) | u16::from(tx.version)
}

fn padding_for(len: usize) -> usize {
    (AGGREGATE_ALIGNMENT - len % AGGREGATE_ALIGNMENT) % AGGREGATE_ALIGNMENT
}

fn check_count(field: &'static str, len: usize, max: usize) -> Result<(), CodecError> {
    if len > max {
        return Err(CodecError::Overflow { field, len, max });
    }
    Ok(())
}

fn encode_body(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    let mut buf: Vec<u8> = Vec::new();
    match &tx.body {
        TransactionBody::Transfer(body) => {
            let payload = body.message.payload();
            check_count("mosaics", body.mosaics.len(), MAX_U8_COUNT)?;
            check_count("message", payload.len(), MAX_MESSAGE_PAYLOAD)?;

            buf.put_slice(&body.recipient.to_bytes());
            buf.put_u16_le((payload.len() + 1) as u16);
            buf.put_u8(body.mosaics.len() as u8);
            buf.put_u8(body.message.message_type());
            buf.put_slice(payload);
            for mosaic in &body.mosaics {
                buf.put_u64_le(mosaic.id.0);
                buf.put_u64_le(mosaic.amount);
            }
        }
        TransactionBody::AccountLink(body) => {
            buf.put_slice(body.remote_public_key.as_bytes());
            buf.put_u8(body.action.code());
        }
        TransactionBody::MultisigModification(body) => {
            check_count("modifications", body.modifications.len(), MAX_U8_COUNT)?;

            buf.put_i8(body.min_removal_delta);
            buf.put_i8(body.min_approval_delta);
            buf.put_u8(body.modifications.len() as u8);
            for modification in &body.modifications {
                buf.put_u8(modification.modification_type.code());
                buf.put_slice(modification.cosignatory.public_key.as_bytes());
            }
        }
        TransactionBody::Aggregate(body) => {
            let mut transactions: Vec<u8> = Vec::new();
            for inner in &body.inner_transactions {
                let offset = AGGREGATE_PAYLOAD_OFFSET + transactions.len();
                if inner.transaction_type().is_aggregate() {
                    return Err(CodecError::NestedAggregate { offset });
                }
                let embedded = encode_embedded(inner)?;
                let padding = padding_for(embedded.len());
                transactions.put_slice(&embedded);
                transactions.put_bytes(0, padding);
            }
            let payload_size =
                u32::try_from(transactions.len()).map_err(|_| CodecError::Overflow {
                    field: "payload_size",
                    len: transactions.len(),
                    max: u32::MAX as usize,
                })?;

            buf.put_u32_le(payload_size);
            buf.put_slice(&transactions);
            for cosignature in &body.cosignatures {
                buf.put_slice(cosignature.signer.as_bytes());
                buf.put_slice(cosignature.signature.as_bytes());
            }
        }
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Cursor over a payload that knows its absolute offset, so errors can say
/// where they happened.
struct Reader<'a> {
    buf: &'a [u8],
    len: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8], base: usize) -> Self {
        Self {
            buf,
            len: buf.len(),
            base,
        }
    }

    fn offset(&self) -> usize {
        self.base + self.len - self.buf.remaining()
    }

    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, field: &'static str, needed: usize) -> Result<(), CodecError> {
        if self.buf.remaining() < needed {
            return Err(CodecError::Truncated {
                field,
                offset: self.offset(),
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        self.ensure(field, 1)?;
        Ok(self.buf.get_u8())
    }

    fn i8(&mut self, field: &'static str) -> Result<i8, CodecError> {
        self.ensure(field, 1)?;
        Ok(self.buf.get_i8())
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        self.ensure(field, 2)?;
        Ok(self.buf.get_u16_le())
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        self.ensure(field, 4)?;
        Ok(self.buf.get_u32_le())
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, CodecError> {
        self.ensure(field, 8)?;
        Ok(self.buf.get_u64_le())
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        self.ensure(field, N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], CodecError> {
        self.ensure(field, n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn peek_u32(&self, field: &'static str) -> Result<u32, CodecError> {
        self.ensure(field, 4)?;
        let mut peek = self.buf;
        Ok(peek.get_u32_le())
    }

    fn finish(&self, field: &'static str) -> Result<(), CodecError> {
        if self.buf.has_remaining() {
            return Err(CodecError::TrailingBytes {
                field,
                offset: self.offset(),
                count: self.buf.remaining(),
            });
        }
        Ok(())
    }
}

/// Parse a top-level transaction.
pub fn decode(bytes: &[u8]) -> Result<Transaction, CodecError> {
    let mut r = Reader::new(bytes, 0);
    let size = r.u32("size")? as usize;
    if size != bytes.len() {
        return Err(CodecError::SizeMismatch {
            field: "size",
            declared: size,
            actual: bytes.len(),
        });
    }
    let signature = r.array::<SIGNATURE_LENGTH>("signature")?;
    let signer = r.array::<PUBLIC_KEY_LENGTH>("signer")?;
    let (network_type, version, transaction_type) = read_version_and_type(&mut r)?;
    let max_fee = r.u64("max_fee")?;
    let deadline = r.u64("deadline")?;
    let body = decode_body(&mut r, transaction_type, network_type)?;
    r.finish("body")?;

    trace!(%transaction_type, size, "decoded transaction");

    let signed = signature.iter().chain(signer.iter()).any(|b| *b != 0);
    Ok(Transaction {
        network_type,
        version,
        max_fee,
        deadline: Deadline::from_raw(deadline),
        signer: signed.then(|| PublicAccount::new(PublicKey::from_bytes(signer), network_type)),
        signature: signed.then(|| Signature::from_bytes(signature)),
        info: None,
        body,
    })
}

/// Parse an embedded inner transaction (no padding).
pub fn decode_embedded(bytes: &[u8]) -> Result<Transaction, CodecError> {
    decode_embedded_at(bytes, 0)
}

/// Parse a hex payload such as [`super::SignedTransaction::payload`].
pub fn decode_hex(payload: &str) -> Result<Transaction, CodecError> {
    let bytes = hex::decode(payload).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
    decode(&bytes)
}

fn decode_embedded_at(bytes: &[u8], base: usize) -> Result<Transaction, CodecError> {
    let mut r = Reader::new(bytes, base);
    let size = r.u32("embedded_size")? as usize;
    if size != bytes.len() {
        return Err(CodecError::SizeMismatch {
            field: "embedded_size",
            declared: size,
            actual: bytes.len(),
        });
    }
    let signer = r.array::<PUBLIC_KEY_LENGTH>("embedded_signer")?;
    let type_offset = r.offset() + 2;
    let (network_type, version, transaction_type) = read_version_and_type(&mut r)?;
    if transaction_type.is_aggregate() {
        return Err(CodecError::NestedAggregate {
            offset: type_offset,
        });
    }
    let body = decode_body(&mut r, transaction_type, network_type)?;
    r.finish("embedded_body")?;

    Ok(Transaction {
        network_type,
        version,
        max_fee: 0,
        deadline: Deadline::from_raw(0),
        signer: Some(PublicAccount::new(
            PublicKey::from_bytes(signer),
            network_type,
        )),
        signature: None,
        info: None,
        body,
    })
}

fn read_version_and_type(
    r: &mut Reader<'_>,
) -> Result<(NetworkType, u8, TransactionType), CodecError> {
    let version_offset = r.offset();
    let raw = r.u16("version")?;
    let network_type =
        NetworkType::from_identifier((raw >> 8) as u8).map_err(|e| CodecError::InvalidField {
            field: "version",
            offset: version_offset,
            reason: e.to_string(),
        })?;
    let version = (raw & 0xFF) as u8;

    let offset = r.offset();
    let code = r.u16("type")?;
    let transaction_type =
        TransactionType::from_code(code).ok_or(CodecError::UnsupportedType { code, offset })?;
    if version != transaction_type.current_version() {
        return Err(CodecError::InvalidField {
            field: "version",
            offset: version_offset,
            reason: format!("unsupported {transaction_type} version {version}"),
        });
    }
    Ok((network_type, version, transaction_type))
}

fn decode_body(
    r: &mut Reader<'_>,
    transaction_type: TransactionType,
    network_type: NetworkType,
) -> Result<TransactionBody, CodecError> {
    let body = match transaction_type {
        TransactionType::Transfer => TransactionBody::Transfer(decode_transfer(r)?),
        TransactionType::AccountLink => {
            let remote_public_key = PublicKey::from_bytes(r.array("remote_public_key")?);
            let offset = r.offset();
            let code = r.u8("link_action")?;
            let action = LinkAction::from_code(code).ok_or_else(|| CodecError::InvalidField {
                field: "link_action",
                offset,
                reason: format!("unknown action {code}"),
            })?;
            TransactionBody::AccountLink(AccountLinkBody {
                remote_public_key,
                action,
            })
        }
        TransactionType::MultisigModification => {
            let min_removal_delta = r.i8("min_removal_delta")?;
            let min_approval_delta = r.i8("min_approval_delta")?;
            let count = r.u8("modification_count")?;
            let mut modifications = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let offset = r.offset();
                let code = r.u8("modification_type")?;
                let modification_type =
                    ModificationType::from_code(code).ok_or_else(|| CodecError::InvalidField {
                        field: "modification_type",
                        offset,
                        reason: format!("unknown modification {code}"),
                    })?;
                let key = PublicKey::from_bytes(r.array("cosignatory_public_key")?);
                modifications.push(CosignatoryModification {
                    modification_type,
                    cosignatory: PublicAccount::new(key, network_type),
                });
            }
            TransactionBody::MultisigModification(MultisigModificationBody {
                min_approval_delta,
                min_removal_delta,
                modifications,
            })
        }
        TransactionType::AggregateComplete => {
            TransactionBody::Aggregate(decode_aggregate(r, AggregateKind::Complete)?)
        }
        TransactionType::AggregateBonded => {
            TransactionBody::Aggregate(decode_aggregate(r, AggregateKind::Bonded)?)
        }
    };
    Ok(body)
}

fn decode_transfer(r: &mut Reader<'_>) -> Result<TransferBody, CodecError> {
    let offset = r.offset();
    let recipient = UnresolvedAddress::from_bytes(r.array::<ADDRESS_DECODED_LENGTH>("recipient")?)
        .map_err(|source| CodecError::InvalidAddress {
            field: "recipient",
            offset,
            source,
        })?;

    let offset = r.offset();
    let message_size = usize::from(r.u16("message_size")?);
    if message_size == 0 {
        return Err(CodecError::InvalidField {
            field: "message_size",
            offset,
            reason: "must cover at least the message type byte".into(),
        });
    }
    let mosaic_count = r.u8("mosaic_count")?;
    let message_type = r.u8("message_type")?;
    let payload = r.take("message", message_size - 1)?.to_vec();

    let mut mosaics = Vec::with_capacity(usize::from(mosaic_count));
    for _ in 0..mosaic_count {
        let id = r.u64("mosaic_id")?;
        let amount = r.u64("mosaic_amount")?;
        mosaics.push(Mosaic::new(MosaicId(id), amount));
    }

    Ok(TransferBody {
        recipient,
        mosaics,
        message: Message::from_parts(message_type, payload),
    })
}

fn decode_aggregate(
    r: &mut Reader<'_>,
    aggregate_kind: AggregateKind,
) -> Result<AggregateBody, CodecError> {
    let payload_size = r.u32("payload_size")? as usize;
    let payload_offset = r.offset();
    let payload = r.take("transactions", payload_size)?;

    let mut inner = Reader::new(payload, payload_offset);
    let mut inner_transactions = Vec::new();
    while inner.remaining() > 0 {
        let offset = inner.offset();
        let size = inner.peek_u32("embedded_size")? as usize;
        if size < EMBEDDED_HEADER_SIZE {
            return Err(CodecError::InvalidField {
                field: "embedded_size",
                offset,
                reason: format!("{size} is smaller than the embedded header"),
            });
        }
        let embedded = inner.take("embedded_transaction", size)?;
        inner_transactions.push(decode_embedded_at(embedded, offset)?);

        let offset = inner.offset();
        let padding = inner.take("embedded_padding", padding_for(size))?;
        if padding.iter().any(|b| *b != 0) {
            return Err(CodecError::InvalidField {
                field: "embedded_padding",
                offset,
                reason: "padding bytes must be zero".into(),
            });
        }
    }

    let offset = r.offset();
    if r.remaining() % COSIGNATURE_SIZE != 0 {
        return Err(CodecError::InvalidField {
            field: "cosignatures",
            offset,
            reason: format!(
                "{} bytes is not a whole number of cosignatures",
                r.remaining()
            ),
        });
    }
    let mut cosignatures = Vec::with_capacity(r.remaining() / COSIGNATURE_SIZE);
    while r.remaining() > 0 {
        let signer = PublicKey::from_bytes(r.array("cosignature_signer")?);
        let signature = Signature::from_bytes(r.array("cosignature_signature")?);
        cosignatures.push(Cosignature { signer, signature });
    }

    Ok(AggregateBody {
        aggregate_kind,
        inner_transactions,
        cosignatures,
    })
}

// ---------------------------------------------------------------------------
// Signing support
// ---------------------------------------------------------------------------

/// Byte range of `payload` covered by the signature and hash: from the
/// version field up to (not including) any appended aggregate cosignatures.
pub fn signable_range(payload: &[u8]) -> Result<Range<usize>, CodecError> {
    let mut r = Reader::new(payload, 0);
    let size = r.u32("size")? as usize;
    if size != payload.len() {
        return Err(CodecError::SizeMismatch {
            field: "size",
            declared: size,
            actual: payload.len(),
        });
    }
    r.take("signature", SIGNATURE_LENGTH)?;
    r.take("signer", PUBLIC_KEY_LENGTH)?;
    r.u16("version")?;
    let offset = r.offset();
    let code = r.u16("type")?;
    let transaction_type =
        TransactionType::from_code(code).ok_or(CodecError::UnsupportedType { code, offset })?;
    r.u64("max_fee")?;
    r.u64("deadline")?;

    if !transaction_type.is_aggregate() {
        return Ok(SIGNABLE_OFFSET..payload.len());
    }
    let payload_size = r.u32("payload_size")? as usize;
    r.take("transactions", payload_size)?;
    Ok(SIGNABLE_OFFSET..AGGREGATE_PAYLOAD_OFFSET + payload_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Address;
    use crate::transaction::builder::{
        AccountLinkTransactionBuilder, AggregateTransactionBuilder,
        MultisigModificationTransactionBuilder, TransferTransactionBuilder,
    };

    const RECIPIENT: &str = "SDUP5PLHDXKBX3UU5Q52LAY4WYEKGEWC6IB3VBFM";
    const UNSIGNED_TRANSFER: &str = concat!(
        "a5000000",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0190544100000000000000000100000000000000",
        "90e8febd671dd41bee94ec3ba5831cb608a312c2f203ba84ac",
        "01000100672b0000ce5600006400000000000000",
    );
    const EMBEDDED_TRANSFER: &str = concat!(
        "55000000",
        "9a49366406aca952b88badf5f1e9be6ce4968141035a60be503273ea65456b24",
        "01905441",
        "90e8febd671dd41bee94ec3ba5831cb608a312c2f203ba84ac",
        "01000100672b0000ce5600006400000000000000",
    );
    const MULTISIG: &str = concat!(
        "bd000000",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "0190554100000000000000000100000000000000",
        "010202",
        "0068b3fbb18729c1fde225c57f8ce080fa828f0067e451a3fd81fa628842b0b763",
        "00cf893ffcc47c33e7f68ab1db56365c156b0736824a0c1e273f9e00b8df8f01eb",
    );

    fn transfer() -> Transaction {
        TransferTransactionBuilder::new(NetworkType::MijinTest)
            .recipient(Address::from_raw(RECIPIENT).unwrap())
            .mosaic(Mosaic::new(MosaicId(95_442_763_262_823), 100))
            .deadline(Deadline::from_raw(1))
            .build()
            .unwrap()
    }

    fn embedded_signer() -> PublicAccount {
        PublicAccount::from_hex(
            "9A49366406ACA952B88BADF5F1E9BE6CE4968141035A60BE503273EA65456B24",
            NetworkType::MijinTest,
        )
        .unwrap()
    }

    fn aggregate(cosignatures: Vec<Cosignature>) -> Transaction {
        let inner = transfer().to_aggregate(&embedded_signer());
        let link = AccountLinkTransactionBuilder::new(NetworkType::MijinTest)
            .remote_public_key(PublicKey::from_bytes([9; 32]))
            .action(LinkAction::Unlink)
            .build()
            .unwrap()
            .to_aggregate(&embedded_signer());
        AggregateTransactionBuilder::bonded(NetworkType::MijinTest)
            .inner_transactions(vec![inner, link])
            .cosignatures(cosignatures)
            .deadline(Deadline::from_raw(7))
            .max_fee(25)
            .build()
            .unwrap()
    }

    #[test]
    fn transfer_matches_golden_bytes() {
        let bytes = encode(&transfer()).unwrap();
        assert_eq!(hex::encode(&bytes), UNSIGNED_TRANSFER);
        assert_eq!(bytes.len(), 0xa5);
    }

    #[test]
    fn embedded_transfer_matches_golden_bytes() {
        let inner = transfer().to_aggregate(&embedded_signer());
        assert_eq!(hex::encode(encode_embedded(&inner).unwrap()), EMBEDDED_TRANSFER);
    }

    #[test]
    fn multisig_matches_golden_bytes() {
        let add = |hex: &str| {
            CosignatoryModification::add(
                PublicAccount::from_hex(hex, NetworkType::MijinTest).unwrap(),
            )
        };
        let tx = MultisigModificationTransactionBuilder::new(NetworkType::MijinTest)
            .min_approval_delta(2)
            .min_removal_delta(1)
            .modification(add(
                "68b3fbb18729c1fde225c57f8ce080fa828f0067e451a3fd81fa628842b0b763",
            ))
            .modification(add(
                "cf893ffcc47c33e7f68ab1db56365c156b0736824a0c1e273f9e00b8df8f01eb",
            ))
            .deadline(Deadline::from_raw(1))
            .build()
            .unwrap();
        assert_eq!(hex::encode(encode(&tx).unwrap()), MULTISIG);
    }

    #[test]
    fn golden_payloads_decode_and_reencode() {
        for golden in [UNSIGNED_TRANSFER, MULTISIG] {
            let bytes = hex::decode(golden).unwrap();
            let tx = decode(&bytes).unwrap();
            assert!(tx.signer.is_none() && tx.signature.is_none());
            assert_eq!(encode(&tx).unwrap(), bytes);
        }
        let embedded = hex::decode(EMBEDDED_TRANSFER).unwrap();
        let inner = decode_embedded(&embedded).unwrap();
        assert_eq!(inner.signer, Some(embedded_signer()));
        assert_eq!(encode_embedded(&inner).unwrap(), embedded);
    }

    #[test]
    fn decoded_transfer_fields() {
        let tx = decode_hex(UNSIGNED_TRANSFER).unwrap();
        assert_eq!(tx.network_type, NetworkType::MijinTest);
        assert_eq!(tx.version, 1);
        assert_eq!(tx.deadline.raw(), 1);
        match tx.body {
            TransactionBody::Transfer(body) => {
                assert_eq!(body.recipient.as_address().unwrap().plain(), RECIPIENT);
                assert_eq!(body.mosaics, vec![Mosaic::new(MosaicId(95_442_763_262_823), 100)]);
                assert_eq!(body.message, Message::empty());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn aggregate_layout_and_roundtrip() {
        let cosignature = Cosignature {
            signer: PublicKey::from_bytes([5; 32]),
            signature: Signature::from_bytes([6; 64]),
        };
        let tx = aggregate(vec![cosignature]);
        let bytes = encode(&tx).unwrap();

        // Transfer embeds as 85 bytes (+3 padding), account link as 73 (+7).
        let payload_size = u32::from_le_bytes(bytes[120..124].try_into().unwrap()) as usize;
        assert_eq!(payload_size, 88 + 80);
        assert_eq!(&bytes[124..128], &85u32.to_le_bytes());
        assert_eq!(&bytes[124 + 85..124 + 88], &[0, 0, 0]);
        assert_eq!(bytes.len(), 124 + payload_size + COSIGNATURE_SIZE);
        assert_eq!(&bytes[102..104], &0x4241u16.to_le_bytes());

        assert_eq!(decode(&bytes).unwrap(), tx);
        assert_eq!(signable_range(&bytes).unwrap(), 100..124 + payload_size);
    }

    #[test]
    fn empty_aggregate_still_encodes_payload_size() {
        let tx = AggregateTransactionBuilder::complete(NetworkType::MijinTest)
            .inner_transactions(Vec::new())
            .deadline(Deadline::from_raw(1))
            .build()
            .unwrap();
        let bytes = encode(&tx).unwrap();
        assert_eq!(bytes.len(), 124);
        assert_eq!(&bytes[120..124], &[0, 0, 0, 0]);
        assert_eq!(decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn encoding_is_deterministic() {
        let tx = aggregate(Vec::new());
        assert_eq!(encode(&tx).unwrap(), encode(&tx).unwrap());
    }

    #[test]
    fn size_mismatch_rejected() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes.push(0);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::SizeMismatch {
                field: "size",
                declared: 0xa5,
                actual: 0xa6
            }
        );
    }

    #[test]
    fn trailing_bytes_rejected_even_with_matching_size() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes.push(0);
        bytes[0] = 0xa6;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::TrailingBytes { field: "body", offset: 0xa5, count: 1 }
        ));
    }

    #[test]
    fn truncation_names_field_and_offset() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes.truncate(0xa5 - 4);
        bytes[0] = 0xa1;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::Truncated { field: "mosaic_amount", offset: 0x9d, needed: 8, available: 4 }
        ));
    }

    #[test]
    fn unknown_type_rejected() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes[102] = 0x4E;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::UnsupportedType { code: 0x414E, offset: 102 }
        ));
    }

    #[test]
    fn unknown_network_rejected() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes[101] = 0x42;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidField { field: "version", offset: 100, .. }
        ));
    }

    #[test]
    fn unsupported_version_rejected() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes[100] = 9;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidField { field: "version", offset: 100, .. }
        ));

        let mut embedded = hex::decode(EMBEDDED_TRANSFER).unwrap();
        embedded[36] = 2;
        assert!(matches!(
            decode_embedded(&embedded).unwrap_err(),
            CodecError::InvalidField { field: "version", offset: 36, .. }
        ));
    }

    #[test]
    fn bad_recipient_checksum_rejected() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes[120 + 24] ^= 0xFF;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidAddress { field: "recipient", offset: 120, .. }
        ));
    }

    #[test]
    fn zero_message_size_rejected() {
        let mut bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        bytes[145] = 0;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidField { field: "message_size", offset: 145, .. }
        ));
    }

    #[test]
    fn non_zero_padding_rejected() {
        let mut bytes = encode(&aggregate(Vec::new())).unwrap();
        bytes[124 + 86] = 1;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidField { field: "embedded_padding", offset: 209, .. }
        ));
    }

    #[test]
    fn partial_cosignature_rejected() {
        let mut bytes = encode(&aggregate(Vec::new())).unwrap();
        bytes.extend_from_slice(&[0; 10]);
        let len = bytes.len() as u32;
        bytes[..4].copy_from_slice(&len.to_le_bytes());
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidField { field: "cosignatures", .. }
        ));
    }

    #[test]
    fn nested_aggregate_rejected_on_decode() {
        // Splice an aggregate type code into the first embedded header.
        let mut bytes = encode(&aggregate(Vec::new())).unwrap();
        bytes[124 + 38..124 + 40].copy_from_slice(&0x4141u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::NestedAggregate { offset: 162 }
        ));
    }

    #[test]
    fn embedded_encode_requires_signer() {
        assert_eq!(
            encode_embedded(&transfer()).unwrap_err(),
            CodecError::MissingEmbeddedSigner
        );
    }

    #[test]
    fn alias_recipient_roundtrip() {
        let tx = TransferTransactionBuilder::new(NetworkType::MijinTest)
            .recipient(UnresolvedAddress::Alias {
                network_type: NetworkType::MijinTest,
                namespace_id: 0x85BB_EA6C_C462_B244,
            })
            .message(Message::plain("hello"))
            .deadline(Deadline::from_raw(1))
            .build()
            .unwrap();
        let bytes = encode(&tx).unwrap();
        assert_eq!(bytes[120], 0x91);
        assert_eq!(decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn signable_range_of_plain_transaction_is_everything_after_signer() {
        let bytes = hex::decode(UNSIGNED_TRANSFER).unwrap();
        assert_eq!(signable_range(&bytes).unwrap(), 100..0xa5);
    }
}
