//! Address matching for per-address transaction streams.

use crate::identity::{Address, PublicAccount};
use crate::transaction::{ModificationType, Transaction, TransactionBody};

/// Whether `address` is involved in `tx`.
///
/// Matches the signer, a transfer's recipient (aliases never match), an
/// added multisig cosignatory, an aggregate cosigner, or any of the above
/// inside an inner transaction. Inner transactions are searched at most
/// `max_depth` levels down.
pub fn transaction_from_address(tx: &Transaction, address: &Address, max_depth: usize) -> bool {
    if tx
        .signer
        .as_ref()
        .is_some_and(|signer| signer.address() == *address)
    {
        return true;
    }

    match &tx.body {
        TransactionBody::Transfer(body) => body.recipient.as_address() == Some(address),
        TransactionBody::AccountLink(_) => false,
        TransactionBody::MultisigModification(body) => body.modifications.iter().any(|m| {
            m.modification_type == ModificationType::Add && m.cosignatory.address() == *address
        }),
        TransactionBody::Aggregate(body) => {
            let cosigned = body.cosignatures.iter().any(|c| {
                PublicAccount::new(c.signer, tx.network_type).address() == *address
            });
            cosigned
                || (max_depth > 0
                    && body
                        .inner_transactions
                        .iter()
                        .any(|inner| transaction_from_address(inner, address, max_depth - 1)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Account, NetworkType};
    use crate::transaction::{
        AggregateBody, AggregateKind, AggregateTransactionBuilder, Cosignature,
        CosignatoryModification, Deadline, MultisigModificationTransactionBuilder,
        TransferTransactionBuilder,
    };
    use crate::config::MAX_MATCH_DEPTH;

    const NET: NetworkType = NetworkType::MijinTest;

    fn transfer_to(recipient: Address) -> Transaction {
        TransferTransactionBuilder::new(NET)
            .recipient(recipient)
            .deadline(Deadline::from_raw(1))
            .build()
            .unwrap()
    }

    #[test]
    fn signer_and_recipient_match() {
        let alice = Account::generate(NET);
        let bob = Account::generate(NET);
        let carol = Account::generate(NET);
        let tx = transfer_to(bob.address()).to_aggregate(&alice.public_account());

        assert!(transaction_from_address(&tx, &alice.address(), 0));
        assert!(transaction_from_address(&tx, &bob.address(), 0));
        assert!(!transaction_from_address(&tx, &carol.address(), 0));
    }

    #[test]
    fn only_added_cosignatories_match() {
        let alice = Account::generate(NET);
        let bob = Account::generate(NET);
        let tx = MultisigModificationTransactionBuilder::new(NET)
            .min_approval_delta(1)
            .min_removal_delta(1)
            .modification(CosignatoryModification::add(alice.public_account()))
            .modification(CosignatoryModification::remove(bob.public_account()))
            .build()
            .unwrap();

        assert!(transaction_from_address(&tx, &alice.address(), 0));
        assert!(!transaction_from_address(&tx, &bob.address(), 0));
    }

    #[test]
    fn aggregate_cosigners_and_inner_transactions_match() {
        let alice = Account::generate(NET);
        let bob = Account::generate(NET);
        let carol = Account::generate(NET);
        let aggregate = AggregateTransactionBuilder::bonded(NET)
            .inner_transactions(vec![
                transfer_to(carol.address()).to_aggregate(&alice.public_account())
            ])
            .cosignatures(vec![Cosignature {
                signer: bob.public_account().public_key,
                signature: bob.key_pair().sign(b"anything"),
            }])
            .build()
            .unwrap();

        assert!(transaction_from_address(&aggregate, &bob.address(), 0));
        assert!(transaction_from_address(&aggregate, &carol.address(), 1));
        assert!(!transaction_from_address(&aggregate, &carol.address(), 0));
    }

    #[test]
    fn nested_search_stops_at_max_depth() {
        let alice = Account::generate(NET);
        let target = Account::generate(NET);
        let mut tx = transfer_to(target.address()).to_aggregate(&alice.public_account());
        tx.signer = None;

        // Builders refuse nested aggregates, so assemble the nesting by hand.
        for _ in 0..MAX_MATCH_DEPTH + 1 {
            let mut wrapper = AggregateTransactionBuilder::complete(NET)
                .inner_transactions(Vec::new())
                .build()
                .unwrap();
            wrapper.body = TransactionBody::Aggregate(AggregateBody {
                aggregate_kind: AggregateKind::Complete,
                inner_transactions: vec![tx],
                cosignatures: Vec::new(),
            });
            tx = wrapper;
        }

        assert!(!transaction_from_address(&tx, &target.address(), MAX_MATCH_DEPTH));
        assert!(transaction_from_address(&tx, &target.address(), MAX_MATCH_DEPTH + 1));
    }
}
