//! Transaction request bodies for the claim and the two sweep transfers

use super::sweep::TransferPlan;
use super::types::Asset;
use alloy::{
    primitives::Address,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use common::interfaces::{claimable::IClaimable, erc20::IERC20};

/// IClaimable::claim() from the managed address
pub fn claim_request(holder: Address, claim_contract: Address) -> TransactionRequest {
    let call = IClaimable::claimCall {};

    TransactionRequest::default()
        .from(holder)
        .to(claim_contract)
        .input(call.abi_encode().into())
}

/// Transfer described by `plan`, sent from the managed address
pub fn transfer_request(holder: Address, plan: &TransferPlan) -> TransactionRequest {
    match plan.asset {
        Asset::Native => {
            let tx = TransactionRequest::default()
                .from(holder)
                .to(plan.recipient)
                .value(plan.amount);

            match plan.gas_limit {
                Some(gas) => tx.gas_limit(gas),
                None => tx,
            }
        }
        Asset::Token(token) => {
            let call = IERC20::transferCall {
                to: plan.recipient,
                value: plan.amount,
            };

            TransactionRequest::default()
                .from(holder)
                .to(token)
                .input(call.abi_encode().into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onchain::FeeOffer;
    use alloy::primitives::{TxKind, U256};

    const HOLDER: Address = Address::new([0x11; 20]);
    const RECIPIENT: Address = Address::new([0x22; 20]);
    const TOKEN: Address = Address::new([0x33; 20]);

    fn make_plan(asset: Asset, amount: u64, gas_limit: Option<u64>) -> TransferPlan {
        TransferPlan {
            asset,
            recipient: RECIPIENT,
            amount: U256::from(amount),
            fee_offer: FeeOffer::Flat { gas_price: 1 },
            gas_limit,
        }
    }

    #[test]
    fn test_claim_request_targets_contract() {
        let contract = Address::new([0x44; 20]);
        let tx = claim_request(HOLDER, contract);

        assert_eq!(tx.from, Some(HOLDER));
        assert_eq!(tx.to, Some(TxKind::Call(contract)));
        assert_eq!(
            tx.input.input().map(|b| b.to_vec()),
            Some(IClaimable::claimCall::SELECTOR.to_vec())
        );
        assert_eq!(tx.value, None);
    }

    #[test]
    fn test_native_transfer_carries_value_and_gas() {
        let tx = transfer_request(HOLDER, &make_plan(Asset::Native, 1_000, Some(21_000)));

        assert_eq!(tx.to, Some(TxKind::Call(RECIPIENT)));
        assert_eq!(tx.value, Some(U256::from(1_000u64)));
        assert_eq!(tx.gas, Some(21_000));
    }

    #[test]
    fn test_token_transfer_encodes_call() {
        let tx = transfer_request(HOLDER, &make_plan(Asset::Token(TOKEN), 500, None));

        assert_eq!(tx.to, Some(TxKind::Call(TOKEN)));
        assert_eq!(tx.value, None);

        let input = tx.input.input().expect("calldata set");
        let decoded = IERC20::transferCall::abi_decode(input).unwrap();
        assert_eq!(decoded.to, RECIPIENT);
        assert_eq!(decoded.value, U256::from(500u64));
    }
}
