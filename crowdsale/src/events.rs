//! Events recorded by the sale coordinator

use crate::stage::CrowdsaleStage;
use jovi_token::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleEvent {
    TokensPurchased {
        purchaser: Address,
        beneficiary: Address,
        value: u128,
        amount: u128,
    },
    StageChanged {
        from: CrowdsaleStage,
        to: CrowdsaleStage,
        rate: u128,
    },
    Finalized {
        goal_reached: bool,
        raised: u128,
    },
    Refunded {
        refundee: Address,
        amount: u128,
    },
    AdminTransferred {
        previous: Address,
        new: Address,
    },
}
