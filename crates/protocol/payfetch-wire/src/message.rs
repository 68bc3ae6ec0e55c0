//! The protocol message envelope.
//!
//! Every message carries a `dealId` and a `status`. New-deal requests add
//! `cid` and `params`; delivery responses add `blocks`; payment messages add
//! `paymentChannel` and `paymentVoucher`. Absent fields are omitted from the
//! encoded JSON.

use payfetch_types::{Cid, DealId, DealProposal, DealStatus, PaymentVoucher, MAX_MESSAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};

/// One chunk of content bytes inside a delivery response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Raw chunk bytes
    pub data: Vec<u8>,
}

impl Block {
    /// Wrap chunk bytes in a block.
    pub fn new(data: Vec<u8>) -> Self {
        Block { data }
    }

    /// Size of the chunk in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A protocol message.
///
/// The `status` determines which optional fields are meaningful; the
/// provider validates their presence when handling each status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealMessage {
    /// Deal this message belongs to
    pub deal_id: DealId,

    /// Message status, driving the deal state machine
    pub status: DealStatus,

    /// Requested content id (new-deal requests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<Cid>,

    /// Proposed deal terms (new-deal requests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<DealProposal>,

    /// Ordered content chunks (delivery responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,

    /// Payment channel address (payment messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_channel: Option<String>,

    /// Payment voucher, opaque to the provider core (payment messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_voucher: Option<PaymentVoucher>,
}

impl DealMessage {
    fn bare(deal_id: DealId, status: DealStatus) -> Self {
        Self {
            deal_id,
            status,
            cid: None,
            params: None,
            blocks: None,
            payment_channel: None,
            payment_voucher: None,
        }
    }

    /// A new-deal request (requester side).
    pub fn proposal(deal_id: DealId, cid: Cid, params: DealProposal) -> Self {
        Self {
            cid: Some(cid),
            params: Some(params),
            ..Self::bare(deal_id, DealStatus::AwaitingAcceptance)
        }
    }

    /// Terms accepted, waiting for the payment channel.
    pub fn accepted(deal_id: DealId) -> Self {
        Self::bare(deal_id, DealStatus::Accepted)
    }

    /// Payment channel funded and ready (requester side).
    pub fn payment_channel_ready(deal_id: DealId, payment_channel: impl Into<String>) -> Self {
        Self {
            payment_channel: Some(payment_channel.into()),
            ..Self::bare(deal_id, DealStatus::PaymentChannelReady)
        }
    }

    /// A payment voucher for the previous increment (requester side).
    pub fn payment(
        deal_id: DealId,
        payment_channel: impl Into<String>,
        voucher: PaymentVoucher,
    ) -> Self {
        Self {
            payment_channel: Some(payment_channel.into()),
            payment_voucher: Some(voucher),
            ..Self::bare(deal_id, DealStatus::PaymentSent)
        }
    }

    /// The final payment voucher (requester side).
    pub fn last_payment(
        deal_id: DealId,
        payment_channel: impl Into<String>,
        voucher: PaymentVoucher,
    ) -> Self {
        Self {
            payment_channel: Some(payment_channel.into()),
            payment_voucher: Some(voucher),
            ..Self::bare(deal_id, DealStatus::LastPaymentSent)
        }
    }

    /// A delivery response requiring the next payment.
    pub fn funds_needed(deal_id: DealId, blocks: Vec<Block>) -> Self {
        Self {
            blocks: Some(blocks),
            ..Self::bare(deal_id, DealStatus::FundsNeeded)
        }
    }

    /// The final delivery response, requiring the last payment.
    pub fn funds_needed_last_payment(deal_id: DealId, blocks: Vec<Block>) -> Self {
        Self {
            blocks: Some(blocks),
            ..Self::bare(deal_id, DealStatus::FundsNeededLastPayment)
        }
    }

    /// Deal completed; the pipe closes after this message.
    pub fn completed(deal_id: DealId) -> Self {
        Self::bare(deal_id, DealStatus::Completed)
    }

    /// Total bytes carried in this message's blocks.
    pub fn block_bytes(&self) -> u64 {
        self.blocks
            .as_deref()
            .map(|blocks| blocks.iter().map(Block::size).sum())
            .unwrap_or(0)
    }
}

/// Encode a message as one JSON line (without the trailing newline).
pub fn encode_message(msg: &DealMessage) -> Result<Vec<u8>, EncodeError> {
    let buf = serde_json::to_vec(msg)?;
    if buf.len() > MAX_MESSAGE_SIZE as usize {
        return Err(EncodeError::MessageTooLarge {
            size: buf.len(),
            max: MAX_MESSAGE_SIZE as usize,
        });
    }
    Ok(buf)
}

/// Decode a message from one JSON line.
pub fn decode_message(bytes: &[u8]) -> Result<DealMessage, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}
