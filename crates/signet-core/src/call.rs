//! Registry calls and the signed envelope that authenticates them.
//!
//! A caller is whoever holds the key for an [`Identity`]. A [`SignedCall`]
//! binds the caller, a per-caller nonce, the attached payment and the call
//! itself under one Ed25519 signature over the canonical encoding.

use serde::{Deserialize, Serialize};

use crate::canonical::{call_id, decode_signed_call, encode_signed_call, signing_bytes};
use crate::content::Registration;
use crate::crypto::{Blake3Hash, Identity, Keypair, Signature};
use crate::error::CoreError;
use crate::record::CreationType;
use crate::types::{Amount, ContentId};

/// A mutating registry operation as submitted by an external caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Call {
    /// Fee-gated registration; the fee travels as the envelope's value.
    Register(Registration),
    /// Registration without a fee.
    RegisterBatch {
        content_id: ContentId,
        content_locator: String,
        creation_type: CreationType,
    },
    Vouch {
        content_id: ContentId,
    },
    UpdateCreationType {
        content_id: ContentId,
        creation_type: CreationType,
    },
    SetFeeCollector {
        collector: Identity,
    },
    SetRegistrationFee {
        fee: Amount,
    },
    SetVouchThreshold {
        threshold: u64,
    },
    TransferAdmin {
        admin: Identity,
    },
}

impl Call {
    /// Wire code identifying the operation.
    pub fn op_code(&self) -> u8 {
        match self {
            Self::Register(_) => 1,
            Self::RegisterBatch { .. } => 2,
            Self::Vouch { .. } => 3,
            Self::UpdateCreationType { .. } => 4,
            Self::SetFeeCollector { .. } => 5,
            Self::SetRegistrationFee { .. } => 6,
            Self::SetVouchThreshold { .. } => 7,
            Self::TransferAdmin { .. } => 8,
        }
    }

    /// Operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::RegisterBatch { .. } => "register_batch",
            Self::Vouch { .. } => "vouch",
            Self::UpdateCreationType { .. } => "update_creation_type",
            Self::SetFeeCollector { .. } => "set_fee_collector",
            Self::SetRegistrationFee { .. } => "set_registration_fee",
            Self::SetVouchThreshold { .. } => "set_vouch_threshold",
            Self::TransferAdmin { .. } => "transfer_admin",
        }
    }

    /// The content this call targets, if any.
    pub fn content_id(&self) -> Option<&ContentId> {
        match self {
            Self::Register(r) => Some(&r.content_id),
            Self::RegisterBatch { content_id, .. }
            | Self::Vouch { content_id }
            | Self::UpdateCreationType { content_id, .. } => Some(content_id),
            _ => None,
        }
    }
}

/// A call authenticated by its caller's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    pub caller: Identity,
    /// Must exceed every nonce previously accepted from this caller.
    pub nonce: u64,
    /// Payment the caller authorizes. Only `Register` may carry one.
    pub value: Amount,
    pub call: Call,
    pub signature: Signature,
}

impl SignedCall {
    /// Sign a call with no payment attached.
    pub fn sign(keypair: &Keypair, nonce: u64, call: Call) -> Self {
        Self::sign_paying(keypair, nonce, call, Amount::ZERO)
    }

    /// Sign a call together with the payment it carries.
    pub fn sign_paying(keypair: &Keypair, nonce: u64, call: Call, value: Amount) -> Self {
        let caller = keypair.identity();
        let message = signing_bytes(&caller, nonce, value, &call);
        Self {
            caller,
            nonce,
            value,
            call,
            signature: keypair.sign(&message),
        }
    }

    /// Check the signature against the caller identity.
    pub fn verify(&self) -> Result<(), CoreError> {
        let message = signing_bytes(&self.caller, self.nonce, self.value, &self.call);
        self.caller.verify(&message, &self.signature)
    }

    /// Content-addressed id of the signed call (for logs and dedup).
    pub fn id(&self) -> Blake3Hash {
        call_id(self)
    }

    /// Canonical wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_signed_call(self)
    }

    /// Decode from the canonical wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_signed_call(bytes)
    }
}
