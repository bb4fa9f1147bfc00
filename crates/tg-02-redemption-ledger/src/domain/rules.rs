//! # Record Transitions
//!
//! The only two mutations a record may undergo. Stores apply them under
//! their per-key write exclusion.

use crate::domain::entities::ConditionalWrite;
use shared_types::{OwnerRef, TicketRedemptionRecord, Timestamp};

/// `is_used: false → true`, stamping `used_at`. Never reverses.
pub fn mark_used(record: &mut TicketRedemptionRecord, used_at: Timestamp) -> ConditionalWrite {
    if record.is_used {
        return ConditionalWrite::Rejected(record.clone());
    }
    record.is_used = true;
    record.used_at = Some(used_at);
    ConditionalWrite::Applied(record.clone())
}

/// Changes the holder of an unredeemed ticket.
pub fn change_owner(record: &mut TicketRedemptionRecord, owner: OwnerRef) -> ConditionalWrite {
    if record.is_used {
        return ConditionalWrite::Rejected(record.clone());
    }
    record.owner_ref = Some(owner);
    ConditionalWrite::Applied(record.clone())
}
