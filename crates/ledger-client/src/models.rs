use serde::Serialize;

/// Confirmed on-chain totals for an address, in satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AddressBalance {
    /// Confirmed funded minus confirmed spent.
    pub balance_sat: u64,
    pub tx_count: u64,
    pub total_received_sat: u64,
    pub total_sent_sat: u64,
}

impl AddressBalance {
    pub fn has_funds(&self) -> bool {
        self.balance_sat > 0
    }

    /// Whether the address was ever used, even if now empty.
    pub fn has_history(&self) -> bool {
        self.tx_count > 0
    }
}

/// An unspent output as reported by a ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerUtxo {
    pub txid: String,
    pub vout: u32,
    pub value_sat: u64,
    pub confirmed: bool,
}

/// Recommended fee rates in sat/byte, rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeEstimates {
    /// About a day (144 blocks).
    pub slow: u64,
    /// About an hour (6 blocks).
    pub normal: u64,
    /// About half an hour (3 blocks).
    pub fast: u64,
    /// Next block.
    pub fastest: u64,
}

impl Default for FeeEstimates {
    /// Used when no service can provide estimates.
    fn default() -> Self {
        Self {
            slow: 1,
            normal: 10,
            fast: 20,
            fastest: 50,
        }
    }
}

/// Round a fractional rate up to a whole sat/byte, never below 1.
pub(crate) fn ceil_rate(rate: f64) -> u64 {
    if rate.is_finite() && rate > 1.0 {
        rate.ceil() as u64
    } else {
        1
    }
}
