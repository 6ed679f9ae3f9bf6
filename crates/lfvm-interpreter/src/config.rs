//! Interpreter configuration

use crate::gas::cost;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol revision selecting the gas schedule and rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// EIP-2200 net-metered storage, flat access costs
    Istanbul,
    /// EIP-2929 warm/cold access lists
    Berlin,
    /// EIP-3529 reduced refunds, EIP-3541 code prefix check
    London,
    /// PUSH0, EIP-3860 init-code limit, warm coinbase
    Shanghai,
}

impl Revision {
    /// Whether access lists decide between warm and cold costs
    pub fn has_access_lists(self) -> bool {
        self >= Revision::Berlin
    }

    /// Whether SELFDESTRUCT still earns a refund
    pub fn has_selfdestruct_refund(self) -> bool {
        self < Revision::London
    }

    /// Whether deployed code starting with 0xEF is rejected
    pub fn rejects_ef_code(self) -> bool {
        self >= Revision::London
    }

    /// Whether PUSH0 exists and init code is limited and metered
    pub fn is_shanghai(self) -> bool {
        self >= Revision::Shanghai
    }
}

impl Default for Revision {
    fn default() -> Self {
        Revision::London
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Revision::Istanbul => "istanbul",
            Revision::Berlin => "berlin",
            Revision::London => "london",
            Revision::Shanghai => "shanghai",
        };
        f.write_str(name)
    }
}

impl FromStr for Revision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "istanbul" => Ok(Revision::Istanbul),
            "berlin" => Ok(Revision::Berlin),
            "london" => Ok(Revision::London),
            "shanghai" => Ok(Revision::Shanghai),
            other => Err(format!("unknown revision '{}'", other)),
        }
    }
}

/// Tunables for one [`Evm`](crate::Evm) instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Protocol revision
    pub revision: Revision,
    /// Replace common opcode sequences by super-instructions
    pub fusion: bool,
    /// Keep 1/64 of the available gas in the caller on CALL* and CREATE*.
    ///
    /// Independent of `revision`: every supported revision postdates
    /// EIP-150, so [`Config::with_revision`] leaves it on for all of them.
    /// Turning it off forwards the requested gas unreduced.
    pub all_but_one_64th: bool,
    /// Maximum nesting of call frames
    pub max_call_depth: usize,
    /// Maximum size of deployed code
    pub max_code_size: usize,
    /// Maximum size of init code (Shanghai+)
    pub max_initcode_size: usize,
    /// Hand KECCAK256 inputs to the ledger as preimages
    pub record_preimages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            revision: Revision::default(),
            fusion: true,
            all_but_one_64th: true,
            max_call_depth: cost::MAX_CALL_DEPTH,
            max_code_size: cost::MAX_CODE_SIZE,
            max_initcode_size: cost::MAX_INIT_CODE_SIZE,
            record_preimages: false,
        }
    }
}

impl Config {
    /// Default configuration for `revision`
    pub fn with_revision(revision: Revision) -> Self {
        Self {
            revision,
            ..Self::default()
        }
    }
}
