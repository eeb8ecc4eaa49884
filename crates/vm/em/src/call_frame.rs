use bytes::Bytes;
use ovmrex_common::{Address, H256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::environment::OvmConfig;

/// Every operation the execution manager exposes, named after its
/// `ovm*` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "ovmCALL")]
    Call,
    #[serde(rename = "ovmSTATICCALL")]
    StaticCall,
    #[serde(rename = "ovmDELEGATECALL")]
    DelegateCall,
    #[serde(rename = "ovmCREATE")]
    Create,
    #[serde(rename = "ovmCREATE2")]
    Create2,
    #[serde(rename = "ovmSLOAD")]
    Sload,
    #[serde(rename = "ovmSSTORE")]
    Sstore,
    #[serde(rename = "ovmREVERT")]
    Revert,
    #[serde(rename = "ovmCALLER")]
    Caller,
    #[serde(rename = "ovmADDRESS")]
    Address,
    #[serde(rename = "ovmCHAINID")]
    ChainId,
    #[serde(rename = "ovmTIMESTAMP")]
    Timestamp,
    #[serde(rename = "ovmNUMBER")]
    Number,
    #[serde(rename = "ovmGASLIMIT")]
    GasLimit,
    #[serde(rename = "ovmGETNONCE")]
    GetNonce,
    #[serde(rename = "ovmEXTCODEHASH")]
    ExtCodeHash,
}

impl OperationKind {
    pub const ALL: [OperationKind; 16] = [
        Self::Call,
        Self::StaticCall,
        Self::DelegateCall,
        Self::Create,
        Self::Create2,
        Self::Sload,
        Self::Sstore,
        Self::Revert,
        Self::Caller,
        Self::Address,
        Self::ChainId,
        Self::Timestamp,
        Self::Number,
        Self::GasLimit,
        Self::GetNonce,
        Self::ExtCodeHash,
    ];

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Call => "ovmCALL",
            Self::StaticCall => "ovmSTATICCALL",
            Self::DelegateCall => "ovmDELEGATECALL",
            Self::Create => "ovmCREATE",
            Self::Create2 => "ovmCREATE2",
            Self::Sload => "ovmSLOAD",
            Self::Sstore => "ovmSSTORE",
            Self::Revert => "ovmREVERT",
            Self::Caller => "ovmCALLER",
            Self::Address => "ovmADDRESS",
            Self::ChainId => "ovmCHAINID",
            Self::Timestamp => "ovmTIMESTAMP",
            Self::Number => "ovmNUMBER",
            Self::GasLimit => "ovmGASLIMIT",
            Self::GetNonce => "ovmGETNONCE",
            Self::ExtCodeHash => "ovmEXTCODEHASH",
        }
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.function_name() == name)
    }

    /// Only the call and create families run sub-steps.
    pub fn accepts_sub_steps(&self) -> bool {
        matches!(
            self,
            Self::Call | Self::StaticCall | Self::DelegateCall | Self::Create | Self::Create2
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallParams {
    /// Caps the nuisance gas allowance handed to the callee.
    pub gas_limit: u64,
    pub target: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    pub bytecode: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Create2Params {
    pub salt: H256,
    pub bytecode: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Call(CallParams),
    StaticCall(CallParams),
    DelegateCall(CallParams),
    Create(CreateParams),
    Create2(Create2Params),
    Sload { key: H256 },
    Sstore { key: H256, value: H256 },
    Revert { revert_data: Bytes },
    Caller,
    Address,
    ChainId,
    Timestamp,
    Number,
    GasLimit,
    GetNonce,
    ExtCodeHash { address: Address },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Call(_) => OperationKind::Call,
            Operation::StaticCall(_) => OperationKind::StaticCall,
            Operation::DelegateCall(_) => OperationKind::DelegateCall,
            Operation::Create(_) => OperationKind::Create,
            Operation::Create2(_) => OperationKind::Create2,
            Operation::Sload { .. } => OperationKind::Sload,
            Operation::Sstore { .. } => OperationKind::Sstore,
            Operation::Revert { .. } => OperationKind::Revert,
            Operation::Caller => OperationKind::Caller,
            Operation::Address => OperationKind::Address,
            Operation::ChainId => OperationKind::ChainId,
            Operation::Timestamp => OperationKind::Timestamp,
            Operation::Number => OperationKind::Number,
            Operation::GasLimit => OperationKind::GasLimit,
            Operation::GetNonce => OperationKind::GetNonce,
            Operation::ExtCodeHash { .. } => OperationKind::ExtCodeHash,
        }
    }

    /// Nuisance gas cap for the frame, `None` when the frame shares its
    /// parent's allowance.
    pub fn nuisance_gas_limit(&self) -> Option<u64> {
        match self {
            Operation::Call(params)
            | Operation::StaticCall(params)
            | Operation::DelegateCall(params) => Some(params.gas_limit),
            _ => None,
        }
    }
}

/// Expected result of a frame. Only the checker reads it; the engine ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub status: bool,
    pub value: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    pub operation: Operation,
    pub sub_steps: Vec<CallFrame>,
    pub expected: Option<Expectation>,
}

impl CallFrame {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            sub_steps: Vec::new(),
            expected: None,
        }
    }

    pub fn with_sub_steps(mut self, sub_steps: Vec<CallFrame>) -> Self {
        self.sub_steps = sub_steps;
        self
    }

    pub fn expecting(mut self, status: bool, value: Option<Bytes>) -> Self {
        self.expected = Some(Expectation { status, value });
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub caller: Address,
    /// OVM address whose storage and nonce the frame operates on.
    pub address: Address,
    /// Linked eth address of the account whose code is executing.
    pub code_address: Address,
    pub is_static: bool,
}

impl ExecutionContext {
    pub fn root(config: &OvmConfig) -> Self {
        Self {
            caller: Address::zero(),
            address: config.entrypoint,
            code_address: config.entrypoint,
            is_static: false,
        }
    }
}
