use bytes::Bytes;
use ovmrex_common::{
    Address, H256,
    utils::{
        address_to_word, calculate_create_address, calculate_create2_address, keccak,
        storage_xor, u64_to_word,
    },
};
use tracing::trace;

use crate::{
    call_frame::{CallFrame, CallParams, ExecutionContext, Operation},
    errors::{RevertReason, VMError},
    state_store::OvmAccount,
    vm::{Dispatch, Engine, FrameBody, FrameExit, FrameOutput},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallScheme {
    Call,
    StaticCall,
    DelegateCall,
}

fn word(value: H256) -> Bytes {
    Bytes::copy_from_slice(value.as_bytes())
}

/// Unwraps a semantic check or turns it into a reverting frame.
macro_rules! revert_on_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(reason) => return Ok(Dispatch::Finished(FrameOutput::revert(reason))),
        }
    };
}

impl<'a> Engine<'a> {
    /// Runs the handler of `frame`. Frames of the call and create families
    /// hand back a [`FrameBody`] so the engine can run their sub-steps.
    pub fn dispatch(
        &mut self,
        frame: &CallFrame,
        context: &ExecutionContext,
    ) -> Result<Dispatch, VMError> {
        let output = match &frame.operation {
            Operation::Call(params) => return self.handle_call(context, params, CallScheme::Call),
            Operation::StaticCall(params) => {
                return self.handle_call(context, params, CallScheme::StaticCall);
            }
            Operation::DelegateCall(params) => {
                return self.handle_call(context, params, CallScheme::DelegateCall);
            }
            Operation::Create(params) => return self.handle_create(context, None, &params.bytecode),
            Operation::Create2(params) => {
                return self.handle_create(context, Some(params.salt), &params.bytecode);
            }
            Operation::Sload { key } => self.handle_sload(context, *key),
            Operation::Sstore { key, value } => self.handle_sstore(context, *key, *value),
            Operation::Revert { revert_data } => FrameOutput::revert_with_value(
                RevertReason::IntentionalRevert,
                revert_data.clone(),
            ),
            Operation::Caller => FrameOutput::success(word(address_to_word(context.caller))),
            Operation::Address => FrameOutput::success(word(address_to_word(context.address))),
            Operation::ChainId => {
                FrameOutput::success(word(u64_to_word(self.config.chain.chain_id)))
            }
            Operation::Timestamp => FrameOutput::success(word(u64_to_word(
                self.config.global_context.timestamp,
            ))),
            Operation::Number => FrameOutput::success(word(u64_to_word(
                self.config.global_context.block_number,
            ))),
            Operation::GasLimit => FrameOutput::success(word(u64_to_word(
                self.config.global_context.gas_limit,
            ))),
            Operation::GetNonce => self.handle_get_nonce(context),
            Operation::ExtCodeHash { address } => self.handle_ext_code_hash(*address),
        };
        Ok(Dispatch::Finished(output))
    }

    // ================== Call family =====================

    fn handle_call(
        &mut self,
        context: &ExecutionContext,
        params: &CallParams,
        scheme: CallScheme,
    ) -> Result<Dispatch, VMError> {
        let target = revert_on_err!(
            self.db
                .get_account(params.target)
                .copied()
                .map_err(|_| RevertReason::MissingAccount(params.target))
        );
        revert_on_err!(self.charge_account_load(params.target));

        let child_context = match scheme {
            CallScheme::Call => ExecutionContext {
                caller: context.address,
                address: params.target,
                code_address: target.eth_address,
                is_static: context.is_static,
            },
            CallScheme::StaticCall => ExecutionContext {
                caller: context.address,
                address: params.target,
                code_address: target.eth_address,
                is_static: true,
            },
            CallScheme::DelegateCall => ExecutionContext {
                caller: context.caller,
                address: context.address,
                code_address: target.eth_address,
                is_static: context.is_static,
            },
        };
        Ok(Dispatch::Run(FrameBody::new(child_context, Bytes::new())))
    }

    // ================== Create family =====================

    fn handle_create(
        &mut self,
        context: &ExecutionContext,
        salt: Option<H256>,
        bytecode: &Bytes,
    ) -> Result<Dispatch, VMError> {
        if context.is_static {
            return Ok(Dispatch::Finished(FrameOutput::revert(
                RevertReason::StaticContextViolation,
            )));
        }
        let creator = context.address;
        let nonce = revert_on_err!(
            self.db
                .increment_nonce(creator)
                .map_err(|_| RevertReason::MissingAccount(creator))
        );
        let address = match salt {
            None => calculate_create_address(creator, nonce),
            Some(salt) => calculate_create2_address(creator, salt, bytecode),
        };

        // The nonce bump belongs to the creator and survives a failed deployment.
        let deploy_checkpoint = self.db.checkpoint();
        match self.deploy(creator, address, bytecode)? {
            Dispatch::Finished(mut output) => {
                if matches!(output.exit, FrameExit::Revert { .. }) {
                    self.db.revert_to(deploy_checkpoint)?;
                    output.state_restored = true;
                }
                Ok(Dispatch::Finished(output))
            }
            Dispatch::Run(body) => Ok(Dispatch::Run(body.rolling_back_to(deploy_checkpoint))),
        }
    }

    fn deploy(
        &mut self,
        creator: Address,
        address: Address,
        bytecode: &Bytes,
    ) -> Result<Dispatch, VMError> {
        if self.db.has_account(address) {
            return Ok(Dispatch::Finished(FrameOutput::revert(
                RevertReason::CreateCollision(address),
            )));
        }
        let cost = self.config.nuisance_gas.contract_cost(bytecode.len());
        revert_on_err!(self.charge_nuisance_gas(cost));
        self.message_record.touch_account(address);
        self.message_record.touch_account_change(address);

        let code_hash = keccak(bytecode);
        self.db.put_account(
            address,
            OvmAccount {
                code_hash,
                eth_address: address,
                nonce: 0,
            },
        );
        self.db.put_code(code_hash, bytecode.clone());
        trace!(?creator, ?address, "Deployed contract");

        let init_context = ExecutionContext {
            caller: creator,
            address,
            code_address: address,
            is_static: false,
        };
        Ok(Dispatch::Run(FrameBody::new(
            init_context,
            word(address_to_word(address)),
        )))
    }

    // ================== Storage =====================

    fn handle_sload(&mut self, context: &ExecutionContext, key: H256) -> FrameOutput {
        let address = context.address;
        if !self.db.has_account(address) {
            return FrameOutput::revert(RevertReason::MissingAccount(address));
        }
        match self.db.get_storage(address, key) {
            Some(slot) if slot.verified => FrameOutput::success(word(storage_xor(slot.value))),
            _ => FrameOutput::revert(RevertReason::UnverifiedStorage { address, key }),
        }
    }

    fn handle_sstore(&mut self, context: &ExecutionContext, key: H256, value: H256) -> FrameOutput {
        if context.is_static {
            return FrameOutput::revert(RevertReason::StaticContextViolation);
        }
        let address = context.address;
        if !self.db.has_account(address) {
            return FrameOutput::revert(RevertReason::MissingAccount(address));
        }

        if !self.message_record.is_slot_touched(address, key) {
            if let Err(reason) = self.charge_nuisance_gas(self.config.nuisance_gas.sstore) {
                return FrameOutput::revert(reason);
            }
            self.message_record.touch_slot(address, key);
        }
        if !self.message_record.is_account_changed(address) {
            if let Err(reason) = self.charge_nuisance_gas(self.config.nuisance_gas.min_per_contract)
            {
                return FrameOutput::revert(reason);
            }
            self.message_record.touch_account_change(address);
        }

        self.db.put_storage(address, key, storage_xor(value), true);
        FrameOutput::success(Bytes::new())
    }

    // ================== Account getters =====================

    fn handle_get_nonce(&mut self, context: &ExecutionContext) -> FrameOutput {
        match self.db.get_account(context.address) {
            Ok(account) => FrameOutput::success(word(u64_to_word(account.nonce))),
            Err(_) => FrameOutput::revert(RevertReason::MissingAccount(context.address)),
        }
    }

    fn handle_ext_code_hash(&mut self, address: Address) -> FrameOutput {
        let code_hash = match self.db.get_account(address) {
            Ok(account) => account.code_hash,
            Err(_) => return FrameOutput::success(word(H256::zero())),
        };
        if let Err(reason) = self.charge_account_load(address) {
            return FrameOutput::revert(reason);
        }
        FrameOutput::success(word(code_hash))
    }

    /// First load of an account in the message costs the contract charge.
    fn charge_account_load(&mut self, address: Address) -> Result<(), RevertReason> {
        if self.message_record.is_account_touched(address) {
            return Ok(());
        }
        let cost = self
            .config
            .nuisance_gas
            .contract_cost(self.db.code_len(address));
        self.charge_nuisance_gas(cost)?;
        self.message_record.touch_account(address);
        Ok(())
    }
}
