use ovmrex_common::H256;
use ovmrex_em::{
    call_frame::{CallFrame, CallParams, Create2Params, CreateParams, Operation, OperationKind},
    environment::OvmConfig,
    message_record::MessageRecord,
    state_store::{OvmAccount, StateStore},
    vm::Engine,
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::modules::{
    deserialize::expected_return_value,
    error::FixtureError,
    placeholders::AliasTable,
    report::{ParameterReport, ParameterResult, TestReport},
    result_check::check_outcome,
    types::{
        CallStepParams, Create2StepParams, CreateStepParams, ExecutionManagerSeed,
        ExtCodeHashStepParams, RawTest, RevertStepParams, SloadStepParams, SstoreStepParams,
        StateManagerSeed, TestDefinition, TestStep,
    },
};

/// A parameter set with its steps already built.
#[derive(Debug, Clone)]
pub struct PreparedParameter {
    pub name: String,
    pub skip: bool,
    pub steps: Vec<CallFrame>,
}

/// Everything needed to run a definition, derived once and shared by its
/// parameter sets.
#[derive(Debug, Clone)]
pub struct PreparedTest {
    pub name: String,
    pub config: OvmConfig,
    pub nuisance_gas: u64,
    pub pre_state: StateStore,
    pub parameters: Vec<PreparedParameter>,
}

pub fn run_tests(tests: &[RawTest], aliases: &AliasTable, config: &OvmConfig) -> Vec<TestReport> {
    tests
        .par_iter()
        .map(|test| run_test(test, aliases, config))
        .collect()
}

/// Runs every parameter set of `test` on its own copy of the pre-state.
pub fn run_test(test: &RawTest, aliases: &AliasTable, config: &OvmConfig) -> TestReport {
    let prepared = match prepare_test(&test.definition, aliases, config) {
        Ok(prepared) => prepared,
        Err(error) => {
            warn!(test = %test.name, %error, "Fixture error");
            return TestReport {
                name: test.name.clone(),
                path: test.path.clone(),
                fixture_error: Some(error.to_string()),
                parameters: Vec::new(),
            };
        }
    };

    let parameters: Vec<ParameterReport> = prepared
        .parameters
        .par_iter()
        .map(|parameter| ParameterReport {
            name: parameter.name.clone(),
            result: run_parameter(&prepared, parameter),
        })
        .collect();

    let report = TestReport {
        name: prepared.name,
        path: test.path.clone(),
        fixture_error: None,
        parameters,
    };
    info!(test = %report.name, passed = report.passed(), "Finished test");
    report
}

pub fn run_parameter(test: &PreparedTest, parameter: &PreparedParameter) -> ParameterResult {
    if parameter.skip {
        return ParameterResult::Skipped;
    }
    let mut store = test.pre_state.clone();
    for (index, frame) in parameter.steps.iter().enumerate() {
        let record = MessageRecord::new(test.nuisance_gas);
        let outcome = match Engine::new(&test.config, &mut store, record).execute(frame) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(test = %test.name, parameter = %parameter.name, %error, "Execution aborted");
                return ParameterResult::Errored(error.to_string());
            }
        };
        if let Err(mismatch) = check_outcome(frame, &outcome, index, None) {
            debug!(test = %test.name, parameter = %parameter.name, %mismatch, "Mismatch");
            return ParameterResult::Failed(mismatch);
        }
    }
    ParameterResult::Passed
}

/// Resolves placeholders, builds the pre-state and every step tree.
pub fn prepare_test(
    definition: &Value,
    aliases: &AliasTable,
    base_config: &OvmConfig,
) -> Result<PreparedTest, FixtureError> {
    let resolved = aliases.resolve(definition.clone())?;
    let definition: TestDefinition = serde_json::from_value(resolved)
        .map_err(|err| FixtureError::MalformedDefinition(err.to_string()))?;

    let execution_manager = &definition.pre_state.execution_manager;
    let config = engine_config(base_config, execution_manager);
    let nuisance_gas = execution_manager
        .message_record
        .as_ref()
        .and_then(|record| record.nuisance_gas_left)
        .unwrap_or(config.default_nuisance_gas);
    let pre_state = materialize_state(&definition.pre_state.state_manager)?;

    let parameters = definition
        .parameters
        .iter()
        .enumerate()
        .map(|(parameter_index, parameter)| {
            // Skipped sets may use functions the engine does not model.
            let steps = if parameter.skip {
                Vec::new()
            } else {
                parameter
                    .steps
                    .iter()
                    .enumerate()
                    .map(|(step_index, step)| {
                        build_frame(
                            step,
                            &format!("$.parameters[{parameter_index}].steps[{step_index}]"),
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };
            Ok(PreparedParameter {
                name: parameter.name.clone(),
                skip: parameter.skip,
                steps,
            })
        })
        .collect::<Result<Vec<_>, FixtureError>>()?;

    Ok(PreparedTest {
        name: definition.name,
        config,
        nuisance_gas,
        pre_state,
        parameters,
    })
}

/// Applies the definition's global and transaction context to `base`.
pub fn engine_config(base: &OvmConfig, seed: &ExecutionManagerSeed) -> OvmConfig {
    let mut config = base.clone();
    if let Some(chain_id) = seed
        .global_context
        .as_ref()
        .and_then(|context| context.ovm_chain_id)
    {
        config.chain.chain_id = chain_id;
    }
    if let Some(context) = &seed.transaction_context {
        if let Some(timestamp) = context.ovm_timestamp {
            config.global_context.timestamp = timestamp;
        }
        if let Some(number) = context.ovm_number {
            config.global_context.block_number = number;
        }
        if let Some(gas_limit) = context.ovm_gas_limit {
            config.global_context.gas_limit = gas_limit;
        }
    }
    config
}

/// Builds the committed pre-state of a definition.
pub fn materialize_state(seed: &StateManagerSeed) -> Result<StateStore, FixtureError> {
    let mut store = StateStore::default();
    for (address, account) in &seed.accounts {
        store.put_account(
            *address,
            OvmAccount {
                code_hash: account.code_hash,
                eth_address: account.eth_address,
                nonce: account.nonce,
            },
        );
    }

    for (address, slots) in &seed.contract_storage {
        if !store.has_account(*address) {
            return Err(FixtureError::StorageWithoutAccount(*address));
        }
        for (key, value) in slots {
            let verified = seed
                .verified_contract_storage
                .get(address)
                .and_then(|verified| verified.get(key))
                .copied()
                .unwrap_or(false);
            store.put_storage(*address, *key, *value, verified);
        }
    }

    for (address, slots) in &seed.verified_contract_storage {
        if !store.has_account(*address) {
            return Err(FixtureError::StorageWithoutAccount(*address));
        }
        for (key, verified) in slots {
            // A slot verified without a seeded value holds the raw zero word.
            if *verified && store.get_storage(*address, *key).is_none() {
                store.put_storage(*address, *key, H256::zero(), true);
            }
        }
    }

    store.commit();
    Ok(store)
}

fn parse_params<T: DeserializeOwned>(
    function: OperationKind,
    step: &TestStep,
    path: &str,
) -> Result<T, FixtureError> {
    serde_json::from_value(step.function_params.clone()).map_err(|err| {
        FixtureError::InvalidParams {
            function,
            path: path.to_string(),
            reason: err.to_string(),
        }
    })
}

fn expect_no_params(function: OperationKind, step: &TestStep, path: &str) -> Result<(), FixtureError> {
    match &step.function_params {
        Value::Null => Ok(()),
        Value::Object(params) if params.is_empty() => Ok(()),
        _ => Err(FixtureError::InvalidParams {
            function,
            path: path.to_string(),
            reason: "takes no parameters".to_string(),
        }),
    }
}

fn call_params(params: &CallStepParams) -> CallParams {
    CallParams {
        gas_limit: params.gas_limit,
        target: params.target,
    }
}

/// Builds the frame tree of a step. `path` locates the step in the definition.
pub fn build_frame(step: &TestStep, path: &str) -> Result<CallFrame, FixtureError> {
    let kind = OperationKind::from_function_name(&step.function_name).ok_or_else(|| {
        FixtureError::UnknownFunction {
            name: step.function_name.clone(),
            path: path.to_string(),
        }
    })?;
    if !kind.accepts_sub_steps() && step.function_params.get("subSteps").is_some() {
        return Err(FixtureError::UnexpectedSubSteps {
            function: kind,
            path: path.to_string(),
        });
    }

    let (operation, sub_steps) = match kind {
        OperationKind::Call => {
            let params: CallStepParams = parse_params(kind, step, path)?;
            (Operation::Call(call_params(&params)), params.sub_steps)
        }
        OperationKind::StaticCall => {
            let params: CallStepParams = parse_params(kind, step, path)?;
            (Operation::StaticCall(call_params(&params)), params.sub_steps)
        }
        OperationKind::DelegateCall => {
            let params: CallStepParams = parse_params(kind, step, path)?;
            (Operation::DelegateCall(call_params(&params)), params.sub_steps)
        }
        OperationKind::Create => {
            let params: CreateStepParams = parse_params(kind, step, path)?;
            (
                Operation::Create(CreateParams {
                    bytecode: params.bytecode,
                }),
                params.sub_steps,
            )
        }
        OperationKind::Create2 => {
            let params: Create2StepParams = parse_params(kind, step, path)?;
            (
                Operation::Create2(Create2Params {
                    salt: params.salt,
                    bytecode: params.bytecode,
                }),
                params.sub_steps,
            )
        }
        OperationKind::Sload => {
            let params: SloadStepParams = parse_params(kind, step, path)?;
            (Operation::Sload { key: params.key }, Vec::new())
        }
        OperationKind::Sstore => {
            let params: SstoreStepParams = parse_params(kind, step, path)?;
            (
                Operation::Sstore {
                    key: params.key,
                    value: params.value,
                },
                Vec::new(),
            )
        }
        OperationKind::Revert => {
            let params: RevertStepParams = parse_params(kind, step, path)?;
            (
                Operation::Revert {
                    revert_data: params.revert_data,
                },
                Vec::new(),
            )
        }
        OperationKind::ExtCodeHash => {
            let params: ExtCodeHashStepParams = parse_params(kind, step, path)?;
            (
                Operation::ExtCodeHash {
                    address: params.address,
                },
                Vec::new(),
            )
        }
        OperationKind::Caller
        | OperationKind::Address
        | OperationKind::ChainId
        | OperationKind::Timestamp
        | OperationKind::Number
        | OperationKind::GasLimit
        | OperationKind::GetNonce => {
            expect_no_params(kind, step, path)?;
            let operation = match kind {
                OperationKind::Caller => Operation::Caller,
                OperationKind::Address => Operation::Address,
                OperationKind::ChainId => Operation::ChainId,
                OperationKind::Timestamp => Operation::Timestamp,
                OperationKind::Number => Operation::Number,
                OperationKind::GasLimit => Operation::GasLimit,
                _ => Operation::GetNonce,
            };
            (operation, Vec::new())
        }
    };

    let sub_steps = sub_steps
        .iter()
        .enumerate()
        .map(|(index, sub_step)| {
            build_frame(sub_step, &format!("{path}.functionParams.subSteps[{index}]"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let expected_value = step
        .expected_return_value
        .as_ref()
        .map(|value| {
            expected_return_value(value).map_err(|reason| FixtureError::InvalidExpectedValue {
                path: path.to_string(),
                reason,
            })
        })
        .transpose()?;

    Ok(CallFrame::new(operation)
        .with_sub_steps(sub_steps)
        .expecting(step.expected_return_status, expected_value))
}
