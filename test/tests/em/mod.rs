mod test_utils;

mod call_tests;
mod create_tests;
mod nuisance_gas_tests;
mod storage_tests;
mod verification_tests;
