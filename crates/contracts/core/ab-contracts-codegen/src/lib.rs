//! Dispatch trampoline generation for annotated contracts.
//!
//! For every operation discovered by the ABI generator a trampoline is emitted that reads call
//! payload from the host, deserializes arguments, constructs the contract, invokes the method and
//! publishes its return value. Trampolines are collected into a single formatted compilation unit
//! that is compiled alongside the contract.
//!
//! Generated code expects a runtime module (see [`CodegenOptions::runtime_path`]) with host
//! bindings (`action_data_size`, `read_action_data`, `get_call_data`, `set_action_return_value`,
//! `set_call_return_value`, `eosio_assert_code`), serialization (`DataStream`, `Read`, `pack`,
//! `write_into`, `CallDataHeader`), `heap_buffer`, `Name`, `ExecType` and the `Contract` trait.

mod error;
mod generator;
mod trampoline;

pub use crate::error::CodegenError;
pub use crate::generator::{
    CodegenOptions, DispatchGenerator, GENERATED_HEADER, GeneratedDispatcher,
};
pub use crate::trampoline::{ABI_ENTRY_SYMBOL, SYNC_CALL_DATA_HEADER_SYMBOL, SYNC_CALL_DATA_SYMBOL};
