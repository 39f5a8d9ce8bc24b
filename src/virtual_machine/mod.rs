//! Script-level view of the ledger's stack virtual machine.
//!
//! Nothing here executes scripts. The modules describe the instruction set
//! precisely enough to build scripts, take them apart again and price them.
//!
//! # Modules
//!
//! - [`isa`]: Opcode table with mnemonics, operand sizes and prices
//! - [`token`]: Tokenizer and disassembler for byte scripts
//! - [`script_builder`]: Script assembly from pushes, syscalls and contract calls
//! - [`interop`]: Interop service registry and native contract hashes
//! - [`contract_param`]: Typed contract parameters
//! - [`stack_item`]: Serialized stack item decoding
//! - [`errors`]: Lookup and parameter error types

pub mod contract_param;
pub mod errors;
pub mod interop;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod script_builder;
pub mod stack_item;
pub mod token;
