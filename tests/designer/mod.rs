//! Designer tests grouped by concern

mod codegen;
mod generics;
mod removal;
mod scenarios;
