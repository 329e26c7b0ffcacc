pub mod core;
pub mod llm;
pub mod memory;
pub mod rag;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod test_util;
