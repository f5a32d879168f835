pub mod aggregator;
pub mod credential;
pub mod inference;
pub mod llm;
pub mod prompts;
#[cfg(not(target_arch = "wasm32"))]
pub mod setup;
pub mod studio;
#[cfg(test)]
pub(crate) mod testing;
