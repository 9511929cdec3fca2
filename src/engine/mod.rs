pub mod engine;
pub mod protocol;
pub mod session;
pub mod error;

pub mod apply_mutation;
pub mod case_parser;
pub mod clue_extractor;
pub mod llm_client;
pub mod prompt_builder;
