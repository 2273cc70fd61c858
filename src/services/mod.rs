pub mod drill;
pub mod grading;
pub mod llm_provider;
pub mod prompts;
pub mod vocabulary;
pub mod word_store;
