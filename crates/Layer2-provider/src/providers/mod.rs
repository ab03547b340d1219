//! LLM Provider implementations

pub mod gemini;
