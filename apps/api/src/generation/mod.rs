// AI-assisted writing: prompt assembly, provider calls, clean-up and
// validation of generated summaries and cover letters.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod validation;
